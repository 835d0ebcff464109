use std::io::{Read, Write};

use super::Tensor;

// 保存和加载张量（bincode二进制格式）
impl Tensor {
    /// 将单个Tensor写入`writer`（如本地文件）
    pub fn save<W: Write>(&self, writer: W) -> bincode::Result<()> {
        bincode::serialize_into(writer, self)
    }

    /// 从`reader`（如本地文件）加载单个Tensor
    pub fn load<R: Read>(reader: R) -> bincode::Result<Self> {
        bincode::deserialize_from(reader)
    }
}
