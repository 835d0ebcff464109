/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 错误类型：张量运算错误（TensorError）与神经网络/优化器错误（NnError）
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },

    #[error("张量数据长度{data_len}与形状{shape:?}不符")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("交换张量时，输入的维度数至少需要2个")]
    PermuteNeedAtLeast2Dims,
    #[error("需要交换的维度必须是唯一且在[0, <张量维数>)范围内")]
    PermuteNeedUniqueAndInRange,
    #[error("轴{axis}超出张量维数{dimension}")]
    AxisOutOfRange { axis: usize, dimension: usize },
    #[error("除数为零")]
    DivByZero,
    #[error("作为除数的张量中存在为零元素")]
    DivByZeroElement,
}

/// 神经网络层、参数与优化器的错误类型
///
/// 与`TensorError`不同，这里的错误都通过`Result`返回给调用方，而非直接panic。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NnError {
    #[error("形状不匹配：期望{expected:?}，实际{got:?}（{message}）")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("超参数`{name}`的值{value}非法：{requirement}")]
    InvalidHyperParameter {
        name: String,
        value: f32,
        requirement: String,
    },
    #[error("输入非法：{0}")]
    InvalidInput(String),
    #[error("{0}在前向传播之前调用了反向传播")]
    MissingCache(String),
    #[error("优化器状态不匹配：{0}")]
    StateDictMismatch(String),
    #[error("序列化失败：{0}")]
    Serialization(String),
    #[error("读写文件失败：{0}")]
    Io(String),
}

impl NnError {
    pub(crate) fn shape_mismatch(expected: &[usize], got: &[usize], message: &str) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
            message: message.to_string(),
        }
    }

    pub(crate) fn invalid_hyper_parameter(name: &str, value: f32, requirement: &str) -> Self {
        Self::InvalidHyperParameter {
            name: name.to_string(),
            value,
            requirement: requirement.to_string(),
        }
    }
}

impl From<std::io::Error> for NnError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for NnError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for NnError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
