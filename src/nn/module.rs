/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Module trait 定义
 */

use super::Parameter;

/// 模块 trait
///
/// # 设计原则
/// - `forward()`/`backward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` 返回 `Vec<Parameter>`（签名一致，放入 trait）
/// - 训练/评估模式会改变 Dropout、BatchNorm 等层的前向行为
///
/// # 使用示例
///
/// ```ignore
/// use only_optim::nn::{BatchNorm1d, Dropout, Module};
/// use only_optim::nn::optimizer::{Adam, Optimizer};
///
/// let mut bn = BatchNorm1d::new(16);
/// let mut dropout = Dropout::new(0.5)?;
/// let mut adam = Adam::new_default(&bn.parameters(), 1e-3)?;
///
/// let y = dropout.forward(&bn.forward(&x)?);
/// // ……计算 dy ……
/// bn.backward(&dropout.backward(&dy)?)?;
/// adam.step()?;
/// adam.zero_grad();
/// ```
pub trait Module {
    /// 获取所有可训练参数
    ///
    /// 用于：
    /// - 优化器需要知道要更新哪些参数
    /// - 统计参数数量
    fn parameters(&self) -> Vec<Parameter>;

    /// 可训练参数的元素总数
    fn num_params(&self) -> usize {
        self.parameters().iter().map(Parameter::size).sum()
    }

    fn set_training(&mut self, training: bool);

    fn is_training(&self) -> bool;

    /// 切换到训练模式
    fn train(&mut self) {
        self.set_training(true);
    }

    /// 切换到评估（推理）模式
    fn eval(&mut self) {
        self.set_training(false);
    }
}
