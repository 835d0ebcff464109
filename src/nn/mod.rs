/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 神经网络（neural network）相关：可训练参数、正则化层与梯度优化器
 */

pub mod layer;
mod module;
pub mod optimizer;
mod parameter;

pub use layer::{BatchNorm1d, BatchNorm2d, Dropout};
pub use module::Module;
pub use parameter::{Parameter, ParameterId};
