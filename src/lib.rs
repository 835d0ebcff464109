//! # Only Optim
//!
//! `only_optim`用纯rust实现了一套基于梯度的优化器（SGD、Momentum、Adagrad、RMSProp、Adam），
//! 以及训练中常用的两种正则化层（Dropout、BatchNorm）。
//!
//! 优化器直接作用于参数值与梯度张量，不依赖任何计算图：梯度由调用方（或各层的`backward`）写入
//! [`nn::Parameter`]，优化器只负责据此更新参数值。
//!

pub mod errors;
pub mod nn;
pub mod tensor;
pub mod utils;
