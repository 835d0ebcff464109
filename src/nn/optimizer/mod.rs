/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 优化器模块，实现 PyTorch 风格的梯度优化算法
 */

// `base`须在`config`之前声明（enum_dispatch 按展开顺序登记 trait）
mod base;
mod clip;
mod config;
mod scheduler;
mod state_dict;

mod adagrad;
mod adam;
mod momentum;
mod rmsprop;
mod sgd;

pub use adagrad::{Adagrad, AdagradConfig};
pub use adam::{Adam, AdamConfig};
pub use base::Optimizer;
pub use clip::{clip_grad_norm, clip_grad_value};
pub use config::{AnyOptimizer, OptimizerConfig};
pub use momentum::{Momentum, MomentumConfig};
pub use rmsprop::{RMSProp, RmsPropConfig};
pub use scheduler::{ExponentialLR, LrScheduler, StepLR};
pub use sgd::{SGD, SgdConfig};
pub use state_dict::{OptimizerStateDict, ParamStateRecord};
