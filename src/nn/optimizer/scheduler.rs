/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 学习率调度器：按轮次（epoch）调整优化器的学习率
 */

use super::base::{Optimizer, check_non_negative};
use crate::errors::NnError;

/// 学习率调度器
///
/// 调度器只保存调度所需的计数，不持有优化器；每轮结束后调用一次`step()`：
/// ```ignore
/// let mut scheduler = StepLR::new(&optimizer, 30, 0.1)?;
/// for epoch in 0..100 {
///     train_one_epoch(&mut optimizer)?;
///     scheduler.step(&mut optimizer);
/// }
/// ```
pub trait LrScheduler {
    /// 进入下一轮，并把新的学习率写入优化器
    fn step(&mut self, optimizer: &mut dyn Optimizer);

    /// 最近一次设置的学习率
    fn last_lr(&self) -> f32;

    /// 已经过的轮数
    fn epoch(&self) -> usize;
}

/// 每隔`step_size`轮，学习率乘以`gamma`：η = η₀·γ^⌊epoch/step_size⌋
#[derive(Debug, Clone)]
pub struct StepLR {
    base_lr: f32,
    step_size: usize,
    gamma: f32,
    epoch: usize,
    last_lr: f32,
}

impl StepLR {
    /// 以优化器当前的学习率为初始学习率
    pub fn new(optimizer: &dyn Optimizer, step_size: usize, gamma: f32) -> Result<Self, NnError> {
        if step_size == 0 {
            return Err(NnError::invalid_hyper_parameter(
                "step_size",
                0.,
                "须大于0",
            ));
        }
        check_non_negative("gamma", gamma)?;
        let base_lr = optimizer.learning_rate();
        Ok(Self {
            base_lr,
            step_size,
            gamma,
            epoch: 0,
            last_lr: base_lr,
        })
    }
}

impl LrScheduler for StepLR {
    fn step(&mut self, optimizer: &mut dyn Optimizer) {
        self.epoch += 1;
        let decays = i32::try_from(self.epoch / self.step_size).unwrap_or(i32::MAX);
        self.last_lr = self.base_lr * self.gamma.powi(decays);
        optimizer.set_learning_rate(self.last_lr);
    }

    fn last_lr(&self) -> f32 {
        self.last_lr
    }

    fn epoch(&self) -> usize {
        self.epoch
    }
}

/// 每轮学习率乘以`gamma`：η = η₀·γ^epoch
#[derive(Debug, Clone)]
pub struct ExponentialLR {
    base_lr: f32,
    gamma: f32,
    epoch: usize,
    last_lr: f32,
}

impl ExponentialLR {
    pub fn new(optimizer: &dyn Optimizer, gamma: f32) -> Result<Self, NnError> {
        check_non_negative("gamma", gamma)?;
        let base_lr = optimizer.learning_rate();
        Ok(Self {
            base_lr,
            gamma,
            epoch: 0,
            last_lr: base_lr,
        })
    }
}

impl LrScheduler for ExponentialLR {
    fn step(&mut self, optimizer: &mut dyn Optimizer) {
        self.epoch += 1;
        let epoch = i32::try_from(self.epoch).unwrap_or(i32::MAX);
        self.last_lr = self.base_lr * self.gamma.powi(epoch);
        optimizer.set_learning_rate(self.last_lr);
    }

    fn last_lr(&self) -> f32 {
        self.last_lr
    }

    fn epoch(&self) -> usize {
        self.epoch
    }
}
