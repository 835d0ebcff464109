/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 梯度下降优化器实现
 */

use serde::{Deserialize, Serialize};

use super::base::{GradEntry, Optimizer, OptimizerState, check_non_negative};
use super::state_dict::{OptimizerStateDict, check_header};
use crate::errors::NnError;
use crate::nn::Parameter;

pub(crate) const KIND: &str = "SGD";

/// SGD 超参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SgdConfig {
    pub learning_rate: f32,
    pub weight_decay: f32,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            weight_decay: 0.,
        }
    }
}

impl SgdConfig {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            ..Self::default()
        }
    }

    pub const fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), NnError> {
        check_non_negative("weight_decay", self.weight_decay)
    }
}

/// SGD (随机梯度下降) 优化器：θ = θ - α * ∇θ
#[derive(Debug)]
pub struct SGD {
    state: OptimizerState,
    config: SgdConfig,
}

impl SGD {
    /// 创建新的SGD优化器
    pub fn new(params: &[Parameter], config: SgdConfig) -> Result<Self, NnError> {
        config.validate()?;
        let state = OptimizerState::new(params, config.learning_rate)?;
        Ok(Self { state, config })
    }

    pub fn new_default(params: &[Parameter], learning_rate: f32) -> Result<Self, NnError> {
        Self::new(params, SgdConfig::new(learning_rate))
    }

    /// 当前配置（含当前学习率）
    pub fn config(&self) -> SgdConfig {
        self.config.with_learning_rate(self.state.learning_rate())
    }
}

impl Optimizer for SGD {
    fn step(&mut self) -> Result<(), NnError> {
        let entries = self.state.gradients(self.config.weight_decay)?;
        let learning_rate = self.state.learning_rate();
        for GradEntry { param, value, grad } in entries {
            param.set_value(value - learning_rate * &grad);
        }
        Ok(())
    }

    fn zero_grad(&mut self) {
        self.state.zero_grad();
    }

    fn learning_rate(&self) -> f32 {
        self.state.learning_rate()
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.state.set_learning_rate(lr);
    }

    // SGD 无累积状态
    fn reset(&mut self) {}

    fn params(&self) -> &[Parameter] {
        self.state.params()
    }

    fn state_dict(&self) -> OptimizerStateDict {
        OptimizerStateDict {
            optimizer: KIND.to_string(),
            learning_rate: self.state.learning_rate(),
            param_states: vec![None; self.state.params().len()],
        }
    }

    fn load_state_dict(&mut self, state_dict: &OptimizerStateDict) -> Result<(), NnError> {
        check_header(KIND, self.state.params(), state_dict)?;
        if state_dict.param_states.iter().any(Option::is_some) {
            return Err(NnError::StateDictMismatch(
                "SGD没有逐参数状态，但状态中含有参数记录".to_string(),
            ));
        }
        self.state.set_learning_rate(state_dict.learning_rate);
        Ok(())
    }
}
