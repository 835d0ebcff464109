/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 动量梯度下降（含 Nesterov 变体）
 */

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

use super::base::{
    GradEntry, Optimizer, OptimizerState, check_closed_unit_interval, check_non_negative,
};
use super::state_dict::{
    OptimizerStateDict, ParamState, ParamStateRecord, check_state_shapes, export_states,
    import_states,
};
use crate::errors::NnError;
use crate::nn::{Parameter, ParameterId};
use crate::tensor::Tensor;

pub(crate) const KIND: &str = "Momentum";
const MOMENTUM_BUFFER: &str = "momentum_buffer";

/// Momentum 超参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub learning_rate: f32,
    pub momentum: f32,
    pub dampening: f32,
    pub nesterov: bool,
    pub weight_decay: f32,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            momentum: 0.9,
            dampening: 0.,
            nesterov: false,
            weight_decay: 0.,
        }
    }
}

impl MomentumConfig {
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

    pub const fn with_momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    pub const fn with_dampening(mut self, dampening: f32) -> Self {
        self.dampening = dampening;
        self
    }

    pub const fn with_nesterov(mut self, nesterov: bool) -> Self {
        self.nesterov = nesterov;
        self
    }

    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), NnError> {
        check_non_negative("momentum", self.momentum)?;
        check_closed_unit_interval("dampening", self.dampening)?;
        check_non_negative("weight_decay", self.weight_decay)?;
        if self.nesterov && (self.momentum <= 0. || self.dampening != 0.) {
            return Err(NnError::invalid_hyper_parameter(
                "momentum",
                self.momentum,
                "Nesterov 动量要求 momentum 大于0且 dampening 为0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct MomentumState {
    step: u64,
    buffer: Tensor,
}

impl ParamState for MomentumState {
    type Config = MomentumConfig;

    fn shape(&self) -> &[usize] {
        self.buffer.shape()
    }

    fn to_record(&self) -> ParamStateRecord {
        ParamStateRecord::new(self.step).with_buffer(MOMENTUM_BUFFER, &self.buffer)
    }

    fn from_record(record: &ParamStateRecord, _config: &MomentumConfig) -> Result<Self, NnError> {
        Ok(Self {
            step: record.step,
            buffer: record.buffer(MOMENTUM_BUFFER)?,
        })
    }
}

/// 动量梯度下降优化器
///
/// - 首步：buf = g；之后：buf = μ·buf + (1-τ)·g
/// - 方向：Nesterov 时 d = g + μ·buf，否则 d = buf
/// - θ = θ - α·d
///
/// `momentum`为0时退化为普通 SGD，且不创建任何状态。
#[derive(Debug)]
pub struct Momentum {
    state: OptimizerState,
    config: MomentumConfig,
    states: HashMap<ParameterId, MomentumState>,
}

impl Momentum {
    pub fn new(params: &[Parameter], config: MomentumConfig) -> Result<Self, NnError> {
        config.validate()?;
        let state = OptimizerState::new(params, config.learning_rate)?;
        Ok(Self {
            state,
            config,
            states: HashMap::new(),
        })
    }

    /// 使用默认参数（μ=0.9）创建
    pub fn new_default(params: &[Parameter], learning_rate: f32) -> Result<Self, NnError> {
        Self::new(params, MomentumConfig::new(learning_rate))
    }

    pub fn config(&self) -> MomentumConfig {
        self.config.with_learning_rate(self.state.learning_rate())
    }

    /// 获取参数的动量缓冲区（调试用）
    pub fn momentum_buffer(&self, param: &Parameter) -> Option<&Tensor> {
        self.states.get(&param.id()).map(|s| &s.buffer)
    }

    pub fn step_count(&self, param: &Parameter) -> u64 {
        self.states.get(&param.id()).map_or(0, |s| s.step)
    }
}

impl Optimizer for Momentum {
    fn step(&mut self) -> Result<(), NnError> {
        let entries = self.state.gradients(self.config.weight_decay)?;
        check_state_shapes(&self.states, &entries)?;

        let learning_rate = self.state.learning_rate();
        let MomentumConfig {
            momentum,
            dampening,
            nesterov,
            ..
        } = self.config;

        for GradEntry { param, value, grad } in entries {
            if momentum == 0. {
                param.set_value(value - learning_rate * &grad);
                continue;
            }

            let state = match self.states.entry(param.id()) {
                Entry::Occupied(entry) => {
                    let state = entry.into_mut();
                    state.buffer *= momentum;
                    state.buffer += &(&grad * (1. - dampening));
                    state
                }
                Entry::Vacant(entry) => entry.insert(MomentumState {
                    step: 0,
                    buffer: grad.clone(),
                }),
            };
            state.step += 1;

            let direction = if nesterov {
                &grad + momentum * &state.buffer
            } else {
                state.buffer.clone()
            };
            param.set_value(value - learning_rate * &direction);
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

    fn reset(&mut self) {
        self.states.clear();
    }

    fn params(&self) -> &[Parameter] {
        self.state.params()
    }

    fn state_dict(&self) -> OptimizerStateDict {
        OptimizerStateDict {
            optimizer: KIND.to_string(),
            learning_rate: self.state.learning_rate(),
            param_states: export_states(self.state.params(), &self.states),
        }
    }

    fn load_state_dict(&mut self, state_dict: &OptimizerStateDict) -> Result<(), NnError> {
        let states = import_states(KIND, self.state.params(), state_dict, &self.config)?;
        if self.config.momentum == 0. && !states.is_empty() {
            return Err(NnError::StateDictMismatch(
                "momentum为0时没有动量缓冲区，但状态中含有参数记录".to_string(),
            ));
        }
        self.states = states;
        self.state.set_learning_rate(state_dict.learning_rate);
        Ok(())
    }
}
