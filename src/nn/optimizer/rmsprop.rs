/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : RMSProp 优化器（含 centered 与动量变体）
 */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::base::{
    GradEntry, Optimizer, OptimizerState, check_closed_unit_interval, check_non_negative,
    check_positive,
};
use super::state_dict::{
    OptimizerStateDict, ParamState, ParamStateRecord, check_state_shapes, export_states,
    import_states,
};
use crate::errors::NnError;
use crate::nn::{Parameter, ParameterId};
use crate::tensor::Tensor;

pub(crate) const KIND: &str = "RMSProp";
const SQUARE_AVG: &str = "square_avg";
const GRAD_AVG: &str = "grad_avg";
const MOMENTUM_BUFFER: &str = "momentum_buffer";

/// RMSProp 超参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmsPropConfig {
    pub learning_rate: f32,
    pub alpha: f32,
    pub eps: f32,
    pub weight_decay: f32,
    pub momentum: f32,
    pub centered: bool,
}

impl Default for RmsPropConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            alpha: 0.99,
            eps: 1e-8,
            weight_decay: 0.,
            momentum: 0.,
            centered: false,
        }
    }
}

impl RmsPropConfig {
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

    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub const fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub const fn with_momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    pub const fn with_centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), NnError> {
        check_closed_unit_interval("alpha", self.alpha)?;
        check_positive("eps", self.eps)?;
        check_non_negative("weight_decay", self.weight_decay)?;
        check_non_negative("momentum", self.momentum)
    }
}

#[derive(Debug)]
pub(crate) struct RmsPropState {
    step: u64,
    square_avg: Tensor,
    /// 仅 centered 时存在
    grad_avg: Option<Tensor>,
    /// 仅 momentum > 0 时存在
    momentum_buffer: Option<Tensor>,
}

impl RmsPropState {
    fn new(shape: &[usize], config: &RmsPropConfig) -> Self {
        Self {
            step: 0,
            square_avg: Tensor::zeros(shape),
            grad_avg: config.centered.then(|| Tensor::zeros(shape)),
            momentum_buffer: (config.momentum > 0.).then(|| Tensor::zeros(shape)),
        }
    }
}

impl ParamState for RmsPropState {
    type Config = RmsPropConfig;

    fn shape(&self) -> &[usize] {
        self.square_avg.shape()
    }

    fn to_record(&self) -> ParamStateRecord {
        let mut record = ParamStateRecord::new(self.step).with_buffer(SQUARE_AVG, &self.square_avg);
        if let Some(grad_avg) = &self.grad_avg {
            record = record.with_buffer(GRAD_AVG, grad_avg);
        }
        if let Some(buffer) = &self.momentum_buffer {
            record = record.with_buffer(MOMENTUM_BUFFER, buffer);
        }
        record
    }

    fn from_record(record: &ParamStateRecord, config: &RmsPropConfig) -> Result<Self, NnError> {
        Ok(Self {
            step: record.step,
            square_avg: record.buffer(SQUARE_AVG)?,
            grad_avg: config
                .centered
                .then(|| record.buffer(GRAD_AVG))
                .transpose()?,
            momentum_buffer: (config.momentum > 0.)
                .then(|| record.buffer(MOMENTUM_BUFFER))
                .transpose()?,
        })
    }
}

/// RMSProp 优化器
///
/// - s = α·s + (1-α)·g²
/// - centered：ḡ = α·ḡ + (1-α)·g，avg = √max(s - ḡ², 0) + ε；否则 avg = √s + ε
/// - μ > 0：buf = μ·buf + g/avg，θ = θ - η·buf；否则 θ = θ - η·g/avg
#[derive(Debug)]
pub struct RMSProp {
    state: OptimizerState,
    config: RmsPropConfig,
    states: HashMap<ParameterId, RmsPropState>,
}

impl RMSProp {
    pub fn new(params: &[Parameter], config: RmsPropConfig) -> Result<Self, NnError> {
        config.validate()?;
        let state = OptimizerState::new(params, config.learning_rate)?;
        Ok(Self {
            state,
            config,
            states: HashMap::new(),
        })
    }

    pub fn new_default(params: &[Parameter], learning_rate: f32) -> Result<Self, NnError> {
        Self::new(params, RmsPropConfig::new(learning_rate))
    }

    pub fn config(&self) -> RmsPropConfig {
        self.config.with_learning_rate(self.state.learning_rate())
    }

    /// 梯度平方的滑动平均
    pub fn square_avg(&self, param: &Parameter) -> Option<&Tensor> {
        self.states.get(&param.id()).map(|s| &s.square_avg)
    }

    /// 梯度的滑动平均（仅 centered）
    pub fn grad_avg(&self, param: &Parameter) -> Option<&Tensor> {
        self.states.get(&param.id()).and_then(|s| s.grad_avg.as_ref())
    }

    pub fn momentum_buffer(&self, param: &Parameter) -> Option<&Tensor> {
        self.states
            .get(&param.id())
            .and_then(|s| s.momentum_buffer.as_ref())
    }

    pub fn step_count(&self, param: &Parameter) -> u64 {
        self.states.get(&param.id()).map_or(0, |s| s.step)
    }
}

impl Optimizer for RMSProp {
    fn step(&mut self) -> Result<(), NnError> {
        let entries = self.state.gradients(self.config.weight_decay)?;
        check_state_shapes(&self.states, &entries)?;

        let learning_rate = self.state.learning_rate();
        let config = self.config;
        let alpha = config.alpha;

        for GradEntry { param, value, grad } in entries {
            let state = self
                .states
                .entry(param.id())
                .or_insert_with(|| RmsPropState::new(grad.shape(), &config));
            state.step += 1;

            state.square_avg *= alpha;
            state.square_avg += &(grad.square() * (1. - alpha));

            let avg = if let Some(grad_avg) = &mut state.grad_avg {
                *grad_avg *= alpha;
                *grad_avg += &(&grad * (1. - alpha));
                // 浮点误差可能使方差略小于0
                (&state.square_avg - &grad_avg.square()).clamp_min(0.).sqrt() + config.eps
            } else {
                state.square_avg.sqrt() + config.eps
            };

            let update = if let Some(buffer) = &mut state.momentum_buffer {
                *buffer *= config.momentum;
                *buffer += &(&grad / &avg);
                buffer.clone()
            } else {
                &grad / &avg
            };
            param.set_value(value - learning_rate * &update);
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
        self.states = import_states(KIND, self.state.params(), state_dict, &self.config)?;
        self.state.set_learning_rate(state_dict.learning_rate);
        Ok(())
    }
}
