/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Adagrad 优化器：按历史梯度平方和自适应缩放每个元素的步长
 */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::base::{GradEntry, Optimizer, OptimizerState, check_non_negative, check_positive};
use super::state_dict::{
    OptimizerStateDict, ParamState, ParamStateRecord, check_state_shapes, export_states,
    import_states,
};
use crate::errors::NnError;
use crate::nn::{Parameter, ParameterId};
use crate::tensor::Tensor;

pub(crate) const KIND: &str = "Adagrad";
const SUM: &str = "sum";

/// Adagrad 超参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdagradConfig {
    pub learning_rate: f32,
    pub lr_decay: f32,
    pub weight_decay: f32,
    pub initial_accumulator_value: f32,
    pub eps: f32,
}

impl Default for AdagradConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            lr_decay: 0.,
            weight_decay: 0.,
            initial_accumulator_value: 0.,
            eps: 1e-10,
        }
    }
}

impl AdagradConfig {
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

    pub const fn with_lr_decay(mut self, lr_decay: f32) -> Self {
        self.lr_decay = lr_decay;
        self
    }

    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub const fn with_initial_accumulator_value(mut self, value: f32) -> Self {
        self.initial_accumulator_value = value;
        self
    }

    pub const fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), NnError> {
        check_non_negative("lr_decay", self.lr_decay)?;
        check_non_negative("weight_decay", self.weight_decay)?;
        check_non_negative("initial_accumulator_value", self.initial_accumulator_value)?;
        check_positive("eps", self.eps)
    }
}

#[derive(Debug)]
pub(crate) struct AdagradState {
    step: u64,
    sum: Tensor,
}

impl ParamState for AdagradState {
    type Config = AdagradConfig;

    fn shape(&self) -> &[usize] {
        self.sum.shape()
    }

    fn to_record(&self) -> ParamStateRecord {
        ParamStateRecord::new(self.step).with_buffer(SUM, &self.sum)
    }

    fn from_record(record: &ParamStateRecord, _config: &AdagradConfig) -> Result<Self, NnError> {
        Ok(Self {
            step: record.step,
            sum: record.buffer(SUM)?,
        })
    }
}

/// Adagrad 优化器
///
/// - η_t = η / (1 + (t-1)·lr_decay)
/// - G = G + g²
/// - θ = θ - η_t·g / (√G + ε)
#[derive(Debug)]
pub struct Adagrad {
    state: OptimizerState,
    config: AdagradConfig,
    states: HashMap<ParameterId, AdagradState>,
}

impl Adagrad {
    pub fn new(params: &[Parameter], config: AdagradConfig) -> Result<Self, NnError> {
        config.validate()?;
        let state = OptimizerState::new(params, config.learning_rate)?;
        Ok(Self {
            state,
            config,
            states: HashMap::new(),
        })
    }

    pub fn new_default(params: &[Parameter], learning_rate: f32) -> Result<Self, NnError> {
        Self::new(params, AdagradConfig::new(learning_rate))
    }

    pub fn config(&self) -> AdagradConfig {
        self.config.with_learning_rate(self.state.learning_rate())
    }

    /// 获取参数的梯度平方累加和
    pub fn sum(&self, param: &Parameter) -> Option<&Tensor> {
        self.states.get(&param.id()).map(|s| &s.sum)
    }

    pub fn step_count(&self, param: &Parameter) -> u64 {
        self.states.get(&param.id()).map_or(0, |s| s.step)
    }
}

impl Optimizer for Adagrad {
    fn step(&mut self) -> Result<(), NnError> {
        let entries = self.state.gradients(self.config.weight_decay)?;
        check_state_shapes(&self.states, &entries)?;

        let learning_rate = self.state.learning_rate();
        let AdagradConfig {
            lr_decay,
            initial_accumulator_value,
            eps,
            ..
        } = self.config;

        for GradEntry { param, value, grad } in entries {
            let state = self
                .states
                .entry(param.id())
                .or_insert_with(|| AdagradState {
                    step: 0,
                    sum: Tensor::full(initial_accumulator_value, grad.shape()),
                });
            state.step += 1;

            let clr = learning_rate / (1. + (state.step - 1) as f32 * lr_decay);
            state.sum += &grad.square();
            let std = state.sum.sqrt() + eps;
            param.set_value(value - clr * &(&grad / &std));
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
