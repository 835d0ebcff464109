/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:30:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Adam优化器实现（含 AMSGrad 变体）
 */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::base::{
    GradEntry, Optimizer, OptimizerState, check_non_negative, check_positive, check_unit_interval,
};
use super::state_dict::{
    OptimizerStateDict, ParamState, ParamStateRecord, check_state_shapes, export_states,
    import_states,
};
use crate::errors::NnError;
use crate::nn::{Parameter, ParameterId};
use crate::tensor::Tensor;

pub(crate) const KIND: &str = "Adam";
const EXP_AVG: &str = "exp_avg";
const EXP_AVG_SQ: &str = "exp_avg_sq";
const MAX_EXP_AVG_SQ: &str = "max_exp_avg_sq";

/// Adam 超参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
    pub weight_decay: f32,
    pub amsgrad: bool,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            weight_decay: 0.,
            amsgrad: false,
        }
    }
}

impl AdamConfig {
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

    pub const fn with_betas(mut self, beta1: f32, beta2: f32) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
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

    pub const fn with_amsgrad(mut self, amsgrad: bool) -> Self {
        self.amsgrad = amsgrad;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), NnError> {
        check_unit_interval("beta1", self.beta1)?;
        check_unit_interval("beta2", self.beta2)?;
        check_positive("eps", self.eps)?;
        check_non_negative("weight_decay", self.weight_decay)
    }
}

#[derive(Debug)]
pub(crate) struct AdamState {
    step: u64,
    /// 一阶矩估计
    exp_avg: Tensor,
    /// 二阶矩估计
    exp_avg_sq: Tensor,
    /// 历史最大二阶矩（仅 AMSGrad）
    max_exp_avg_sq: Option<Tensor>,
}

impl ParamState for AdamState {
    type Config = AdamConfig;

    fn shape(&self) -> &[usize] {
        self.exp_avg.shape()
    }

    fn to_record(&self) -> ParamStateRecord {
        let record = ParamStateRecord::new(self.step)
            .with_buffer(EXP_AVG, &self.exp_avg)
            .with_buffer(EXP_AVG_SQ, &self.exp_avg_sq);
        match &self.max_exp_avg_sq {
            Some(max_exp_avg_sq) => record.with_buffer(MAX_EXP_AVG_SQ, max_exp_avg_sq),
            None => record,
        }
    }

    fn from_record(record: &ParamStateRecord, config: &AdamConfig) -> Result<Self, NnError> {
        Ok(Self {
            step: record.step,
            exp_avg: record.buffer(EXP_AVG)?,
            exp_avg_sq: record.buffer(EXP_AVG_SQ)?,
            max_exp_avg_sq: config
                .amsgrad
                .then(|| record.buffer(MAX_EXP_AVG_SQ))
                .transpose()?,
        })
    }
}

/// Adam优化器
///
/// - m = β1·m + (1-β1)·g，v = β2·v + (1-β2)·g²
/// - m̂ = m/(1-β1^t)，v̂ = v/(1-β2^t)（AMSGrad 时用历史最大的 v）
/// - θ = θ - α·m̂/(√v̂ + ε)
#[derive(Debug)]
pub struct Adam {
    state: OptimizerState,
    config: AdamConfig,
    states: HashMap<ParameterId, AdamState>,
}

impl Adam {
    pub fn new(params: &[Parameter], config: AdamConfig) -> Result<Self, NnError> {
        config.validate()?;
        let state = OptimizerState::new(params, config.learning_rate)?;
        Ok(Self {
            state,
            config,
            states: HashMap::new(),
        })
    }

    /// 使用默认参数（β=(0.9, 0.999)，ε=1e-8）创建Adam优化器
    ///
    /// # 示例
    /// ```ignore
    /// // GAN 训练：分别为 G 和 D 创建优化器
    /// let optimizer_g = Adam::new_default(&generator.parameters(), 0.0002)?;
    /// let optimizer_d = Adam::new_default(&discriminator.parameters(), 0.0002)?;
    /// ```
    pub fn new_default(params: &[Parameter], learning_rate: f32) -> Result<Self, NnError> {
        Self::new(params, AdamConfig::new(learning_rate))
    }

    pub fn config(&self) -> AdamConfig {
        self.config.with_learning_rate(self.state.learning_rate())
    }

    /// 获取参数的一阶矩（m），用于调试
    pub fn exp_avg(&self, param: &Parameter) -> Option<&Tensor> {
        self.states.get(&param.id()).map(|s| &s.exp_avg)
    }

    /// 获取参数的二阶矩（v），用于调试
    pub fn exp_avg_sq(&self, param: &Parameter) -> Option<&Tensor> {
        self.states.get(&param.id()).map(|s| &s.exp_avg_sq)
    }

    pub fn max_exp_avg_sq(&self, param: &Parameter) -> Option<&Tensor> {
        self.states
            .get(&param.id())
            .and_then(|s| s.max_exp_avg_sq.as_ref())
    }

    /// 参数已被更新的步数（即偏差修正中的 t）
    pub fn step_count(&self, param: &Parameter) -> u64 {
        self.states.get(&param.id()).map_or(0, |s| s.step)
    }
}

impl Optimizer for Adam {
    fn step(&mut self) -> Result<(), NnError> {
        let entries = self.state.gradients(self.config.weight_decay)?;
        check_state_shapes(&self.states, &entries)?;

        let learning_rate = self.state.learning_rate();
        let AdamConfig {
            beta1,
            beta2,
            eps,
            amsgrad,
            ..
        } = self.config;

        for GradEntry { param, value, grad } in entries {
            let state = self.states.entry(param.id()).or_insert_with(|| AdamState {
                step: 0,
                exp_avg: Tensor::zeros(grad.shape()),
                exp_avg_sq: Tensor::zeros(grad.shape()),
                max_exp_avg_sq: amsgrad.then(|| Tensor::zeros(grad.shape())),
            });
            state.step += 1;

            // m = β1 * m + (1 - β1) * g
            state.exp_avg *= beta1;
            state.exp_avg += &(&grad * (1. - beta1));
            // v = β2 * v + (1 - β2) * g²
            state.exp_avg_sq *= beta2;
            state.exp_avg_sq += &(grad.square() * (1. - beta2));

            // 偏差修正
            let t = i32::try_from(state.step).unwrap_or(i32::MAX);
            let bias_correction1 = 1. - beta1.powi(t);
            let bias_correction2 = 1. - beta2.powi(t);

            let m_hat = &state.exp_avg / bias_correction1;
            let v_hat = match &mut state.max_exp_avg_sq {
                Some(max_exp_avg_sq) => {
                    *max_exp_avg_sq = max_exp_avg_sq.maximum(&state.exp_avg_sq);
                    &*max_exp_avg_sq / bias_correction2
                }
                None => &state.exp_avg_sq / bias_correction2,
            };

            // θ = θ - α * m_hat / (√v_hat + ε)
            let denominator = v_hat.sqrt() + eps;
            let update = &m_hat / &denominator;
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
