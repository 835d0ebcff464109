/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 优化器基础trait和辅助结构
 */

use std::collections::HashSet;

use enum_dispatch::enum_dispatch;

use super::state_dict::OptimizerStateDict;
use crate::errors::NnError;
use crate::nn::Parameter;
use crate::tensor::Tensor;
use crate::utils::traits::float::FloatTrait;

/// 优化器核心 trait
#[enum_dispatch]
pub trait Optimizer {
    /// 参数更新（使用已计算的梯度）
    ///
    /// `PyTorch` 风格训练循环：
    /// ```ignore
    /// optimizer.zero_grad();
    /// // ……前向、手写反向，并通过 param.set_grad()/accumulate_grad() 写入梯度……
    /// optimizer.step()?; // ← 只更新参数，不计算梯度
    /// ```
    ///
    /// - 没有梯度（`grad()`为`None`）的参数被跳过，其状态也保持不变；
    /// - 任何一个参数的梯度或已有状态形状不符时返回错误，且不更新任何参数。
    fn step(&mut self) -> Result<(), NnError>;

    /// 清除所有受管参数的梯度
    fn zero_grad(&mut self);

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率（学习率调度器通过此方法生效）
    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（动量、二阶矩、步数等），学习率保持不变
    fn reset(&mut self);

    /// 受管参数（按构造时的顺序）
    fn params(&self) -> &[Parameter];

    /// 导出可序列化的优化器状态
    fn state_dict(&self) -> OptimizerStateDict;

    /// 恢复由`state_dict()`导出的状态。失败时优化器保持原状。
    fn load_state_dict(&mut self, state_dict: &OptimizerStateDict) -> Result<(), NnError>;
}

/// 单个待更新参数：值与（叠加权重衰减后的）梯度
pub(crate) struct GradEntry {
    pub(crate) param: Parameter,
    pub(crate) value: Tensor,
    pub(crate) grad: Tensor,
}

/// 优化器状态管理（内部实现，不对外暴露）
#[derive(Debug)]
pub(crate) struct OptimizerState {
    /// 受管参数
    params: Vec<Parameter>,
    /// 学习率
    learning_rate: f32,
}

impl OptimizerState {
    /// 创建优化器状态；同一参数不能重复出现
    pub(crate) fn new(params: &[Parameter], learning_rate: f32) -> Result<Self, NnError> {
        check_learning_rate(learning_rate)?;
        let mut seen = HashSet::new();
        for param in params {
            if !seen.insert(param.id()) {
                return Err(NnError::InvalidInput(format!(
                    "参数`{}`在优化器中重复出现",
                    param.name()
                )));
            }
        }
        Ok(Self {
            params: params.to_vec(),
            learning_rate,
        })
    }

    pub(crate) fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) const fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub(crate) const fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }

    pub(crate) fn zero_grad(&self) {
        for param in &self.params {
            param.zero_grad();
        }
    }

    /// 收集所有带梯度的参数，并叠加 L2 权重衰减：g ← g + wd·θ
    ///
    /// 先收集、后更新，保证校验失败时不会留下部分更新的参数。
    pub(crate) fn gradients(&self, weight_decay: f32) -> Result<Vec<GradEntry>, NnError> {
        let mut entries = Vec::with_capacity(self.params.len());
        for param in &self.params {
            let collected = param.with_value_and_grad(|value, grad| {
                let grad = grad?;
                if !value.is_same_shape(grad) {
                    return Some(Err(NnError::shape_mismatch(
                        value.shape(),
                        grad.shape(),
                        &format!("参数`{}`的值在写入梯度后被改变了形状", param.name()),
                    )));
                }
                let grad = if weight_decay == 0. {
                    grad.clone()
                } else {
                    grad + weight_decay * value
                };
                Some(Ok((value.clone(), grad)))
            });
            if let Some(collected) = collected {
                let (value, grad) = collected?;
                entries.push(GradEntry {
                    param: param.clone(),
                    value,
                    grad,
                });
            }
        }
        Ok(entries)
    }
}

pub(crate) fn check_learning_rate(lr: f32) -> Result<(), NnError> {
    if lr.is_finite_non_negative() {
        Ok(())
    } else {
        Err(NnError::invalid_hyper_parameter(
            "learning_rate",
            lr,
            "须为有限的非负数",
        ))
    }
}

pub(crate) fn check_non_negative(name: &str, value: f32) -> Result<(), NnError> {
    if value.is_finite_non_negative() {
        Ok(())
    } else {
        Err(NnError::invalid_hyper_parameter(name, value, "须为有限的非负数"))
    }
}

/// 用于 eps 等出现在分母中的超参数
pub(crate) fn check_positive(name: &str, value: f32) -> Result<(), NnError> {
    if value.is_finite_non_negative() && value > 0. {
        Ok(())
    } else {
        Err(NnError::invalid_hyper_parameter(name, value, "须为有限的正数"))
    }
}

/// 用于 Adam 的 beta 系数
pub(crate) fn check_unit_interval(name: &str, value: f32) -> Result<(), NnError> {
    if value.is_in_unit_interval() {
        Ok(())
    } else {
        Err(NnError::invalid_hyper_parameter(name, value, "须位于[0, 1)内"))
    }
}

/// 用于 RMSProp 的 alpha、Momentum 的 dampening
pub(crate) fn check_closed_unit_interval(name: &str, value: f32) -> Result<(), NnError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NnError::invalid_hyper_parameter(name, value, "须位于[0, 1]内"))
    }
}
