/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 可序列化的优化器配置，以及按配置构建的统一优化器类型
 */

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use super::base::Optimizer;
use super::state_dict::OptimizerStateDict;
use super::{
    Adagrad, AdagradConfig, Adam, AdamConfig, Momentum, MomentumConfig, RMSProp, RmsPropConfig,
    SGD, SgdConfig, adagrad, adam, momentum, rmsprop, sgd,
};
use crate::errors::NnError;
use crate::nn::Parameter;

/// 任一优化器的配置。JSON 中以`type`字段区分种类，例如：
///
/// ```json
/// { "type": "Adam", "learning_rate": 0.001, "amsgrad": true }
/// ```
///
/// 未给出的字段取默认值。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OptimizerConfig {
    SGD(SgdConfig),
    Momentum(MomentumConfig),
    Adagrad(AdagradConfig),
    RMSProp(RmsPropConfig),
    Adam(AdamConfig),
}

impl OptimizerConfig {
    pub fn to_json(&self) -> Result<String, NnError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, NnError> {
        Ok(serde_json::from_str(json)?)
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SGD(_) => sgd::KIND,
            Self::Momentum(_) => momentum::KIND,
            Self::Adagrad(_) => adagrad::KIND,
            Self::RMSProp(_) => rmsprop::KIND,
            Self::Adam(_) => adam::KIND,
        }
    }

    pub const fn learning_rate(&self) -> f32 {
        match self {
            Self::SGD(c) => c.learning_rate,
            Self::Momentum(c) => c.learning_rate,
            Self::Adagrad(c) => c.learning_rate,
            Self::RMSProp(c) => c.learning_rate,
            Self::Adam(c) => c.learning_rate,
        }
    }

    /// 校验超参数并构建优化器
    pub fn build(&self, params: &[Parameter]) -> Result<AnyOptimizer, NnError> {
        Ok(match *self {
            Self::SGD(config) => SGD::new(params, config)?.into(),
            Self::Momentum(config) => Momentum::new(params, config)?.into(),
            Self::Adagrad(config) => Adagrad::new(params, config)?.into(),
            Self::RMSProp(config) => RMSProp::new(params, config)?.into(),
            Self::Adam(config) => Adam::new(params, config)?.into(),
        })
    }
}

impl From<SgdConfig> for OptimizerConfig {
    fn from(config: SgdConfig) -> Self {
        Self::SGD(config)
    }
}

impl From<MomentumConfig> for OptimizerConfig {
    fn from(config: MomentumConfig) -> Self {
        Self::Momentum(config)
    }
}

impl From<AdagradConfig> for OptimizerConfig {
    fn from(config: AdagradConfig) -> Self {
        Self::Adagrad(config)
    }
}

impl From<RmsPropConfig> for OptimizerConfig {
    fn from(config: RmsPropConfig) -> Self {
        Self::RMSProp(config)
    }
}

impl From<AdamConfig> for OptimizerConfig {
    fn from(config: AdamConfig) -> Self {
        Self::Adam(config)
    }
}

/// 运行时才确定种类的优化器（如由配置文件构建）
#[enum_dispatch(Optimizer)]
pub enum AnyOptimizer {
    SGD,
    Momentum,
    Adagrad,
    RMSProp,
    Adam,
}

impl AnyOptimizer {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SGD(_) => sgd::KIND,
            Self::Momentum(_) => momentum::KIND,
            Self::Adagrad(_) => adagrad::KIND,
            Self::RMSProp(_) => rmsprop::KIND,
            Self::Adam(_) => adam::KIND,
        }
    }

    /// 当前配置（含当前学习率）
    pub fn config(&self) -> OptimizerConfig {
        match self {
            Self::SGD(o) => o.config().into(),
            Self::Momentum(o) => o.config().into(),
            Self::Adagrad(o) => o.config().into(),
            Self::RMSProp(o) => o.config().into(),
            Self::Adam(o) => o.config().into(),
        }
    }
}

// 只显示种类与学习率
impl std::fmt::Debug for AnyOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyOptimizer")
            .field("kind", &self.kind())
            .field("learning_rate", &self.learning_rate())
            .finish()
    }
}
