/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 优化器状态的导出与恢复（断点续训）
 *
 * 状态按参数在优化器中的位置（而非 ParameterId）索引，
 * 这样换一批新建的 Parameter（如重新加载模型）后依然能够恢复。
 */

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::NnError;
use crate::nn::{Parameter, ParameterId};
use crate::tensor::Tensor;

use super::base::GradEntry;

/// 单个参数的优化器状态：已更新步数及若干命名缓冲区
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamStateRecord {
    pub step: u64,
    pub buffers: BTreeMap<String, Tensor>,
}

impl ParamStateRecord {
    pub(crate) fn new(step: u64) -> Self {
        Self {
            step,
            buffers: BTreeMap::new(),
        }
    }

    pub(crate) fn with_buffer(mut self, name: &str, buffer: &Tensor) -> Self {
        self.buffers.insert(name.to_string(), buffer.clone());
        self
    }

    /// 取出必需的缓冲区，缺失时报错
    pub(crate) fn buffer(&self, name: &str) -> Result<Tensor, NnError> {
        self.buffers
            .get(name)
            .cloned()
            .ok_or_else(|| NnError::StateDictMismatch(format!("缺少缓冲区`{name}`")))
    }
}

/// 可序列化的优化器状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerStateDict {
    /// 优化器种类，如"Adam"
    pub optimizer: String,
    pub learning_rate: f32,
    /// 与`Optimizer::params()`一一对应；尚未更新过的参数为`None`
    pub param_states: Vec<Option<ParamStateRecord>>,
}

impl OptimizerStateDict {
    pub fn to_json(&self) -> Result<String, NnError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, NnError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 以二进制（bincode）格式保存到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), NnError> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NnError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

/// 有状态优化器的逐参数状态
pub(crate) trait ParamState: Sized {
    /// 决定需要哪些缓冲区的配置
    type Config;

    /// 所有缓冲区共同的形状（即创建该状态时参数的形状）
    fn shape(&self) -> &[usize];

    fn to_record(&self) -> ParamStateRecord;

    fn from_record(record: &ParamStateRecord, config: &Self::Config) -> Result<Self, NnError>;
}

/// 按参数顺序导出状态
pub(crate) fn export_states<S: ParamState>(
    params: &[Parameter],
    states: &HashMap<ParameterId, S>,
) -> Vec<Option<ParamStateRecord>> {
    params
        .iter()
        .map(|param| states.get(&param.id()).map(ParamState::to_record))
        .collect()
}

/// 校验并恢复状态。只有全部校验通过才返回新的状态表，调用方据此整体替换。
pub(crate) fn import_states<S: ParamState>(
    kind: &str,
    params: &[Parameter],
    state_dict: &OptimizerStateDict,
    config: &S::Config,
) -> Result<HashMap<ParameterId, S>, NnError> {
    check_header(kind, params, state_dict)?;

    let mut states = HashMap::new();
    for (param, record) in params.iter().zip(&state_dict.param_states) {
        let Some(record) = record else {
            continue;
        };
        // 步数须还能再加1
        if record.step == u64::MAX {
            return Err(NnError::StateDictMismatch(format!(
                "参数`{}`的步数{}已达上限",
                param.name(),
                record.step
            )));
        }
        let shape = param.shape();
        for (name, buffer) in &record.buffers {
            if buffer.shape() != shape.as_slice() {
                return Err(NnError::shape_mismatch(
                    &shape,
                    buffer.shape(),
                    &format!("参数`{}`的缓冲区`{name}`", param.name()),
                ));
            }
        }
        states.insert(param.id(), S::from_record(record, config)?);
    }
    Ok(states)
}

/// 校验优化器种类、学习率与参数个数
pub(crate) fn check_header(
    kind: &str,
    params: &[Parameter],
    state_dict: &OptimizerStateDict,
) -> Result<(), NnError> {
    if state_dict.optimizer != kind {
        return Err(NnError::StateDictMismatch(format!(
            "状态来自优化器{}，无法加载到{kind}",
            state_dict.optimizer
        )));
    }
    if state_dict.param_states.len() != params.len() {
        return Err(NnError::StateDictMismatch(format!(
            "状态含{}个参数，而优化器管理{}个参数",
            state_dict.param_states.len(),
            params.len()
        )));
    }
    super::base::check_learning_rate(state_dict.learning_rate)
}

/// 更新前校验：梯度形状须与已有状态一致
pub(crate) fn check_state_shapes<S: ParamState>(
    states: &HashMap<ParameterId, S>,
    entries: &[GradEntry],
) -> Result<(), NnError> {
    for entry in entries {
        if let Some(state) = states.get(&entry.param.id()) {
            if state.shape() != entry.grad.shape() {
                return Err(NnError::shape_mismatch(
                    state.shape(),
                    entry.grad.shape(),
                    &format!("参数`{}`的形状与其优化器状态不一致", entry.param.name()),
                ));
            }
        }
    }
    Ok(())
}
