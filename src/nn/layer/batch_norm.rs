/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 批归一化（Batch Normalization）层
 *
 * 训练时用当前批次的均值与（有偏）方差做归一化，并以动量更新运行统计量
 * （运行方差使用无偏估计）；评估时直接使用运行统计量。
 */

use crate::errors::NnError;
use crate::nn::{Module, Parameter};
use crate::tensor::Tensor;

const DEFAULT_EPS: f32 = 1e-5;
const DEFAULT_MOMENTUM: f32 = 0.1;

#[derive(Debug)]
struct BatchNormCache {
    /// 归一化后的输入 [N, D]
    x_hat: Tensor,
    /// 1/√(var + eps)，形状 [D]
    inv_std: Tensor,
    /// 前向是否使用了批统计量（即训练模式）
    batch_stats: bool,
}

/// 一维批归一化
///
/// # 输入/输出形状
/// - 输入：[batch_size, num_features]
/// - 输出：与输入相同
///
/// `y = γ·x̂ + β`，其中 γ（初始为1）和 β（初始为0）为可训练参数。
#[derive(Debug)]
pub struct BatchNorm1d {
    num_features: usize,
    eps: f32,
    momentum: f32,
    gamma: Parameter,
    beta: Parameter,
    running_mean: Tensor,
    running_var: Tensor,
    training: bool,
    cache: Option<BatchNormCache>,
}

impl BatchNorm1d {
    /// 使用默认参数（eps=1e-5，momentum=0.1）创建
    pub fn new(num_features: usize) -> Self {
        Self::build(num_features, DEFAULT_EPS, DEFAULT_MOMENTUM)
    }

    /// - `eps`：加在方差上的小正数，须大于0
    /// - `momentum`：运行统计量的更新系数，须位于[0, 1]
    pub fn with_config(num_features: usize, eps: f32, momentum: f32) -> Result<Self, NnError> {
        if !(eps.is_finite() && eps > 0.) {
            return Err(NnError::invalid_hyper_parameter("eps", eps, "须为有限的正数"));
        }
        if !(0.0..=1.0).contains(&momentum) {
            return Err(NnError::invalid_hyper_parameter(
                "momentum",
                momentum,
                "须位于[0, 1]内",
            ));
        }
        Ok(Self::build(num_features, eps, momentum))
    }

    fn build(num_features: usize, eps: f32, momentum: f32) -> Self {
        Self {
            num_features,
            eps,
            momentum,
            gamma: Parameter::new(Tensor::ones(&[num_features]), "gamma"),
            beta: Parameter::new(Tensor::zeros(&[num_features]), "beta"),
            running_mean: Tensor::zeros(&[num_features]),
            running_var: Tensor::ones(&[num_features]),
            training: true,
            cache: None,
        }
    }

    pub const fn num_features(&self) -> usize {
        self.num_features
    }

    pub const fn eps(&self) -> f32 {
        self.eps
    }

    pub const fn momentum(&self) -> f32 {
        self.momentum
    }

    /// 缩放参数 γ
    pub const fn gamma(&self) -> &Parameter {
        &self.gamma
    }

    /// 平移参数 β
    pub const fn beta(&self) -> &Parameter {
        &self.beta
    }

    pub const fn running_mean(&self) -> &Tensor {
        &self.running_mean
    }

    pub const fn running_var(&self) -> &Tensor {
        &self.running_var
    }

    pub fn forward(&mut self, x: &Tensor) -> Result<Tensor, NnError> {
        self.check_input(x)?;

        let (mean, var) = if self.training {
            let n = x.shape()[0];
            if n < 2 {
                return Err(NnError::InvalidInput(format!(
                    "训练模式下每个特征至少需要2个样本，实际为{n}"
                )));
            }
            let mean = x.mean_axis(0);
            let var = x.var_axis(0, 0.);
            let unbiased_var = &var * (n as f32 / (n - 1) as f32);

            let m = self.momentum;
            self.running_mean = (1. - m) * &self.running_mean + m * &mean;
            self.running_var = (1. - m) * &self.running_var + m * &unbiased_var;
            (mean, var)
        } else {
            (self.running_mean.clone(), self.running_var.clone())
        };

        let inv_std = 1. / &(var + self.eps).sqrt();
        let x_hat = (x - &mean) * &inv_std;
        let y = &x_hat * &self.gamma.value() + &self.beta.value();

        self.cache = Some(BatchNormCache {
            x_hat,
            inv_std,
            batch_stats: self.training,
        });
        Ok(y)
    }

    /// 把 dγ、dβ 累加到参数梯度上，并返回输入的梯度 dx
    pub fn backward(&self, dy: &Tensor) -> Result<Tensor, NnError> {
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| NnError::MissingCache("BatchNorm1d".to_string()))?;
        if !dy.is_same_shape(&cache.x_hat) {
            return Err(NnError::shape_mismatch(
                cache.x_hat.shape(),
                dy.shape(),
                "BatchNorm1d 反向传播的梯度形状须与前向输入一致",
            ));
        }

        let dgamma = (dy * &cache.x_hat).sum_axis(0);
        let dbeta = dy.sum_axis(0);
        let dx_hat = dy * &self.gamma.value();

        let dx = if cache.batch_stats {
            // 均值与方差都依赖于 x，需把它们的梯度一并算入
            let n = dy.shape()[0] as f32;
            let sum_dx_hat = dx_hat.sum_axis(0);
            let sum_dx_hat_x_hat = (&dx_hat * &cache.x_hat).sum_axis(0);
            (n * &dx_hat - &sum_dx_hat - &cache.x_hat * &sum_dx_hat_x_hat) * &cache.inv_std / n
        } else {
            &dx_hat * &cache.inv_std
        };

        self.gamma.accumulate_grad(&dgamma)?;
        self.beta.accumulate_grad(&dbeta)?;
        Ok(dx)
    }

    fn check_input(&self, x: &Tensor) -> Result<(), NnError> {
        let batch_size = x.shape().first().copied().unwrap_or(0);
        if x.dimension() != 2 || x.shape()[1] != self.num_features {
            return Err(NnError::shape_mismatch(
                &[batch_size, self.num_features],
                x.shape(),
                "BatchNorm1d 的输入须为[batch_size, num_features]",
            ));
        }
        Ok(())
    }
}

impl Module for BatchNorm1d {
    fn parameters(&self) -> Vec<Parameter> {
        vec![self.gamma.clone(), self.beta.clone()]
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }
}

/// 二维批归一化：对 [N, C, H, W] 的每个通道，在 N·H·W 个元素上做归一化
///
/// 内部把输入变形为 [N·H·W, C] 后交给`BatchNorm1d`处理。
#[derive(Debug)]
pub struct BatchNorm2d {
    inner: BatchNorm1d,
    input_shape: Option<[usize; 4]>,
}

impl BatchNorm2d {
    pub fn new(num_channels: usize) -> Self {
        Self {
            inner: BatchNorm1d::new(num_channels),
            input_shape: None,
        }
    }

    pub fn with_config(num_channels: usize, eps: f32, momentum: f32) -> Result<Self, NnError> {
        Ok(Self {
            inner: BatchNorm1d::with_config(num_channels, eps, momentum)?,
            input_shape: None,
        })
    }

    pub const fn num_channels(&self) -> usize {
        self.inner.num_features()
    }

    pub const fn gamma(&self) -> &Parameter {
        self.inner.gamma()
    }

    pub const fn beta(&self) -> &Parameter {
        self.inner.beta()
    }

    pub const fn running_mean(&self) -> &Tensor {
        self.inner.running_mean()
    }

    pub const fn running_var(&self) -> &Tensor {
        self.inner.running_var()
    }

    pub fn forward(&mut self, x: &Tensor) -> Result<Tensor, NnError> {
        let shape = self.check_input(x)?;
        let y = self.inner.forward(&to_channels_last(x, shape))?;
        self.input_shape = Some(shape);
        Ok(from_channels_last(&y, shape))
    }

    pub fn backward(&self, dy: &Tensor) -> Result<Tensor, NnError> {
        let shape = self
            .input_shape
            .ok_or_else(|| NnError::MissingCache("BatchNorm2d".to_string()))?;
        if dy.shape() != shape.as_slice() {
            return Err(NnError::shape_mismatch(
                &shape,
                dy.shape(),
                "BatchNorm2d 反向传播的梯度形状须与前向输入一致",
            ));
        }
        let dx = self.inner.backward(&to_channels_last(dy, shape))?;
        Ok(from_channels_last(&dx, shape))
    }

    fn check_input(&self, x: &Tensor) -> Result<[usize; 4], NnError> {
        let channels = self.num_channels();
        match *x.shape() {
            [n, c, h, w] if c == channels => Ok([n, c, h, w]),
            _ => Err(NnError::shape_mismatch(
                &[x.shape().first().copied().unwrap_or(0), channels],
                x.shape(),
                "BatchNorm2d 的输入须为[N, C, H, W]，且 C 等于通道数",
            )),
        }
    }
}

impl Module for BatchNorm2d {
    fn parameters(&self) -> Vec<Parameter> {
        self.inner.parameters()
    }

    fn set_training(&mut self, training: bool) {
        self.inner.set_training(training);
    }

    fn is_training(&self) -> bool {
        self.inner.is_training()
    }
}

// [N, C, H, W] -> [N·H·W, C]
fn to_channels_last(x: &Tensor, [n, c, h, w]: [usize; 4]) -> Tensor {
    x.permute(&[0, 2, 3, 1]).reshape(&[n * h * w, c])
}

// [N·H·W, C] -> [N, C, H, W]
fn from_channels_last(x: &Tensor, [n, c, h, w]: [usize; 4]) -> Tensor {
    x.reshape(&[n, h, w, c]).permute(&[0, 3, 1, 2])
}
