/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Dropout 层（inverted dropout）
 *
 * 训练时以概率 p 将元素置零，保留的元素乘以 1/(1-p)，使期望值不变；
 * 评估（推理）时为恒等映射，无需再做缩放。
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::NnError;
use crate::nn::{Module, Parameter};
use crate::tensor::Tensor;

/// 前向传播留给反向传播的缓存
#[derive(Debug)]
enum DropoutCache {
    /// 前向为恒等映射（评估模式或 p=0）
    Identity(Vec<usize>),
    /// 已按 1/(1-p) 缩放的掩码
    Mask(Tensor),
}

/// Dropout 层
///
/// # 使用示例
/// ```ignore
/// let mut dropout = Dropout::new_seeded(0.5, 42)?;
/// let y = dropout.forward(&x);
/// let dx = dropout.backward(&dy)?;
/// dropout.eval(); // 之后 forward 为恒等映射
/// ```
#[derive(Debug)]
pub struct Dropout {
    /// 元素被置零的概率
    p: f32,
    training: bool,
    rng: StdRng,
    cache: Option<DropoutCache>,
}

impl Dropout {
    /// `p`须位于[0, 1]；p=1 时训练模式下输出全零
    pub fn new(p: f32) -> Result<Self, NnError> {
        Self::with_rng(p, StdRng::from_entropy())
    }

    /// 同`new`，但掩码由固定种子生成，保证结果可复现
    pub fn new_seeded(p: f32, seed: u64) -> Result<Self, NnError> {
        Self::with_rng(p, StdRng::seed_from_u64(seed))
    }

    fn with_rng(p: f32, rng: StdRng) -> Result<Self, NnError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(NnError::invalid_hyper_parameter("p", p, "须位于[0, 1]内"));
        }
        Ok(Self {
            p,
            training: true,
            rng,
            cache: None,
        })
    }

    pub const fn p(&self) -> f32 {
        self.p
    }

    pub fn forward(&mut self, x: &Tensor) -> Tensor {
        if !self.training || self.p == 0. {
            self.cache = Some(DropoutCache::Identity(x.shape().to_vec()));
            return x.clone();
        }

        let mask = if self.p == 1. {
            Tensor::zeros(x.shape())
        } else {
            let scale = 1. / (1. - self.p);
            let p = self.p;
            let data = (0..x.size())
                .map(|_| {
                    if self.rng.r#gen::<f32>() < p {
                        0.
                    } else {
                        scale
                    }
                })
                .collect::<Vec<_>>();
            Tensor::new(&data, x.shape())
        };
        let y = x * &mask;
        self.cache = Some(DropoutCache::Mask(mask));
        y
    }

    /// dx = dy ⊙ mask（恒等前向时 dx = dy）
    pub fn backward(&self, dy: &Tensor) -> Result<Tensor, NnError> {
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| NnError::MissingCache("Dropout".to_string()))?;
        let expected = match cache {
            DropoutCache::Identity(shape) => shape.as_slice(),
            DropoutCache::Mask(mask) => mask.shape(),
        };
        if dy.shape() != expected {
            return Err(NnError::shape_mismatch(
                expected,
                dy.shape(),
                "Dropout 反向传播的梯度形状须与前向输入一致",
            ));
        }
        Ok(match cache {
            DropoutCache::Identity(_) => dy.clone(),
            DropoutCache::Mask(mask) => dy * mask,
        })
    }
}

// Dropout 没有可训练参数
impl Module for Dropout {
    fn parameters(&self) -> Vec<Parameter> {
        vec![]
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }
}
