use ndarray::{Array, IxDyn, Zip};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::errors::{Operator, TensorError};

mod ops {
    #[macro_use]
    mod macros;

    pub mod add;
    pub mod add_assign;
    pub mod div;
    pub mod div_assign;
    pub mod eq;
    pub mod mat_mul;
    pub mod mul;
    pub mod mul_assign;
    pub mod others;
    pub mod sub;
    pub mod sub_assign;
}

mod print;
mod property;
mod save_load;
mod shape;


/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等（`shape`为`[]`时乘积为1），否则会panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        match Array::from_shape_vec(IxDyn(shape), data.to_vec()) {
            Ok(data) => Self { data },
            Err(_) => panic!(
                "{}",
                TensorError::DataShapeMismatch {
                    data_len: data.len(),
                    shape: shape.to_vec(),
                }
            ),
        }
    }

    /// 创建一个所有元素都为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(0., shape)
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::full(1., shape)
    }

    /// 创建一个与`other`形状相同的全零张量
    pub fn zeros_like(other: &Self) -> Self {
        Self::zeros(other.shape())
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间
    pub fn new_random(min: f32, max: f32, shape: &[usize]) -> Self {
        Self::uniform_with_rng(min, max, shape, &mut rand::thread_rng())
    }

    /// 同`new_random`，但使用固定种子，保证结果可复现
    pub fn random_seeded(min: f32, max: f32, shape: &[usize], seed: u64) -> Self {
        Self::uniform_with_rng(min, max, shape, &mut StdRng::seed_from_u64(seed))
    }

    /// 创建一个服从正态分布的随机张量，其值在指定的均值和标准差范围内。
    pub fn new_normal(mean: f32, std_dev: f32, shape: &[usize]) -> Self {
        Self::normal_with_rng(mean, std_dev, shape, &mut rand::thread_rng())
    }

    /// 同`new_normal`，但使用固定种子，保证结果可复现
    pub fn normal_seeded(mean: f32, std_dev: f32, shape: &[usize], seed: u64) -> Self {
        Self::normal_with_rng(mean, std_dev, shape, &mut StdRng::seed_from_u64(seed))
    }
}

// 私有方法
impl Tensor {
    fn uniform_with_rng<R: Rng>(min: f32, max: f32, shape: &[usize], rng: &mut R) -> Self {
        let uniform = Uniform::from(min..=max);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| uniform.sample(rng))
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }

    // Box-Muller变换
    fn normal_with_rng<R: Rng>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Self {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::new(&data, shape)
    }

    fn has_zero_value(&self) -> bool {
        self.data.iter().any(|&x| x == 0.)
    }

    /// 标量张量中唯一的那个数；调用前须确保`is_scalar()`为真
    fn scalar_value(&self) -> f32 {
        self.data.iter().next().copied().unwrap_or(0.)
    }

    /// 两个张量间的逐元素二元运算，支持以下情况：
    /// 1. 其中一个为标量（含形状为[1]、[1,1]等的张量），且其维数不多于另一个：结果形状为另一个张量的形状；
    /// 2. 否则按 NumPy 风格广播：从右向左对齐维度，每个维度须相等或其中一个为1。
    ///
    /// # Panics
    /// 形状无法广播时
    fn zip_map(&self, other: &Self, operator: Operator, f: impl Fn(f32, f32) -> f32) -> Self {
        if other.is_scalar() && !self.is_scalar() && other.dimension() <= self.dimension() {
            let rhs = other.scalar_value();
            return Self {
                data: self.data.mapv(|lhs| f(lhs, rhs)),
            };
        }
        if self.is_scalar() && !other.is_scalar() && self.dimension() <= other.dimension() {
            let lhs = self.scalar_value();
            return Self {
                data: other.data.mapv(|rhs| f(lhs, rhs)),
            };
        }

        let broadcasted = broadcast_shape(self.shape(), other.shape()).and_then(|shape| {
            let lhs = self.data.broadcast(shape.as_slice())?;
            let rhs = other.data.broadcast(shape.as_slice())?;
            Some(Zip::from(&lhs).and(&rhs).map_collect(|&a, &b| f(a, b)))
        });
        match broadcasted {
            Some(data) => Self { data },
            None => panic!(
                "{}",
                TensorError::OperatorError {
                    operator,
                    tensor1_shape: self.shape().to_vec(),
                    tensor2_shape: other.shape().to_vec(),
                }
            ),
        }
    }

    /// 就地逐元素二元运算：`other`须与自身形状严格一致，或为标量
    fn zip_map_inplace(&mut self, other: &Self, operator: Operator, f: impl Fn(f32, f32) -> f32) {
        if self.is_same_shape(other) {
            Zip::from(&mut self.data)
                .and(&other.data)
                .for_each(|a, &b| *a = f(*a, b));
        } else if other.is_scalar() {
            let rhs = other.scalar_value();
            self.data.mapv_inplace(|a| f(a, rhs));
        } else {
            panic!(
                "{}",
                TensorError::OperatorError {
                    operator,
                    tensor1_shape: self.shape().to_vec(),
                    tensor2_shape: other.shape().to_vec(),
                }
            )
        }
    }
}

/// 计算两个形状广播后的形状，无法广播时返回`None`
fn broadcast_shape(shape_1: &[usize], shape_2: &[usize]) -> Option<Vec<usize>> {
    let rank = shape_1.len().max(shape_2.len());
    let mut shape = vec![0; rank];
    for i in 0..rank {
        let dim_1 = if i < shape_1.len() { shape_1[shape_1.len() - 1 - i] } else { 1 };
        let dim_2 = if i < shape_2.len() { shape_2[shape_2.len() - 1 - i] } else { 1 };
        shape[rank - 1 - i] = match (dim_1, dim_2) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => return None,
        };
    }
    Some(shape)
}
