/*
 * @Author       : 老董
 * @Date         : 2023-08-21 10:10:11
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 张量的逐元素函数（开方、幂、截断等）与归约运算（求和、均值、方差、范数）
 */

use ndarray::{Axis, Zip};

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Self::new(&[scalar], &[1])
    }
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓逐元素函数↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl Tensor {
    /// 对每个元素应用`f`，返回新张量
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.mapv(f),
        }
    }

    /// 逐元素开方；负数元素的结果为NaN
    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    pub fn powi(&self, n: i32) -> Self {
        self.map(|x| x.powi(n))
    }

    pub fn square(&self) -> Self {
        self.map(|x| x * x)
    }

    pub fn abs(&self) -> Self {
        self.map(f32::abs)
    }

    /// 将每个元素截断到[min, max]区间
    pub fn clamp(&self, min: f32, max: f32) -> Self {
        assert!(min <= max, "截断区间的下界须不大于上界");
        self.map(|x| x.clamp(min, max))
    }

    /// 将每个元素截断到不小于`min`
    pub fn clamp_min(&self, min: f32) -> Self {
        self.map(|x| x.max(min))
    }

    /// 与形状严格一致的另一个张量逐元素取最大值
    pub fn maximum(&self, other: &Self) -> Self {
        assert!(
            self.is_same_shape(other),
            "{}",
            TensorError::OperatorError {
                operator: Operator::Maximum,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
        Self {
            data: Zip::from(&self.data)
                .and(&other.data)
                .map_collect(|&a, &b| a.max(b)),
        }
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑逐元素函数↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓归约运算↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl Tensor {
    /// 对张量中的所有元素求和并返回一个形状为[1]的标量。
    pub fn sum(&self) -> Self {
        Self::from(self.data.sum())
    }

    /// 所有元素的平均值（纯数）
    pub fn mean(&self) -> f32 {
        assert!(self.size() > 0, "空张量无法求均值");
        self.data.sum() / self.size() as f32
    }

    /// 沿`axis`求和，结果去掉该维度
    pub fn sum_axis(&self, axis: usize) -> Self {
        self.check_axis(axis);
        Self {
            data: self.data.sum_axis(Axis(axis)),
        }
    }

    /// 沿`axis`求均值，结果去掉该维度
    pub fn mean_axis(&self, axis: usize) -> Self {
        self.check_axis(axis);
        let len = self.shape()[axis];
        assert!(len > 0, "沿空维度无法求均值");
        Self {
            data: self.data.sum_axis(Axis(axis)) / len as f32,
        }
    }

    /// 沿`axis`求方差，结果去掉该维度。
    /// `ddof`为自由度修正：0为有偏（总体）方差，1为无偏（样本）方差。
    pub fn var_axis(&self, axis: usize, ddof: f32) -> Self {
        self.check_axis(axis);
        let len = self.shape()[axis] as f32;
        assert!(
            ddof >= 0. && ddof < len,
            "ddof须在[0, {len})范围内，实际为{ddof}"
        );
        let mean = Self {
            data: self.mean_axis(axis).data.insert_axis(Axis(axis)),
        };
        let squared_diff = (self - &mean).square();
        Self {
            data: squared_diff.data.sum_axis(Axis(axis)) / (len - ddof),
        }
    }

    /// 所有元素构成向量的L2范数
    pub fn norm_l2(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    fn check_axis(&self, axis: usize) {
        assert!(
            axis < self.dimension(),
            "{}",
            TensorError::AxisOutOfRange {
                axis,
                dimension: self.dimension(),
            }
        );
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑归约运算↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
