use super::Tensor;
use crate::errors::TensorError;
use std::collections::HashSet;

impl Tensor {
    /// 变形。元素按逻辑顺序（行优先）重新排布，因而对转置等非连续布局的张量同样适用。
    pub fn reshape(&self, shape: &[usize]) -> Self {
        let new_total_elements: usize = shape.iter().product();
        assert!(
            self.size() == new_total_elements,
            "{}",
            TensorError::IncompatibleShape
        );
        Self::new(&self.to_vec(), shape)
    }

    /// 交换张量的两个（以上）维度，并将其返回（不影响原张量）
    pub fn permute(&self, axes: &[usize]) -> Self {
        assert!(axes.len() >= 2, "{}", TensorError::PermuteNeedAtLeast2Dims);
        // 检查axes中的所有元素必须是唯一且在[0, <张量维数>)范围内
        let unique_axes = axes.iter().copied().collect::<HashSet<_>>();
        assert!(
            unique_axes.len() == axes.len()
                && axes.len() == self.dimension()
                && unique_axes.iter().all(|&a| a < self.dimension()),
            "{}",
            TensorError::PermuteNeedUniqueAndInRange
        );

        Self {
            data: self.data.clone().permuted_axes(axes),
        }
    }

    /// 张量的转置（交换前两个维度）；阶数不大于1时原样返回
    pub fn transpose(&self) -> Self {
        if self.dimension() <= 1 {
            self.clone()
        } else {
            let mut axes: Vec<usize> = (0..self.dimension()).collect();
            axes.swap(0, 1);
            self.permute(&axes)
        }
    }
}
