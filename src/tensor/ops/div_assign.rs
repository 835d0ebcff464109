use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::DivAssign;

impl DivAssign for Tensor {
    fn div_assign(&mut self, other: Tensor) {
        *self /= &other;
    }
}

impl<'a> DivAssign<&'a Tensor> for Tensor {
    fn div_assign(&mut self, other: &'a Tensor) {
        // 检查除数是否包含零值
        assert!(!other.has_zero_value(), "{}", TensorError::DivByZeroElement);
        self.zip_map_inplace(other, Operator::DivAssign, |a, b| a / b);
    }
}

impl DivAssign<f32> for Tensor {
    fn div_assign(&mut self, scalar: f32) {
        assert!(scalar != 0., "{}", TensorError::DivByZero);
        self.data /= scalar;
    }
}
