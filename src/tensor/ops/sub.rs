use crate::errors::Operator;
use crate::tensor::Tensor;
use std::ops::Neg;

impl_tensor_binary_op!(Sub, sub, Operator::Sub, |a: f32, b: f32| a - b);

impl Neg for Tensor {
    type Output = Self;

    fn neg(self) -> Self {
        Self { data: -self.data }
    }
}

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor {
            data: self.data.mapv(|x| -x),
        }
    }
}
