use crate::errors::Operator;
use crate::tensor::Tensor;

impl_tensor_assign_op!(MulAssign, mul_assign, Operator::MulAssign, |a: f32, b: f32| a * b);
