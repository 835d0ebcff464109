use crate::errors::Operator;
use crate::tensor::Tensor;

impl_tensor_assign_op!(SubAssign, sub_assign, Operator::SubAssign, |a: f32, b: f32| a - b);
