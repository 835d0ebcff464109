use crate::errors::Operator;
use crate::tensor::Tensor;

impl_tensor_assign_op!(AddAssign, add_assign, Operator::AddAssign, |a: f32, b: f32| a + b);
