use num_traits::Float;

/// 浮点数的常用判断，主要用于超参数校验
pub trait FloatTrait: Float {
    /// 有限且不小于0（NaN与无穷均不满足）
    fn is_finite_non_negative(&self) -> bool {
        self.is_finite() && *self >= Self::zero()
    }

    /// 位于左闭右开区间[0, 1)内
    fn is_in_unit_interval(&self) -> bool {
        *self >= Self::zero() && *self < Self::one()
    }
}

impl FloatTrait for f32 {}
impl FloatTrait for f64 {}
