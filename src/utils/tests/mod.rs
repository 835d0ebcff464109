use crate::errors::NnError;
use crate::utils::traits::float::FloatTrait;
use crate::{assert_err, assert_panic};

#[test]
fn test_assert_panic_macro() {
    assert_panic!(panic!("test panic"));
    assert_panic!(panic!("custom test panic msg"), "custom test panic msg");
}

#[test]
fn test_assert_err_macro() {
    let result: Result<(), NnError> = Err(NnError::InvalidInput("批量大小须大于1".to_string()));
    assert_err!(result);
    assert_err!(result, NnError::InvalidInput("批量大小须大于1"));
    assert_err!(result, NnError::InvalidInput(msg) if msg.contains("批量"));

    let result: Result<(), NnError> = Err(NnError::shape_mismatch(&[2, 2], &[3], "测试"));
    assert_err!(result, NnError::ShapeMismatch([2, 2], [3], "测试"));
    assert_err!(result, NnError::ShapeMismatch { expected, .. } if expected == &[2, 2]);

    let result: Result<(), NnError> =
        Err(NnError::invalid_hyper_parameter("beta1", f32::NAN, "须位于[0, 1)内"));
    assert_err!(result, NnError::InvalidHyperParameter("beta1"));
    assert_err!(result, NnError::InvalidHyperParameter { value, .. } if value.is_nan());
}

#[test]
fn test_float_trait() {
    assert!(0.0f32.is_finite_non_negative());
    assert!(3.5f64.is_finite_non_negative());
    assert!(!(-1e-8f32).is_finite_non_negative());
    assert!(!f32::INFINITY.is_finite_non_negative());
    assert!(!f32::NAN.is_finite_non_negative());

    assert!(0.0f32.is_in_unit_interval());
    assert!(0.999f32.is_in_unit_interval());
    assert!(!1.0f32.is_in_unit_interval());
    assert!(!f32::NAN.is_in_unit_interval());
}
