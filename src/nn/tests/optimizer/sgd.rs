/*
 * @Author       : 老董
 * @Date         : 2025-12-20
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : SGD 优化器测试
 */

use approx::assert_abs_diff_eq;

use super::param_with_grad;
use crate::assert_err;
use crate::errors::NnError;
use crate::nn::Parameter;
use crate::nn::optimizer::{Optimizer, SGD, SgdConfig};
use crate::tensor::Tensor;

#[test]
fn test_sgd_creation() {
    let param = Parameter::new(Tensor::zeros(&[2, 2]), "w");
    let sgd = SGD::new_default(&[param.clone()], 0.01).unwrap();
    assert_eq!(sgd.learning_rate(), 0.01);
    assert_eq!(sgd.params().len(), 1);
    assert_eq!(sgd.config(), SgdConfig::new(0.01));

    assert_eq!(SgdConfig::default().learning_rate, 1e-3);
    assert_eq!(SgdConfig::default().weight_decay, 0.);
}

#[test]
fn test_sgd_update() {
    // θ = θ - lr * g = [1, 2] - 0.1 * [0.5, -1]
    let param = param_with_grad(&[1., 2.], &[0.5, -1.]);
    let mut sgd = SGD::new_default(&[param.clone()], 0.1).unwrap();
    sgd.step().unwrap();
    assert_abs_diff_eq!(
        param.value(),
        Tensor::new(&[0.95, 2.1], &[2]),
        epsilon = 1e-6
    );

    // 梯度未清除时，再次 step 会再更新一次
    sgd.step().unwrap();
    assert_abs_diff_eq!(
        param.value(),
        Tensor::new(&[0.9, 2.2], &[2]),
        epsilon = 1e-6
    );
}

#[test]
fn test_sgd_weight_decay() {
    // g' = g + wd * θ = [0.5, -1] + 0.1 * [1, 2] = [0.6, -0.8]
    let param = param_with_grad(&[1., 2.], &[0.5, -1.]);
    let config = SgdConfig::new(0.1).with_weight_decay(0.1);
    let mut sgd = SGD::new(&[param.clone()], config).unwrap();
    sgd.step().unwrap();
    assert_abs_diff_eq!(
        param.value(),
        Tensor::new(&[0.94, 2.08], &[2]),
        epsilon = 1e-6
    );
    // 权重衰减只作用于更新，不修改参数上的梯度
    assert_eq!(param.grad(), Some(Tensor::new(&[0.5, -1.], &[2])));
}

#[test]
fn test_sgd_invalid_hyper_parameters() {
    let param = Parameter::new(Tensor::zeros(&[1]), "w");
    assert_err!(
        SGD::new_default(&[param.clone()], -0.1),
        NnError::InvalidHyperParameter("learning_rate")
    );
    assert_err!(
        SGD::new_default(&[param.clone()], f32::INFINITY),
        NnError::InvalidHyperParameter { .. }
    );
    assert_err!(
        SGD::new(&[param], SgdConfig::new(0.1).with_weight_decay(-1.)),
        NnError::InvalidHyperParameter("weight_decay")
    );
}

#[test]
fn test_sgd_zero_learning_rate_is_noop() {
    let param = param_with_grad(&[1., 2.], &[3., 4.]);
    let mut sgd = SGD::new_default(&[param.clone()], 0.).unwrap();
    sgd.step().unwrap();
    assert_eq!(param.value(), Tensor::new(&[1., 2.], &[2]));
}
