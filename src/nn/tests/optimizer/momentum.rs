use approx::assert_abs_diff_eq;

use super::{param_with_grad, scalar};
use crate::assert_err;
use crate::errors::NnError;
use crate::nn::Parameter;
use crate::nn::optimizer::{Momentum, MomentumConfig, Optimizer};
use crate::tensor::Tensor;

fn run(config: MomentumConfig, steps: usize) -> Vec<f32> {
    // 常数梯度 g=1，初值 θ=1
    let param = param_with_grad(&[1.], &[1.]);
    let mut optimizer = Momentum::new(&[param.clone()], config).unwrap();
    (0..steps)
        .map(|_| {
            optimizer.step().unwrap();
            scalar(&param)
        })
        .collect()
}

#[test]
fn test_momentum_update() {
    // buf: 1 → 1.9 → 2.71
    let values = run(MomentumConfig::new(0.1), 3);
    assert_abs_diff_eq!(values[0], 0.9, epsilon = 1e-6);
    assert_abs_diff_eq!(values[1], 0.71, epsilon = 1e-6);
    assert_abs_diff_eq!(values[2], 0.439, epsilon = 1e-6);
}

#[test]
fn test_momentum_nesterov() {
    // d = g + μ·buf：1.9 → 2.71
    let values = run(MomentumConfig::new(0.1).with_nesterov(true), 2);
    assert_abs_diff_eq!(values[0], 0.81, epsilon = 1e-6);
    assert_abs_diff_eq!(values[1], 0.539, epsilon = 1e-6);
}

#[test]
fn test_momentum_dampening() {
    // 首步 buf = g 不受阻尼影响；之后 buf = 0.9 * 1 + 0.5 * 1 = 1.4
    let values = run(MomentumConfig::new(0.1).with_dampening(0.5), 2);
    assert_abs_diff_eq!(values[0], 0.9, epsilon = 1e-6);
    assert_abs_diff_eq!(values[1], 0.76, epsilon = 1e-6);
}

#[test]
fn test_momentum_zero_is_plain_sgd() {
    let param = param_with_grad(&[1.], &[1.]);
    let mut optimizer =
        Momentum::new(&[param.clone()], MomentumConfig::new(0.1).with_momentum(0.)).unwrap();
    optimizer.step().unwrap();
    optimizer.step().unwrap();
    assert_abs_diff_eq!(scalar(&param), 0.8, epsilon = 1e-6);
    assert!(optimizer.momentum_buffer(&param).is_none());
}

#[test]
fn test_momentum_buffer_accessor() {
    let param = param_with_grad(&[1., 1.], &[1., 2.]);
    let mut optimizer = Momentum::new_default(&[param.clone()], 0.1).unwrap();
    assert!(optimizer.momentum_buffer(&param).is_none());
    assert_eq!(optimizer.step_count(&param), 0);

    optimizer.step().unwrap();
    optimizer.step().unwrap();
    assert_abs_diff_eq!(
        optimizer.momentum_buffer(&param).unwrap(),
        &Tensor::new(&[1.9, 3.8], &[2]),
        epsilon = 1e-6
    );
    assert_eq!(optimizer.step_count(&param), 2);
}

#[test]
fn test_momentum_weight_decay_feeds_buffer() {
    // 首步 buf = g + wd * θ = 1 + 0.5 * 2 = 2
    let param = param_with_grad(&[2.], &[1.]);
    let config = MomentumConfig::new(0.1).with_weight_decay(0.5);
    let mut optimizer = Momentum::new(&[param.clone()], config).unwrap();
    optimizer.step().unwrap();
    assert_abs_diff_eq!(
        optimizer.momentum_buffer(&param).unwrap(),
        &Tensor::new(&[2.], &[1]),
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(scalar(&param), 1.8, epsilon = 1e-6);

    // 第二步 g' = 1 + 0.5 * 1.8 = 1.9，buf = 0.9 * 2 + 1.9 = 3.7
    optimizer.step().unwrap();
    assert_abs_diff_eq!(
        optimizer.momentum_buffer(&param).unwrap(),
        &Tensor::new(&[3.7], &[1]),
        epsilon = 1e-5
    );
    assert_abs_diff_eq!(scalar(&param), 1.43, epsilon = 1e-5);
}

#[test]
fn test_momentum_invalid_hyper_parameters() {
    let params = [Parameter::new(Tensor::zeros(&[1]), "w")];
    assert_err!(
        Momentum::new(&params, MomentumConfig::new(0.1).with_momentum(-0.5)),
        NnError::InvalidHyperParameter("momentum")
    );
    assert_err!(
        Momentum::new(&params, MomentumConfig::new(0.1).with_dampening(1.5)),
        NnError::InvalidHyperParameter("dampening")
    );
    // Nesterov 要求动量大于0且无阻尼
    assert_err!(
        Momentum::new(
            &params,
            MomentumConfig::new(0.1).with_nesterov(true).with_momentum(0.)
        ),
        NnError::InvalidHyperParameter { .. }
    );
    assert_err!(
        Momentum::new(
            &params,
            MomentumConfig::new(0.1)
                .with_nesterov(true)
                .with_dampening(0.1)
        ),
        NnError::InvalidHyperParameter { .. }
    );
}
