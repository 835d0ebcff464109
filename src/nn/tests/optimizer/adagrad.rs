use approx::assert_abs_diff_eq;

use super::{param_with_grad, scalar};
use crate::assert_err;
use crate::errors::NnError;
use crate::nn::Parameter;
use crate::nn::optimizer::{Adagrad, AdagradConfig, Optimizer};
use crate::tensor::Tensor;

fn run(config: AdagradConfig, steps: usize) -> Vec<f32> {
    // 常数梯度 g=2，初值 θ=1
    let param = param_with_grad(&[1.], &[2.]);
    let mut optimizer = Adagrad::new(&[param.clone()], config).unwrap();
    (0..steps)
        .map(|_| {
            optimizer.step().unwrap();
            scalar(&param)
        })
        .collect()
}

#[test]
fn test_adagrad_defaults() {
    let config = AdagradConfig::default();
    assert_eq!(config.learning_rate, 1e-2);
    assert_eq!(config.eps, 1e-10);
    assert_eq!(config.lr_decay, 0.);
    assert_eq!(config.initial_accumulator_value, 0.);
}

#[test]
fn test_adagrad_update() {
    // G: 4 → 8；θ: 1 - 0.1*2/2 = 0.9 → 0.9 - 0.1*2/√8
    let values = run(AdagradConfig::new(0.1), 2);
    assert_abs_diff_eq!(values[0], 0.9, epsilon = 1e-6);
    assert_abs_diff_eq!(values[1], 0.829_289_3, epsilon = 1e-6);
}

#[test]
fn test_adagrad_lr_decay() {
    // 第二步 η = 0.1 / (1 + 0.5)
    let values = run(AdagradConfig::new(0.1).with_lr_decay(0.5), 2);
    assert_abs_diff_eq!(values[0], 0.9, epsilon = 1e-6);
    assert_abs_diff_eq!(values[1], 0.852_859_5, epsilon = 1e-6);
}

#[test]
fn test_adagrad_initial_accumulator() {
    // G = 1 + 4 = 5
    let values = run(
        AdagradConfig::new(0.1).with_initial_accumulator_value(1.),
        1,
    );
    assert_abs_diff_eq!(values[0], 0.910_557_3, epsilon = 1e-6);
}

#[test]
fn test_adagrad_sum_accessor() {
    let param = param_with_grad(&[0., 0.], &[1., -3.]);
    let mut optimizer = Adagrad::new_default(&[param.clone()], 0.1).unwrap();
    optimizer.step().unwrap();
    optimizer.step().unwrap();
    assert_eq!(
        optimizer.sum(&param),
        Some(&Tensor::new(&[2., 18.], &[2]))
    );
    assert_eq!(optimizer.step_count(&param), 2);
}

#[test]
fn test_adagrad_zero_gradient_is_stable() {
    // 累加和为0时 eps 避免除零
    let param = param_with_grad(&[1.], &[0.]);
    let mut optimizer = Adagrad::new_default(&[param.clone()], 0.1).unwrap();
    optimizer.step().unwrap();
    assert_eq!(scalar(&param), 1.);
    assert!(param.value().all_finite());
}

#[test]
fn test_adagrad_invalid_hyper_parameters() {
    let params = [Parameter::new(Tensor::zeros(&[1]), "w")];
    assert_err!(
        Adagrad::new(&params, AdagradConfig::new(0.1).with_lr_decay(-1.)),
        NnError::InvalidHyperParameter("lr_decay")
    );
    assert_err!(
        Adagrad::new(
            &params,
            AdagradConfig::new(0.1).with_initial_accumulator_value(-0.1)
        ),
        NnError::InvalidHyperParameter("initial_accumulator_value")
    );
    assert_err!(
        Adagrad::new(&params, AdagradConfig::new(0.1).with_eps(0.)),
        NnError::InvalidHyperParameter("eps")
    );
}
