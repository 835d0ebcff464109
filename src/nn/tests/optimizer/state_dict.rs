use std::collections::BTreeMap;

use super::param_with_grad;
use crate::assert_err;
use crate::errors::NnError;
use crate::nn::Parameter;
use crate::nn::optimizer::{
    Adam, AdamConfig, Momentum, MomentumConfig, Optimizer, OptimizerConfig, OptimizerStateDict,
    ParamStateRecord, RmsPropConfig, SGD,
};
use crate::tensor::Tensor;

#[test]
fn test_state_dict_contents() {
    let w = param_with_grad(&[1., 2.], &[0.1, 0.2]);
    let b = Parameter::new(Tensor::zeros(&[1]), "b");
    let mut adam = Adam::new_default(&[w.clone(), b], 0.01).unwrap();
    adam.step().unwrap();

    let state_dict = adam.state_dict();
    assert_eq!(state_dict.optimizer, "Adam");
    assert_eq!(state_dict.learning_rate, 0.01);
    assert_eq!(state_dict.param_states.len(), 2);
    assert!(state_dict.param_states[1].is_none());

    let record = state_dict.param_states[0].as_ref().unwrap();
    assert_eq!(record.step, 1);
    assert_eq!(
        record.buffers.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["exp_avg", "exp_avg_sq"]
    );
    assert_eq!(&record.buffers["exp_avg"], adam.exp_avg(&w).unwrap());
}

#[test]
fn test_state_dict_resume_matches_uninterrupted() {
    let configs: [OptimizerConfig; 4] = [
        MomentumConfig::new(0.1).with_nesterov(true).into(),
        OptimizerConfig::from_json(r#"{ "type": "Adagrad", "learning_rate": 0.1, "lr_decay": 0.1 }"#)
            .unwrap(),
        RmsPropConfig::new(0.01).with_centered(true).with_momentum(0.9).into(),
        AdamConfig::new(0.1).with_amsgrad(true).into(),
    ];
    let grads = [[0.5, -1.], [0.2, 0.3], [-0.7, 0.1], [0.4, 0.4]];

    for config in configs {
        // 不间断地训练4步
        let reference = Parameter::new(Tensor::new(&[1., 2.], &[2]), "w");
        let mut optimizer = config.build(&[reference.clone()]).unwrap();
        for grad in &grads {
            reference.set_grad(Some(Tensor::new(grad, &[2]))).unwrap();
            optimizer.step().unwrap();
        }

        // 训练2步后导出状态，换一个新的优化器（与新的参数句柄）继续训练
        let param = Parameter::new(Tensor::new(&[1., 2.], &[2]), "w");
        let mut first = config.build(&[param.clone()]).unwrap();
        for grad in &grads[..2] {
            param.set_grad(Some(Tensor::new(grad, &[2]))).unwrap();
            first.step().unwrap();
        }
        let json = first.state_dict().to_json().unwrap();

        let resumed_param = Parameter::new(param.value(), "w");
        let mut second = config.build(&[resumed_param.clone()]).unwrap();
        second
            .load_state_dict(&OptimizerStateDict::from_json(&json).unwrap())
            .unwrap();
        for grad in &grads[2..] {
            resumed_param
                .set_grad(Some(Tensor::new(grad, &[2])))
                .unwrap();
            second.step().unwrap();
        }

        assert_eq!(resumed_param.value(), reference.value(), "{}", config.kind());
    }
}

#[test]
fn test_state_dict_restores_learning_rate() {
    let params = [param_with_grad(&[1.], &[1.])];
    let mut source = SGD::new_default(&params, 0.1).unwrap();
    source.set_learning_rate(0.01);

    let mut target = SGD::new_default(&params, 0.5).unwrap();
    target.load_state_dict(&source.state_dict()).unwrap();
    assert_eq!(target.learning_rate(), 0.01);
}

#[test]
fn test_state_dict_save_load_file() {
    let param = param_with_grad(&[1., 2., 3.], &[0.1, -0.2, 0.3]);
    let mut adam = Adam::new_default(&[param], 0.01).unwrap();
    adam.step().unwrap();
    adam.step().unwrap();

    let path = std::env::temp_dir().join("only_optim_test_state_dict.bin");
    let state_dict = adam.state_dict();
    state_dict.save(&path).unwrap();
    let loaded = OptimizerStateDict::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, state_dict);

    assert_err!(
        OptimizerStateDict::load(std::env::temp_dir().join("only_optim_no_such_file.bin")),
        NnError::Io(_)
    );
}

#[test]
fn test_load_state_dict_rejects_mismatch() {
    let param = param_with_grad(&[1., 2.], &[0.1, 0.2]);
    let mut adam = Adam::new_default(&[param.clone()], 0.01).unwrap();
    adam.step().unwrap();
    let good = adam.state_dict();

    let mut target = Adam::new_default(&[Parameter::new(Tensor::zeros(&[2]), "w")], 0.5).unwrap();

    // 优化器种类不同
    let mut wrong_kind = good.clone();
    wrong_kind.optimizer = "SGD".to_string();
    assert_err!(
        target.load_state_dict(&wrong_kind),
        NnError::StateDictMismatch("状态来自优化器SGD，无法加载到Adam")
    );

    // 参数个数不同
    let mut wrong_len = good.clone();
    wrong_len.param_states.push(None);
    assert_err!(target.load_state_dict(&wrong_len), NnError::StateDictMismatch(_));

    // 缺少缓冲区
    let mut missing = good.clone();
    if let Some(record) = missing.param_states[0].as_mut() {
        record.buffers.remove("exp_avg_sq");
    }
    assert_err!(
        target.load_state_dict(&missing),
        NnError::StateDictMismatch("缺少缓冲区`exp_avg_sq`")
    );

    // 缓冲区形状与参数不符
    let mut wrong_shape = good.clone();
    if let Some(record) = wrong_shape.param_states[0].as_mut() {
        record
            .buffers
            .insert("exp_avg".to_string(), Tensor::zeros(&[3]));
    }
    assert_err!(
        target.load_state_dict(&wrong_shape),
        NnError::ShapeMismatch { expected, got, .. } if expected == &[2] && got == &[3]
    );

    // 以上失败都不改变目标优化器
    assert_eq!(target.learning_rate(), 0.5);
    assert!(target.state_dict().param_states[0].is_none());

    target.load_state_dict(&good).unwrap();
    assert_eq!(target.state_dict(), good);
}

#[test]
fn test_load_state_dict_amsgrad_requires_max_buffer() {
    let param = param_with_grad(&[1.], &[1.]);
    let mut plain = Adam::new_default(&[param.clone()], 0.01).unwrap();
    plain.step().unwrap();

    let mut ams = Adam::new(&[param], AdamConfig::new(0.01).with_amsgrad(true)).unwrap();
    assert_err!(
        ams.load_state_dict(&plain.state_dict()),
        NnError::StateDictMismatch("缺少缓冲区`max_exp_avg_sq`")
    );
}

#[test]
fn test_sgd_state_dict_has_no_records() {
    let params = [param_with_grad(&[1.], &[1.])];
    let mut sgd = SGD::new_default(&params, 0.1).unwrap();
    sgd.step().unwrap();
    let mut state_dict = sgd.state_dict();
    assert_eq!(state_dict.param_states, vec![None]);

    state_dict.param_states[0] = Some(ParamStateRecord {
        step: 1,
        buffers: BTreeMap::new(),
    });
    assert_err!(sgd.load_state_dict(&state_dict), NnError::StateDictMismatch(_));
}

#[test]
fn test_load_state_dict_rejects_exhausted_step() {
    let param = param_with_grad(&[1., 2.], &[0.1, 0.2]);
    let mut adam = Adam::new_default(&[param.clone()], 0.01).unwrap();
    adam.step().unwrap();
    let mut state_dict = adam.state_dict();
    if let Some(record) = state_dict.param_states[0].as_mut() {
        record.step = u64::MAX;
    }

    let mut target = Adam::new_default(&[param.clone()], 0.01).unwrap();
    assert_err!(
        target.load_state_dict(&state_dict),
        NnError::StateDictMismatch(msg) if msg.contains("步数")
    );
    assert_eq!(target.step_count(&param), 0);

    // 步数未达上限的记录仍可加载并继续更新
    if let Some(record) = state_dict.param_states[0].as_mut() {
        record.step = u64::MAX - 1;
    }
    target.load_state_dict(&state_dict).unwrap();
    target.step().unwrap();
    assert_eq!(target.step_count(&param), u64::MAX);
    assert!(param.value().all_finite());
}

#[test]
fn test_momentum_zero_rejects_buffered_state_dict() {
    let param = param_with_grad(&[1.], &[1.]);
    let mut heavy = OptimizerConfig::from(MomentumConfig::new(0.1).with_momentum(0.9))
        .build(&[param.clone()])
        .unwrap();
    heavy.step().unwrap();
    let buffered = heavy.state_dict();

    let plain_config = MomentumConfig::new(0.1).with_momentum(0.);
    let mut plain = Momentum::new(&[param.clone()], plain_config).unwrap();
    assert_err!(
        plain.load_state_dict(&buffered),
        NnError::StateDictMismatch(_)
    );
    assert!(plain.momentum_buffer(&param).is_none());

    // 没有参数记录的状态可以加载，μ=0 时导出的状态也不含记录
    let mut empty = buffered.clone();
    empty.param_states = vec![None];
    empty.learning_rate = 0.2;
    plain.load_state_dict(&empty).unwrap();
    assert_eq!(plain.learning_rate(), 0.2);
    plain.step().unwrap();
    assert!(plain.momentum_buffer(&param).is_none());
    assert_eq!(plain.state_dict().param_states, vec![None]);
}
