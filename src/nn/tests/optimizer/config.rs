use crate::assert_err;
use crate::errors::NnError;
use crate::nn::Parameter;
use crate::nn::optimizer::{
    AdamConfig, AnyOptimizer, MomentumConfig, Optimizer, OptimizerConfig, RmsPropConfig,
    SgdConfig,
};
use crate::tensor::Tensor;

#[test]
fn test_optimizer_config_json_round_trip() {
    let config: OptimizerConfig = AdamConfig::new(3e-4)
        .with_betas(0.8, 0.99)
        .with_weight_decay(1e-2)
        .with_amsgrad(true)
        .into();
    let json = config.to_json().unwrap();
    assert!(json.contains("\"type\": \"Adam\""));
    assert_eq!(OptimizerConfig::from_json(&json).unwrap(), config);
}

#[test]
fn test_optimizer_config_from_partial_json() {
    // 未给出的字段取默认值
    let config = OptimizerConfig::from_json(
        r#"{ "type": "RMSProp", "learning_rate": 0.05, "centered": true }"#,
    )
    .unwrap();
    assert_eq!(
        config,
        OptimizerConfig::RMSProp(RmsPropConfig::new(0.05).with_centered(true))
    );
    assert_eq!(config.kind(), "RMSProp");
    assert_eq!(config.learning_rate(), 0.05);

    let config = OptimizerConfig::from_json(r#"{ "type": "SGD" }"#).unwrap();
    assert_eq!(config, OptimizerConfig::SGD(SgdConfig::default()));
}

#[test]
fn test_optimizer_config_invalid_json() {
    assert_err!(
        OptimizerConfig::from_json(r#"{ "type": "LBFGS" }"#),
        NnError::Serialization(_)
    );
    assert_err!(OptimizerConfig::from_json("not json"), NnError::Serialization(_));
}

#[test]
fn test_optimizer_config_build() {
    let params = [Parameter::new(Tensor::zeros(&[2]), "w")];
    let configs: [(OptimizerConfig, &str); 5] = [
        (SgdConfig::new(0.1).into(), "SGD"),
        (MomentumConfig::new(0.1).into(), "Momentum"),
        (OptimizerConfig::from_json(r#"{ "type": "Adagrad" }"#).unwrap(), "Adagrad"),
        (RmsPropConfig::new(0.1).into(), "RMSProp"),
        (AdamConfig::new(0.1).into(), "Adam"),
    ];
    for (config, kind) in configs {
        let optimizer = config.build(&params).unwrap();
        assert_eq!(optimizer.kind(), kind);
        assert_eq!(optimizer.learning_rate(), config.learning_rate());
        assert_eq!(optimizer.config(), config);
        assert_eq!(optimizer.state_dict().optimizer, kind);
    }
}

#[test]
fn test_optimizer_config_build_validates() {
    let params = [Parameter::new(Tensor::zeros(&[2]), "w")];
    let config: OptimizerConfig = AdamConfig::new(0.1).with_betas(0.9, 1.).into();
    assert_err!(
        config.build(&params),
        NnError::InvalidHyperParameter("beta2")
    );
}

#[test]
fn test_any_optimizer_dispatch() {
    let param = Parameter::new(Tensor::new(&[1.], &[1]), "w");
    param.set_grad(Some(Tensor::new(&[1.], &[1]))).unwrap();

    let mut optimizer: AnyOptimizer = OptimizerConfig::from(SgdConfig::new(0.5))
        .build(&[param.clone()])
        .unwrap();
    optimizer.step().unwrap();
    assert_eq!(param.value(), Tensor::new(&[0.5], &[1]));

    optimizer.set_learning_rate(0.25);
    assert_eq!(optimizer.config(), OptimizerConfig::SGD(SgdConfig::new(0.25)));
    assert_eq!(
        format!("{optimizer:?}"),
        "AnyOptimizer { kind: \"SGD\", learning_rate: 0.25 }"
    );
}
