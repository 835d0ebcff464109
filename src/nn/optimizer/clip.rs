/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 梯度裁剪，在`step()`之前调用
 */

use super::base::check_non_negative;
use crate::errors::NnError;
use crate::nn::Parameter;

/// 按全局 L2 范数裁剪梯度
///
/// 所有参数梯度拼接后的范数超过`max_norm`时，每个梯度乘以`max_norm / (norm + 1e-6)`。
/// 返回裁剪前的全局范数；没有梯度的参数不参与计算。
pub fn clip_grad_norm(params: &[Parameter], max_norm: f32) -> Result<f32, NnError> {
    check_non_negative("max_norm", max_norm)?;

    let total_norm = params
        .iter()
        .map(|p| p.with_value_and_grad(|_, grad| grad.map_or(0., |g| g.norm_l2().powi(2))))
        .sum::<f32>()
        .sqrt();

    let clip_coef = max_norm / (total_norm + 1e-6);
    if clip_coef < 1. {
        for param in params {
            param.with_grad_mut(|grad| {
                if let Some(grad) = grad {
                    *grad *= clip_coef;
                }
            });
        }
    }
    Ok(total_norm)
}

/// 把每个梯度元素截断到[-clip_value, clip_value]
pub fn clip_grad_value(params: &[Parameter], clip_value: f32) -> Result<(), NnError> {
    check_non_negative("clip_value", clip_value)?;
    for param in params {
        param.with_grad_mut(|grad| {
            if let Some(grad) = grad {
                *grad = grad.clamp(-clip_value, clip_value);
            }
        });
    }
    Ok(())
}
