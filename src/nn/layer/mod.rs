/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Layer 模块 - 正则化层
 *
 * 每个层都提供`forward()`与解析式的`backward()`，
 * 有可训练参数的层在`backward()`中把梯度累加到对应的`Parameter`上。
 */

mod batch_norm;
mod dropout;

pub use batch_norm::{BatchNorm1d, BatchNorm2d};
pub use dropout::Dropout;
