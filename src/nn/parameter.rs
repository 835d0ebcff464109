/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 可训练参数（Parameter）
 *
 * Parameter 是一个共享句柄（Rc<RefCell<..>>），内含参数值与梯度：
 * - 层持有一份，优化器持有一份，二者看到的是同一个值与梯度
 * - 梯度由调用方（手写反向传播，或各层的 backward）写入
 * - 优化器只读取梯度、改写参数值
 */

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::NnError;
use crate::tensor::Tensor;

/// 参数的全局唯一标识，用于索引优化器中的逐参数状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId(pub u64);

static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(0);

impl ParameterId {
    fn next() -> Self {
        Self(NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct ParameterInner {
    name: String,
    value: Tensor,
    grad: Option<Tensor>,
}

/// 可训练参数句柄。`clone()`得到的是指向同一参数的新句柄，而非深拷贝。
#[derive(Clone)]
pub struct Parameter {
    id: ParameterId,
    inner: Rc<RefCell<ParameterInner>>,
}

impl Parameter {
    pub fn new(value: Tensor, name: &str) -> Self {
        Self {
            id: ParameterId::next(),
            inner: Rc::new(RefCell::new(ParameterInner {
                name: name.to_string(),
                value,
                grad: None,
            })),
        }
    }

    pub const fn id(&self) -> ParameterId {
        self.id
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// 参数值的拷贝
    pub fn value(&self) -> Tensor {
        self.inner.borrow().value.clone()
    }

    /// 直接替换参数值（允许改变形状，如重新初始化）
    pub fn set_value(&self, value: Tensor) {
        self.inner.borrow_mut().value = value;
    }

    pub fn shape(&self) -> Vec<usize> {
        self.inner.borrow().value.shape().to_vec()
    }

    /// 元素个数
    pub fn size(&self) -> usize {
        self.inner.borrow().value.size()
    }

    /// 梯度的拷贝；尚未写入梯度（或已被清零）时为`None`
    pub fn grad(&self) -> Option<Tensor> {
        self.inner.borrow().grad.clone()
    }

    pub fn has_grad(&self) -> bool {
        self.inner.borrow().grad.is_some()
    }

    /// 设置（或清除）梯度，梯度形状须与参数值严格一致
    pub fn set_grad(&self, grad: Option<Tensor>) -> Result<(), NnError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(g) = &grad {
            check_grad_shape(&inner.name, &inner.value, g)?;
        }
        inner.grad = grad;
        Ok(())
    }

    /// 将`grad`累加到已有梯度上；无梯度时直接写入
    pub fn accumulate_grad(&self, grad: &Tensor) -> Result<(), NnError> {
        let mut inner = self.inner.borrow_mut();
        check_grad_shape(&inner.name, &inner.value, grad)?;
        inner.grad = Some(match inner.grad.take() {
            Some(existing) => existing + grad,
            None => grad.clone(),
        });
        Ok(())
    }

    /// 清除梯度（置为`None`），下一次`step()`将跳过该参数
    pub fn zero_grad(&self) {
        self.inner.borrow_mut().grad = None;
    }

    /// 在闭包中同时以只读方式访问参数值与梯度，避免拷贝
    pub(crate) fn with_value_and_grad<R>(&self, f: impl FnOnce(&Tensor, Option<&Tensor>) -> R) -> R {
        let inner = self.inner.borrow();
        f(&inner.value, inner.grad.as_ref())
    }

    /// 在闭包中可变地访问梯度（用于梯度裁剪）
    pub(crate) fn with_grad_mut<R>(&self, f: impl FnOnce(Option<&mut Tensor>) -> R) -> R {
        let mut inner = self.inner.borrow_mut();
        f(inner.grad.as_mut())
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Parameter")
            .field("id", &self.id)
            .field("name", &inner.name)
            .field("shape", &inner.value.shape())
            .field("has_grad", &inner.grad.is_some())
            .finish()
    }
}

fn check_grad_shape(name: &str, value: &Tensor, grad: &Tensor) -> Result<(), NnError> {
    if value.is_same_shape(grad) {
        Ok(())
    } else {
        Err(NnError::shape_mismatch(
            value.shape(),
            grad.shape(),
            &format!("参数`{name}`的梯度形状须与参数值一致"),
        ))
    }
}
