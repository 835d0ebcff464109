/// 为`Tensor`批量实现某个二元运算符的全部组合：
/// （不）带引用的张量 与（不）带引用的张量、张量与f32、f32与张量。
/// `$f`为`Fn(f32, f32) -> f32`形式的逐元素运算。
macro_rules! impl_tensor_binary_op {
    ($op_trait:ident, $method:ident, $operator:expr, $f:expr) => {
        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓f32 与（不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl std::ops::$op_trait<Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: Tensor) -> Tensor {
                let f = $f;
                Tensor {
                    data: tensor.data.mapv(|x| f(self, x)),
                }
            }
        }
        impl<'a> std::ops::$op_trait<&'a Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: &'a Tensor) -> Tensor {
                let f = $f;
                Tensor {
                    data: tensor.data.mapv(|x| f(self, x)),
                }
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑f32 与（不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 与 f32↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl std::ops::$op_trait<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                let f = $f;
                Tensor {
                    data: self.data.mapv(|x| f(x, scalar)),
                }
            }
        }
        impl std::ops::$op_trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                let f = $f;
                Tensor {
                    data: self.data.mapv(|x| f(x, scalar)),
                }
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 与 f32↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 与（不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl std::ops::$op_trait for Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                self.zip_map(&other, $operator, $f)
            }
        }
        impl<'a> std::ops::$op_trait<&'a Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: &'a Tensor) -> Tensor {
                self.zip_map(other, $operator, $f)
            }
        }
        impl std::ops::$op_trait<Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                self.zip_map(&other, $operator, $f)
            }
        }
        impl<'b> std::ops::$op_trait<&'b Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: &'b Tensor) -> Tensor {
                self.zip_map(other, $operator, $f)
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 与（不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    };
}

/// 为`Tensor`批量实现某个复合赋值运算符：右侧可为（不）带引用的张量或f32。
/// 右侧张量须与左侧形状严格一致，或为标量。
macro_rules! impl_tensor_assign_op {
    ($op_trait:ident, $method:ident, $operator:expr, $f:expr) => {
        impl std::ops::$op_trait for Tensor {
            fn $method(&mut self, other: Tensor) {
                self.zip_map_inplace(&other, $operator, $f);
            }
        }

        impl<'a> std::ops::$op_trait<&'a Tensor> for Tensor {
            fn $method(&mut self, other: &'a Tensor) {
                self.zip_map_inplace(other, $operator, $f);
            }
        }

        impl std::ops::$op_trait<f32> for Tensor {
            fn $method(&mut self, scalar: f32) {
                let f = $f;
                self.data.mapv_inplace(|x| f(x, scalar));
            }
        }
    };
}
