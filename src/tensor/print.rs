use crate::tensor::Tensor;
use ndarray::{Array, IxDyn};
use std::fmt;

impl Tensor {
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn display_recursive(
            f: &mut fmt::Formatter,
            data: &Array<f32, IxDyn>,
            indices: &mut Vec<usize>,
            depth: usize,
        ) -> fmt::Result {
            if depth == indices.len() {
                return write!(f, "{:8.4}", data[&indices[..]]);
            }
            write!(f, "[")?;
            let len = data.shape()[depth];
            for i in 0..len {
                indices[depth] = i;
                display_recursive(f, data, indices, depth + 1)?;
                if i != len - 1 {
                    write!(f, ", ")?;
                    if depth + 2 == indices.len() {
                        write!(f, "\n{}", " ".repeat(depth + 1))?;
                    }
                }
            }
            write!(f, "]")
        }

        let shape = self.shape();
        let mut indices = vec![0; shape.len()];
        display_recursive(f, &self.data, &mut indices, 0)?;
        writeln!(f, "\n形状: {shape:?}")
    }
}
