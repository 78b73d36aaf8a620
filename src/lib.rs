pub mod error;
pub mod ir;
pub mod ops;
pub mod shape;
pub mod tensor;

pub use crate::error::Error;
pub use crate::ir::{Graph, Node, NodeId, Output};
pub use crate::ops::color::{ColorConversion, ConvertColorRgb};
pub use crate::ops::rgb_to_nv12::RgbToNv12;
pub use crate::ops::Op;
pub use crate::shape::{Dim, Shape};
pub use crate::tensor::{ElementType, TensorDesc};
