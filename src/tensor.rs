use crate::shape::{Axis, Dim, Shape, ShapeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

// Scalar element kinds a tensor can carry
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Boolean,

    // Integers
    I8,
    I16,
    I32,
    I64,

    // Unsigned Integers
    U8,
    U16,
    U32,
    U64,

    // Floats
    Bf16,
    F16,
    F32,
    F64,
}

impl ElementType {
    pub fn is_real(&self) -> bool {
        matches!(
            self,
            ElementType::Bf16 | ElementType::F16 | ElementType::F32 | ElementType::F64
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Boolean => "boolean",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
            ElementType::Bf16 => "bf16",
            ElementType::F16 => "f16",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        }
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Static signature of a tensor flowing along a graph edge.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TensorDesc {
    pub shape: Shape,
    pub element_type: ElementType,
}

impl TensorDesc {
    pub fn new(shape: Shape, element_type: ElementType) -> Self {
        TensorDesc {
            shape,
            element_type,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn dim<A>(&self, axis: A) -> Result<Dim, ShapeError>
    where
        A: Axis,
    {
        self.shape.dim(axis)
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }
}

impl Debug for TensorDesc {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.element_type, self.shape)
    }
}

impl Display for TensorDesc {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}
