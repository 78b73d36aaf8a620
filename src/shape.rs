use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type Array = SmallVec<[Dim; 5]>;

pub fn display_comma(arr: &[Dim]) -> String {
    arr.iter().map(|s| s.to_string()).join(", ")
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ShapeError {
    #[error("invalid shape extent {}, size should not be negative or set to -1 for a dynamic dimension", .0)]
    InvalidExtent(isize),

    #[error("index out of range, expected index in range of {}..{}, but {} is given.", .low, .high, .index)]
    OutOfBounds {
        index: isize,
        low: isize,
        high: isize,
    },

    #[error("invalid index bound")]
    InvalidBound,
}

/// A single tensor dimension, either known at graph build time or left open.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Dim {
    Static(usize),
    Dynamic,
}

impl Dim {
    pub fn is_static(&self) -> bool {
        matches!(self, Dim::Static(_))
    }

    pub fn get(&self) -> Option<usize> {
        match self {
            Dim::Static(e) => Some(*e),
            Dim::Dynamic => None,
        }
    }

    /// Whether the dimension can hold `extent`. A dynamic dimension holds anything.
    pub fn compatible(&self, extent: usize) -> bool {
        match self {
            Dim::Static(e) => *e == extent,
            Dim::Dynamic => true,
        }
    }

    /// Multiplies a static extent by `num / den`. Returns `None` if the result is not
    /// an exact integer or does not fit in `usize`. Dynamic dimensions stay dynamic.
    pub fn scale(&self, num: usize, den: usize) -> Option<Dim> {
        match self {
            Dim::Static(e) => {
                let p = e.checked_mul(num)?;
                (p % den == 0).then(|| Dim::Static(p / den))
            }
            Dim::Dynamic => Some(Dim::Dynamic),
        }
    }

    pub fn half(&self) -> Option<Dim> {
        self.scale(1, 2)
    }
}

impl Display for Dim {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Static(e) => write!(f, "{}", e),
            Dim::Dynamic => write!(f, "?"),
        }
    }
}

// Partially known shape. The rank is always known.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Shape {
    dims: Array,
}

impl Shape {
    pub fn new<E>(extents: E) -> Result<Shape, ShapeError>
    where
        E: Extent,
    {
        Ok(Shape {
            dims: extents.to_arr()?,
        })
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn dim<A>(&self, axis: A) -> Result<Dim, ShapeError>
    where
        A: Axis,
    {
        let axis = axis.to_usize(self.rank())?;
        Ok(self.dims[axis])
    }

    pub fn with_dim<A>(&self, axis: A, dim: Dim) -> Result<Shape, ShapeError>
    where
        A: Axis,
    {
        let axis = axis.to_usize(self.rank())?;
        let mut shape = self.clone();
        shape.dims[axis] = dim;
        Ok(shape)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", display_comma(self.dims()))
    }
}

pub trait Size {
    fn to_dim(&self) -> Result<Dim, ShapeError>;
}

pub trait Axis {
    fn to_usize(&self, bound: usize) -> Result<usize, ShapeError>;
}

pub trait Extent {
    fn to_arr(&self) -> Result<Array, ShapeError>;
}

fn extents_to_arr<E>(extents: &[E]) -> Result<Array, ShapeError>
where
    E: Size,
{
    extents.iter().map(|e| e.to_dim()).collect()
}

macro_rules! impl_size_unsigned {
    ($ty:ty) => {
        impl Size for $ty {
            fn to_dim(&self) -> Result<Dim, ShapeError> {
                Ok(Dim::Static(*self as usize))
            }
        }
    };
}

// -1 marks a dynamic dimension
macro_rules! impl_size_signed {
    ($ty:ty) => {
        impl Size for $ty {
            fn to_dim(&self) -> Result<Dim, ShapeError> {
                match *self {
                    -1 => Ok(Dim::Dynamic),
                    e if e >= 0 => Ok(Dim::Static(e as usize)),
                    e => Err(ShapeError::InvalidExtent(e as isize)),
                }
            }
        }
    };
}

macro_rules! impl_axis_unsigned {
    ($ty:ty) => {
        impl Axis for $ty {
            fn to_usize(&self, bound: usize) -> Result<usize, ShapeError> {
                if bound < 1 {
                    return Err(ShapeError::InvalidBound);
                }
                let axis = *self as usize;
                if axis < bound {
                    Ok(axis)
                } else {
                    Err(ShapeError::OutOfBounds {
                        index: axis as isize,
                        low: -(bound as isize),
                        high: (bound - 1) as isize,
                    })
                }
            }
        }
    };
}

macro_rules! impl_axis_signed {
    ($ty:ty) => {
        impl Axis for $ty {
            fn to_usize(&self, bound: usize) -> Result<usize, ShapeError> {
                if bound < 1 {
                    return Err(ShapeError::InvalidBound);
                }
                let axis = *self as isize;
                let axis = if axis >= 0 {
                    axis
                } else {
                    axis + bound as isize
                };

                if axis >= 0 && (axis as usize) < bound {
                    Ok(axis as usize)
                } else {
                    Err(ShapeError::OutOfBounds {
                        index: *self as isize,
                        low: -(bound as isize),
                        high: (bound - 1) as isize,
                    })
                }
            }
        }
    };
}

impl_size_unsigned!(u32);
impl_size_unsigned!(usize);

impl_size_signed!(i32);
impl_size_signed!(isize);

impl_axis_unsigned!(u32);
impl_axis_unsigned!(usize);

impl_axis_signed!(i32);
impl_axis_signed!(isize);

impl Size for Dim {
    fn to_dim(&self) -> Result<Dim, ShapeError> {
        Ok(*self)
    }
}

impl<T, const C: usize> Extent for [T; C]
where
    T: Size,
{
    fn to_arr(&self) -> Result<Array, ShapeError> {
        extents_to_arr(self)
    }
}
