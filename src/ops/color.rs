use crate::ops::attr::{AttributeVisitor, EnumNames};
use crate::shape::{Dim, Shape, ShapeError};
use crate::tensor::{ElementType, TensorDesc};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::trace;

// NHWC
const BATCH_AXIS: usize = 0;
const HEIGHT_AXIS: usize = 1;
const WIDTH_AXIS: usize = 2;
const CHANNEL_AXIS: usize = 3;

const RGB_CHANNELS: usize = 3;
const Y_CHANNELS: usize = 1;
const UV_CHANNELS: usize = 2;

pub type Outputs = SmallVec<[TensorDesc; 2]>;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ConvertColorError {
    #[error("color conversion shall have one or two input nodes, but {} were given", .0)]
    Arity(usize),

    #[error("input {} must have rank 4 (NHWC), but has shape {}", .input, .shape)]
    Rank { input: usize, shape: Shape },

    #[error("input {} has element type {}, expected u8 or a floating point type", .input, .element_type)]
    UnsupportedType {
        input: usize,
        element_type: ElementType,
    },

    #[error("element types of Y and UV inputs do not match: {} vs {}", .0, .1)]
    TypeMismatch(ElementType, ElementType),

    #[error("input {} channel dimension must be {}, but is {}", .input, .expected, .got)]
    Channel {
        input: usize,
        expected: usize,
        got: Dim,
    },

    #[error("invalid NV12 dimension: {}", .0)]
    DerivedDimension(String),

    #[error("batch dimensions of Y and UV inputs do not match: {} vs {}", .0, .1)]
    BatchMismatch(Dim, Dim),

    #[error("{}", .0)]
    Shape(#[from] ShapeError),
}

/// Target pixel format of an RGB color conversion.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ColorConversion {
    #[default]
    #[serde(rename = "RGB_TO_NV12")]
    RgbToNv12,
    #[serde(rename = "RGB_TO_NV21")]
    RgbToNv21,
}

impl EnumNames for ColorConversion {
    fn names() -> &'static [(&'static str, Self)] {
        &[
            ("RGB_TO_NV12", ColorConversion::RgbToNv12),
            ("RGB_TO_NV21", ColorConversion::RgbToNv21),
        ]
    }
}

impl Display for ColorConversion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_name())
    }
}

/// Shared validation and shape inference for conversions from NHWC RGB images.
///
/// One input is a packed RGB image `[N, H, W, 3]` and yields a single NV12 plane
/// `[N, 1.5 * H, W, 1]`. Two inputs are an already split Y plane `[N, H, W, 1]` and
/// UV plane `[N, H / 2, W / 2, 2]`, mirrored as two outputs.
///
/// Concrete nodes embed this and fix the format.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ConvertColorRgb {
    format: ColorConversion,
}

impl ConvertColorRgb {
    pub(crate) fn new(format: ColorConversion) -> Self {
        ConvertColorRgb { format }
    }

    pub fn format(&self) -> ColorConversion {
        self.format
    }

    pub fn is_type_supported(&self, element_type: ElementType) -> bool {
        element_type == ElementType::U8 || element_type.is_real()
    }

    pub fn infer_shape_and_type(&self, inputs: &[TensorDesc]) -> Result<Outputs, ConvertColorError> {
        let k = inputs.len();
        if !(1..=2).contains(&k) {
            return Err(ConvertColorError::Arity(k));
        }

        trace!(format = %self.format, inputs = k, "inferring color conversion outputs");

        for (i, x) in inputs.iter().enumerate() {
            if x.rank() != 4 {
                return Err(ConvertColorError::Rank {
                    input: i,
                    shape: x.shape().clone(),
                });
            }
        }

        for (i, x) in inputs.iter().enumerate() {
            if !self.is_type_supported(x.element_type()) {
                return Err(ConvertColorError::UnsupportedType {
                    input: i,
                    element_type: x.element_type(),
                });
            }
        }

        match inputs {
            [rgb] => Ok(smallvec![self.infer_single_plane(rgb)?]),
            [y, uv] => self.infer_two_planes(y, uv),
            _ => Err(ConvertColorError::Arity(k)),
        }
    }

    fn infer_single_plane(&self, rgb: &TensorDesc) -> Result<TensorDesc, ConvertColorError> {
        check_channels(rgb, 0, RGB_CHANNELS)?;

        let height = rgb.dim(HEIGHT_AXIS)?;
        let nv12_height = height.scale(3, 2).ok_or_else(|| {
            ConvertColorError::DerivedDimension(format!(
                "image height {} has no exact 1.5x NV12 height that fits in usize",
                height
            ))
        })?;

        let shape = rgb
            .shape()
            .with_dim(HEIGHT_AXIS, nv12_height)?
            .with_dim(CHANNEL_AXIS, Dim::Static(1))?;

        Ok(TensorDesc::new(shape, rgb.element_type()))
    }

    fn infer_two_planes(
        &self,
        y: &TensorDesc,
        uv: &TensorDesc,
    ) -> Result<Outputs, ConvertColorError> {
        if y.element_type() != uv.element_type() {
            return Err(ConvertColorError::TypeMismatch(
                y.element_type(),
                uv.element_type(),
            ));
        }

        check_channels(y, 0, Y_CHANNELS)?;
        check_channels(uv, 1, UV_CHANNELS)?;

        let (y_batch, uv_batch) = (y.dim(BATCH_AXIS)?, uv.dim(BATCH_AXIS)?);
        if y_batch.is_static() && uv_batch.is_static() && y_batch != uv_batch {
            return Err(ConvertColorError::BatchMismatch(y_batch, uv_batch));
        }

        for (axis, name) in [(HEIGHT_AXIS, "height"), (WIDTH_AXIS, "width")] {
            let (y_dim, uv_dim) = (y.dim(axis)?, uv.dim(axis)?);

            // only checked when both sides are known
            if let (Some(y_ext), Some(uv_ext)) = (y_dim.get(), uv_dim.get()) {
                if y_dim.half() != Some(Dim::Static(uv_ext)) {
                    return Err(ConvertColorError::DerivedDimension(format!(
                        "UV plane {} {} must be half of Y plane {} {}",
                        name, uv_ext, name, y_ext
                    )));
                }
            }
        }

        Ok(smallvec![y.clone(), uv.clone()])
    }

    pub fn visit_attributes(&mut self, visitor: &mut dyn AttributeVisitor) -> bool {
        visitor.on_attribute("format", &mut self.format)
    }
}

fn check_channels(x: &TensorDesc, input: usize, expected: usize) -> Result<(), ConvertColorError> {
    let got = x.dim(CHANNEL_AXIS)?;
    if got.compatible(expected) {
        Ok(())
    } else {
        Err(ConvertColorError::Channel {
            input,
            expected,
            got,
        })
    }
}
