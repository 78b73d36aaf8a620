use crate::ir::GraphError;
use crate::ops::attr::AttributeError;
use crate::ops::color::ConvertColorError;
use crate::shape::ShapeError;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("color conversion error: {0}")]
    ConvertColor(#[from] ConvertColorError),
    #[error("attribute error: {0}")]
    Attribute(#[from] AttributeError),
}
