pub mod attr;
pub mod color;
pub mod rgb_to_nv12;

use crate::error::Error;
use crate::ir::{Graph, GraphError, NodeId, Output};
use crate::ops::attr::{AttributeError, AttributeMap, AttributeVisitor};
use crate::ops::rgb_to_nv12::RgbToNv12;
use crate::tensor::TensorDesc;

// Closed set of node kinds the graph can hold
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Op {
    Parameter(TensorDesc),
    RgbToNv12(RgbToNv12),
}

impl Op {
    pub fn type_name(&self) -> &'static str {
        match self {
            Op::Parameter(_) => "Parameter",
            Op::RgbToNv12(_) => RgbToNv12::TYPE_NAME,
        }
    }

    pub fn version(&self) -> &'static str {
        match self {
            Op::Parameter(_) => "opset1",
            Op::RgbToNv12(_) => RgbToNv12::VERSION,
        }
    }

    pub fn visit_attributes(&mut self, visitor: &mut dyn AttributeVisitor) -> bool {
        match self {
            Op::Parameter(_) => true,
            Op::RgbToNv12(op) => op.visit_attributes(visitor),
        }
    }

    pub fn clone_with_new_inputs(&self, graph: &mut Graph, new_args: &[Output]) -> Result<NodeId, Error> {
        match self {
            Op::Parameter(desc) => {
                if !new_args.is_empty() {
                    return Err(GraphError::UnexpectedInputs(self.type_name(), new_args.len()).into());
                }
                Ok(graph.parameter(desc.clone()).node)
            }
            Op::RgbToNv12(op) => op.clone_with_new_inputs(graph, new_args),
        }
    }
}

/// Rebuilds a node from its type name and serialized attributes.
pub fn build(
    graph: &mut Graph,
    type_name: &str,
    attrs: &AttributeMap,
    inputs: &[Output],
) -> Result<NodeId, Error> {
    match type_name {
        RgbToNv12::TYPE_NAME => RgbToNv12::from_attributes(graph, attrs, inputs),
        _ => Err(AttributeError::UnsupportedType(type_name.to_string()).into()),
    }
}
