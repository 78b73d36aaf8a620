use crate::error::Error;
use crate::ops::attr::{AttributeMap, AttributeWriter};
use crate::ops::Op;
use crate::tensor::TensorDesc;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::debug;

pub type NodeId = usize;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum GraphError {
    #[error("node {} does not exist", .0)]
    UnknownNode(NodeId),

    #[error("node {} has {} outputs, but output {} is referenced", .node, .len, .index)]
    OutputOutOfRange { node: NodeId, index: usize, len: usize },

    #[error("{} takes no inputs, but {} were given", .0, .1)]
    UnexpectedInputs(&'static str, usize),
}

/// Edge endpoint: one result of a producer node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Output {
    pub node: NodeId,
    pub index: usize,
}

impl Output {
    pub fn new(node: NodeId, index: usize) -> Self {
        Output { node, index }
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "%{}:{}", self.node, self.index)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    op: Op,
    inputs: SmallVec<[Output; 2]>,
    // derived from the inputs when the node is built
    outputs: SmallVec<[TensorDesc; 2]>,
}

impl Node {
    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn type_name(&self) -> &'static str {
        self.op.type_name()
    }

    pub fn inputs(&self) -> &[Output] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TensorDesc] {
        &self.outputs
    }
}

/// Arena of nodes. Nodes refer to their producers by [`NodeId`] and never own them.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges_out: HashMap<NodeId, Vec<NodeId>>,
    results: Vec<Output>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(node).ok_or(GraphError::UnknownNode(node))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub fn edges_out(&self, node: NodeId) -> &[NodeId] {
        self.edges_out.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn results(&self) -> &[Output] {
        &self.results
    }

    pub fn add_result(&mut self, output: Output) -> Result<(), GraphError> {
        self.desc(output)?;
        self.results.push(output);
        Ok(())
    }

    pub fn desc(&self, output: Output) -> Result<&TensorDesc, GraphError> {
        let node = self.node(output.node)?;
        node.outputs
            .get(output.index)
            .ok_or(GraphError::OutputOutOfRange {
                node: output.node,
                index: output.index,
                len: node.outputs.len(),
            })
    }

    pub fn input_descs(&self, inputs: &[Output]) -> Result<SmallVec<[TensorDesc; 2]>, GraphError> {
        inputs.iter().map(|&x| self.desc(x).cloned()).collect()
    }

    pub fn parameter(&mut self, desc: TensorDesc) -> Output {
        let node = self.insert(Op::Parameter(desc.clone()), smallvec![], smallvec![desc]);
        Output::new(node, 0)
    }

    // Callers validate before inserting. A node in the arena is always valid.
    pub(crate) fn insert(
        &mut self,
        op: Op,
        inputs: SmallVec<[Output; 2]>,
        outputs: SmallVec<[TensorDesc; 2]>,
    ) -> NodeId {
        let node_id = self.nodes.len();

        inputs.iter().for_each(|arg| {
            self.edges_out.entry(arg.node).or_default().push(node_id);
        });

        debug!(
            node = node_id,
            op = op.type_name(),
            outputs = %outputs.iter().join(", "),
            "inserted node"
        );

        self.nodes.push(Node {
            op,
            inputs,
            outputs,
        });
        node_id
    }

    /// Builds a copy of `node` bound to `new_inputs`, re-running its validation.
    pub fn clone_node(&mut self, node: NodeId, new_inputs: &[Output]) -> Result<NodeId, Error> {
        let op = self.node(node)?.op.clone();
        let cloned = op.clone_with_new_inputs(self, new_inputs)?;
        debug!(from = node, to = cloned, "cloned node");
        Ok(cloned)
    }

    pub fn attributes(&self, node: NodeId) -> Result<AttributeMap, Error> {
        let mut op = self.node(node)?.op.clone();
        let mut writer = AttributeWriter::new();
        op.visit_attributes(&mut writer);
        Ok(writer.into_inner())
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (id, node) in self.nodes() {
            let mut op = node.op.clone();
            let mut writer = AttributeWriter::new();
            op.visit_attributes(&mut writer);
            let attrs = writer.into_inner();

            write!(f, "%{} = {}", id, node.type_name())?;
            if !attrs.is_empty() {
                write!(f, "[{}]", attrs.iter().map(|(k, v)| format!("{}={}", k, v)).join(", "))?;
            }
            writeln!(
                f,
                "({}) -> ({})",
                node.inputs.iter().join(", "),
                node.outputs.iter().join(", ")
            )?;
        }
        for output in &self.results {
            writeln!(f, "return {}", output)?;
        }
        Ok(())
    }
}
