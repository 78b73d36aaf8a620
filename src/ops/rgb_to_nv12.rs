use crate::error::Error;
use crate::ir::{Graph, NodeId, Output};
use crate::ops::attr::{AttributeError, AttributeMap, AttributeReader, AttributeVisitor};
use crate::ops::color::{ColorConversion, ConvertColorError, ConvertColorRgb};
use crate::ops::Op;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

/// Converts an NHWC RGB image into NV12.
///
/// Built either from a single packed RGB image, producing one NV12 plane, or from a
/// Y plane and a UV plane, producing both planes. See [`ConvertColorRgb`] for the
/// shape rules.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RgbToNv12 {
    base: ConvertColorRgb,
}

impl RgbToNv12 {
    pub const TYPE_NAME: &'static str = "RGBtoNV12";
    pub const VERSION: &'static str = "opset8";

    fn op() -> Self {
        RgbToNv12 {
            base: ConvertColorRgb::new(ColorConversion::RgbToNv12),
        }
    }

    pub fn new(graph: &mut Graph, arg: Output) -> Result<NodeId, Error> {
        Self::op().build(graph, smallvec![arg])
    }

    pub fn with_planes(graph: &mut Graph, arg_y: Output, arg_uv: Output) -> Result<NodeId, Error> {
        Self::op().build(graph, smallvec![arg_y, arg_uv])
    }

    fn build(self, graph: &mut Graph, inputs: SmallVec<[Output; 2]>) -> Result<NodeId, Error> {
        let descs = graph.input_descs(&inputs)?;
        let outputs = self.base.infer_shape_and_type(&descs)?;

        let node = graph.insert(Op::RgbToNv12(self), inputs, outputs);
        debug!(node, op = Self::TYPE_NAME, "validated color conversion");
        Ok(node)
    }

    /// Builds a node of the same kind on `new_args`. Validation runs again from scratch.
    pub fn clone_with_new_inputs(&self, graph: &mut Graph, new_args: &[Output]) -> Result<NodeId, Error> {
        match *new_args {
            [arg] => Self::new(graph, arg),
            [arg_y, arg_uv] => Self::with_planes(graph, arg_y, arg_uv),
            _ => Err(ConvertColorError::Arity(new_args.len()).into()),
        }
    }

    pub fn from_attributes(
        graph: &mut Graph,
        attrs: &AttributeMap,
        inputs: &[Output],
    ) -> Result<NodeId, Error> {
        let mut base = ConvertColorRgb::default();
        let mut reader = AttributeReader::new(attrs);
        base.visit_attributes(&mut reader);
        reader.finish()?;

        if base.format() != ColorConversion::RgbToNv12 {
            return Err(AttributeError::Unexpected {
                node: Self::TYPE_NAME,
                name: "format".to_string(),
                value: base.format().to_string(),
            }
            .into());
        }

        Self::op().clone_with_new_inputs(graph, inputs)
    }

    pub fn base(&self) -> &ConvertColorRgb {
        &self.base
    }

    pub fn format(&self) -> ColorConversion {
        self.base.format()
    }

    pub fn visit_attributes(&mut self, visitor: &mut dyn AttributeVisitor) -> bool {
        self.base.visit_attributes(visitor)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::ir::Graph;
    use crate::ops::attr::{AttributeError, AttributeMap};
    use crate::ops::color::{ColorConversion, ConvertColorError};
    use crate::ops::rgb_to_nv12::RgbToNv12;
    use crate::ops::Op;
    use crate::shape::{Dim, Shape};
    use crate::tensor::{ElementType, TensorDesc};

    fn desc(extents: [isize; 4], element_type: ElementType) -> TensorDesc {
        TensorDesc::new(Shape::new(extents).unwrap(), element_type)
    }

    #[test]
    fn test_rgb() {
        let mut g = Graph::new();
        let x = g.parameter(desc([1, 480, 640, 3], ElementType::U8));

        let y = RgbToNv12::new(&mut g, x).unwrap();
        let node = g.node(y).unwrap();

        assert_eq!(node.type_name(), "RGBtoNV12");
        assert_eq!(node.inputs(), &[x]);
        assert_eq!(node.outputs().len(), 1);
        assert_eq!(node.outputs()[0], desc([1, 720, 640, 1], ElementType::U8));
        assert!(matches!(node.op(), Op::RgbToNv12(op) if op.format() == ColorConversion::RgbToNv12));
    }

    #[test]
    fn test_planes() {
        let mut g = Graph::new();
        let y_plane = g.parameter(desc([1, 480, 640, 1], ElementType::U8));
        let uv_plane = g.parameter(desc([1, 240, 320, 2], ElementType::U8));

        let y = RgbToNv12::with_planes(&mut g, y_plane, uv_plane).unwrap();
        let node = g.node(y).unwrap();

        assert_eq!(node.outputs().len(), 2);
        assert_eq!(node.outputs()[0], desc([1, 480, 640, 1], ElementType::U8));
        assert_eq!(node.outputs()[1], desc([1, 240, 320, 2], ElementType::U8));
        assert_eq!(g.edges_out(y_plane.node), &[y]);
        assert_eq!(g.edges_out(uv_plane.node), &[y]);
    }

    #[test]
    fn test_failed_build_leaves_graph() {
        let mut g = Graph::new();
        let x = g.parameter(desc([1, 480, 640, 4], ElementType::U8));

        let err = RgbToNv12::new(&mut g, x).expect_err("");
        assert_eq!(
            err,
            Error::ConvertColor(ConvertColorError::Channel {
                input: 0,
                expected: 3,
                got: Dim::Static(4),
            })
        );
        assert_eq!(g.len(), 1);
        assert!(g.edges_out(x.node).is_empty());
    }

    #[test]
    fn test_clone() {
        let mut g = Graph::new();
        let x = g.parameter(desc([1, 480, 640, 3], ElementType::U8));
        let y = RgbToNv12::new(&mut g, x).unwrap();

        let y2 = g.clone_node(y, &[x]).unwrap();
        assert_ne!(y, y2);
        assert_eq!(g.node(y).unwrap().outputs(), g.node(y2).unwrap().outputs());

        // rebinding to a new input re-derives the outputs
        let x2 = g.parameter(desc([2, -1, 320, 3], ElementType::F32));
        let y3 = g.clone_node(y, &[x2]).unwrap();
        assert_eq!(
            g.node(y3).unwrap().outputs()[0],
            desc([2, -1, 320, 1], ElementType::F32)
        );

        // and may switch to the two plane form
        let y_plane = g.parameter(desc([1, 480, 640, 1], ElementType::U8));
        let uv_plane = g.parameter(desc([1, 240, 320, 2], ElementType::U8));
        let y4 = g.clone_node(y, &[y_plane, uv_plane]).unwrap();
        assert_eq!(g.node(y4).unwrap().outputs().len(), 2);
    }

    #[test]
    fn test_clone_err() {
        let mut g = Graph::new();
        let x = g.parameter(desc([1, 480, 640, 3], ElementType::U8));
        let y = RgbToNv12::new(&mut g, x).unwrap();
        let len = g.len();

        assert_eq!(
            g.clone_node(y, &[x, x, x]).expect_err(""),
            Error::ConvertColor(ConvertColorError::Arity(3))
        );
        assert_eq!(
            g.clone_node(y, &[]).expect_err(""),
            Error::ConvertColor(ConvertColorError::Arity(0))
        );

        let bad = g.parameter(desc([1, 480, 640, 3], ElementType::I8));
        assert!(matches!(
            g.clone_node(y, &[bad]).expect_err(""),
            Error::ConvertColor(ConvertColorError::UnsupportedType { .. })
        ));
        assert_eq!(g.len(), len + 1);
    }

    #[test]
    fn test_attributes_round_trip() {
        let mut g = Graph::new();
        let x = g.parameter(desc([1, 480, 640, 3], ElementType::U8));
        let y = RgbToNv12::new(&mut g, x).unwrap();

        let attrs = g.attributes(y).unwrap();
        assert_eq!(attrs.get("format"), Some("RGB_TO_NV12"));

        let json = serde_json::to_string(&attrs).unwrap();
        let attrs: AttributeMap = serde_json::from_str(&json).unwrap();

        let y2 = RgbToNv12::from_attributes(&mut g, &attrs, &[x]).unwrap();
        assert_eq!(g.node(y2).unwrap().op(), g.node(y).unwrap().op());
        assert_eq!(g.node(y2).unwrap().outputs(), g.node(y).unwrap().outputs());
    }

    #[test]
    fn test_attributes_err() {
        let mut g = Graph::new();
        let x = g.parameter(desc([1, 480, 640, 3], ElementType::U8));

        let mut attrs = AttributeMap::new();
        attrs.insert("format", "RGB_TO_NV21");
        assert_eq!(
            RgbToNv12::from_attributes(&mut g, &attrs, &[x]).expect_err(""),
            Error::Attribute(AttributeError::Unexpected {
                node: "RGBtoNV12",
                name: "format".to_string(),
                value: "RGB_TO_NV21".to_string(),
            })
        );

        assert_eq!(
            RgbToNv12::from_attributes(&mut g, &AttributeMap::new(), &[x]).expect_err(""),
            Error::Attribute(AttributeError::Missing("format".to_string()))
        );
    }
}
