use chroma::ir::Graph;
use chroma::shape::Shape;
use chroma::{ElementType, Error, Output, RgbToNv12, TensorDesc};
use tracing::{error, info};

fn build() -> Result<Graph, Error> {
    let mut g = Graph::new();

    // packed RGB frame with a dynamic batch
    let rgb = g.parameter(TensorDesc::new(
        Shape::new([-1, 480, 640, 3])?,
        ElementType::U8,
    ));
    let nv12 = RgbToNv12::new(&mut g, rgb)?;
    g.add_result(Output::new(nv12, 0))?;

    // pre-split planes
    let y = g.parameter(TensorDesc::new(Shape::new([1, 480, 640, 1])?, ElementType::F32));
    let uv = g.parameter(TensorDesc::new(Shape::new([1, 240, 320, 2])?, ElementType::F32));
    let planes = RgbToNv12::with_planes(&mut g, y, uv)?;
    g.add_result(Output::new(planes, 0))?;
    g.add_result(Output::new(planes, 1))?;

    Ok(g)
}

fn main() {
    tracing_subscriber::fmt().init();

    match build() {
        Ok(g) => {
            info!(nodes = g.len(), "graph built");
            print!("{}", g);
        }
        Err(e) => {
            error!("failed to build graph: {}", e);
            std::process::exit(1);
        }
    }
}
