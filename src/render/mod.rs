//! The ASCII rasterizer (§4.8): sizing, label layout, glyph tables and the
//! main draw loop.

pub mod charset;
pub mod label;
pub mod raster;
pub mod sizing;

use crate::error::GraphResult;
use crate::model::Graph;

pub fn rasterize(graph: &Graph) -> GraphResult<String> {
    let span = tracing::debug_span!("rasterize");
    let _enter = span.enter();
    raster::rasterize(graph)
}
