mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use geometry::fill_sector;
pub use projection::Viewport;
pub use renderer::{Lod, MapLayers, MapRenderer};
pub use spatial::SpatialGrid;
