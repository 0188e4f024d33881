pub mod source;

pub use source::{OpenStreetMapSource, TileRequest, TileSource, TileSourceFactory};
