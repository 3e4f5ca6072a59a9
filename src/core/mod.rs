//! Core conversion modules

pub mod grid;
pub mod geodesy;
pub mod locate;
pub mod metadata;
pub mod pipeline;

// Re-export main types
pub use grid::GridReconstructor;
pub use geodesy::{Ellipsoid, WGS84};
pub use locate::ModelLocator;
pub use metadata::{GlobalParameters, MetadataMerger, ProcessingTags};
pub use pipeline::{ExportParams, GbisExporter};
