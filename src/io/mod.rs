//! Boundary collaborators: container loading, mask rasters, output files and plots

pub mod container;
pub mod mask;
pub mod writer;
pub mod display;

pub use container::{JsonContainerLoader, RecordLoader};
pub use mask::{GdalMaskReader, MaskReader};
pub use writer::{GeoTiffWriter, MemoryWriter, OutputWriter};
pub use display::{NoDisplay, PanelPlotter, Visualizer};
