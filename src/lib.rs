//! gbisgrid: GBIS inversion results to self-describing rasters
//!
//! Reassembles the sparse data/model/residual vectors of every interferogram
//! of a GBIS inversion into dense grids, locates the inverted source on the
//! WGS84 ellipsoid and writes one GeoTIFF per interferogram carrying the
//! merged metadata.

pub mod types;
pub mod io;
pub mod core;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    GbisError, GbisResult, ImageGrids, ImageRecord, InversionContainer, InversionResult, Mask,
    Metadata, MetadataValue, OutputRecord, ReferenceGeometry,
};

pub use crate::core::{ExportParams, GbisExporter};
pub use io::{GeoTiffWriter, JsonContainerLoader, NoDisplay, PanelPlotter, RecordLoader};

use std::path::{Path, PathBuf};

/// Convert a GBIS inversion export into one GeoTIFF per interferogram
///
/// Returns the written files in input order.
pub fn gbis_to_rasters<P: AsRef<Path>>(file: P, params: &ExportParams) -> GbisResult<Vec<PathBuf>> {
    let file = file.as_ref();
    let container = JsonContainerLoader::default().load(file)?;
    let output_dir = params.resolve_output_dir(file);

    if let Some(name) = &params.output_name {
        log::warn!(
            "output name '{}' is informational only, files are named after their interferogram",
            name
        );
    }

    let writer = GeoTiffWriter::new(&output_dir);
    if params.display {
        GbisExporter::new(params, writer, PanelPlotter::new(&output_dir)).run(&container)
    } else {
        GbisExporter::new(params, writer, NoDisplay).run(&container)
    }
}
