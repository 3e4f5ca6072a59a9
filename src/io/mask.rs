use crate::types::{GbisError, GbisResult, Mask, Metadata, MetadataValue};
use gdal::{Dataset, Metadata as GdalMetadata};
use ndarray::Array2;
use std::path::Path;

/// Reads the validity mask of one interferogram and the metadata stored with it
pub trait MaskReader {
    fn read_mask(&self, path: &Path) -> GbisResult<(Mask, Metadata)>;
}

/// Keys added by the exporting tool rather than the data itself (e.g. `_fieldnames`)
pub fn is_bookkeeping_key(key: &str) -> bool {
    key.starts_with('_')
}

/// Parse GDAL `KEY=VALUE` metadata items, dropping bookkeeping keys
pub fn parse_metadata_items<I, S>(items: I) -> Metadata
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .filter_map(|item| {
            let (key, value) = item.as_ref().split_once('=')?;
            let key = key.trim();
            if key.is_empty() || is_bookkeeping_key(key) {
                return None;
            }
            Some((key.to_string(), MetadataValue::Text(value.to_string())))
        })
        .collect()
}

/// Mask reader for any GDAL raster: band 1 holds the mask, non-zero is valid
pub struct GdalMaskReader;

impl GdalMaskReader {
    fn load_error(path: &Path, reason: impl ToString) -> GbisError {
        GbisError::Load {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl MaskReader for GdalMaskReader {
    fn read_mask(&self, path: &Path) -> GbisResult<(Mask, Metadata)> {
        let dataset = Dataset::open(path).map_err(|e| Self::load_error(path, e))?;

        let (width, height) = dataset.raster_size();
        log::debug!("Mask size: {}x{}, bands: {}", width, height, dataset.raster_count());

        let band = dataset.rasterband(1).map_err(|e| Self::load_error(path, e))?;
        let buffer = band
            .read_as::<f64>((0, 0), (width, height), (width, height), None)
            .map_err(|e| Self::load_error(path, e))?;
        let values = Array2::from_shape_vec((height, width), buffer.data)
            .map_err(|e| Self::load_error(path, format!("Failed to reshape mask: {}", e)))?;

        // NaN != 0, so NaN pixels count as valid
        let mask = values.mapv(|v| v != 0.0);
        let metadata = parse_metadata_items(dataset.metadata_domain("").unwrap_or_default());

        log::debug!(
            "Mask holds {} valid pixels, {} metadata items",
            mask.iter().filter(|&&valid| valid).count(),
            metadata.len()
        );
        Ok((mask, metadata))
    }
}
