use ndarray::Array2;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Per-pixel validity flags of an interferogram (rows x columns)
pub type Mask = Array2<bool>;

/// Dense float32 raster with NaN where the mask is unset
pub type Grid = Array2<f32>;

/// Flat, ordered metadata mapping written next to every output raster
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Scalar metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f64),
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Float(v) => write!(f, "{}", v),
            MetadataValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

/// Optimal model of the inversion with its parameter names
///
/// Only built through [`InversionResult::new`], so both sequences always
/// have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct InversionResult {
    optimal_model: Vec<f64>,
    /// Human readable, may contain spaces (e.g. "MOGI X")
    parameter_names: Vec<String>,
}

impl InversionResult {
    /// Pair values with names, checking both sequences have the same length
    pub fn new(optimal_model: Vec<f64>, parameter_names: Vec<String>) -> GbisResult<Self> {
        if optimal_model.len() != parameter_names.len() {
            return Err(GbisError::ShapeMismatch {
                what: "invResults.model.parName".to_string(),
                expected: optimal_model.len(),
                actual: parameter_names.len(),
            });
        }
        Ok(Self {
            optimal_model,
            parameter_names,
        })
    }

    pub fn optimal_model(&self) -> &[f64] {
        &self.optimal_model
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.parameter_names
            .iter()
            .map(String::as_str)
            .zip(self.optimal_model.iter().copied())
    }
}

/// Origin of the local coordinate system, degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceGeometry {
    pub reference_longitude: f64,
    pub reference_latitude: f64,
}

/// One interferogram of the inversion: mask plus sparse observed/modelled values
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub name: String,
    pub mask: Mask,
    pub displacement_values: Vec<f64>,
    pub model_values: Vec<f64>,
    pub residual_values: Vec<f64>,
    pub min_height: Option<f64>,
    /// Metadata of the mask source, bookkeeping keys already removed
    pub file_metadata: Metadata,
    /// Where the mask and file metadata were read from
    pub mask_source: PathBuf,
}

/// Fully loaded and validated inversion container
#[derive(Debug, Clone)]
pub struct InversionContainer {
    pub source: PathBuf,
    pub images: Vec<ImageRecord>,
    pub inversion: InversionResult,
    pub geometry: ReferenceGeometry,
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// The three dense rasters reconstructed for one interferogram
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGrids {
    pub data: Grid,
    pub model: Grid,
    pub residual: Grid,
}

impl ImageGrids {
    /// Grids in output band order, paired with their dataset names
    pub fn named(&self) -> [(&'static str, &Grid); 3] {
        [
            ("data", &self.data),
            ("model", &self.model),
            ("residual", &self.residual),
        ]
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// Everything persisted for one input image
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub name: String,
    pub grids: ImageGrids,
    pub metadata: Metadata,
}

/// Error types for GBIS export
#[derive(Debug, thiserror::Error)]
pub enum GbisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Missing field '{field}' in {record}")]
    MissingField { record: String, field: String },

    #[error("Shape mismatch for {what}: expected {expected} values, found {actual}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Optimal model holds {found} value(s), at least 2 are needed to locate the source")]
    InsufficientParameters { found: usize },

    #[error("Parameter names '{first}' and '{second}' both normalize to key '{key}'")]
    DuplicateParameterName {
        key: String,
        first: String,
        second: String,
    },

    #[error("Failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error("Rendering error: {0}")]
    Render(String),

    #[error("Record {index} ({name}): {source}")]
    InRecord {
        index: usize,
        name: String,
        #[source]
        source: Box<GbisError>,
    },
}

impl GbisError {
    /// Attach the offending record to a per-record failure
    pub fn in_record(self, index: usize, name: &str) -> Self {
        GbisError::InRecord {
            index,
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// The underlying error with any record context peeled off
    pub fn root(&self) -> &GbisError {
        match self {
            GbisError::InRecord { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for GBIS export operations
pub type GbisResult<T> = Result<T, GbisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inversion_result_rejects_unpaired_values() {
        let err = InversionResult::new(vec![1.0, 2.0, 3.0], vec!["MOGI X".into(), "MOGI Y".into()])
            .unwrap_err();
        assert!(matches!(err, GbisError::ShapeMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_parameters_pair_every_value() {
        let inversion =
            InversionResult::new(vec![1.0, 2.0], vec!["MOGI X".into(), "MOGI Y".into()]).unwrap();
        let pairs: Vec<_> = inversion.parameters().collect();
        assert_eq!(pairs, vec![("MOGI X", 1.0), ("MOGI Y", 2.0)]);
        assert_eq!(inversion.optimal_model(), &[1.0, 2.0]);
    }

    #[test]
    fn test_metadata_value_display() {
        assert_eq!(MetadataValue::from(0.5).to_string(), "0.5");
        assert_eq!(MetadataValue::from("isce").to_string(), "isce");
    }
}
