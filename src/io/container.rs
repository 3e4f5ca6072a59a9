use crate::io::mask::{GdalMaskReader, MaskReader};
use crate::types::{
    GbisError, GbisResult, ImageRecord, InversionContainer, InversionResult, ReferenceGeometry,
};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Source of fully typed inversion containers
pub trait RecordLoader {
    fn load(&self, path: &Path) -> GbisResult<InversionContainer>;
}

/// A field that may hold a single value or a list of them.
///
/// MATLAB exports collapse single-element arrays to bare values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawContainer {
    insar: Option<OneOrMany<RawInsar>>,
    #[serde(rename = "insarPlot")]
    insar_plot: Option<OneOrMany<RawInsarPlot>>,
    #[serde(rename = "invResults")]
    inv_results: Option<RawInvResults>,
    geo: Option<RawGeo>,
}

#[derive(Debug, Deserialize)]
struct RawInsar {
    #[serde(rename = "dataPath")]
    data_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInsarPlot {
    name: Option<String>,
    data: Option<OneOrMany<f64>>,
    model: Option<OneOrMany<f64>>,
    residual: Option<OneOrMany<f64>>,
    #[serde(rename = "minHeight")]
    min_height: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawInvResults {
    optimalmodel: Option<OneOrMany<f64>>,
    model: Option<RawModel>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    #[serde(rename = "parName")]
    par_name: Option<OneOrMany<String>>,
}

#[derive(Debug, Deserialize)]
struct RawGeo {
    #[serde(rename = "referencePoint")]
    reference_point: Option<OneOrMany<f64>>,
}

fn require<T>(value: Option<T>, record: &str, field: &str) -> GbisResult<T> {
    value.ok_or_else(|| GbisError::MissingField {
        record: record.to_string(),
        field: field.to_string(),
    })
}

/// Loads the JSON export of a GBIS inversion file and the mask rasters it
/// points to
pub struct JsonContainerLoader<M: MaskReader = GdalMaskReader> {
    mask_reader: M,
}

impl Default for JsonContainerLoader<GdalMaskReader> {
    fn default() -> Self {
        Self::new(GdalMaskReader)
    }
}

impl<M: MaskReader> JsonContainerLoader<M> {
    pub fn new(mask_reader: M) -> Self {
        Self { mask_reader }
    }

    /// Parse and validate a container held in memory; `source` anchors
    /// relative mask paths
    pub fn load_str(&self, json: &str, source: &Path) -> GbisResult<InversionContainer> {
        let raw: RawContainer = serde_json::from_str(json).map_err(|e| GbisError::Load {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.normalize(raw, source)
    }

    /// Turn the loosely typed export into typed records, checking every
    /// field the pipeline relies on
    fn normalize(&self, raw: RawContainer, source: &Path) -> GbisResult<InversionContainer> {
        let geometry = Self::geometry(raw.geo)?;
        let inversion = Self::inversion(raw.inv_results)?;

        let insar = require(raw.insar, "container", "insar")?.into_vec();
        let plots = require(raw.insar_plot, "container", "insarPlot")?.into_vec();
        if plots.len() != insar.len() {
            return Err(GbisError::ShapeMismatch {
                what: "insarPlot".to_string(),
                expected: insar.len(),
                actual: plots.len(),
            });
        }

        let base_dir = source.parent().unwrap_or_else(|| Path::new(""));
        let mut images = Vec::with_capacity(insar.len());
        for (index, (file, plot)) in insar.into_iter().zip(plots).enumerate() {
            images.push(self.image(index, file, plot, base_dir)?);
        }

        Ok(InversionContainer {
            source: source.to_path_buf(),
            images,
            inversion,
            geometry,
        })
    }

    fn geometry(geo: Option<RawGeo>) -> GbisResult<ReferenceGeometry> {
        let geo = require(geo, "container", "geo")?;
        let point = require(geo.reference_point, "geo", "referencePoint")?.into_vec();
        match point.as_slice() {
            [lon, lat, ..] => Ok(ReferenceGeometry {
                reference_longitude: *lon,
                reference_latitude: *lat,
            }),
            _ => Err(GbisError::ShapeMismatch {
                what: "geo.referencePoint".to_string(),
                expected: 2,
                actual: point.len(),
            }),
        }
    }

    fn inversion(results: Option<RawInvResults>) -> GbisResult<InversionResult> {
        let results = require(results, "container", "invResults")?;
        let values = require(results.optimalmodel, "invResults", "optimalmodel")?.into_vec();
        let model = require(results.model, "invResults", "model")?;
        let names = require(model.par_name, "invResults.model", "parName")?.into_vec();
        InversionResult::new(values, names)
    }

    fn image(
        &self,
        index: usize,
        file: RawInsar,
        plot: RawInsarPlot,
        base_dir: &Path,
    ) -> GbisResult<ImageRecord> {
        let record = format!("insarPlot[{}]", index);
        let name = require(plot.name, &record, "name").map_err(|e| e.in_record(index, "<unnamed>"))?;
        let wrap = |e: GbisError| e.in_record(index, &name);

        let data_path = require(file.data_path, &format!("insar[{}]", index), "dataPath").map_err(wrap)?;
        let displacement_values = require(plot.data, &record, "data").map_err(wrap)?.into_vec();
        let model_values = require(plot.model, &record, "model").map_err(wrap)?.into_vec();
        let residual_values = require(plot.residual, &record, "residual").map_err(wrap)?.into_vec();

        let mask_source = resolve_path(base_dir, &data_path);
        log::info!("read mask from file: {}", mask_source.display());
        let (mask, file_metadata) = self.mask_reader.read_mask(&mask_source).map_err(wrap)?;

        Ok(ImageRecord {
            name,
            mask,
            displacement_values,
            model_values,
            residual_values,
            min_height: plot.min_height,
            file_metadata,
            mask_source,
        })
    }
}

impl<M: MaskReader> RecordLoader for JsonContainerLoader<M> {
    fn load(&self, path: &Path) -> GbisResult<InversionContainer> {
        log::info!("read inversion file: {}", path.display());
        let file = File::open(path).map_err(|e| GbisError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let raw: RawContainer =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| GbisError::Load {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        self.normalize(raw, path)
    }
}

/// Relative mask paths are taken relative to the container
fn resolve_path(base_dir: &Path, data_path: &str) -> PathBuf {
    let path = Path::new(data_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
