use crate::types::{GbisError, GbisResult, Grid, OutputRecord};
use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager, Metadata};
use std::path::{Path, PathBuf};

/// Persists one output record; returns the identifier of what was written
pub trait OutputWriter {
    fn write(&mut self, record: &OutputRecord) -> GbisResult<PathBuf>;
}

/// Keeps records in memory, identified by their name
#[derive(Debug, Default)]
pub struct MemoryWriter {
    pub records: Vec<OutputRecord>,
}

impl OutputWriter for MemoryWriter {
    fn write(&mut self, record: &OutputRecord) -> GbisResult<PathBuf> {
        self.records.push(record.clone());
        Ok(PathBuf::from(&record.name))
    }
}

/// Writes `<output_dir>/<name>.tif`: three float32 bands (data, model,
/// residual) with the merged metadata in the default domain
pub struct GeoTiffWriter {
    output_dir: PathBuf,
}

impl GeoTiffWriter {
    pub const EXTENSION: &'static str = "tif";

    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", name, Self::EXTENSION))
    }

    fn write_band(dataset: &Dataset, index: isize, name: &str, grid: &Grid) -> GbisResult<()> {
        let (height, width) = grid.dim();
        let mut band = dataset.rasterband(index)?;
        let buffer = Buffer::new((width, height), grid.iter().copied().collect::<Vec<f32>>());
        band.write((0, 0), (width, height), &buffer)?;
        band.set_no_data_value(Some(f64::NAN))?;
        band.set_description(name)?;
        Ok(())
    }

    fn write_dataset(&self, path: &Path, record: &OutputRecord) -> GbisResult<()> {
        let (height, width) = record.grids.dim();
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset = driver.create_with_band_type::<f32, _>(
            path,
            width as isize,
            height as isize,
            3,
        )?;

        for (key, value) in &record.metadata {
            dataset.set_metadata_item(key, &value.to_string(), "")?;
        }

        for (index, (name, grid)) in record.grids.named().into_iter().enumerate() {
            if grid.dim() != (height, width) {
                return Err(GbisError::ShapeMismatch {
                    what: format!("{} grid of {}", name, record.name),
                    expected: height * width,
                    actual: grid.len(),
                });
            }
            Self::write_band(&dataset, index as isize + 1, name, grid)?;
        }

        Ok(())
    }
}

impl OutputWriter for GeoTiffWriter {
    fn write(&mut self, record: &OutputRecord) -> GbisResult<PathBuf> {
        let path = self.output_path(&record.name);
        log::info!("create GeoTIFF file: {} with w mode", path.display());

        self.write_dataset(&path, record).map_err(|e| match e {
            GbisError::Gdal(err) => GbisError::Write {
                path: path.clone(),
                reason: err.to_string(),
            },
            other => other,
        })?;

        log::info!("finished writing to {}", path.display());
        Ok(path)
    }
}
