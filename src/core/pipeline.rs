use crate::core::grid::GridReconstructor;
use crate::core::locate::ModelLocator;
use crate::core::metadata::{GlobalParameters, MetadataMerger, ProcessingTags};
use crate::io::display::Visualizer;
use crate::io::writer::OutputWriter;
use crate::types::{GbisResult, ImageRecord, InversionContainer, OutputRecord};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Parameters for one export run
#[derive(Debug, Clone)]
pub struct ExportParams {
    /// Render the diagnostic panels
    pub display: bool,
    /// Where output files go; defaults to the directory of the input container
    pub output_dir: Option<PathBuf>,
    /// Requested output name. Informational only: every file is named after
    /// its record
    pub output_name: Option<String>,
    pub tags: ProcessingTags,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            display: true,
            output_dir: None,
            output_name: None,
            tags: ProcessingTags::default(),
        }
    }
}

impl ExportParams {
    /// Output directory for a given input container path
    pub fn resolve_output_dir(&self, source: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => source
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Drives reconstruction, location and metadata fusion for every image of a
/// container, handing each result to the writer and the visualizer in order
pub struct GbisExporter<W: OutputWriter, V: Visualizer> {
    locator: ModelLocator,
    merger: MetadataMerger,
    writer: W,
    visualizer: V,
}

impl<W: OutputWriter, V: Visualizer> GbisExporter<W, V> {
    pub fn new(params: &ExportParams, writer: W, visualizer: V) -> Self {
        Self {
            locator: ModelLocator::default(),
            merger: MetadataMerger::new(params.tags.clone()),
            writer,
            visualizer,
        }
    }

    pub fn with_locator(mut self, locator: ModelLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Build the output record for one image without writing it
    fn build_record(&self, index: usize, image: &ImageRecord, globals: &GlobalParameters) -> GbisResult<OutputRecord> {
        let grids = GridReconstructor::reconstruct(image).map_err(|e| e.in_record(index, &image.name))?;
        let metadata = self.merger.merge(&image.file_metadata, image.min_height, globals);

        Ok(OutputRecord {
            name: image.name.clone(),
            grids,
            metadata,
        })
    }

    /// Export every image; returns the written files in input order
    ///
    /// Fails fast: the first error aborts the batch, files already written stay.
    pub fn run(&mut self, container: &InversionContainer) -> GbisResult<Vec<PathBuf>> {
        let total = container.images.len();
        log::info!("number of output files: {}", total);
        for name in repeated_names(&container.images) {
            log::warn!("several images are named '{}', later ones overwrite earlier output", name);
        }

        // Computed before the first write so a bad model never leaves partial output
        let globals = GlobalParameters::from_inversion(&container.inversion, &container.geometry, &self.locator)?;

        let mut written = Vec::with_capacity(total);
        for (index, image) in container.images.iter().enumerate() {
            let record = self.build_record(index, image, &globals)?;
            log::info!("{}", "-".repeat(30));
            log::info!(
                "image {}/{}: {} (mask from {})",
                index + 1,
                total,
                record.name,
                image.mask_source.display()
            );

            let path = self
                .writer
                .write(&record)
                .map_err(|e| e.in_record(index, &record.name))?;
            log::info!("wrote {}", path.display());
            written.push(path);

            self.visualizer
                .render(&record.grids, &record.name)
                .map_err(|e| e.in_record(index, &record.name))?;
        }

        Ok(written)
    }

    pub fn into_parts(self) -> (W, V) {
        (self.writer, self.visualizer)
    }
}

/// Names carried by more than one image, in first-seen order
fn repeated_names(images: &[ImageRecord]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut repeated = Vec::new();
    for image in images {
        let name = image.name.as_str();
        if !seen.insert(name) && !repeated.contains(&name) {
            repeated.push(name);
        }
    }
    repeated
}
