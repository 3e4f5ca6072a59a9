use crate::types::{GbisError, GbisResult, Grid, ImageGrids};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Diagnostic rendering of the three grids of one image
pub trait Visualizer {
    fn render(&mut self, grids: &ImageGrids, label: &str) -> GbisResult<()>;
}

/// Display disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDisplay;

impl Visualizer for NoDisplay {
    fn render(&mut self, _grids: &ImageGrids, _label: &str) -> GbisResult<()> {
        Ok(())
    }
}

const LABEL_WIDTH: u32 = 140;
const COLORBAR_STEPS: usize = 64;

/// Renders data / model / residual side by side into `<dir>/<label>_panels.png`
pub struct PanelPlotter {
    output_dir: PathBuf,
    panel_size: u32,
    written: Vec<PathBuf>,
}

impl PanelPlotter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            panel_size: 400,
            written: Vec::new(),
        }
    }

    pub fn with_panel_size(mut self, panel_size: u32) -> Self {
        self.panel_size = panel_size;
        self
    }

    /// Figures rendered so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn figure_path(&self, label: &str) -> PathBuf {
        self.output_dir.join(format!("{}_panels.png", label))
    }

    fn draw(&self, path: &Path, grids: &ImageGrids, label: &str) -> Result<(), Box<dyn std::error::Error>> {
        let (rows, cols) = grids.dim();
        let limit = symmetric_limit(&grids.data);

        let root = BitMapBackend::new(path, (LABEL_WIDTH + 3 * self.panel_size, self.panel_size))
            .into_drawing_area();
        root.fill(&WHITE)?;
        let (label_area, panel_area) = root.split_horizontally(LABEL_WIDTH);

        let font = ("sans-serif", 16).into_font();
        let lines = label_lines(label);
        for (i, line) in lines.iter().enumerate() {
            label_area.draw(&Text::new(line.clone(), (10, 20 + 20 * i as i32), font.clone()))?;
        }

        // vertical colour ramp shared by the three panels, +limit at the top
        let top = 30 + 20 * lines.len() as i32;
        let bottom = (self.panel_size as i32 - 30).max(top + COLORBAR_STEPS as i32);
        let step = (bottom - top) as f32 / COLORBAR_STEPS as f32;
        for (k, value) in colorbar_values(limit, COLORBAR_STEPS).into_iter().enumerate() {
            let y0 = top + (step * k as f32).round() as i32;
            let y1 = top + (step * (k + 1) as f32).round() as i32;
            label_area.draw(&Rectangle::new([(10, y0), (30, y1)], jet(value, limit).filled()))?;
        }
        label_area.draw(&Rectangle::new([(10, top), (30, bottom)], BLACK))?;
        label_area.draw(&Text::new(format!("{:+.3}", limit), (35, top), font.clone()))?;
        label_area.draw(&Text::new(format!("{:+.3}", -limit), (35, bottom - 14), font))?;

        for (area, (title, grid)) in panel_area.split_evenly((1, 3)).iter().zip(grids.named()) {
            let mut chart = ChartBuilder::on(area)
                .caption(title, ("sans-serif", 18))
                .margin(10)
                .x_label_area_size(25)
                .y_label_area_size(35)
                .build_cartesian_2d(0..cols, 0..rows)?;
            chart.configure_mesh().disable_mesh().draw()?;

            // row 0 at the top, as in an image
            chart.draw_series(
                grid.indexed_iter()
                    .filter(|(_, value)| value.is_finite())
                    .map(|((i, j), &value)| {
                        let y = rows - 1 - i;
                        Rectangle::new([(j, y), (j + 1, y + 1)], jet(value, limit).filled())
                    }),
            )?;
        }

        root.present()?;
        Ok(())
    }
}

impl Visualizer for PanelPlotter {
    fn render(&mut self, grids: &ImageGrids, label: &str) -> GbisResult<()> {
        let path = self.figure_path(label);
        log::info!("plotting {} to {}", label, path.display());
        self.draw(&path, grids, label)
            .map_err(|e| GbisError::Render(format!("{}: {}", path.display(), e)))?;
        self.written.push(path);
        Ok(())
    }
}

/// Colour limit shared by the three panels: max |value| over finite data pixels
pub fn symmetric_limit(data: &Grid) -> f32 {
    let limit = data
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0f32, |acc, v| acc.max(v.abs()));
    if limit > 0.0 {
        limit
    } else {
        1.0
    }
}

/// Colour bar sample values from +limit down to -limit, taken at the centre
/// of each of `steps` cells
pub fn colorbar_values(limit: f32, steps: usize) -> Vec<f32> {
    (0..steps)
        .map(|k| limit * (1.0 - 2.0 * (k as f32 + 0.5) / steps as f32))
        .collect()
}

/// Jet colour ramp over [-limit, limit]
pub fn jet(value: f32, limit: f32) -> RGBColor {
    let t = ((value + limit) / (2.0 * limit)).clamp(0.0, 1.0);
    let channel = |offset: f32| ((1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBColor(channel(3.0), channel(2.0), channel(1.0))
}

/// Label split at the first underscore onto two lines
pub fn label_lines(label: &str) -> Vec<String> {
    match label.split_once('_') {
        Some((head, tail)) => vec![head.to_string(), tail.to_string()],
        None => vec![label.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_symmetric_limit_ignores_nan() {
        let data = array![[f32::NAN, -0.3], [0.2, f32::NAN]];
        assert_eq!(symmetric_limit(&data), 0.3);

        let empty = Grid::from_elem((2, 2), f32::NAN);
        assert_eq!(symmetric_limit(&empty), 1.0);
    }

    #[test]
    fn test_jet_endpoints() {
        let RGBColor(r, g, b) = jet(-1.0, 1.0);
        assert!(b > 0 && r == 0 && g == 0);

        let RGBColor(r, g, b) = jet(0.0, 1.0);
        assert!(g == 255 && r == b);

        let RGBColor(r, g, b) = jet(5.0, 1.0);
        assert!(r > 0 && g == 0 && b == 0);
    }

    #[test]
    fn test_label_lines() {
        assert_eq!(label_lines("T065_asc_2019"), vec!["T065", "asc_2019"]);
        assert_eq!(label_lines("single"), vec!["single"]);
    }

    #[test]
    fn test_colorbar_runs_top_to_bottom() {
        let values = colorbar_values(0.5, 4);
        assert_eq!(values, vec![0.375, 0.125, -0.125, -0.375]);
        let RGBColor(r, _, b) = jet(values[0], 0.5);
        assert!(r > b);
        let RGBColor(r, _, b) = jet(values[3], 0.5);
        assert!(b > r);
    }

    fn small_grids() -> ImageGrids {
        ImageGrids {
            data: array![[0.1f32, f32::NAN, -0.2], [0.3, 0.0, -0.1]],
            model: array![[0.1f32, f32::NAN, -0.1], [0.2, 0.0, -0.1]],
            residual: array![[0.0f32, f32::NAN, -0.1], [0.1, 0.0, 0.0]],
        }
    }

    #[test]
    fn test_panel_plotter_writes_one_figure_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut plotter = PanelPlotter::new(dir.path()).with_panel_size(160);

        plotter.render(&small_grids(), "T065_asc").unwrap();

        let expected = plotter.figure_path("T065_asc");
        assert_eq!(expected, dir.path().join("T065_asc_panels.png"));
        assert!(expected.is_file());
        assert!(std::fs::metadata(&expected).unwrap().len() > 0);
        assert_eq!(plotter.written(), &[expected.clone()]);

        plotter.render(&small_grids(), "T142_dsc").unwrap();
        assert_eq!(plotter.written().len(), 2);
        assert!(dir.path().join("T142_dsc_panels.png").is_file());
    }

    #[test]
    fn test_panel_plotter_unwritable_directory_is_render_error() {
        let mut plotter = PanelPlotter::new("/nonexistent/dir").with_panel_size(160);
        let err = plotter.render(&small_grids(), "T1").unwrap_err();
        assert!(matches!(err, GbisError::Render(_)));
        assert!(plotter.written().is_empty());
    }

    #[test]
    fn test_no_display_is_inert() {
        let grids = ImageGrids {
            data: array![[1.0f32]],
            model: array![[1.0f32]],
            residual: array![[0.0f32]],
        };
        let before = grids.clone();
        NoDisplay.render(&grids, "T1").unwrap();
        assert_eq!(grids, before);
    }
}
