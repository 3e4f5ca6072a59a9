use crate::types::{GbisError, GbisResult, ImageGrids, ImageRecord, Mask};
use ndarray::Array2;
use num_traits::{Float, NumCast};

/// Scatters sparse masked vectors back into dense 2D grids
///
/// Masked pixels are visited in row-major order: the k-th set pixel of the
/// mask receives the k-th value. Every other pixel is NaN.
pub struct GridReconstructor;

impl GridReconstructor {
    /// Number of valid pixels in a mask
    pub fn valid_count(mask: &Mask) -> usize {
        mask.iter().filter(|&&valid| valid).count()
    }

    /// Scatter one value sequence into a grid shaped like `mask`
    pub fn scatter<T: Float>(mask: &Mask, values: &[f64], what: &str) -> GbisResult<Array2<T>> {
        let expected = Self::valid_count(mask);
        if values.len() != expected {
            return Err(GbisError::ShapeMismatch {
                what: what.to_string(),
                expected,
                actual: values.len(),
            });
        }

        let mut grid = Array2::<T>::from_elem(mask.dim(), T::nan());
        let mut source = values.iter();
        // ndarray iterates in logical row-major order for any memory layout
        for (cell, &valid) in grid.iter_mut().zip(mask.iter()) {
            if valid {
                if let Some(&value) = source.next() {
                    *cell = <T as NumCast>::from(value).unwrap_or_else(T::nan);
                }
            }
        }

        Ok(grid)
    }

    /// Rebuild the data/model/residual grids of one image
    pub fn reconstruct(record: &ImageRecord) -> GbisResult<ImageGrids> {
        let (rows, cols) = record.mask.dim();
        log::debug!(
            "Reconstructing {}x{} grids from {} valid pixels",
            rows,
            cols,
            Self::valid_count(&record.mask)
        );

        Ok(ImageGrids {
            data: Self::scatter(&record.mask, &record.displacement_values, "data")?,
            model: Self::scatter(&record.mask, &record.model_values, "model")?,
            residual: Self::scatter(&record.mask, &record.residual_values, "residual")?,
        })
    }
}
