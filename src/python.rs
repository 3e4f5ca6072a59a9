//! Python bindings

use crate::core::GridReconstructor;
use crate::{gbis_to_rasters, ExportParams};
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;
use std::path::PathBuf;

fn to_py_err(e: crate::GbisError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e))
}

/// Convert a GBIS inversion export into one GeoTIFF per interferogram
#[pyfunction]
#[pyo3(signature = (file, display = true, outdir = None))]
fn load_gbis(file: String, display: bool, outdir: Option<String>) -> PyResult<Vec<String>> {
    let params = ExportParams {
        display,
        output_dir: outdir.map(PathBuf::from),
        ..Default::default()
    };
    let written = gbis_to_rasters(&file, &params).map_err(to_py_err)?;
    Ok(written.iter().map(|p| p.display().to_string()).collect())
}

/// Scatter masked values into a float32 grid, NaN outside the mask
#[pyfunction]
fn reconstruct_grid<'py>(
    py: Python<'py>,
    mask: PyReadonlyArray2<'py, u8>,
    values: Vec<f64>,
) -> PyResult<&'py PyArray2<f32>> {
    let mask = mask.as_array().mapv(|v| v != 0);
    let grid = GridReconstructor::scatter::<f32>(&mask, &values, "values").map_err(to_py_err)?;
    Ok(grid.into_pyarray(py))
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(load_gbis, m)?)?;
    m.add_function(wrap_pyfunction!(reconstruct_grid, m)?)?;
    Ok(())
}
