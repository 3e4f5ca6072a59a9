#![allow(dead_code)]

//! Fixtures shared by the integration tests: GDAL mask rasters and GBIS
//! container exports in a scratch directory

use gdal::raster::Buffer;
use gdal::{DriverManager, Metadata};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// 3x3 mask with four valid pixels: (0,0), (0,2), (1,1), (2,1)
pub const MASK: [[u8; 3]; 3] = [[1, 0, 1], [0, 1, 0], [0, 1, 0]];
pub const VALID: [(usize, usize); 4] = [(0, 0), (0, 2), (1, 1), (2, 1)];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn write_mask(path: &Path, mask: &[[u8; 3]; 3], metadata: &[(&str, &str)]) {
    let driver = DriverManager::get_driver_by_name("GTiff").expect("GTiff driver");
    let mut dataset = driver
        .create_with_band_type::<u8, _>(path, 3, 3, 1)
        .expect("create mask raster");
    for (key, value) in metadata {
        dataset
            .set_metadata_item(key, value, "")
            .expect("set mask metadata");
    }
    let flat: Vec<u8> = mask.iter().flatten().copied().collect();
    let mut band = dataset.rasterband(1).expect("mask band");
    band.write((0, 0), (3, 3), &Buffer::new((3, 3), flat))
        .expect("write mask");
}

/// Container with two interferograms, masks written next to it
pub fn two_image_container(dir: &Path) -> Value {
    write_mask(
        &dir.join("T065_mask.tif"),
        &MASK,
        &[
            ("ORBIT_DIRECTION", "ASCENDING"),
            ("_fieldnames", "ORBIT_DIRECTION"),
            ("MOGI_Depth", "stale"),
        ],
    );
    write_mask(&dir.join("T142_mask.tif"), &MASK, &[("ORBIT_DIRECTION", "DESCENDING")]);

    json!({
        "insar": [
            {"dataPath": "T065_mask.tif"},
            {"dataPath": dir.join("T142_mask.tif").display().to_string()}
        ],
        "insarPlot": [
            {"name": "T065_asc", "data": [0.01, 0.02, 0.03, 0.04],
             "model": [0.011, 0.019, 0.031, 0.039], "residual": [-0.001, 0.001, -0.001, 0.001],
             "minHeight": 250.0},
            {"name": "T142_dsc", "data": [-0.01, -0.02, -0.03, -0.04],
             "model": [-0.011, -0.019, -0.031, -0.039], "residual": [0.001, -0.001, 0.001, -0.001]}
        ],
        "invResults": {
            "optimalmodel": [0.0, 1000.0, 3000.0, 2.5e6],
            "model": {"parName": ["MOGI X", "MOGI Y", "MOGI Depth", "MOGI DV"]}
        },
        "geo": {"referencePoint": [0.0, 0.0]}
    })
}

pub fn write_container(dir: &Path, container: &Value) -> PathBuf {
    let path = dir.join("invert_1_2_C.json");
    std::fs::write(&path, serde_json::to_string_pretty(container).expect("serialize container"))
        .expect("write container");
    path
}

/// GeoTIFF files present in a directory
pub fn tif_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "tif"))
        .filter(|path| !path.to_string_lossy().ends_with("_mask.tif"))
        .collect();
    files.sort();
    files
}
