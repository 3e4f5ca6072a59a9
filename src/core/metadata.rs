use crate::core::locate::ModelLocator;
use crate::types::{
    GbisError, GbisResult, InversionResult, Metadata, MetadataValue, ReferenceGeometry,
};
use std::collections::BTreeMap;

pub const KEY_UNIT: &str = "UNIT";
pub const KEY_FILE_TYPE: &str = "FILE_TYPE";
pub const KEY_PROCESSOR: &str = "PROCESSOR";
pub const KEY_MODEL_MIN_HEIGHT: &str = "MODEL_MIN_HEIGHT";

/// Fixed tags stamped on every output file
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingTags {
    pub unit: String,
    pub file_type: String,
    pub processor: String,
}

impl Default for ProcessingTags {
    fn default() -> Self {
        Self {
            unit: "m".to_string(),
            file_type: "displacement".to_string(),
            processor: "isce".to_string(),
        }
    }
}

/// Inversion-wide parameters shared by every output file: the optimal model
/// keyed by normalized parameter name plus the derived source location
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalParameters {
    entries: Metadata,
}

impl GlobalParameters {
    /// Parameter name as a metadata key: spaces become underscores
    pub fn normalize_key(name: &str) -> String {
        name.replace(' ', "_")
    }

    /// Build the shared mapping once for the whole batch
    pub fn from_inversion(
        inversion: &InversionResult,
        geometry: &ReferenceGeometry,
        locator: &ModelLocator,
    ) -> GbisResult<Self> {
        // key -> original name, to report both sides of a collision
        let mut origins: BTreeMap<String, String> = BTreeMap::new();
        let mut entries = Metadata::new();

        let derived = locator.derived_location(inversion, geometry)?;
        let pairs = inversion
            .parameters()
            .map(|(name, value)| (name.to_string(), value))
            .chain(derived);

        for (name, value) in pairs {
            let key = Self::normalize_key(&name);
            if let Some(first) = origins.get(&key) {
                return Err(GbisError::DuplicateParameterName {
                    key,
                    first: first.clone(),
                    second: name,
                });
            }
            origins.insert(key.clone(), name);
            entries.insert(key, MetadataValue::Float(value));
        }

        log::debug!("Global parameters: {:?}", entries);
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.entries.iter()
    }
}

/// Fuses file metadata, processing tags, the optional minimum height and the
/// global parameters into one flat mapping. Later sources win.
#[derive(Debug, Clone, Default)]
pub struct MetadataMerger {
    tags: ProcessingTags,
}

impl MetadataMerger {
    pub fn new(tags: ProcessingTags) -> Self {
        Self { tags }
    }

    pub fn merge(
        &self,
        file_metadata: &Metadata,
        min_height: Option<f64>,
        globals: &GlobalParameters,
    ) -> Metadata {
        let mut merged = file_metadata.clone();

        merged.insert(KEY_UNIT.to_string(), self.tags.unit.as_str().into());
        merged.insert(KEY_FILE_TYPE.to_string(), self.tags.file_type.as_str().into());
        merged.insert(KEY_PROCESSOR.to_string(), self.tags.processor.as_str().into());

        if let Some(height) = min_height {
            merged.insert(KEY_MODEL_MIN_HEIGHT.to_string(), height.into());
        }

        for (key, value) in globals.iter() {
            merged.insert(key.clone(), value.clone());
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> ReferenceGeometry {
        ReferenceGeometry {
            reference_longitude: 0.0,
            reference_latitude: 0.0,
        }
    }

    fn okada() -> InversionResult {
        InversionResult::new(
            vec![100.0, -250.0, 2500.0, 0.8],
            vec![
                "FAULT X".to_string(),
                "FAULT Y".to_string(),
                "FAULT Depth".to_string(),
                "FAULT Slip".to_string(),
            ],
        )
        .unwrap()
    }

    fn globals() -> GlobalParameters {
        GlobalParameters::from_inversion(&okada(), &origin(), &ModelLocator::default()).unwrap()
    }

    #[test]
    fn test_global_parameter_keys() {
        let g = globals();
        assert_eq!(g.len(), 6);
        assert_eq!(g.get("FAULT_X"), Some(&MetadataValue::Float(100.0)));
        assert_eq!(g.get("FAULT_Slip"), Some(&MetadataValue::Float(0.8)));
        assert!(g.get("FAULT_latitude").is_some());
        assert!(g.get("FAULT_longitude").is_some());
    }

    #[test]
    fn test_duplicate_parameter_names() {
        let inversion = InversionResult::new(
            vec![1.0, 2.0, 3.0],
            vec!["MOGI X".into(), "MOGI Y".into(), "MOGI_X".into()],
        )
        .unwrap();

        let err = GlobalParameters::from_inversion(&inversion, &origin(), &ModelLocator::default())
            .unwrap_err();
        match err {
            GbisError::DuplicateParameterName { key, first, second } => {
                assert_eq!(key, "MOGI_X");
                assert_eq!(first, "MOGI X");
                assert_eq!(second, "MOGI_X");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parameter_colliding_with_derived_location() {
        let inversion = InversionResult::new(
            vec![1.0, 2.0, 3.0],
            vec!["MOGI X".into(), "MOGI Y".into(), "MOGI latitude".into()],
        )
        .unwrap();

        let err = GlobalParameters::from_inversion(&inversion, &origin(), &ModelLocator::default())
            .unwrap_err();
        assert!(matches!(err, GbisError::DuplicateParameterName { ref key, .. } if key == "MOGI_latitude"));
    }

    #[test]
    fn test_merge_precedence() {
        let mut file = Metadata::new();
        file.insert("WAVELENGTH".into(), 0.0555.into());
        file.insert("UNIT".into(), "radian".into());
        file.insert("FAULT_X".into(), "stale".into());

        let merged = MetadataMerger::default().merge(&file, Some(-120.0), &globals());

        assert_eq!(merged["WAVELENGTH"], MetadataValue::Float(0.0555));
        assert_eq!(merged[KEY_UNIT], MetadataValue::Text("m".into()));
        assert_eq!(merged[KEY_FILE_TYPE], MetadataValue::Text("displacement".into()));
        assert_eq!(merged[KEY_PROCESSOR], MetadataValue::Text("isce".into()));
        assert_eq!(merged[KEY_MODEL_MIN_HEIGHT], MetadataValue::Float(-120.0));
        // global parameters override file metadata
        assert_eq!(merged["FAULT_X"], MetadataValue::Float(100.0));
    }

    #[test]
    fn test_merge_without_min_height() {
        let merged = MetadataMerger::default().merge(&Metadata::new(), None, &globals());
        assert!(!merged.contains_key(KEY_MODEL_MIN_HEIGHT));
        assert_eq!(merged.len(), 3 + 6);
    }

    #[test]
    fn test_global_parameter_overrides_fixed_tag() {
        let inversion = InversionResult::new(
            vec![0.0, 0.0, 7.0],
            vec!["MOGI X".into(), "MOGI Y".into(), "PROCESSOR".into()],
        )
        .unwrap();
        let g = GlobalParameters::from_inversion(&inversion, &origin(), &ModelLocator::default())
            .unwrap();

        let merged = MetadataMerger::new(ProcessingTags::default()).merge(&Metadata::new(), None, &g);
        assert_eq!(merged[KEY_PROCESSOR], MetadataValue::Float(7.0));
    }
}
