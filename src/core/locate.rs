use crate::core::geodesy::{Ellipsoid, WGS84};
use crate::types::{GbisError, GbisResult, GeodeticPoint, InversionResult, ReferenceGeometry};

/// Converts the local east/north offset of the inverted source into an
/// absolute longitude/latitude
#[derive(Debug, Clone, Copy)]
pub struct ModelLocator {
    ellipsoid: Ellipsoid,
}

impl Default for ModelLocator {
    fn default() -> Self {
        Self::new(WGS84)
    }
}

impl ModelLocator {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    /// Azimuth in degrees, clockwise from north, of the offset (mx east, my north)
    ///
    /// Uses the two-argument arctangent so that sources west of the origin
    /// or south of it are not folded onto the opposite quadrant.
    pub fn azimuth(mx: f64, my: f64) -> f64 {
        mx.atan2(my).to_degrees()
    }

    /// Locate the source from the first two optimal model values
    pub fn locate(&self, optimal_model: &[f64], geometry: &ReferenceGeometry) -> GbisResult<GeodeticPoint> {
        let (mx, my) = match optimal_model {
            [mx, my, ..] => (*mx, *my),
            _ => {
                return Err(GbisError::InsufficientParameters {
                    found: optimal_model.len(),
                })
            }
        };

        let azimuth = Self::azimuth(mx, my);
        let distance = mx.hypot(my);
        let origin = GeodeticPoint {
            longitude: geometry.reference_longitude,
            latitude: geometry.reference_latitude,
        };
        let location = self.ellipsoid.forward(origin, azimuth, distance);

        log::debug!(
            "Model offset ({:.3}, {:.3}) m -> azimuth {:.4} deg, distance {:.3} m -> lon {:.6}, lat {:.6}",
            mx,
            my,
            azimuth,
            distance,
            location.longitude,
            location.latitude
        );
        Ok(location)
    }

    /// Model type label: first whitespace-delimited token of the first parameter name
    pub fn model_type(inversion: &InversionResult) -> GbisResult<&str> {
        inversion
            .parameter_names()
            .first()
            .and_then(|name| name.split_whitespace().next())
            .ok_or_else(|| GbisError::MissingField {
                record: "invResults.model".to_string(),
                field: "parName[0]".to_string(),
            })
    }

    /// Derived `<type>_latitude` / `<type>_longitude` entries
    pub fn derived_location(
        &self,
        inversion: &InversionResult,
        geometry: &ReferenceGeometry,
    ) -> GbisResult<[(String, f64); 2]> {
        let location = self.locate(inversion.optimal_model(), geometry)?;
        let model_type = Self::model_type(inversion)?;
        Ok([
            (format!("{}_latitude", model_type), location.latitude),
            (format!("{}_longitude", model_type), location.longitude),
        ])
    }
}
