//! Ellipsoidal forward geodesic (Vincenty's direct solution)

use crate::types::GeodeticPoint;

/// Convergence threshold on the angular distance, radians (~0.006 mm)
const SIGMA_TOLERANCE: f64 = 1e-12;
const MAX_ITERATIONS: usize = 200;

/// Reference ellipsoid described by its semi-major axis and flattening
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters
    pub a: f64,
    /// Flattening
    pub f: f64,
}

/// WGS84 ellipsoid
pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    f: 1.0 / 298.257_223_563,
};

impl Ellipsoid {
    /// Semi-minor axis in meters
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// Destination reached from `origin` after travelling `distance` meters
    /// along the geodesic leaving at `azimuth_deg` (clockwise from north)
    pub fn forward(&self, origin: GeodeticPoint, azimuth_deg: f64, distance: f64) -> GeodeticPoint {
        if distance == 0.0 {
            return origin;
        }

        let (a, b, f) = (self.a, self.b(), self.f);
        let alpha1 = azimuth_deg.to_radians();
        let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

        // Reduced latitude of the origin
        let tan_u1 = (1.0 - f) * origin.latitude.to_radians().tan();
        let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
        let sin_u1 = tan_u1 * cos_u1;

        let sigma1 = tan_u1.atan2(cos_alpha1);
        let sin_alpha = cos_u1 * sin_alpha1;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

        let sigma0 = distance / (b * big_a);
        let mut sigma = sigma0;
        let mut cos_2sigma_m;
        let mut sin_sigma;
        let mut cos_sigma;
        let mut iterations = 0;
        loop {
            cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
            sin_sigma = sigma.sin();
            cos_sigma = sigma.cos();
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
            let previous = sigma;
            sigma = sigma0 + delta_sigma;
            iterations += 1;
            if (sigma - previous).abs() < SIGMA_TOLERANCE || iterations >= MAX_ITERATIONS {
                break;
            }
        }
        cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        sin_sigma = sigma.sin();
        cos_sigma = sigma.cos();

        let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
        let latitude = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
            .atan2((1.0 - f) * (sin_alpha * sin_alpha + x * x).sqrt());
        let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let big_l = lambda
            - (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        GeodeticPoint {
            longitude: normalize_longitude(origin.longitude + big_l.to_degrees()),
            latitude: latitude.to_degrees(),
        }
    }
}

/// Wrap a longitude into [-180, 180)
pub fn normalize_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}
