use crate::foundation::error::{LdiError, LdiResult};

/// Nominal viewer distance from the display, in millimeters.
pub const DEFAULT_REST_DISTANCE_MM: f64 = 600.0;
/// Mobile screens are smaller and held closer.
pub const MOBILE_REST_DISTANCE_FACTOR: f64 = 0.7;
pub const DEFAULT_EYE_SEPARATION_MM: f64 = 63.0;

/// Low-pass coefficients for the viewpoint filter, each in `(0, 1]`.
///
/// Depth estimates are noisier than lateral ones, so `alpha_depth` is usually the smaller.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Weight of a new sample on the x and y axes.
    pub alpha_lateral: f64,
    /// Weight of a new sample on the z axis.
    pub alpha_depth: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            alpha_lateral: 0.5,
            alpha_depth: 0.1,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> LdiResult<()> {
        for (name, alpha) in [
            ("alpha_lateral", self.alpha_lateral),
            ("alpha_depth", self.alpha_depth),
        ] {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(LdiError::validation(format!(
                    "{name} must be in (0, 1], got {alpha}"
                )));
            }
        }
        Ok(())
    }
}

/// Device constants used by the parameter computer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Rest distance on desktop displays; also the reference plane distance.
    pub default_rest_distance_mm: f64,
    /// Scale applied to the rest distance on mobile devices.
    pub mobile_distance_factor: f64,
    /// Eye separation handed to the renderer for stereo output.
    pub eye_separation_mm: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_rest_distance_mm: DEFAULT_REST_DISTANCE_MM,
            mobile_distance_factor: MOBILE_REST_DISTANCE_FACTOR,
            eye_separation_mm: DEFAULT_EYE_SEPARATION_MM,
        }
    }
}

impl SynthesisConfig {
    /// Rest distance for the device class; the per-frame math divides by it.
    pub fn rest_distance(&self, is_mobile: bool) -> f64 {
        if is_mobile {
            self.mobile_distance_factor * self.default_rest_distance_mm
        } else {
            self.default_rest_distance_mm
        }
    }

    pub fn validate(&self) -> LdiResult<()> {
        if !(self.default_rest_distance_mm.is_finite() && self.default_rest_distance_mm > 0.0) {
            return Err(LdiError::validation(
                "default_rest_distance_mm must be finite and > 0",
            ));
        }
        if !(self.mobile_distance_factor.is_finite() && self.mobile_distance_factor > 0.0) {
            return Err(LdiError::validation(
                "mobile_distance_factor must be finite and > 0",
            ));
        }
        if !(self.eye_separation_mm.is_finite() && self.eye_separation_mm >= 0.0) {
            return Err(LdiError::validation(
                "eye_separation_mm must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synthesis/config.rs"]
mod tests;
