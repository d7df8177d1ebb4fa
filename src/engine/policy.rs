use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_NOMINAL_RADIUS_METERS: f64 = 50.0;
pub const DEFAULT_ACCURACY_CAP_MULTIPLIER: f64 = 3.0;

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("nominal radius must be a positive finite number of meters, got {0}")]
    InvalidRadius(f64),

    #[error("accuracy cap multiplier must be finite and >= 1, got {0}")]
    InvalidCapMultiplier(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityVerdict {
    pub accepted: bool,
    pub effective_radius: f64,
}

/// Accuracy-aware radius check.
///
/// The nominal radius is widened by the device-reported accuracy and then
/// capped at `nominal * cap_multiplier`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityPolicy {
    nominal_radius_meters: f64,
    max_radius_meters: f64,
}

impl ProximityPolicy {
    pub fn new(nominal_radius_meters: f64, cap_multiplier: f64) -> Result<Self, PolicyError> {
        if !nominal_radius_meters.is_finite() || nominal_radius_meters <= 0.0 {
            return Err(PolicyError::InvalidRadius(nominal_radius_meters));
        }
        if !cap_multiplier.is_finite() || cap_multiplier < 1.0 {
            return Err(PolicyError::InvalidCapMultiplier(cap_multiplier));
        }

        Ok(Self {
            nominal_radius_meters,
            max_radius_meters: nominal_radius_meters * cap_multiplier,
        })
    }

    pub fn nominal_radius_meters(&self) -> f64 {
        self.nominal_radius_meters
    }

    pub fn max_radius_meters(&self) -> f64 {
        self.max_radius_meters
    }

    pub fn effective_radius(&self, reported_accuracy_meters: Option<f64>) -> f64 {
        // Unknown, negative and NaN accuracies do not widen the radius.
        let widening = reported_accuracy_meters
            .filter(|accuracy| accuracy.is_finite() && *accuracy > 0.0)
            .unwrap_or(0.0);

        (self.nominal_radius_meters + widening).min(self.max_radius_meters)
    }

    pub fn is_within_radius(
        &self,
        distance_meters: f64,
        reported_accuracy_meters: Option<f64>,
    ) -> ProximityVerdict {
        let effective_radius = self.effective_radius(reported_accuracy_meters);
        ProximityVerdict {
            accepted: distance_meters <= effective_radius,
            effective_radius,
        }
    }
}

impl Default for ProximityPolicy {
    fn default() -> Self {
        Self {
            nominal_radius_meters: DEFAULT_NOMINAL_RADIUS_METERS,
            max_radius_meters: DEFAULT_NOMINAL_RADIUS_METERS * DEFAULT_ACCURACY_CAP_MULTIPLIER,
        }
    }
}
