//! Light-source description and estimation.
//!
//! The illumination is a single distant source given by its slant `σ` (angle
//! from the viewing axis, `[0, π/2]`) and tilt `τ` (azimuth in the image plane,
//! `[0, 2π]`). The solver consumes the derived ratios
//! `ix = cos τ · tan σ` and `iy = sin τ · tan σ`, which stay constant for the
//! whole run.
//!
//! Azimuth follows the field layout: the first in-plane axis runs along rows
//! (the `p` gradient), the second along columns (the `q` gradient).

pub mod estimator;

pub use estimator::{IlluminationEstimate, IlluminationEstimator, StatisticalEstimator};

use crate::error::SfsError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Whether out-of-range angles are rejected before solving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeCheck {
    /// Fail with [`SfsError::OutOfRange`] when slant ∉ [0, π/2] or tilt ∉ [0, 2π].
    #[default]
    Reject,
    /// Accept any finite angle; the result is well defined but may be meaningless.
    Accept,
}

/// Distant point light given by slant and tilt in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Illumination {
    pub slant: f64,
    pub tilt: f64,
}

impl Illumination {
    pub const fn new(slant: f64, tilt: f64) -> Self {
        Self { slant, tilt }
    }

    /// Combine an optional slant/tilt pair: both or neither must be present.
    pub fn from_pair(slant: Option<f64>, tilt: Option<f64>) -> Result<Option<Self>, SfsError> {
        match (slant, tilt) {
            (Some(slant), Some(tilt)) => Ok(Some(Self::new(slant, tilt))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(SfsError::invalid("slant given without tilt")),
            (None, Some(_)) => Err(SfsError::invalid("tilt given without slant")),
        }
    }

    /// Validate the angles. Non-finite values are always rejected.
    pub fn validate(&self, check: RangeCheck) -> Result<(), SfsError> {
        if !self.slant.is_finite() || !self.tilt.is_finite() {
            return Err(SfsError::invalid(format!(
                "illumination angles must be finite (slant={}, tilt={})",
                self.slant, self.tilt
            )));
        }
        if check == RangeCheck::Accept {
            return Ok(());
        }
        if !(0.0..=FRAC_PI_2).contains(&self.slant) {
            return Err(SfsError::OutOfRange {
                name: "slant",
                value: self.slant,
                min: 0.0,
                max: FRAC_PI_2,
            });
        }
        if !(0.0..=TAU).contains(&self.tilt) {
            return Err(SfsError::OutOfRange {
                name: "tilt",
                value: self.tilt,
                min: 0.0,
                max: TAU,
            });
        }
        Ok(())
    }

    /// `cos τ · tan σ`
    #[inline]
    pub fn ix(&self) -> f64 {
        self.tilt.cos() * self.slant.tan()
    }

    /// `sin τ · tan σ`
    #[inline]
    pub fn iy(&self) -> f64 {
        self.tilt.sin() * self.slant.tan()
    }

    /// Unit vector towards the light: `(cos τ sin σ, sin τ sin σ, cos σ)`.
    pub fn direction(&self) -> Vector3<f64> {
        let (ss, cs) = self.slant.sin_cos();
        let (st, ct) = self.tilt.sin_cos();
        Vector3::new(ct * ss, st * ss, cs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, PI};

    #[test]
    fn pair_must_be_complete() {
        assert_eq!(Illumination::from_pair(None, None).unwrap(), None);
        assert_eq!(
            Illumination::from_pair(Some(0.3), Some(1.0)).unwrap(),
            Some(Illumination::new(0.3, 1.0))
        );
        assert!(matches!(
            Illumination::from_pair(Some(0.3), None),
            Err(SfsError::InvalidInput(_))
        ));
        assert!(matches!(
            Illumination::from_pair(None, Some(0.3)),
            Err(SfsError::InvalidInput(_))
        ));
    }

    #[test]
    fn range_check_rejects_only_when_enabled() {
        let steep = Illumination::new(2.0, 0.0);
        assert!(matches!(
            steep.validate(RangeCheck::Reject),
            Err(SfsError::OutOfRange { name: "slant", .. })
        ));
        assert!(steep.validate(RangeCheck::Accept).is_ok());

        let wrapped = Illumination::new(0.5, 7.0);
        assert!(matches!(
            wrapped.validate(RangeCheck::Reject),
            Err(SfsError::OutOfRange { name: "tilt", .. })
        ));

        let nan = Illumination::new(f64::NAN, 0.0);
        assert!(matches!(
            nan.validate(RangeCheck::Accept),
            Err(SfsError::InvalidInput(_))
        ));

        assert!(Illumination::new(FRAC_PI_2, 2.0 * PI)
            .validate(RangeCheck::Reject)
            .is_ok());
    }

    #[test]
    fn directional_ratios_match_light_vector() {
        let light = Illumination::new(FRAC_PI_4, 0.0);
        assert!((light.ix() - 1.0).abs() < 1e-12);
        assert!(light.iy().abs() < 1e-12);

        let light = Illumination::new(0.6, 2.1);
        let d = light.direction();
        assert!((d.norm() - 1.0).abs() < 1e-12);
        assert!((d.x / d.z - light.ix()).abs() < 1e-12);
        assert!((d.y / d.z - light.iy()).abs() < 1e-12);
    }
}
