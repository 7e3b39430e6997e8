//! Roll-pitch-yaw and unit quaternion conversions.
//!
//! Angles are radians, quaternions are Hamilton `[x, y, z, w]`, and RPY is
//! composed Z-Y-X (yaw, then pitch, then roll).

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance used when deciding whether a quaternion is unit length.
pub const UNIT_NORM_EPSILON: f64 = 1e-9;

const DEGENERATE_NORM: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrientationError {
    #[error("orientation values must be finite numbers")]
    NonFinite,
    #[error("quaternion has zero length and cannot be normalized")]
    DegenerateQuaternion,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rpy {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Rpy {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    pub fn is_finite(&self) -> bool {
        self.roll.is_finite() && self.pitch.is_finite() && self.yaw.is_finite()
    }

    pub fn to_quaternion(&self) -> Quaternion {
        rpy_to_quaternion(self.roll, self.pitch, self.yaw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    pub fn is_unit(&self, epsilon: f64) -> bool {
        (self.norm() - 1.0).abs() <= epsilon
    }

    /// Scales to unit length. `None` when the norm is zero or not finite.
    pub fn normalized(&self) -> Option<Self> {
        let norm = self.norm();
        if !norm.is_finite() || norm < DEGENERATE_NORM {
            return None;
        }
        Some(Self::new(
            self.x / norm,
            self.y / norm,
            self.z / norm,
            self.w / norm,
        ))
    }

    pub fn to_rpy(&self) -> Rpy {
        quaternion_to_rpy(self.x, self.y, self.z, self.w)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpyAxis {
    Roll,
    Pitch,
    Yaw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuaternionComponent {
    X,
    Y,
    Z,
    W,
}

/// Which representation the operator is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationMode {
    #[default]
    Rpy,
    Quaternion,
}

pub fn rpy_to_quaternion(roll: f64, pitch: f64, yaw: f64) -> Quaternion {
    let cy = (yaw * 0.5).cos();
    let sy = (yaw * 0.5).sin();
    let cp = (pitch * 0.5).cos();
    let sp = (pitch * 0.5).sin();
    let cr = (roll * 0.5).cos();
    let sr = (roll * 0.5).sin();

    Quaternion {
        x: sr * cp * cy - cr * sp * sy,
        y: cr * sp * cy + sr * cp * sy,
        z: cr * cp * sy - sr * sp * cy,
        w: cr * cp * cy + sr * sp * sy,
    }
}

pub fn quaternion_to_rpy(x: f64, y: f64, z: f64, w: f64) -> Rpy {
    let sinr_cosp = 2.0 * (w * x + y * z);
    let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp);

    // Clamp at gimbal lock; asin would return NaN once rounding pushes past 1.
    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= 1.0 {
        FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    let yaw = siny_cosp.atan2(cosy_cosp);

    Rpy { roll, pitch, yaw }
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Degree readout for display, two decimals.
pub fn format_degrees(radians: f64) -> String {
    format!("{:.2}", radians_to_degrees(radians))
}

/// Radian readout for display, four decimals.
pub fn format_radians(radians: f64) -> String {
    format!("{radians:.4}")
}

/// An orientation holding both representations.
///
/// Whichever representation an edit arrives in is the source of truth for
/// that edit; the other view is derived once, here, and never recomputed on
/// read. Both fields are private so the pair cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    rpy: Rpy,
    quaternion: Quaternion,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            rpy: Rpy::default(),
            quaternion: Quaternion::identity(),
        }
    }

    pub fn from_rpy(rpy: Rpy) -> Result<Self, OrientationError> {
        if !rpy.is_finite() {
            return Err(OrientationError::NonFinite);
        }
        Ok(Self {
            rpy,
            quaternion: rpy.to_quaternion(),
        })
    }

    pub fn from_quaternion(quaternion: Quaternion) -> Result<Self, OrientationError> {
        if !quaternion.is_finite() {
            return Err(OrientationError::NonFinite);
        }
        let quaternion = quaternion
            .normalized()
            .ok_or(OrientationError::DegenerateQuaternion)?;
        Ok(Self {
            rpy: quaternion.to_rpy(),
            quaternion,
        })
    }

    pub fn rpy(&self) -> Rpy {
        self.rpy
    }

    pub fn quaternion(&self) -> Quaternion {
        self.quaternion
    }

    pub fn with_rpy_axis(&self, axis: RpyAxis, radians: f64) -> Result<Self, OrientationError> {
        let mut rpy = self.rpy;
        match axis {
            RpyAxis::Roll => rpy.roll = radians,
            RpyAxis::Pitch => rpy.pitch = radians,
            RpyAxis::Yaw => rpy.yaw = radians,
        }
        Self::from_rpy(rpy)
    }

    /// Replaces one quaternion component and renormalizes.
    pub fn with_quaternion_component(
        &self,
        component: QuaternionComponent,
        value: f64,
    ) -> Result<Self, OrientationError> {
        let mut quaternion = self.quaternion;
        match component {
            QuaternionComponent::X => quaternion.x = value,
            QuaternionComponent::Y => quaternion.y = value,
            QuaternionComponent::Z => quaternion.z = value,
            QuaternionComponent::W => quaternion.w = value,
        }
        Self::from_quaternion(quaternion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    /// `steps + 1` evenly spaced values from `lo` to `hi` inclusive.
    fn sweep(lo: f64, hi: f64, steps: usize) -> impl Iterator<Item = f64> + Clone {
        (0..=steps).map(move |i| lo + (hi - lo) * i as f64 / steps as f64)
    }

    #[test]
    fn finite_rpy_produces_unit_quaternion() {
        let angles = sweep(-2.0 * PI, 2.0 * PI, 32);
        for roll in angles.clone() {
            for pitch in angles.clone() {
                for yaw in angles.clone() {
                    let q = rpy_to_quaternion(roll, pitch, yaw);
                    assert!(
                        q.is_unit(UNIT_NORM_EPSILON),
                        "norm {} for ({roll}, {pitch}, {yaw})",
                        q.norm()
                    );
                }
            }
        }
        for (roll, pitch, yaw) in [(12.5, -7.25, 100.0), (1e-12, 1e6, -1e6)] {
            assert!(rpy_to_quaternion(roll, pitch, yaw).is_unit(UNIT_NORM_EPSILON));
        }
    }

    #[test]
    fn ninety_degree_yaw() {
        let q = rpy_to_quaternion(0.0, 0.0, FRAC_PI_2);
        assert!(approx_eq(q.x, 0.0, 1e-9));
        assert!(approx_eq(q.y, 0.0, 1e-9));
        assert!(approx_eq(q.z, 0.7071, 1e-4));
        assert!(approx_eq(q.w, 0.7071, 1e-4));
    }

    #[test]
    fn recovers_rpy_away_from_gimbal_lock() {
        // Canonical ranges: roll and yaw inside (-pi, pi), pitch clear of +/-pi/2.
        let outer = sweep(-3.0, 3.0, 24);
        for roll in outer.clone() {
            for pitch in sweep(-1.5, 1.5, 24) {
                for yaw in outer.clone() {
                    let rpy = rpy_to_quaternion(roll, pitch, yaw).to_rpy();
                    assert!(
                        approx_eq(rpy.roll, roll, 1e-6)
                            && approx_eq(rpy.pitch, pitch, 1e-6)
                            && approx_eq(rpy.yaw, yaw, 1e-6),
                        "({roll}, {pitch}, {yaw}) came back as {rpy:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn pitch_clamps_at_gimbal_lock() {
        // 2(wy - zx) overshoots 1 slightly for this unnormalized input.
        let up = quaternion_to_rpy(0.0, 0.7072, 0.0, 0.7072);
        assert_eq!(up.pitch, FRAC_PI_2);
        assert!(up.roll.is_finite() && up.yaw.is_finite());

        let down = quaternion_to_rpy(0.0, -0.7072, 0.0, 0.7072);
        assert_eq!(down.pitch, -FRAC_PI_2);
        assert!(down.roll.is_finite() && down.yaw.is_finite());
    }

    #[test]
    fn exact_gimbal_lock_is_finite() {
        let q = rpy_to_quaternion(0.4, FRAC_PI_2, -0.3);
        let rpy = q.to_rpy();
        assert!(rpy.roll.is_finite() && rpy.pitch.is_finite() && rpy.yaw.is_finite());
        assert!(approx_eq(rpy.pitch, FRAC_PI_2, 1e-6));
    }

    #[test]
    fn degree_helpers() {
        assert!(approx_eq(radians_to_degrees(PI), 180.0, 1e-12));
        assert!(approx_eq(degrees_to_radians(90.0), FRAC_PI_2, 1e-12));
        assert_eq!(format_degrees(FRAC_PI_2), "90.00");
        assert_eq!(format_radians(degrees_to_radians(45.0)), "0.7854");
    }

    #[test]
    fn quaternion_component_edit_stays_normalized() {
        let orientation = Orientation::identity()
            .with_quaternion_component(QuaternionComponent::X, 1.0)
            .expect("edit");
        let q = orientation.quaternion();
        assert!(q.is_unit(UNIT_NORM_EPSILON));
        assert!(approx_eq(q.x, std::f64::consts::FRAC_1_SQRT_2, 1e-12));
        assert!(approx_eq(orientation.rpy().roll, FRAC_PI_2, 1e-9));
    }

    #[test]
    fn zero_quaternion_is_rejected() {
        let orientation = Orientation::identity();
        let err = orientation
            .with_quaternion_component(QuaternionComponent::W, 0.0)
            .expect_err("degenerate");
        assert_eq!(err, OrientationError::DegenerateQuaternion);
    }

    #[test]
    fn non_finite_rpy_is_rejected() {
        let err = Orientation::identity()
            .with_rpy_axis(RpyAxis::Yaw, f64::NAN)
            .expect_err("nan");
        assert_eq!(err, OrientationError::NonFinite);
    }

    #[test]
    fn rpy_edit_derives_quaternion_once() {
        let orientation = Orientation::identity()
            .with_rpy_axis(RpyAxis::Yaw, FRAC_PI_2)
            .expect("edit");
        assert_eq!(orientation.rpy().yaw, FRAC_PI_2);
        assert_eq!(orientation.quaternion(), rpy_to_quaternion(0.0, 0.0, FRAC_PI_2));
    }
}
