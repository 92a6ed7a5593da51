// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local poses and 4×4 matrix helpers.
//!
//! A node's local state is a [`LocalPose`]: translation, rotation, and
//! non-uniform scale, composed in scale → rotate → translate order. Composed
//! transforms are plain column-major [`DMat4`] values, matching the layout
//! used by GPU APIs.

use glam::{DMat3, DMat4, DQuat, DVec3};

/// Translation, rotation, and scale of a node relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalPose {
    /// Position relative to the parent.
    pub position: DVec3,
    /// Rotation relative to the parent.
    pub rotation: DQuat,
    /// Per-axis scale.
    pub scale: DVec3,
}

impl LocalPose {
    /// Zero translation, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    /// Creates a pose with the given position and identity rotation/scale.
    #[inline]
    #[must_use]
    pub const fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Creates a pose with the given rotation and zero position, unit scale.
    #[inline]
    #[must_use]
    pub const fn from_rotation(rotation: DQuat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Creates a pose with the given scale and zero position, no rotation.
    #[inline]
    #[must_use]
    pub const fn from_scale(scale: DVec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    /// Returns this pose with its position replaced.
    #[inline]
    #[must_use]
    pub const fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Returns this pose with its rotation replaced.
    #[inline]
    #[must_use]
    pub const fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this pose with its scale replaced.
    #[inline]
    #[must_use]
    pub const fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    /// Composes the pose into a matrix (`T * R * S`).
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for LocalPose {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Sign of the determinant of a transform's 3×3 linear part.
///
/// Cached per node and reset to [`Unknown`](Self::Unknown) whenever the
/// node's world transform is invalidated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleSign {
    /// Not computed since the last invalidation.
    #[default]
    Unknown,
    /// Orientation preserving (determinant ≥ 0).
    Positive,
    /// Mirrored (determinant < 0).
    Negative,
}

impl ScaleSign {
    /// Returns `0`, `1`, or `-1`.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Self::Unknown => 0,
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

/// Returns the translation column of `m`.
#[inline]
#[must_use]
pub fn translation(m: &DMat4) -> DVec3 {
    m.w_axis.truncate()
}

/// Returns the lengths of the three basis columns of `m`.
///
/// Always non-negative; mirroring is reported by [`scale_sign`].
#[inline]
#[must_use]
pub fn axis_scale(m: &DMat4) -> DVec3 {
    DVec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

/// Returns the rotation part of `m` with scale removed.
#[inline]
#[must_use]
pub fn rotation(m: &DMat4) -> DQuat {
    let (_, rotation, _) = m.to_scale_rotation_translation();
    rotation
}

/// Computes the [`ScaleSign`] of `m`. Never returns `Unknown`.
#[must_use]
pub fn scale_sign(m: &DMat4) -> ScaleSign {
    if DMat3::from_mat4(*m).determinant() >= 0.0 {
        ScaleSign::Positive
    } else {
        ScaleSign::Negative
    }
}

/// Rotation that points the local −Z axis from `eye` toward `target`.
///
/// `up` is a hint for the local +Y axis and must not be parallel to the view
/// direction.
#[must_use]
pub fn look_rotation(eye: DVec3, target: DVec3, up: DVec3) -> DQuat {
    let z = (eye - target).normalize();
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    DQuat::from_mat3(&DMat3::from_cols(x, y, z))
}
