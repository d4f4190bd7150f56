//! Rigid-body transform algebra.
//!
//! A [`Transform3D`] is a translation plus a unit-quaternion rotation.  The
//! frame graph stores one per edge as the pose of the child frame expressed
//! in its parent (`T_parent_child`) and composes them along tree paths.
//!
//! # Example
//!
//! ```rust
//! use frameflow_types::transform::{Quaternion, Transform3D, Vec3};
//!
//! let t_world_base = Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity());
//! let t_base_camera = Transform3D::new(Vec3::new(0.5, 0.0, 0.0), Quaternion::identity());
//!
//! let t_world_camera = t_world_base.compose(t_base_camera);
//! assert!((t_world_camera.translation.x - 1.5).abs() < 1e-5);
//!
//! let back = t_world_camera.compose(t_world_camera.inverse());
//! assert!(back.approx_eq(&Transform3D::identity(), 1e-5));
//! ```

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// Translation component of an edge, or a point in some frame, in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Origin of a frame.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn scale(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// Rotation component of an edge, stored scalar-first as `(w, x, y, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// Components are taken as given; submitters are expected to pass unit
    /// quaternions or run them through [`normalized`][Self::normalized].
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle_rad` around `axis`.  A zero-length axis yields the
    /// identity rotation.
    pub fn from_axis_angle(axis: Vec3, angle_rad: f32) -> Self {
        let len = axis.length();
        if len <= f32::EPSILON {
            return Self::identity();
        }
        let (s, c) = (angle_rad * 0.5).sin_cos();
        let k = s / len;
        Self::new(c, axis.x * k, axis.y * k, axis.z * k)
    }

    /// Scale to unit length.  A zero quaternion yields the identity.
    pub fn normalized(self) -> Self {
        let norm = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if norm <= f32::EPSILON {
            return Self::identity();
        }
        Self::new(self.w / norm, self.x / norm, self.y / norm, self.z / norm)
    }

    fn vector(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    fn from_parts(w: f32, v: Vec3) -> Self {
        Self::new(w, v.x, v.y, v.z)
    }

    /// `self * rhs`: apply `rhs` first, then `self`.
    pub fn mul(self, rhs: Self) -> Self {
        let (a, b) = (self.vector(), rhs.vector());
        let w = self.w * rhs.w - a.dot(b);
        let v = b.scale(self.w).add(a.scale(rhs.w)).add(a.cross(b));
        Self::from_parts(w, v)
    }

    /// Inverse rotation of a unit quaternion.
    pub fn conjugate(self) -> Self {
        Self::from_parts(self.w, self.vector().neg())
    }

    /// Rotate `v`, using `v + 2w(u × v) + 2u × (u × v)` with `u` the vector part.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let u = self.vector();
        let t = u.cross(v).scale(2.0);
        v.add(t.scale(self.w)).add(u.cross(t))
    }

    /// True when both quaternions describe the same rotation within `eps`.
    ///
    /// `q` and `-q` are the same rotation, so both signs are accepted.
    pub fn approx_eq(&self, other: &Self, eps: f32) -> bool {
        let same = (self.w - other.w).abs() <= eps
            && (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps;
        let flipped = (self.w + other.w).abs() <= eps
            && (self.x + other.x).abs() <= eps
            && (self.y + other.y).abs() <= eps
            && (self.z + other.z).abs() <= eps;
        same || flipped
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transform3D
// ────────────────────────────────────────────────────────────────────────────

/// Pose of a child frame in its parent, `T_parent_child`.
///
/// A point given in the child frame maps into the parent frame by rotating
/// it with `rotation` and then adding `translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// A pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quaternion::identity())
    }

    /// Pose of a frame relative to itself.
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// Chain one edge onto another: `T_a_b.compose(T_b_c)` is `T_a_c`.
    ///
    /// Not commutative once either side rotates.
    pub fn compose(self, other: Self) -> Self {
        let translated = self.translation.add(self.rotation.rotate(other.translation));
        let rotated = self.rotation.mul(other.rotation);
        Self::new(translated, rotated)
    }

    /// Invert the transform: T_A_B becomes T_B_A.
    pub fn inverse(self) -> Self {
        let rotation = self.rotation.conjugate();
        let translation = rotation.rotate(self.translation).neg();
        Self::new(translation, rotation)
    }

    /// Map a point expressed in frame B into frame A.
    pub fn transform_point(self, p: Vec3) -> Vec3 {
        self.translation.add(self.rotation.rotate(p))
    }

    /// Component-wise comparison within `eps` (rotation sign-insensitive).
    pub fn approx_eq(&self, other: &Self, eps: f32) -> bool {
        (self.translation.x - other.translation.x).abs() <= eps
            && (self.translation.y - other.translation.y).abs() <= eps
            && (self.translation.z - other.translation.z).abs() <= eps
            && self.rotation.approx_eq(&other.rotation, eps)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
