//! Ground-plane transforms: cardinal rotations and 2D vectors.
//!
//! Everything lives on the (x, z) plane. Rotations are yaw-only quarter
//! turns, clockwise when viewed from above, so forward `(0, 1)` turns into
//! right `(1, 0)` after one quarter turn.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A point or direction on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, z: 0.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, z: 0.0 };
    pub const FORWARD: Vec2 = Vec2 { x: 0.0, z: 1.0 };

    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.z * other.z
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.z * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.z)
    }
}

impl From<Vec2> for [f32; 2] {
    fn from(v: Vec2) -> Self {
        [v.x, v.z]
    }
}

/// One of the four cardinal yaw rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Rotations in the order the placement search tries them.
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    pub fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Compose two rotations (apply `self`, then `other`).
    pub fn then(self, other: Rotation) -> Rotation {
        Rotation::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// Rotate a ground-plane vector by this rotation.
    pub fn apply(self, v: Vec2) -> Vec2 {
        match self {
            Rotation::R0 => v,
            Rotation::R90 => Vec2::new(v.z, -v.x),
            Rotation::R180 => Vec2::new(-v.x, -v.z),
            Rotation::R270 => Vec2::new(-v.z, v.x),
        }
    }

    /// The instance's local +x axis after rotation.
    pub fn right(self) -> Vec2 {
        self.apply(Vec2::RIGHT)
    }

    /// The instance's local +z axis after rotation.
    pub fn forward(self) -> Vec2 {
        self.apply(Vec2::FORWARD)
    }
}

/// World transform of a placed module: pivot position plus yaw.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: Rotation,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec2::ZERO,
        rotation: Rotation::R0,
    };

    pub fn new(position: Vec2, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    /// Map a local offset (already in world units) to world space.
    pub fn point(&self, local: Vec2) -> Vec2 {
        self.position + self.rotation.apply(local)
    }

    /// Map a local direction to world space.
    pub fn direction(&self, local: Vec2) -> Vec2 {
        self.rotation.apply(local)
    }
}
