//! Minimal 3D math for the scene: vectors, Euler rotation and a
//! perspective look-at camera projected onto a 2D viewport.

use std::ops::{Add, Mul, Sub};

use vello::kurbo::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    /// Unit vector, or zero for a zero-length input
    pub fn normalize(self) -> Vec3 {
        let len = self.length();
        if len > f32::EPSILON { self * (1.0 / len) } else { Vec3::ZERO }
    }

    /// Apply an XYZ-order Euler rotation (x applied last)
    pub fn rotate_euler(self, rotation: Vec3) -> Vec3 {
        let (sx, cx) = rotation.x.sin_cos();
        let (sy, cy) = rotation.y.sin_cos();
        let (sz, cz) = rotation.z.sin_cos();

        // Rz
        let v = Vec3::new(self.x * cz - self.y * sz, self.x * sz + self.y * cz, self.z);
        // Ry
        let v = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
        // Rx
        Vec3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx)
    }

    /// Point on a sphere: `phi` from +Y, `theta` around Y starting at +Z
    pub fn from_spherical(radius: f32, phi: f32, theta: f32) -> Vec3 {
        let sin_phi = phi.sin();
        Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        )
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Perspective camera looking at a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 30.0),
            target: Vec3::ZERO,
            fov: 75.0,
        }
    }
}

/// A point projected to screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub point: Point,
    /// Pixels per world unit at this depth
    pub scale: f64,
    /// Distance along the view direction
    pub depth: f32,
}

const NEAR_PLANE: f32 = 0.1;

/// Screen rectangle plus the camera looking into it
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub bounds: Rect,
    pub camera: Camera,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    focal: f32,
}

impl Viewport {
    pub fn new(bounds: Rect, camera: Camera) -> Self {
        let forward = (camera.target - camera.position).normalize();
        let mut right = forward.cross(Vec3::UP).normalize();
        if right == Vec3::ZERO {
            right = Vec3::new(1.0, 0.0, 0.0);
        }
        let up = right.cross(forward);
        let focal = 1.0 / (camera.fov.to_radians() * 0.5).tan();
        Self {
            bounds,
            camera,
            right,
            up,
            forward,
            focal,
        }
    }

    /// Project a world-space point; `None` when behind the near plane
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let rel = world - self.camera.position;
        let depth = rel.dot(self.forward);
        if depth <= NEAR_PLANE {
            return None;
        }

        let width = self.bounds.width();
        let height = self.bounds.height();
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let aspect = (width / height) as f32;

        let ndc_x = rel.dot(self.right) * self.focal / (depth * aspect);
        let ndc_y = rel.dot(self.up) * self.focal / depth;

        let x = self.bounds.x0 + (ndc_x as f64 + 1.0) * 0.5 * width;
        let y = self.bounds.y0 + (1.0 - ndc_y as f64) * 0.5 * height;
        let scale = (self.focal / depth) as f64 * height * 0.5;

        Some(Projected {
            point: Point::new(x, y),
            scale,
            depth,
        })
    }
}
