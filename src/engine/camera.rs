use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 20_000.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.05;
const MIN_DISTANCE_FACTOR: f32 = 0.1;
const MAX_DISTANCE_FACTOR: f32 = 4.0;

/// Screen-space rectangle the scene is drawn into, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub min: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.min + self.size;
        point.x >= self.min.x && point.y >= self.min.y && point.x <= max.x && point.y <= max.y
    }

    pub fn aspect(&self) -> f32 {
        if self.size.y <= f32::EPSILON {
            1.0
        } else {
            self.size.x / self.size.y
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::new(1440.0, 920.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

/// A world point projected onto the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub screen: Vec2,
    /// Distance along the view axis.
    pub depth: f32,
    /// Screen pixels covered by one world unit at `depth`.
    pub pixels_per_unit: f32,
}

/// Perspective camera orbiting a target point.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    home_distance: f32,
}

impl Camera {
    pub fn new(distance: f32, fov_degrees: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: fov_degrees.to_radians(),
            aspect: Viewport::default().aspect(),
            home_distance: distance,
        }
    }

    pub fn reset(&mut self) {
        self.position = Vec3::new(0.0, 0.0, self.home_distance);
        self.target = Vec3::ZERO;
        self.up = Vec3::Y;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, NEAR_PLANE, FAR_PLANE)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    #[cfg(test)]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Pixel coordinates to normalized device coordinates (`y` up).
    pub fn screen_to_ndc(viewport: Viewport, screen: Vec2) -> Vec2 {
        let local = (screen - viewport.min) / viewport.size.max(Vec2::ONE);
        Vec2::new(local.x * 2.0 - 1.0, -(local.y * 2.0) + 1.0)
    }

    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(-1.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - near).normalize_or(self.forward());
        Ray {
            origin: self.position,
            direction,
        }
    }

    pub fn ray_from_screen(&self, viewport: Viewport, screen: Vec2) -> Ray {
        self.ray_from_ndc(Self::screen_to_ndc(viewport, screen))
    }

    /// Projects a world point; `None` when it lies behind the near plane.
    pub fn project(&self, viewport: Viewport, world: Vec3) -> Option<Projection> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= NEAR_PLANE {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        let screen = viewport.min
            + Vec2::new(
                (ndc.x + 1.0) * 0.5 * viewport.size.x,
                (1.0 - ndc.y) * 0.5 * viewport.size.y,
            );
        let pixels_per_unit = (viewport.size.y * 0.5) / (clip.w * (self.fov_y * 0.5).tan());

        Some(Projection {
            screen,
            depth: clip.w,
            pixels_per_unit,
        })
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Rotates the camera around its target by yaw/pitch deltas in radians.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let yaw = offset.x.atan2(offset.z) + delta_yaw;
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + delta_pitch)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.position = self.target
            + Vec3::new(
                radius * pitch.cos() * yaw.sin(),
                radius * pitch.sin(),
                radius * pitch.cos() * yaw.cos(),
            );
    }

    /// Moves toward (`factor < 1`) or away from the target.
    pub fn zoom(&mut self, factor: f32) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON || !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let next = (distance * factor).clamp(
            self.home_distance * MIN_DISTANCE_FACTOR,
            self.home_distance * MAX_DISTANCE_FACTOR,
        );
        self.position = self.target + offset * (next / distance);
    }
}
