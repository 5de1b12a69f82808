use std::f32::consts::{PI, TAU};

use glam::Vec3;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::config::CameraConfig;

use super::{CameraControls, PerspectiveCamera};

/// Keeps the polar angle away from the poles so `look_at` stays defined.
const POLAR_EPSILON: f32 = 1e-4;

/// Movement below this (squared distance) does not count as a change.
const MOVE_EPSILON_SQ: f32 = 1e-8;

/// Orbits the camera around a target with mouse drag, zooms with the wheel.
///
/// Input only accumulates deltas; [`CameraControls::update`] applies them. With
/// damping enabled each update applies `damping_factor` of the pending delta and
/// keeps the rest, which produces the inertia after a drag is released.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    /// Pending azimuth change (radians).
    delta_theta: f32,
    /// Pending polar change (radians).
    delta_phi: f32,
    /// Pending radius multiplier.
    scale: f32,

    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut controls = Self::new(config.target);
        controls.enable_damping = config.enable_damping;
        controls.damping_factor = config.damping_factor;
        controls
    }

    /// Rotates around the target horizontally by `angle` radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    /// Rotates around the target vertically by `angle` radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Moves towards the target; `factor < 1` zooms in.
    pub fn dolly(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.scale *= factor;
        }
    }

    /// Feeds a window event. `surface_height` (physical pixels) converts drag
    /// distances to angles: dragging the full height turns by one revolution.
    ///
    /// Returns `true` if the event was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent, surface_height: f32) -> bool {
        match event {
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }

            WindowEvent::CursorMoved { position, .. } => {
                let last = self.last_cursor.replace(*position);
                if !self.dragging {
                    return false;
                }
                let Some(last) = last else { return false };
                let height = surface_height.max(1.0);
                let dx = (position.x - last.x) as f32;
                let dy = (position.y - last.y) as f32;
                self.rotate_left(TAU * dx / height * self.rotate_speed);
                self.rotate_up(TAU * dy / height * self.rotate_speed);
                true
            }

            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                false
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                self.dolly(self.zoom_scale().powf(steps));
                true
            }

            _ => false,
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }
}

impl CameraControls for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let radius = offset.length();

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };

        let step = if self.enable_damping { self.damping_factor } else { 1.0 };
        theta += self.delta_theta * step;
        phi = (phi + self.delta_phi * step).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let new_offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );

        let old_position = camera.position;
        camera.position = self.target + new_offset;
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        old_position.distance_squared(camera.position) > MOVE_EPSILON_SQ
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        camera.position = position;
        camera
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(10.0, 5.0, 5.0));

        assert!(!controls.update(&mut camera));
        assert!(camera.position.distance(Vec3::new(10.0, 5.0, 5.0)) < 1e-4);
    }

    #[test]
    fn rotation_preserves_distance_to_target() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        controls.rotate_left(0.5);
        assert!(controls.update(&mut camera));
        assert!((camera.position.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn damping_spreads_rotation_over_several_updates() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;
        controls.damping_factor = 0.5;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        controls.rotate_left(1.0);
        assert!(controls.update(&mut camera));
        let first = camera.position;
        // Inertia: the remaining half of the delta still moves the camera.
        assert!(controls.update(&mut camera));
        assert_ne!(camera.position, first);
    }

    #[test]
    fn dolly_scales_radius_once() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        controls.dolly(0.5);
        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0).abs() < 1e-4);

        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_is_clamped_at_the_pole() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        controls.rotate_up(10.0);
        controls.update(&mut camera);
        assert!(camera.position.y <= 10.0 + 1e-4);
        assert!(camera.position.is_finite());
        assert!((camera.position.length() - 10.0).abs() < 1e-3);
    }
}
