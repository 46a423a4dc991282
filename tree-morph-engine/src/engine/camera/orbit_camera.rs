use std::f32::consts::TAU;

use bevy::core_pipeline::bloom::Bloom;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::render_settings::{
    BLOOM_INTENSITY, CAMERA_AUTO_ROTATE_SPEED, CAMERA_DAMPING, CAMERA_DRAG_SENSITIVITY,
    CAMERA_FOV_DEGREES, CAMERA_MAX_DISTANCE, CAMERA_MIN_DISTANCE, CAMERA_POSITION,
};

use crate::engine::scene_mode::SceneMode;

/// Pitch is kept just shy of the poles so `looking_at` never degenerates.
const MAX_PITCH: f32 = 1.5;

/// Orbit around the origin with damped drag, wheel zoom and optional auto-rotation.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub yaw_velocity: f32,
    pub pitch_velocity: f32,
    pub damping: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let start = Vec3::from_array(CAMERA_POSITION);
        let horizontal = Vec2::new(start.x, start.z).length();
        Self {
            yaw: start.x.atan2(start.z),
            pitch: start.y.atan2(horizontal),
            distance: start.length().clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE),
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            damping: CAMERA_DAMPING,
        }
    }
}

impl OrbitCamera {
    /// Feed a drag delta in pixels.
    pub fn drag(&mut self, delta: Vec2) {
        self.yaw_velocity -= delta.x * CAMERA_DRAG_SENSITIVITY;
        self.pitch_velocity += delta.y * CAMERA_DRAG_SENSITIVITY;
    }

    /// Positive `amount` moves closer; distance stays inside the zoom limits.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance * (1.0 - amount * 0.1))
            .clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
    }

    /// Apply one frame of damped motion plus auto-rotation.
    pub fn advance(&mut self, auto_rotate: bool, delta_secs: f32) {
        if auto_rotate {
            // A speed of 1.0 is one full orbit per minute.
            self.yaw += TAU / 60.0 * CAMERA_AUTO_ROTATE_SPEED * delta_secs;
        }
        self.yaw += self.yaw_velocity * self.damping;
        self.pitch = (self.pitch + self.pitch_velocity * self.damping).clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw_velocity *= 1.0 - self.damping;
        self.pitch_velocity *= 1.0 - self.damping;
    }

    pub fn transform(&self) -> Transform {
        let offset = Quat::from_euler(EulerRot::YXZ, self.yaw, -self.pitch, 0.0) * Vec3::Z;
        Transform::from_translation(offset * self.distance).looking_at(Vec3::ZERO, Vec3::Y)
    }
}

/// Marker for the scene's only 3D camera.
#[derive(Component)]
pub struct SceneCamera;

pub fn spawn_camera(mut commands: Commands) {
    let orbit = OrbitCamera::default();
    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true,
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            ..default()
        }),
        Tonemapping::TonyMcMapface,
        Bloom {
            intensity: BLOOM_INTENSITY,
            ..Bloom::NATURAL
        },
        orbit.transform(),
        SceneCamera,
    ));
    commands.insert_resource(orbit);
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<SceneCamera>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mode: Res<SceneMode>,
    time: Res<Time>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
        orbit.drag(mouse_delta);
    }

    let scroll: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();
    if scroll.abs() > f32::EPSILON {
        orbit.zoom(scroll);
    }

    orbit.advance(mode.is_assembled(), time.delta_secs());

    if let Ok(mut camera_transform) = camera_query.single_mut() {
        *camera_transform = orbit.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_start_position() {
        let transform = OrbitCamera::default().transform();
        assert!((transform.translation - Vec3::from_array(CAMERA_POSITION)).length() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = OrbitCamera::default();
        for _ in 0..100 {
            orbit.zoom(5.0);
        }
        assert_eq!(orbit.distance, CAMERA_MIN_DISTANCE);
        for _ in 0..100 {
            orbit.zoom(-5.0);
        }
        assert_eq!(orbit.distance, CAMERA_MAX_DISTANCE);
    }

    #[test]
    fn drag_velocity_decays() {
        let mut orbit = OrbitCamera::default();
        orbit.drag(Vec2::new(100.0, 0.0));
        let first = orbit.yaw_velocity;
        orbit.advance(false, 0.016);
        assert!(orbit.yaw_velocity.abs() < first.abs());
    }

    #[test]
    fn auto_rotation_only_when_requested() {
        let mut orbit = OrbitCamera::default();
        orbit.advance(false, 1.0);
        assert_eq!(orbit.yaw, 0.0);
        orbit.advance(true, 1.0);
        assert!(orbit.yaw > 0.0);
    }
}
