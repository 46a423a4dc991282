use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::class::{FRAME_BACKING, FRAME_GOLD, FRAME_PLACEHOLDER, FRAME_PLACEHOLDER_EMISSIVE};
use constants::tree::{FRAME_FOCUS_POSITION, FRAME_FOCUS_SCALE};

use crate::engine::config::{SceneRng, TreeConfig};
use crate::engine::layout::{LayoutConfig, LayoutKind, generate};
use crate::engine::pose::{Pose, step};
use crate::engine::scene::TreeRoot;
use crate::engine::scene_mode::{ModeSnapshot, MorphSet, SceneMode};
use crate::rpc::web_rpc::WebRpcInterface;

const FRAME_WIDTH: f32 = 1.2;
const FRAME_HEIGHT: f32 = 1.5;
const FRAME_BORDER: f32 = 0.1;

/// Which frame, if any, is flown to the focal pose.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFocus {
    focused: Option<usize>,
}

impl FrameFocus {
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn is_focused(&self, id: usize) -> bool {
        self.focused == Some(id)
    }

    /// Focus `id`, replacing any current focus. Returns whether anything changed.
    pub fn select(&mut self, id: usize) -> bool {
        let changed = self.focused != Some(id);
        self.focused = Some(id);
        changed
    }

    pub fn deselect(&mut self) -> bool {
        self.focused.take().is_some()
    }

    /// Click behaviour: the focused frame closes, any other frame takes focus.
    pub fn toggle(&mut self, id: usize) -> bool {
        if self.is_focused(id) {
            self.deselect()
        } else {
            self.select(id)
        }
    }

    pub fn apply(&mut self, request: FrameFocusRequest) -> bool {
        match request {
            FrameFocusRequest::Select(id) => self.select(id),
            FrameFocusRequest::Deselect => self.deselect(),
            FrameFocusRequest::Toggle(id) => self.toggle(id),
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFocusRequest {
    Select(usize),
    Deselect,
    Toggle(usize),
}

impl FrameFocusRequest {
    fn frame_id(self) -> Option<usize> {
        match self {
            FrameFocusRequest::Select(id) | FrameFocusRequest::Toggle(id) => Some(id),
            FrameFocusRequest::Deselect => None,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct PhotoFrame {
    pub id: usize,
    pub scatter: Pose,
    pub target: Pose,
    pub current: Pose,
    pub scale: f32,
    pub rate: f32,
}

impl PhotoFrame {
    pub fn new(id: usize, scatter: Pose, target: Pose, rate: f32) -> Self {
        Self {
            id,
            scatter,
            target,
            current: scatter,
            scale: 1.0,
            rate,
        }
    }

    /// Focused frames ignore the mode and fly to the focal pose at the focal scale.
    pub fn goal(&self, mode: SceneMode, focused: bool) -> (Pose, f32) {
        if focused {
            (
                Pose::from_translation(Vec3::from_array(FRAME_FOCUS_POSITION)),
                FRAME_FOCUS_SCALE,
            )
        } else {
            (mode.select(self.scatter, self.target), 1.0)
        }
    }

    pub fn tick(&mut self, snapshot: ModeSnapshot, focused: bool) {
        let (pose, scale) = self.goal(snapshot.mode, focused);
        self.current = step(self.current, pose, self.rate);
        self.scale = step(self.scale, scale, self.rate);
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.current.translation)
            .with_rotation(self.current.quat())
            .with_scale(Vec3::splat(self.scale))
    }
}

pub fn frame_layout(
    count: usize,
    layout: &LayoutConfig,
    rate: f32,
    rng: &mut fastrand::Rng,
) -> Vec<PhotoFrame> {
    let scatter = generate(count, LayoutKind::FrameRing, layout, rng);
    let target = generate(count, LayoutKind::FrameSpiral, layout, rng);
    scatter
        .iter()
        .zip(&target)
        .enumerate()
        .map(|(id, (scatter, target))| PhotoFrame::new(id, scatter.pose(), target.pose(), rate))
        .collect()
}

/// Photo texture still loading. `marker` is the placeholder glyph removed on success.
#[derive(Component)]
pub struct PendingPhoto {
    image: Handle<Image>,
    material: Handle<StandardMaterial>,
    marker: Entity,
}

pub fn spawn_frames(
    mut commands: Commands,
    config: Res<TreeConfig>,
    mut rng: ResMut<SceneRng>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    roots: Query<Entity, With<TreeRoot>>,
) {
    let Ok(root) = roots.single() else {
        warn!("No tree root; photo frames not spawned");
        return;
    };

    let border = meshes.add(Cuboid::new(
        FRAME_WIDTH + FRAME_BORDER,
        FRAME_HEIGHT + FRAME_BORDER,
        0.1,
    ));
    let backing = meshes.add(Rectangle::new(FRAME_WIDTH, FRAME_HEIGHT));
    let photo = meshes.add(Rectangle::new(FRAME_WIDTH - 0.1, FRAME_HEIGHT - 0.1));
    let bar_h = meshes.add(Cuboid::new(0.3, 0.05, 0.01));
    let bar_v = meshes.add(Cuboid::new(0.05, 0.3, 0.01));
    let gold = materials.add(StandardMaterial {
        base_color: FRAME_GOLD,
        metallic: 1.0,
        perceptual_roughness: 0.2,
        ..default()
    });
    let dark = materials.add(StandardMaterial {
        base_color: FRAME_BACKING,
        perceptual_roughness: 0.8,
        ..default()
    });

    let frames = frame_layout(
        config.photo_frame_count,
        &config.layout(),
        config.rates.frames,
        &mut rng.0,
    );
    let mut requested = 0;

    for frame in frames {
        let id = frame.id;
        let photo_material = materials.add(StandardMaterial {
            base_color: FRAME_PLACEHOLDER,
            emissive: LinearRgba::from(FRAME_PLACEHOLDER_EMISSIVE),
            perceptual_roughness: 0.5,
            ..default()
        });

        let mut marker = Entity::PLACEHOLDER;
        let frame_entity = commands
            .spawn((
                frame.transform(),
                Visibility::default(),
                frame,
                ChildOf(root),
                Name::new(format!("photo_frame_{id}")),
            ))
            .with_children(|parent| {
                parent.spawn((Mesh3d(border.clone()), MeshMaterial3d(gold.clone())));
                parent.spawn((
                    Mesh3d(backing.clone()),
                    MeshMaterial3d(dark.clone()),
                    Transform::from_xyz(0.0, 0.0, -0.06),
                ));
                parent.spawn((
                    Mesh3d(photo.clone()),
                    MeshMaterial3d(photo_material.clone()),
                    Transform::from_xyz(0.0, 0.0, 0.06),
                ));
                marker = parent
                    .spawn((Transform::from_xyz(0.0, 0.0, 0.07), Visibility::default()))
                    .with_children(|plus| {
                        plus.spawn((Mesh3d(bar_h.clone()), MeshMaterial3d(gold.clone())));
                        plus.spawn((Mesh3d(bar_v.clone()), MeshMaterial3d(gold.clone())));
                    })
                    .id();
            })
            .observe(
                move |_click: Trigger<Pointer<Click>>,
                      mut requests: EventWriter<FrameFocusRequest>| {
                    requests.write(FrameFocusRequest::Toggle(id));
                },
            )
            .id();

        if let Some(path) = config.photo_paths.get(&id) {
            commands.entity(frame_entity).insert(PendingPhoto {
                image: asset_server.load(path.clone()),
                material: photo_material,
                marker,
            });
            requested += 1;
        }
    }

    info!(
        "✓ Photo frames spawned: {} frames, {} photos requested",
        config.photo_frame_count, requested
    );
}

/// Swap placeholders for photos as they finish loading.
pub fn resolve_photos(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    pending: Query<(Entity, &PhotoFrame, &PendingPhoto)>,
) {
    for (entity, frame, photo) in &pending {
        match asset_server.get_load_state(&photo.image) {
            Some(LoadState::Loaded) => {
                if let Some(material) = materials.get_mut(&photo.material) {
                    material.base_color = Color::WHITE;
                    material.base_color_texture = Some(photo.image.clone());
                    material.emissive = LinearRgba::BLACK;
                }
                commands.entity(photo.marker).despawn();
                commands.entity(entity).remove::<PendingPhoto>();
            }
            Some(LoadState::Failed(err)) => {
                warn!("Photo for frame {} failed to load, keeping placeholder: {err}", frame.id);
                commands.entity(entity).remove::<PendingPhoto>();
            }
            _ => {}
        }
    }
}

/// Apply queued focus requests, dropping ids that name no frame.
pub fn apply_frame_requests(
    mut requests: EventReader<FrameFocusRequest>,
    mut focus: ResMut<FrameFocus>,
    config: Res<TreeConfig>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for &request in requests.read() {
        if request
            .frame_id()
            .is_some_and(|id| id >= config.photo_frame_count)
        {
            warn!("Ignoring focus request for unknown frame: {request:?}");
            continue;
        }
        if focus.apply(request) {
            debug!("Frame focus -> {:?}", focus.focused());
            rpc_interface.send_notification(
                "frame_focus_changed",
                serde_json::json!({
                    "frame_id": focus.focused()
                }),
            );
        }
    }
}

pub fn tick_frames(
    mode: Res<SceneMode>,
    time: Res<Time>,
    focus: Res<FrameFocus>,
    mut frames: Query<(&mut PhotoFrame, &mut Transform)>,
) {
    let snapshot = ModeSnapshot::capture(&mode, &time);
    for (mut frame, mut transform) in &mut frames {
        let focused = focus.is_focused(frame.id);
        frame.tick(snapshot, focused);
        *transform = frame.transform();
    }
}

pub struct PhotoFramePlugin;

impl Plugin for PhotoFramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameFocus>()
            .add_event::<FrameFocusRequest>()
            .add_systems(
                Update,
                (
                    apply_frame_requests.in_set(MorphSet::Input),
                    tick_frames.in_set(MorphSet::Tick),
                    resolve_photos,
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_toggles_and_switches_focus() {
        let mut focus = FrameFocus::default();
        assert!(focus.toggle(2));
        assert_eq!(focus.focused(), Some(2));
        assert!(focus.toggle(4));
        assert_eq!(focus.focused(), Some(4));
        assert!(focus.toggle(4));
        assert_eq!(focus.focused(), None);
    }

    #[test]
    fn repeated_select_reports_no_change() {
        let mut focus = FrameFocus::default();
        assert!(focus.select(1));
        assert!(!focus.select(1));
        assert!(focus.deselect());
        assert!(!focus.deselect());
    }

    #[test]
    fn focused_frame_flies_to_focal_pose() {
        let scatter = Pose::from_translation(Vec3::new(5.0, -3.0, 0.0));
        let target = Pose::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 0.0));
        let mut frame = PhotoFrame::new(0, scatter, target, 0.04);
        let snapshot = ModeSnapshot::new(SceneMode::TreeShape, 0.0);
        for _ in 0..600 {
            frame.tick(snapshot, true);
        }
        assert!(frame.current.translation.distance(Vec3::new(0.0, 2.0, 18.0)) < 1e-3);
        assert!(frame.current.rotation.length() < 1e-3);
        assert!((frame.scale - FRAME_FOCUS_SCALE).abs() < 1e-3);
    }

    #[test]
    fn unfocused_frame_follows_mode() {
        let layout = LayoutConfig::default();
        let mut rng = fastrand::Rng::with_seed(21);
        let frames = frame_layout(6, &layout, 0.04, &mut rng);
        assert_eq!(frames.len(), 6);
        for frame in &frames {
            let (pose, scale) = frame.goal(SceneMode::TreeShape, false);
            assert_eq!(pose, frame.target);
            assert_eq!(scale, 1.0);
            assert_eq!(frame.current, frame.scatter);
        }
    }
}
