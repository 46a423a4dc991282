use bevy::prelude::*;
use constants::class::{
    DollStyleInfo, GOLD_THRESHOLD, PRINCESS_THRESHOLD, STAR_GOLD, get_style_info,
};
use constants::morph_rates::{
    DOLL_IDLE_SPIN, STAR_SPIN, STAR_WOBBLE_AMPLITUDE, STAR_WOBBLE_FREQUENCY,
};
use constants::tree::{DOLL_SCALE, STAR_APEX_OFFSET, STAR_SCATTER_POSITION};

use crate::engine::config::{SceneRng, TreeConfig};
use crate::engine::layout::{LayoutConfig, LayoutKind, generate};
use crate::engine::mesh::star_mesh::create_octahedron;
use crate::engine::pose::{Pose, step};
use crate::engine::scene::TreeRoot;
use crate::engine::scene_mode::{ModeSnapshot, SceneMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DollStyle {
    Classic,
    Princess,
    Gold,
}

impl DollStyle {
    pub const ALL: [DollStyle; 3] = [DollStyle::Classic, DollStyle::Princess, DollStyle::Gold];

    /// Map a uniform draw to a style: 60 % classic, 30 % princess, 10 % gold.
    pub fn from_draw(u: f32) -> Self {
        if u > GOLD_THRESHOLD {
            DollStyle::Gold
        } else if u > PRINCESS_THRESHOLD {
            DollStyle::Princess
        } else {
            DollStyle::Classic
        }
    }

    pub fn info(self) -> &'static DollStyleInfo {
        get_style_info(self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentKind {
    Doll(DollStyle),
    Star,
}

/// Individually animated accent: position eases toward the mode's goal,
/// rotation follows kind-specific rules.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AccentMotion {
    pub kind: AccentKind,
    pub scatter: Pose,
    pub target: Pose,
    pub current: Pose,
    pub rate: f32,
}

impl AccentMotion {
    pub fn doll(style: DollStyle, scatter: Pose, target: Pose, rate: f32) -> Self {
        Self {
            kind: AccentKind::Doll(style),
            scatter,
            target,
            current: scatter,
            rate,
        }
    }

    /// Star parks off to the side while scattered and sits just above the apex when assembled.
    pub fn star(tree_height: f32, rate: f32) -> Self {
        let scatter = Pose::from_translation(Vec3::from_array(STAR_SCATTER_POSITION));
        Self {
            kind: AccentKind::Star,
            scatter,
            target: Pose::from_translation(Vec3::new(
                0.0,
                tree_height / 2.0 + STAR_APEX_OFFSET,
                0.0,
            )),
            current: scatter,
            rate,
        }
    }

    pub fn tick(&mut self, snapshot: ModeSnapshot) {
        let goal = snapshot.mode.select(&self.scatter, &self.target);
        self.current.translation = step(self.current.translation, goal.translation, self.rate);

        match (self.kind, snapshot.mode) {
            // Scattered dolls tumble instead of holding a pose.
            (AccentKind::Doll(_), SceneMode::Scattered) => {
                self.current.rotation.x += DOLL_IDLE_SPIN;
                self.current.rotation.y += DOLL_IDLE_SPIN;
            }
            (AccentKind::Doll(_), SceneMode::TreeShape) => {
                self.current.rotation = step(self.current.rotation, self.target.rotation, self.rate);
            }
            (AccentKind::Star, _) => {
                self.current.rotation.y += STAR_SPIN;
                self.current.rotation.z =
                    (snapshot.elapsed_secs * STAR_WOBBLE_FREQUENCY).sin() * STAR_WOBBLE_AMPLITUDE;
            }
        }
    }
}

/// Doll poses and styles, drawn in a fixed order from `rng`.
pub fn doll_motions(
    count: usize,
    layout: &LayoutConfig,
    rate: f32,
    rng: &mut fastrand::Rng,
) -> Vec<AccentMotion> {
    let scatter = generate(count, LayoutKind::Scattered { tumble: false }, layout, rng);
    let target = generate(count, LayoutKind::GoldenSpiral, layout, rng);
    scatter
        .iter()
        .zip(&target)
        .map(|(scatter, target)| {
            let style = DollStyle::from_draw(rng.f32());
            AccentMotion::doll(style, scatter.pose(), target.pose(), rate)
        })
        .collect()
}

pub fn tick_accents(
    mode: Res<SceneMode>,
    time: Res<Time>,
    mut accents: Query<(&mut AccentMotion, &mut Transform)>,
) {
    let snapshot = ModeSnapshot::capture(&mode, &time);
    for (mut motion, mut transform) in &mut accents {
        motion.tick(snapshot);
        transform.translation = motion.current.translation;
        transform.rotation = motion.current.quat();
    }
}

/// Shared meshes for every doll plus one material set per style.
struct DollKit {
    head: Handle<Mesh>,
    ear: Handle<Mesh>,
    bow_knot: Handle<Mesh>,
    bow_loop: Handle<Mesh>,
    eye: Handle<Mesh>,
    nose: Handle<Mesh>,
    whisker: Handle<Mesh>,
    dress: Handle<Mesh>,
    arm: Handle<Mesh>,
    foot: Handle<Mesh>,
    dark: Handle<StandardMaterial>,
    gold: Handle<StandardMaterial>,
    styles: Vec<(DollStyle, StyleMaterials)>,
}

#[derive(Clone)]
struct StyleMaterials {
    head: Handle<StandardMaterial>,
    bow: Handle<StandardMaterial>,
    dress: Handle<StandardMaterial>,
}

impl DollKit {
    fn new(meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) -> Self {
        let styles = DollStyle::ALL
            .iter()
            .map(|&style| {
                let info = style.info();
                let set = StyleMaterials {
                    head: materials.add(StandardMaterial {
                        base_color: info.head,
                        perceptual_roughness: 0.3,
                        metallic: 0.1,
                        ..default()
                    }),
                    bow: materials.add(StandardMaterial {
                        base_color: info.bow,
                        perceptual_roughness: 0.2,
                        metallic: 0.3,
                        ..default()
                    }),
                    dress: materials.add(StandardMaterial {
                        base_color: info.dress,
                        perceptual_roughness: 0.4,
                        ..default()
                    }),
                };
                (style, set)
            })
            .collect();

        Self {
            head: meshes.add(Sphere::new(1.0)),
            ear: meshes.add(Cone::new(0.3, 0.5)),
            bow_knot: meshes.add(Sphere::new(0.3)),
            bow_loop: meshes.add(Sphere::new(0.35)),
            eye: meshes.add(Sphere::new(0.1)),
            nose: meshes.add(Sphere::new(0.12)),
            whisker: meshes.add(Cuboid::new(0.3, 0.02, 0.02)),
            dress: meshes.add(ConicalFrustum {
                radius_top: 0.5,
                radius_bottom: 0.9,
                height: 1.4,
            }),
            arm: meshes.add(Capsule3d::new(0.2, 0.6)),
            foot: meshes.add(Capsule3d::new(0.22, 0.5)),
            dark: materials.add(StandardMaterial {
                base_color: Color::srgb_u8(0x11, 0x11, 0x11),
                perceptual_roughness: 0.1,
                ..default()
            }),
            gold: materials.add(StandardMaterial {
                base_color: STAR_GOLD,
                perceptual_roughness: 0.2,
                ..default()
            }),
            styles,
        }
    }

    fn materials(&self, style: DollStyle) -> Option<&StyleMaterials> {
        self.styles
            .iter()
            .find(|(s, _)| *s == style)
            .map(|(_, set)| set)
    }
}

fn part(
    mesh: &Handle<Mesh>,
    material: &Handle<StandardMaterial>,
    transform: Transform,
) -> (Mesh3d, MeshMaterial3d<StandardMaterial>, Transform) {
    (Mesh3d(mesh.clone()), MeshMaterial3d(material.clone()), transform)
}

fn spawn_doll(commands: &mut Commands, kit: &DollKit, root: Entity, motion: AccentMotion) {
    let AccentKind::Doll(style) = motion.kind else {
        return;
    };
    let Some(colors) = kit.materials(style).cloned() else {
        return;
    };

    let start = Transform::from_translation(motion.current.translation)
        .with_rotation(motion.current.quat())
        .with_scale(Vec3::splat(DOLL_SCALE));

    commands
        .spawn((
            start,
            Visibility::default(),
            motion,
            ChildOf(root),
            Name::new("doll"),
        ))
        .with_children(|doll| {
            doll.spawn((Transform::from_xyz(0.0, 0.5, 0.0), Visibility::default()))
                .with_children(|head| {
                    head.spawn(part(&kit.head, &colors.head, Transform::default()));
                    for side in [-1.0_f32, 1.0] {
                        head.spawn(part(
                            &kit.ear,
                            &colors.head,
                            Transform::from_xyz(0.8 * side, 0.7, 0.0)
                                .with_rotation(Quat::from_rotation_z(-0.5 * side)),
                        ));
                        head.spawn(part(
                            &kit.eye,
                            &kit.dark,
                            Transform::from_xyz(0.4 * side, -0.1, 0.88)
                                .with_scale(Vec3::new(1.0, 1.4, 0.3)),
                        ));
                        for (row, tilt) in [(-0.05_f32, 0.1_f32), (-0.15, 0.0), (-0.25, -0.1)] {
                            head.spawn(part(
                                &kit.whisker,
                                &kit.dark,
                                Transform::from_xyz(0.45 * side, row, 0.85)
                                    .with_rotation(Quat::from_rotation_z(tilt * side)),
                            ));
                        }
                    }
                    head.spawn(part(
                        &kit.nose,
                        &kit.gold,
                        Transform::from_xyz(0.0, -0.25, 0.92).with_scale(Vec3::new(1.0, 0.6, 0.4)),
                    ));
                    head.spawn((
                        Transform::from_xyz(-0.8, 0.4, 0.6)
                            .with_rotation(Quat::from_euler(EulerRot::XYZ, 0.0, -0.2, -0.2))
                            .with_scale(Vec3::splat(0.8)),
                        Visibility::default(),
                    ))
                    .with_children(|bow| {
                        bow.spawn(part(&kit.bow_knot, &colors.bow, Transform::default()));
                        for side in [-1.0_f32, 1.0] {
                            bow.spawn(part(
                                &kit.bow_loop,
                                &colors.bow,
                                Transform::from_xyz(0.35 * side, 0.0, 0.0)
                                    .with_scale(Vec3::new(1.0, 1.2, 0.6)),
                            ));
                        }
                    });
                });

            doll.spawn((Transform::from_xyz(0.0, -0.8, 0.0), Visibility::default()))
                .with_children(|body| {
                    body.spawn(part(&kit.dress, &colors.dress, Transform::from_xyz(0.0, 0.1, 0.0)));
                    for side in [-1.0_f32, 1.0] {
                        body.spawn(part(
                            &kit.arm,
                            &colors.head,
                            Transform::from_xyz(0.7 * side, 0.3, 0.0)
                                .with_rotation(Quat::from_rotation_z(-0.5 * side)),
                        ));
                        body.spawn(part(
                            &kit.foot,
                            &colors.head,
                            Transform::from_xyz(0.4 * side, -0.8, 0.2)
                                .with_rotation(Quat::from_rotation_x(0.2)),
                        ));
                    }
                });
        });
}

pub fn spawn_accents(
    mut commands: Commands,
    config: Res<TreeConfig>,
    mut rng: ResMut<SceneRng>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    roots: Query<Entity, With<TreeRoot>>,
) {
    let Ok(root) = roots.single() else {
        warn!("No tree root; accents not spawned");
        return;
    };

    let kit = DollKit::new(&mut meshes, &mut materials);
    let dolls = doll_motions(
        config.accent_doll_count,
        &config.layout(),
        config.rates.dolls,
        &mut rng.0,
    );
    let doll_count = dolls.len();
    for motion in dolls {
        spawn_doll(&mut commands, &kit, root, motion);
    }

    let star = AccentMotion::star(config.tree_height, config.rates.star);
    commands
        .spawn((
            Transform::from_translation(star.current.translation),
            Visibility::default(),
            star,
            ChildOf(root),
            Name::new("star_topper"),
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(create_octahedron(0.8))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: STAR_GOLD,
                    emissive: LinearRgba::from(STAR_GOLD) * 2.0,
                    metallic: 1.0,
                    perceptual_roughness: 0.1,
                    ..default()
                })),
            ));
            parent.spawn((
                Mesh3d(meshes.add(Sphere::new(1.0).mesh().uv(16, 16))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: STAR_GOLD.with_alpha(0.2),
                    alpha_mode: AlphaMode::Add,
                    unlit: true,
                    ..default()
                })),
                Transform::from_scale(Vec3::splat(1.5)),
                Pickable::IGNORE,
            ));
        });

    info!("✓ Accents spawned: {} dolls and the star", doll_count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_thresholds() {
        assert_eq!(DollStyle::from_draw(0.0), DollStyle::Classic);
        assert_eq!(DollStyle::from_draw(0.6), DollStyle::Classic);
        assert_eq!(DollStyle::from_draw(0.61), DollStyle::Princess);
        assert_eq!(DollStyle::from_draw(0.95), DollStyle::Gold);
    }

    #[test]
    fn style_table_matches_enum() {
        assert_eq!(DollStyle::Princess.info().name, "princess");
        assert_eq!(DollStyle::Gold.info().name, "gold");
    }

    #[test]
    fn star_targets_just_above_apex() {
        let star = AccentMotion::star(12.0, 0.05);
        assert_eq!(star.target.translation, Vec3::new(0.0, 6.5, 0.0));
        assert_eq!(star.current.translation, Vec3::new(10.0, 20.0, -10.0));
    }
}
