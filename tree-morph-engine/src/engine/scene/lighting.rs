use bevy::prelude::*;
use constants::render_settings::{
    AMBIENT_BRIGHTNESS, FILL_LIGHT_INTENSITY, FILL_LIGHT_POSITION, FILL_LIGHT_RANGE,
    KEY_LIGHT_INTENSITY, KEY_LIGHT_POSITION, RIM_LIGHT_INTENSITY, RIM_LIGHT_POSITION,
    SPOT_LIGHT_ANGLE,
};

/// Dim pink ambient, a warm key spot, a cool rim spot and a low fill point.
pub fn spawn_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb_u8(0x22, 0x00, 0x11),
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });

    for (name, position, intensity, color) in [
        (
            "key_light",
            KEY_LIGHT_POSITION,
            KEY_LIGHT_INTENSITY,
            Color::srgb(1.0, 0.9, 0.95),
        ),
        (
            "rim_light",
            RIM_LIGHT_POSITION,
            RIM_LIGHT_INTENSITY,
            Color::srgb_u8(0xFF, 0xB6, 0xC1),
        ),
    ] {
        commands.spawn((
            SpotLight {
                color,
                intensity,
                outer_angle: SPOT_LIGHT_ANGLE,
                inner_angle: SPOT_LIGHT_ANGLE * 0.5,
                range: 60.0,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_translation(Vec3::from_array(position)).looking_at(Vec3::ZERO, Vec3::Y),
            Name::new(name),
        ));
    }

    commands.spawn((
        PointLight {
            color: Color::srgb_u8(0xFF, 0x14, 0x93),
            intensity: FILL_LIGHT_INTENSITY,
            range: FILL_LIGHT_RANGE,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(FILL_LIGHT_POSITION)),
        Name::new("fill_light"),
    ));
}
