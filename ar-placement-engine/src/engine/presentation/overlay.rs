use bevy::prelude::*;

use super::PresentationSignal;

#[derive(Component)]
pub struct GuidanceText;

pub fn spawn_guidance_overlay(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(16.0),
                    left: Val::Px(16.0),
                    ..default()
                },
                GuidanceText,
            ));
        });
}

/// Show the guidance of the latest signal.
pub fn update_guidance_overlay(
    mut signals: EventReader<PresentationSignal>,
    mut query: Query<&mut Text, With<GuidanceText>>,
) {
    let Some(latest) = signals.read().last() else {
        return;
    };
    for mut text in &mut query {
        text.0 = latest.guidance().to_string();
    }
}
