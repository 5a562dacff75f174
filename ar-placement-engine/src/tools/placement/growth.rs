use std::time::Duration;

use bevy::prelude::*;

use crate::config::GrowthSettings;

/// Pop-in effect: scale is multiplied by `factor` on every elapsed tick
/// until the deadline passes. Ticks falling after the deadline never fire.
#[derive(Component, Debug, Clone)]
pub struct GrowthAnimation {
    tick: Timer,
    deadline: Timer,
    factor: f32,
}

impl GrowthAnimation {
    pub fn new(settings: &GrowthSettings) -> Self {
        Self {
            tick: Timer::new(settings.tick(), TimerMode::Repeating),
            deadline: Timer::new(settings.duration(), TimerMode::Once),
            factor: settings.factor,
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Advance both timers by `delta`; returns the number of ticks that fired.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        if self.deadline.finished() {
            return 0;
        }

        let step = delta.min(self.deadline.remaining());
        self.tick.tick(step);
        self.deadline.tick(delta);
        self.tick.times_finished_this_tick()
    }

    pub fn is_finished(&self) -> bool {
        self.deadline.finished()
    }

    /// Scale multiplier for `ticks` fired ticks.
    pub fn multiplier(&self, ticks: u32) -> f32 {
        self.factor.powi(ticks as i32)
    }
}

/// The first tick lands one period after the update that placed the object.
pub fn advance_growth_animations(
    mut commands: Commands,
    time: Res<Time>,
    mut animations: Query<(Entity, &mut Transform, &mut GrowthAnimation)>,
) {
    for (entity, mut transform, mut growth) in &mut animations {
        // Spawned this update: the elapsed delta predates the tap.
        if growth.is_added() {
            continue;
        }

        let ticks = growth.advance(time.delta());
        if ticks > 0 {
            transform.scale *= growth.multiplier(ticks);
        }

        if growth.is_finished() {
            commands.entity(entity).remove::<GrowthAnimation>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn ticks_fire_every_period_until_deadline() {
        let mut growth = GrowthAnimation::new(&GrowthSettings::default());

        let fired: u32 = (0..31).map(|_| growth.advance(FRAME)).sum();
        assert_eq!(fired, 31);
        assert!(!growth.is_finished());

        // 496 ms -> 512 ms crosses the 500 ms deadline; the 512 ms tick is dropped.
        assert_eq!(growth.advance(FRAME), 0);
        assert!(growth.is_finished());
        assert_eq!(growth.advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn scale_grows_monotonically_then_freezes() {
        let mut growth = GrowthAnimation::new(&GrowthSettings::default());
        let mut scale = 1.0_f32;
        let mut history = vec![scale];

        for _ in 0..40 {
            let ticks = growth.advance(FRAME);
            scale *= growth.multiplier(ticks);
            history.push(scale);
        }

        for window in history[..=31].windows(2) {
            assert!(window[1] > window[0]);
        }
        assert!(history[31..].iter().all(|s| *s == history[31]));
        assert!((scale - 1.01_f32.powi(31)).abs() < 1e-4);
    }

    #[test]
    fn placement_update_keeps_unit_scale() {
        use bevy::time::TimeUpdateStrategy;

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(17)))
            .add_systems(Update, advance_growth_animations);
        app.update();
        app.update();

        let placed = app
            .world_mut()
            .spawn((
                Transform::IDENTITY,
                GrowthAnimation::new(&GrowthSettings::default()),
            ))
            .id();
        app.update();
        assert_eq!(app.world().get::<Transform>(placed).unwrap().scale, Vec3::ONE);

        app.update();
        let scale = app.world().get::<Transform>(placed).unwrap().scale;
        assert!((scale.x - 1.01).abs() < 1e-6, "{}", scale.x);
    }

    #[test]
    fn long_frame_is_capped_at_deadline() {
        let mut growth = GrowthAnimation::new(&GrowthSettings::default());
        assert_eq!(growth.advance(Duration::from_millis(2000)), 31);
        assert!(growth.is_finished());
    }

    #[test]
    fn uneven_frames_fire_the_same_ticks() {
        let mut growth = GrowthAnimation::new(&GrowthSettings::default());
        let frames = [5, 40, 3, 100, 7, 200, 145];
        let fired: u32 = frames
            .iter()
            .map(|ms| growth.advance(Duration::from_millis(*ms)))
            .sum();
        assert_eq!(fired, 31);
        assert!(growth.is_finished());
    }
}
