use crate::gfx::{anim::interpolate, math::{Color, GeoPoint}};
use crate::roster::Roster;
use log::{debug, info};
use std::collections::HashMap;

pub const DEFAULT_MIN_SPEED: f64 = 0.0025;
pub const DEFAULT_MAX_SPEED: f64 = 0.08;
pub const DEFAULT_SPEED: f64 = 0.01;

/// Speed bounds, in normalized time per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimits {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_SPEED,
            max: DEFAULT_MAX_SPEED,
            default: DEFAULT_SPEED,
        }
    }
}

impl SpeedLimits {
    // Not f64::clamp, which panics on inverted bounds.
    pub fn clamp(&self, speed: f64) -> f64 {
        speed.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedDirection {
    Faster,
    Slower,
}

#[derive(Debug, Clone)]
pub struct TimelineState {
    pub time: f64,
    pub speed: f64,
    pub playing: bool,
    pub visibility: HashMap<String, bool>,
}

/// What the map draws for one entity. Hidden entities get no marker at
/// all, so `visible` is always true inside a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub display_name: String,
    pub color: Color,
    pub position: GeoPoint,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub id: String,
    pub display_name: String,
    pub color: Color,
    pub visible: bool,
}

/// One render frame. The play button label is read from here too, so it
/// always agrees with the markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub time: f64,
    pub speed: f64,
    pub playing: bool,
    pub markers: Vec<Marker>,
}

impl Frame {
    pub fn play_label(&self) -> &'static str {
        if self.playing {
            "Pause"
        } else {
            "Play"
        }
    }
}

/// Sole owner of the playback state. Every operation is total: bad input
/// is clamped, wrapped or ignored.
pub struct TimelineController {
    roster: Roster,
    limits: SpeedLimits,
    state: TimelineState,
}

impl TimelineController {
    pub fn new(roster: Roster, limits: SpeedLimits) -> Self {
        let visibility = roster.iter().map(|e| (e.id().to_string(), true)).collect();
        let state = TimelineState {
            time: 0.0,
            speed: limits.clamp(limits.default),
            playing: true,
            visibility,
        };
        Self {
            roster,
            limits,
            state,
        }
    }

    pub fn tick(&mut self) {
        if !self.state.playing {
            return;
        }
        self.state.time = (self.state.time + self.state.speed).rem_euclid(1.0);
        debug!("tick: time={:.4}", self.state.time);
    }

    /// Returns whether the timeline is playing afterwards.
    pub fn toggle_play(&mut self) -> bool {
        self.state.playing = !self.state.playing;
        info!("Playback {}", if self.state.playing { "resumed" } else { "paused" });
        self.state.playing
    }

    pub fn set_speed(&mut self, direction: SpeedDirection) -> f64 {
        let target = match direction {
            SpeedDirection::Faster => self.state.speed * 2.0,
            SpeedDirection::Slower => self.state.speed / 2.0,
        };
        self.state.speed = self.limits.clamp(target);
        info!("Speed set to {} ({:?})", self.state.speed, direction);
        self.state.speed
    }

    /// Jumps straight to `value`. The control surface bounds it to `[0, 1]`;
    /// it is not checked again here. `tick` wraps anything else back into range.
    pub fn scrub_to(&mut self, value: f64) {
        self.state.time = value;
        debug!("scrubbed to {:.4}", value);
    }

    /// Returns the new visibility, or `None` for an unknown id.
    pub fn toggle_visibility(&mut self, id: &str) -> Option<bool> {
        let visible = self.state.visibility.get_mut(id)?;
        *visible = !*visible;
        let name = self.roster.get(id).map_or(id, |e| e.display_name());
        info!("{} is now {}", name, if *visible { "shown" } else { "hidden" });
        Some(*visible)
    }

    pub fn snapshot(&self) -> Frame {
        let markers = self
            .roster
            .iter()
            .filter(|e| self.is_visible(e.id()))
            .map(|e| Marker {
                id: e.id().to_string(),
                display_name: e.display_name().to_string(),
                color: e.color(),
                position: interpolate(e.path(), self.state.time),
                visible: true,
            })
            .collect();

        Frame {
            time: self.state.time,
            speed: self.state.speed,
            playing: self.state.playing,
            markers,
        }
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.roster
            .iter()
            .map(|e| LegendEntry {
                id: e.id().to_string(),
                display_name: e.display_name().to_string(),
                color: e.color(),
                visible: self.is_visible(e.id()),
            })
            .collect()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.state.visibility.get(id).copied().unwrap_or(false)
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }

    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Entity;
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    fn entity(id: &str, path: &[[f64; 2]]) -> Entity {
        let path = path.iter().copied().map(GeoPoint::from).collect();
        Entity::new(id, id.to_uppercase(), Color::rgb(10, 20, 30), path).unwrap()
    }

    fn controller() -> TimelineController {
        let roster = Roster::new(vec![
            entity("north", &[[0.0, 0.0], [10.0, 0.0]]),
            entity("east", &[[0.0, 0.0], [0.0, 10.0]]),
            entity("still", &[[5.0, 5.0]]),
        ])
        .unwrap();
        TimelineController::new(roster, SpeedLimits::default())
    }

    #[test]
    fn starts_playing_at_zero_with_everything_visible() {
        let c = controller();
        assert_eq!(c.time(), 0.0);
        assert_eq!(c.speed(), DEFAULT_SPEED);
        assert!(c.is_playing());
        assert!(c.legend().iter().all(|e| e.visible));
        assert_eq!(c.snapshot().markers.len(), 3);
    }

    #[test]
    fn default_speed_outside_limits_is_clamped() {
        let limits = SpeedLimits { min: 0.1, max: 0.2, default: 0.5 };
        let c = TimelineController::new(controller().roster().clone(), limits);
        assert_eq!(c.speed(), 0.2);
    }

    #[test]
    fn tick_advances_by_speed() {
        let mut c = controller();
        c.tick();
        c.tick();
        c.tick();
        assert!((c.time() - 3.0 * DEFAULT_SPEED).abs() < EPS);
    }

    #[test]
    fn tick_wraps_past_one() {
        let mut c = controller();
        c.scrub_to(0.995);
        c.tick();
        assert!((c.time() - 0.005).abs() < EPS, "time was {}", c.time());
    }

    #[rstest]
    #[case(1.25, 0.26)]
    #[case(-0.25, 0.76)]
    fn tick_wraps_out_of_range_scrub_values(#[case] scrubbed: f64, #[case] expected: f64) {
        let mut c = controller();
        c.scrub_to(scrubbed);
        c.tick();
        assert!((c.time() - expected).abs() < EPS, "time was {}", c.time());
        assert!((0.0..1.0).contains(&c.time()));
    }

    #[test]
    fn paused_tick_leaves_time_alone() {
        let mut c = controller();
        c.scrub_to(0.4);
        assert!(!c.toggle_play());
        c.tick();
        assert_eq!(c.time(), 0.4);

        assert!(c.toggle_play());
        c.tick();
        assert!((c.time() - 0.41).abs() < EPS);
    }

    #[test]
    fn toggle_play_keeps_time_and_speed() {
        let mut c = controller();
        c.scrub_to(0.3);
        c.set_speed(SpeedDirection::Faster);
        let speed = c.speed();
        c.toggle_play();
        assert_eq!(c.time(), 0.3);
        assert_eq!(c.speed(), speed);
    }

    #[test]
    fn faster_converges_to_max() {
        let mut c = controller();
        for _ in 0..20 {
            let speed = c.set_speed(SpeedDirection::Faster);
            assert!(speed <= DEFAULT_MAX_SPEED);
        }
        assert_eq!(c.speed(), DEFAULT_MAX_SPEED);
    }

    #[test]
    fn slower_converges_to_min() {
        let mut c = controller();
        for _ in 0..20 {
            let speed = c.set_speed(SpeedDirection::Slower);
            assert!(speed >= DEFAULT_MIN_SPEED);
        }
        assert_eq!(c.speed(), DEFAULT_MIN_SPEED);
    }

    #[test]
    fn speed_steps_double_and_halve() {
        let mut c = controller();
        assert!((c.set_speed(SpeedDirection::Faster) - 0.02).abs() < EPS);
        assert!((c.set_speed(SpeedDirection::Slower) - 0.01).abs() < EPS);
        assert!((c.set_speed(SpeedDirection::Slower) - 0.005).abs() < EPS);
    }

    #[test]
    fn toggle_visibility_twice_restores() {
        let mut c = controller();
        assert_eq!(c.toggle_visibility("east"), Some(false));
        assert!(!c.is_visible("east"));
        assert_eq!(c.toggle_visibility("east"), Some(true));
        assert!(c.is_visible("east"));
    }

    #[test]
    fn unknown_visibility_id_is_ignored() {
        let mut c = controller();
        assert_eq!(c.toggle_visibility("atlantis"), None);
        assert!(!c.is_visible("atlantis"));
        assert_eq!(c.snapshot().markers.len(), 3);
    }

    #[test]
    fn snapshot_omits_hidden_entities() {
        let mut c = controller();
        c.toggle_visibility("north");
        let frame = c.snapshot();
        let ids: Vec<_> = frame.markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["east", "still"]);
        assert!(frame.markers.iter().all(|m| m.visible));

        let legend = c.legend();
        assert_eq!(legend.len(), 3);
        assert!(!legend[0].visible);
    }

    #[test]
    fn snapshot_interpolates_at_current_time() {
        let mut c = controller();
        c.scrub_to(0.5);
        let frame = c.snapshot();
        let east = frame.markers.iter().find(|m| m.id == "east").unwrap();
        assert_eq!(east.position, GeoPoint::new(0.0, 5.0));
        assert_eq!(east.display_name, "EAST");
        let still = frame.markers.iter().find(|m| m.id == "still").unwrap();
        assert_eq!(still.position, GeoPoint::new(5.0, 5.0));
    }

    #[test]
    fn snapshot_is_side_effect_free() {
        let mut c = controller();
        c.scrub_to(0.37);
        let first = c.snapshot();
        let second = c.snapshot();
        assert_eq!(first, second);
        assert_eq!(c.time(), 0.37);
    }

    #[test]
    fn play_label_follows_frame_state() {
        let mut c = controller();
        assert_eq!(c.snapshot().play_label(), "Pause");
        c.toggle_play();
        assert_eq!(c.snapshot().play_label(), "Play");
    }
}
