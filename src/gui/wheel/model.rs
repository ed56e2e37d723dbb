use super::DEFAULT_PALETTE;
use crate::config::{Config, PointerDirection, SpinSettings};
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::{Srgb, Srgba};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct OptionLabel(String);

crate::impl_string_newtype!(OptionLabel);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    EmptyLabel,
    Duplicate,
}

impl AddOutcome {
    pub fn is_added(self) -> bool {
        matches!(self, Self::Added)
    }
}

/// Ordered collection of unique option labels. Insertion order determines
/// slice position and color assignment.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    options: Vec<OptionLabel>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims the label and appends it, unless the result is empty or already
    /// present (exact, case-sensitive match).
    pub fn add(&mut self, label: &str) -> AddOutcome {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return AddOutcome::EmptyLabel;
        }
        if self.options.iter().any(|o| o.as_str() == trimmed) {
            return AddOutcome::Duplicate;
        }
        self.options.push(OptionLabel::new(trimmed));
        AddOutcome::Added
    }

    /// Removes the label at `index`, shifting later labels back.
    pub fn remove_at(&mut self, index: usize) -> Option<OptionLabel> {
        (index < self.options.len()).then(|| self.options.remove(index))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OptionLabel> {
        self.options.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionLabel> {
        self.options.iter()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpinTuning {
    pub duration_us: i64,
    pub extra_turns: u32,
}

impl SpinTuning {
    fn from_settings(settings: &SpinSettings) -> Self {
        Self {
            duration_us: (settings.duration_ms as i64 * 1000).max(1),
            extra_turns: settings.extra_turns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpinSession {
    /// Frame-clock timestamp of the first tick, captured lazily.
    started_at: Option<i64>,
    target: f64,
    duration_us: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Spinner {
    Idle,
    Spinning(SpinSession),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpinStep {
    /// No session is active.
    Idle,
    /// The animation is still running; redraw and keep ticking.
    Running,
    /// The session completed. `None` only if the registry was emptied
    /// underneath the running animation.
    Finished(Option<OptionLabel>),
}

/// The whole widget state: registry, rotation, spin session and the
/// presentation settings that come from the config file.
pub struct WheelState {
    pub registry: Registry,
    /// Current orientation in radians; unbounded, normalized only when the
    /// winner is resolved.
    pub rotation: f64,
    spinner: Spinner,
    pub palette: Vec<Srgba<f64>>,
    pub tuning: SpinTuning,
    pub pointer: PointerDirection,
}

impl WheelState {
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Registry::new();
        for label in &config.options {
            let outcome = registry.add(label);
            if !outcome.is_added() {
                log::debug!("skipping configured option {:?}: {:?}", label, outcome);
            }
        }

        Self {
            registry,
            rotation: 0.0,
            spinner: Spinner::Idle,
            palette: parse_palette(&config.palette),
            tuning: SpinTuning::from_settings(&config.spin),
            pointer: config.pointer,
        }
    }

    /// Re-applies the reloadable settings. The registry and any running
    /// session are left alone.
    pub fn apply_config(&mut self, config: &Config) {
        self.palette = parse_palette(&config.palette);
        self.tuning = SpinTuning::from_settings(&config.spin);
        self.pointer = config.pointer;
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.spinner, Spinner::Spinning(_))
    }

    /// Starts a spin towards a uniformly random offset plus the configured
    /// extra turns. Rejected while a session is active or with fewer than two
    /// options.
    pub fn begin_spin(&mut self) -> bool {
        let mut rng = rand::rng();
        self.begin_spin_with_offset(rng.random_range(0.0..2.0 * PI))
    }

    fn begin_spin_with_offset(&mut self, offset: f64) -> bool {
        if self.is_spinning() || self.registry.len() < 2 {
            return false;
        }
        self.spinner = Spinner::Spinning(SpinSession {
            started_at: None,
            target: self.rotation + 2.0 * PI * f64::from(self.tuning.extra_turns) + offset,
            duration_us: self.tuning.duration_us,
        });
        true
    }

    /// Advances the active session to `now` (frame-clock microseconds).
    ///
    /// Each tick moves the rotation towards the session target by the cubic
    /// ease-out of total progress, re-based on the current rotation. The last
    /// tick (progress 1) lands exactly on the target, so the resolved winner
    /// does not depend on frame cadence.
    pub fn step(&mut self, now: i64) -> SpinStep {
        let Spinner::Spinning(session) = &mut self.spinner else {
            return SpinStep::Idle;
        };

        let started = *session.started_at.get_or_insert(now);
        let elapsed = (now - started).max(0) as f64;
        let progress = (elapsed / session.duration_us as f64).min(1.0);
        let eased = 1.0 - (1.0 - progress).powi(3);
        self.rotation += (session.target - self.rotation) * eased;

        if progress < 1.0 {
            return SpinStep::Running;
        }

        self.spinner = Spinner::Idle;
        if self.registry.is_empty() {
            return SpinStep::Finished(None);
        }
        let index = winning_index(self.rotation, self.registry.len(), self.pointer.angle());
        SpinStep::Finished(self.registry.get(index).cloned())
    }
}

impl Default for WheelState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Angular width of one slice for `count` options.
pub fn slice_width(count: usize) -> f64 {
    2.0 * PI / count as f64
}

/// Index of the slice sitting under the pointer for a given rotation.
///
/// Floored modulo throughout: the angular distance from the rotated slice 0
/// boundary back to the pointer, normalized into [0, 2pi), divided by the
/// slice width. Always in [0, count).
pub fn winning_index(rotation: f64, count: usize, pointer_angle: f64) -> usize {
    let width = slice_width(count);
    let normalized = rotation.rem_euclid(2.0 * PI);
    ((pointer_angle - normalized) / width)
        .rem_euclid(count as f64)
        .floor() as usize
        % count
}

pub fn parse_palette(entries: &[String]) -> Vec<Srgba<f64>> {
    let parsed: Vec<Srgba<f64>> = entries
        .iter()
        .filter_map(|hex| match hex.parse::<Srgb<u8>>() {
            Ok(color) => Some(to_srgba(color)),
            Err(e) => {
                log::warn!("ignoring palette entry {:?}: {}", hex, e);
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        default_palette()
    } else {
        parsed
    }
}

pub fn default_palette() -> Vec<Srgba<f64>> {
    DEFAULT_PALETTE
        .iter()
        .map(|hex| {
            let color = hex
                .parse::<Srgb<u8>>()
                .expect("built-in palette entries are valid hex");
            to_srgba(color)
        })
        .collect()
}

fn to_srgba(color: Srgb<u8>) -> Srgba<f64> {
    let color: Srgb<f64> = color.into_format();
    Srgba::new(color.red, color.green, color.blue, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn state_with(labels: &[&str]) -> WheelState {
        let mut state = WheelState::default();
        for label in labels {
            assert!(state.registry.add(label).is_added());
        }
        state
    }

    #[test]
    fn add_trims_whitespace() {
        let mut registry = Registry::new();
        assert_eq!(registry.add("  lunch at marco's  "), AddOutcome::Added);
        assert_eq!(registry.get(0).unwrap().as_str(), "lunch at marco's");
    }

    #[test]
    fn add_rejects_empty_and_blank() {
        let mut registry = Registry::new();
        assert_eq!(registry.add(""), AddOutcome::EmptyLabel);
        assert_eq!(registry.add("   \t "), AddOutcome::EmptyLabel);
        assert!(registry.is_empty());
    }

    #[test]
    fn add_rejects_exact_duplicates_only() {
        let mut registry = Registry::new();
        assert_eq!(registry.add("pizza"), AddOutcome::Added);
        assert_eq!(registry.add(" pizza "), AddOutcome::Duplicate);
        // matching is case-sensitive
        assert_eq!(registry.add("Pizza"), AddOutcome::Added);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut registry = Registry::new();
        for label in ["a", "b", "c", "d"] {
            registry.add(label);
        }
        assert_eq!(registry.remove_at(1).unwrap().as_str(), "b");
        let remaining: Vec<&str> = registry.iter().map(|o| o.as_str()).collect();
        assert_eq!(remaining, ["a", "c", "d"]);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut registry = Registry::new();
        registry.add("only");
        assert!(registry.remove_at(1).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn slice_widths_partition_the_circle() {
        for count in 1..=24 {
            let width = slice_width(count);
            let total = width * count as f64;
            assert!((total - 2.0 * PI).abs() < 1e-12, "count {count}: {total}");
            // slice i starts at i * width before rotation is applied
            for i in 0..count {
                assert!((i as f64 * width) < 2.0 * PI);
            }
        }
    }

    #[test]
    fn winner_matches_the_worked_example() {
        // Four options, slice width pi/2.
        assert_eq!(winning_index(0.0, 4, 0.0), 0);
        // floor(-1) = -1, and -1 mod 4 = 3 under floored modulo.
        assert_eq!(winning_index(FRAC_PI_2, 4, 0.0), 3);
        assert_eq!(winning_index(PI, 4, 0.0), 2);
    }

    #[test]
    fn winner_is_always_in_range() {
        let mut rotation = -50.0;
        while rotation < 50.0 {
            for count in 1..=13 {
                for pointer in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
                    let index = winning_index(rotation, count, pointer);
                    assert!(index < count, "rotation {rotation}, count {count}");
                }
            }
            rotation += 0.37;
        }
    }

    #[test]
    fn winner_honors_the_pointer_direction() {
        // Four slices, rotated slightly so no pointer sits on a boundary.
        // Slice i spans [i * pi/2 + 0.1, (i + 1) * pi/2 + 0.1).
        let rotation = 0.1;
        assert_eq!(winning_index(rotation, 4, PointerDirection::East.angle()), 3);
        assert_eq!(winning_index(rotation, 4, PointerDirection::South.angle()), 0);
        assert_eq!(winning_index(rotation, 4, PointerDirection::West.angle()), 1);
        assert_eq!(winning_index(rotation, 4, PointerDirection::North.angle()), 2);
    }

    #[test]
    fn spin_needs_at_least_two_options() {
        let mut state = state_with(&["solo"]);
        assert!(!state.begin_spin());
        assert!(!state.is_spinning());

        let mut state = state_with(&["a", "b"]);
        assert!(state.begin_spin());
        assert!(state.is_spinning());
    }

    #[test]
    fn spin_is_rejected_while_spinning() {
        let mut state = state_with(&["a", "b", "c"]);
        assert!(state.begin_spin_with_offset(1.0));
        let Spinner::Spinning(first) = state.spinner else {
            panic!("expected an active session");
        };

        assert!(!state.begin_spin_with_offset(2.0));
        assert_eq!(state.spinner, Spinner::Spinning(first));
    }

    #[test]
    fn spin_target_includes_extra_turns() {
        let mut state = state_with(&["a", "b"]);
        state.rotation = 1.25;
        assert!(state.begin_spin_with_offset(0.5));
        let Spinner::Spinning(session) = state.spinner else {
            panic!("expected an active session");
        };
        let turns = f64::from(state.tuning.extra_turns);
        assert!((session.target - (1.25 + 2.0 * PI * turns + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn step_lands_on_the_target_and_reports_the_winner() {
        let mut state = state_with(&["a", "b", "c", "d"]);
        // Final normalized rotation is pi + 0.3, comfortably inside a slice:
        // floor((-(pi + 0.3) / (pi/2)) mod 4) = floor(1.809...) = 1.
        assert!(state.begin_spin_with_offset(PI + 0.3));
        let Spinner::Spinning(session) = state.spinner else {
            panic!("expected an active session");
        };
        let target = session.target;

        assert_eq!(state.step(1_000), SpinStep::Running);
        assert_eq!(state.step(1_000 + state.tuning.duration_us / 2), SpinStep::Running);

        let result = state.step(1_000 + state.tuning.duration_us);
        assert_eq!(result, SpinStep::Finished(Some(OptionLabel::new("b"))));
        assert!(!state.is_spinning());
        assert!((state.rotation - target).abs() < 1e-9);
    }

    #[test]
    fn step_moves_monotonically_towards_the_target() {
        let mut state = state_with(&["a", "b"]);
        assert!(state.begin_spin_with_offset(2.0));
        let Spinner::Spinning(session) = state.spinner else {
            panic!("expected an active session");
        };
        let target = session.target;

        state.step(0);
        let mut previous = state.rotation;
        for tick in 1..=20 {
            state.step(tick * state.tuning.duration_us / 20);
            assert!(state.rotation >= previous);
            assert!(state.rotation <= target + 1e-9);
            previous = state.rotation;
        }
    }

    #[test]
    fn step_is_idle_without_a_session() {
        let mut state = state_with(&["a", "b"]);
        assert_eq!(state.step(123), SpinStep::Idle);
    }

    #[test]
    fn emptied_registry_finishes_without_a_winner() {
        let mut state = state_with(&["a", "b"]);
        assert!(state.begin_spin_with_offset(1.0));
        state.step(0);
        state.registry.remove_at(0);
        state.registry.remove_at(0);
        assert_eq!(
            state.step(state.tuning.duration_us),
            SpinStep::Finished(None)
        );
        assert!(!state.is_spinning());
    }

    #[test]
    fn reload_keeps_registry_and_session() {
        let mut state = state_with(&["a", "b"]);
        assert!(state.begin_spin_with_offset(1.0));
        let spinner_before = state.spinner;

        let config = Config {
            options: vec!["x".into(), "y".into()],
            pointer: PointerDirection::North,
            ..Config::default()
        };
        state.apply_config(&config);

        assert_eq!(state.registry.len(), 2);
        assert_eq!(state.registry.get(0).unwrap().as_str(), "a");
        assert_eq!(state.spinner, spinner_before);
        assert_eq!(state.pointer, PointerDirection::North);
    }

    #[test]
    fn palette_parses_hex_and_falls_back() {
        let palette = parse_palette(&["#102030".to_string(), "not-a-color".to_string()]);
        assert_eq!(palette.len(), 1);
        assert!((palette[0].red - 16.0 / 255.0).abs() < 1e-9);

        assert_eq!(parse_palette(&[]).len(), 12);
        assert_eq!(parse_palette(&["nope".to_string()]).len(), 12);
        assert_eq!(default_palette().len(), 12);
    }

    #[test]
    fn seeded_options_respect_registry_invariants() {
        let config = Config {
            options: vec![" a ".into(), "a".into(), "".into(), "b".into()],
            ..Config::default()
        };
        let state = WheelState::from_config(&config);
        let labels: Vec<&str> = state.registry.iter().map(|o| o.as_str()).collect();
        assert_eq!(labels, ["a", "b"]);
    }
}
