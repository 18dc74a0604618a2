use std::fmt;

use serde::{Serialize, Serializer};

/// Positions on the Camelot wheel.
pub const WHEEL_SIZE: i32 = 12;

/// Wheel steps moved by a single key shift (one perfect fifth).
const FIFTH_STEP: i32 = 5;

/// Camelot mode letter: `A` is the minor ring, `B` the major ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    A,
    B,
}

impl Mode {
    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
        }
    }
}

/// A key in Camelot-wheel encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HarmonicKey {
    position: u8,
    mode: Mode,
}

impl HarmonicKey {
    /// Returns `None` unless `position` is in `1..=12`.
    pub fn new(position: u8, mode: Mode) -> Option<Self> {
        (1..=WHEEL_SIZE as u8)
            .contains(&position)
            .then_some(Self { position, mode })
    }

    /// Transpose by `shift` fifths. The mode is unchanged.
    pub fn shifted(self, shift: i32) -> Self {
        let zero_based = i32::from(self.position) - 1 - FIFTH_STEP * shift;
        Self {
            position: (zero_based.rem_euclid(WHEEL_SIZE) + 1) as u8,
            mode: self.mode,
        }
    }

    /// Circular distance between wheel positions, ignoring mode.
    pub fn wheel_distance(self, other: Self) -> u8 {
        let diff = (i32::from(self.position) - i32::from(other.position)).rem_euclid(WHEEL_SIZE);
        diff.min(WHEEL_SIZE - diff) as u8
    }

    /// Same key, relative major/minor, or an adjacent position in the same mode.
    pub fn is_compatible_with(self, other: Self) -> bool {
        if self.position == other.position {
            return true;
        }
        self.mode == other.mode && self.wheel_distance(other) <= 1
    }
}

impl fmt::Display for HarmonicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.position, self.mode.letter())
    }
}

impl Serialize for HarmonicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One catalog entry. Fields are validated by the catalog loader; a `Track`
/// is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: u32,
    pub name: String,
    pub tempo_bpm: f64,
    pub duration_seconds: u32,
    pub key: HarmonicKey,
}

impl Track {
    /// Returns `None` when the tempo is not a positive finite number.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        tempo_bpm: f64,
        duration_seconds: u32,
        key: HarmonicKey,
    ) -> Option<Self> {
        if !tempo_bpm.is_finite() || tempo_bpm <= 0.0 {
            return None;
        }
        Some(Self {
            id,
            name: name.into(),
            tempo_bpm,
            duration_seconds,
            key,
        })
    }
}

/// `MM:SS` rendering used by reports.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(position: u8, mode: Mode) -> HarmonicKey {
        HarmonicKey::new(position, mode).expect("valid wheel position")
    }

    #[test]
    fn rejects_out_of_range_positions() {
        assert!(HarmonicKey::new(0, Mode::A).is_none());
        assert!(HarmonicKey::new(13, Mode::B).is_none());
        assert!(HarmonicKey::new(1, Mode::A).is_some());
        assert!(HarmonicKey::new(12, Mode::B).is_some());
    }

    #[test]
    fn shift_moves_by_fifths() {
        assert_eq!(key(8, Mode::B).shifted(0), key(8, Mode::B));
        assert_eq!(key(8, Mode::B).shifted(1), key(3, Mode::B));
        assert_eq!(key(8, Mode::B).shifted(-1), key(1, Mode::B));
        assert_eq!(key(1, Mode::A).shifted(1), key(8, Mode::A));
        assert_eq!(key(12, Mode::A).shifted(-1), key(5, Mode::A));
    }

    #[test]
    fn shift_round_trip_restores_position() {
        for position in 1..=12 {
            for shift in -6..=6 {
                let original = key(position, Mode::A);
                assert_eq!(
                    original.shifted(shift).shifted(-shift),
                    original,
                    "shift {shift} from {original}"
                );
            }
        }
    }

    #[test]
    fn every_position_is_reachable_by_shifting() {
        let start = key(4, Mode::B);
        let mut seen: Vec<u8> = (0..12).map(|s| start.shifted(s).position).collect();
        seen.sort_unstable();
        assert_eq!(seen, (1..=12).collect::<Vec<u8>>());
    }

    #[test]
    fn compatibility_rules() {
        assert!(key(8, Mode::A).is_compatible_with(key(8, Mode::A)));
        assert!(key(8, Mode::A).is_compatible_with(key(8, Mode::B)));
        assert!(key(8, Mode::B).is_compatible_with(key(9, Mode::B)));
        assert!(key(8, Mode::B).is_compatible_with(key(7, Mode::B)));
        assert!(key(12, Mode::A).is_compatible_with(key(1, Mode::A)));
        assert!(!key(8, Mode::B).is_compatible_with(key(9, Mode::A)));
        assert!(!key(8, Mode::B).is_compatible_with(key(10, Mode::B)));
        assert!(!key(1, Mode::A).is_compatible_with(key(7, Mode::A)));
    }

    #[test]
    fn compatibility_is_reflexive_and_symmetric() {
        let keys: Vec<HarmonicKey> = (1..=12)
            .flat_map(|p| [key(p, Mode::A), key(p, Mode::B)])
            .collect();
        for &a in &keys {
            assert!(a.is_compatible_with(a), "{a} should be compatible with itself");
            for &b in &keys {
                assert_eq!(
                    a.is_compatible_with(b),
                    b.is_compatible_with(a),
                    "compatibility of {a} and {b} should be symmetric"
                );
            }
        }
    }

    #[test]
    fn track_rejects_non_positive_tempo() {
        let k = key(8, Mode::A);
        assert!(Track::new(1, "a", 0.0, 180, k).is_none());
        assert!(Track::new(1, "a", -120.0, 180, k).is_none());
        assert!(Track::new(1, "a", f64::NAN, 180, k).is_none());
        assert!(Track::new(1, "a", 124.0, 180, k).is_some());
    }

    #[test]
    fn key_display_is_camelot_notation() {
        assert_eq!(key(11, Mode::B).to_string(), "11B");
        assert_eq!(format_duration(245), "4:05");
    }
}
