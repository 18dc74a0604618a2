//! Asymmetric transition cost between two nodes of the variant graph.

use serde::Serialize;

use super::variants::{Node, Variant};

/// Added to any transition whose tempo or key clash. Dominates every
/// compatible transition cost.
pub const INCOMPATIBLE_PENALTY: u64 = 1_000_000;

const SHIFT_PENALTY_UNIT: u64 = 225;
const TEMPO_TOLERANCE: f64 = 0.06;
const TEMPO_DISTANCE_SCALE: f64 = 250.0;
const COST_EXPONENT: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Anchor to the first track of the mix.
    Opening,
    /// Last track back to the anchor.
    Closing,
    Smooth,
    TempoClash,
    KeyClash,
}

impl TransitionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Opening => "Opening",
            Self::Closing => "Closing",
            Self::Smooth => "Smooth",
            Self::TempoClash => "Tempo clash",
            Self::KeyClash => "Key clash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub cost: u64,
}

/// Quadratic in the shift so a double shift costs four times a single one.
pub fn shift_penalty(shift: i32) -> u64 {
    let magnitude = u64::from(shift.unsigned_abs());
    SHIFT_PENALTY_UNIT * magnitude * magnitude
}

/// Tempo deviation relative to the destination tempo.
pub fn relative_tempo_deviation(from_bpm: f64, to_bpm: f64) -> f64 {
    (from_bpm - to_bpm).abs() / to_bpm
}

pub fn tempo_compatible(from_bpm: f64, to_bpm: f64) -> bool {
    relative_tempo_deviation(from_bpm, to_bpm) < TEMPO_TOLERANCE
}

/// Squared, scaled relative deviation. Normalized by the destination tempo,
/// so `tempo_distance(a, b)` and `tempo_distance(b, a)` generally differ.
pub fn tempo_distance(from_bpm: f64, to_bpm: f64) -> u64 {
    let scaled =
        (relative_tempo_deviation(from_bpm, to_bpm) * TEMPO_DISTANCE_SCALE).round() as u64;
    scaled * scaled
}

fn classify(from: &Variant, to: &Variant) -> TransitionKind {
    if !tempo_compatible(from.track.tempo_bpm, to.track.tempo_bpm) {
        TransitionKind::TempoClash
    } else if !from.shifted_key.is_compatible_with(to.shifted_key) {
        TransitionKind::KeyClash
    } else {
        TransitionKind::Smooth
    }
}

/// Cost of playing `to` right after `from`.
pub fn transition(from: &Node, to: &Node) -> Transition {
    match (from, to) {
        (Node::Anchor, to) => Transition {
            kind: TransitionKind::Opening,
            cost: shift_penalty(to.shift()),
        },
        (_, Node::Anchor) => Transition {
            kind: TransitionKind::Closing,
            cost: 0,
        },
        (Node::Variant(from), Node::Variant(to)) => {
            let kind = classify(from, to);
            let cost = match kind {
                TransitionKind::Smooth => {
                    let base = tempo_distance(from.track.tempo_bpm, to.track.tempo_bpm)
                        + shift_penalty(to.shift);
                    (base as f64).powf(COST_EXPONENT).round() as u64
                }
                _ => INCOMPATIBLE_PENALTY + shift_penalty(to.shift),
            };
            Transition { kind, cost }
        }
    }
}

pub fn cost(from: &Node, to: &Node) -> u64 {
    transition(from, to).cost
}
