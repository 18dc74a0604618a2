//! Mix ordering: expand tracks into key-shift variants, price every
//! transition, hand the path model to an engine, and decode the answer.

pub mod cost;
pub mod decode;
pub mod engine;
pub mod graph;
pub mod model;
pub mod program;
pub mod variants;


use std::time::Duration;

use serde::Serialize;

use crate::types::{HarmonicKey, Track};

pub use cost::TransitionKind;
pub use decode::DecodeError;
pub use engine::{EngineError, MicroLpEngine, OptimizationEngine, SolveStatus};
pub use variants::ModelError;

use graph::DistanceMatrix;
use model::PathModel;
use variants::{ANCHOR, VariantSet};

#[derive(Debug, thiserror::Error)]
pub enum MixError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixOptions {
    pub max_shift: i32,
    pub time_limit: Option<Duration>,
}

impl Default for MixOptions {
    fn default() -> Self {
        Self {
            max_shift: 1,
            time_limit: Some(Duration::from_secs(300)),
        }
    }
}

/// One slot of the finished mix.
#[derive(Debug, Clone, Serialize)]
pub struct MixEntry {
    pub track: Track,
    pub shift: i32,
    pub shifted_key: HarmonicKey,
    /// Cost of arriving at this track; the first entry carries the opening cost.
    pub transition_cost: u64,
    pub transition: TransitionKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct MixPlan {
    pub entries: Vec<MixEntry>,
    pub objective: u64,
    pub status: SolveStatus,
}

impl MixPlan {
    pub fn total_duration_seconds(&self) -> u32 {
        self.entries.iter().map(|e| e.track.duration_seconds).sum()
    }

    pub fn track_ids(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.track.id).collect()
    }
}

/// Run the full pipeline for one catalog.
pub fn plan_mix(
    tracks: &[Track],
    options: &MixOptions,
    engine: &dyn OptimizationEngine,
) -> Result<MixPlan, MixError> {
    let variants = VariantSet::expand(tracks, options.max_shift)?;
    let matrix = DistanceMatrix::build(&variants);
    let model = PathModel::build(&variants, &matrix);

    let solution = engine.solve(model.program(), options.time_limit)?;
    tracing::info!(
        status = solution.status.describe(),
        objective = solution.objective,
        "engine returned"
    );

    let edges = model.selected_edges(&solution.values);
    let order = decode::decode_path(&edges, &variants)?;

    let mut tour = Vec::with_capacity(order.len() + 1);
    tour.push(ANCHOR);
    tour.extend_from_slice(&order);
    let objective = matrix.cycle_cost(&tour);
    if (objective as f64 - solution.objective).abs() > 0.5 {
        tracing::warn!(
            engine_objective = solution.objective,
            path_cost = objective,
            "engine objective disagrees with the decoded path"
        );
    }

    let mut previous = ANCHOR;
    let mut entries = Vec::with_capacity(order.len());
    for node in order {
        let Some(variant) = variants.node(node).variant() else {
            continue;
        };
        let step = cost::transition(variants.node(previous), variants.node(node));
        entries.push(MixEntry {
            track: variant.track.clone(),
            shift: variant.shift,
            shifted_key: variant.shifted_key,
            transition_cost: step.cost,
            transition: step.kind,
        });
        previous = node;
    }

    Ok(MixPlan {
        entries,
        objective,
        status: solution.status,
    })
}
