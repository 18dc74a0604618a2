//! Optimization engine boundary and the good_lp/microlp implementation.
//!
//! The exact search runs on its own thread. When the wall-clock limit expires
//! first, the engine answers with the program's warm start (if it is
//! feasible) and abandons the search thread.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};
use serde::Serialize;

use super::program::{Comparison, IntegerProgram, Sense, VariableKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    /// Best assignment known when the time limit expired.
    FeasibleWithinLimit,
}

impl SolveStatus {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::FeasibleWithinLimit => "best found within time limit",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("solver reported the model infeasible")]
    Infeasible,
    #[error("time limit of {0:?} reached without a feasible solution")]
    TimedOut(Duration),
    #[error("solver failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct EngineSolution {
    pub status: SolveStatus,
    pub values: Vec<f64>,
    pub objective: f64,
}

/// Anything able to solve an [`IntegerProgram`] within an optional
/// wall-clock budget.
pub trait OptimizationEngine {
    fn solve(
        &self,
        program: &IntegerProgram,
        time_limit: Option<Duration>,
    ) -> Result<EngineSolution, EngineError>;
}

/// Exact branch-and-bound through good_lp's pure-Rust microlp backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct MicroLpEngine;

impl OptimizationEngine for MicroLpEngine {
    fn solve(
        &self,
        program: &IntegerProgram,
        time_limit: Option<Duration>,
    ) -> Result<EngineSolution, EngineError> {
        let shared = Arc::new(program.clone());
        let (tx, rx) = mpsc::channel();
        let worker = Arc::clone(&shared);
        thread::Builder::new()
            .name("mixpath-solver".to_string())
            .spawn(move || {
                // The receiver is gone once the caller has timed out.
                let _ = tx.send(solve_exact(&worker));
            })
            .map_err(|e| EngineError::Failed(format!("cannot start solver thread: {e}")))?;

        let outcome = match time_limit {
            Some(limit) => rx.recv_timeout(limit),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match outcome {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                let limit = time_limit.unwrap_or_default();
                tracing::warn!(?limit, "time limit reached, falling back to warm start");
                fallback_to_warm_start(&shared, limit)
            }
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::Failed(
                "solver thread exited without a result".to_string(),
            )),
        }
    }
}

fn fallback_to_warm_start(
    program: &IntegerProgram,
    limit: Duration,
) -> Result<EngineSolution, EngineError> {
    let Some(values) = program.warm_start() else {
        return Err(EngineError::TimedOut(limit));
    };
    let violations = program.violations(values);
    if !violations.is_empty() {
        tracing::warn!(?violations, "warm start is not feasible");
        return Err(EngineError::TimedOut(limit));
    }
    Ok(EngineSolution {
        status: SolveStatus::FeasibleWithinLimit,
        objective: program.objective_value(values),
        values: values.to_vec(),
    })
}

fn solve_exact(program: &IntegerProgram) -> Result<EngineSolution, EngineError> {
    let mut problem = ProblemVariables::new();
    let handles: Vec<Variable> = program
        .variables()
        .iter()
        .map(|v| {
            let definition = match v.kind {
                VariableKind::Binary => variable().binary(),
                VariableKind::Integer => variable().integer(),
            };
            problem.add(definition.min(v.lower as f64).max(v.upper as f64))
        })
        .collect();

    let objective: Expression = program
        .variables()
        .iter()
        .zip(&handles)
        .filter(|(v, _)| v.objective != 0.0)
        .map(|(v, &handle)| v.objective * handle)
        .sum();

    let unsolved = match program.sense() {
        Sense::Minimize => problem.minimise(objective),
        Sense::Maximize => problem.maximise(objective),
    };
    let mut model = unsolved.using(good_lp::microlp);
    for c in program.constraints() {
        let lhs: Expression = c
            .terms
            .iter()
            .map(|&(var, coefficient)| coefficient * handles[var.index()])
            .sum();
        model = model.with(match c.comparison {
            Comparison::LessOrEqual => constraint::leq(lhs, c.rhs),
            Comparison::Equal => constraint::eq(lhs, c.rhs),
            Comparison::GreaterOrEqual => constraint::geq(lhs, c.rhs),
        });
    }

    let solution = model.solve().map_err(|e| match e {
        ResolutionError::Infeasible => EngineError::Infeasible,
        other => EngineError::Failed(other.to_string()),
    })?;
    let values: Vec<f64> = handles
        .iter()
        .map(|&handle| solution.value(handle).round())
        .collect();
    let objective = program.objective_value(&values);
    tracing::debug!(objective, "exact search finished");

    Ok(EngineSolution {
        status: SolveStatus::Optimal,
        values,
        objective,
    })
}
