//! Grover iteration scheduling.

use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::error::{MotifError, MotifResult};

/// `max(1, round(π/4 · sqrt(N / M)))`.
///
/// `M` must satisfy `0 < M <= N`; the engine handles `M = 0` and `M = N`
/// before scheduling.
pub fn optimal_iterations(size: u64, marked: u64) -> MotifResult<u32> {
    if marked == 0 {
        return Err(MotifError::InvalidParameter(
            "cannot schedule amplification with no marked states".into(),
        ));
    }
    if marked > size {
        return Err(MotifError::InvalidParameter(format!(
            "{marked} marked states in a space of {size}"
        )));
    }
    let r = (FRAC_PI_4 * (size as f64 / marked as f64).sqrt()).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let r = r as u32;
    Ok(r.max(1))
}

/// Theoretical probability of measuring a marked state after `r` rounds:
/// `sin²((2r + 1)·θ)` with `θ = asin(sqrt(M / N))`.
pub fn success_probability(size: u64, marked: u64, iterations: u32) -> f64 {
    if size == 0 {
        return 0.0;
    }
    let theta = (marked as f64 / size as f64).sqrt().min(1.0).asin();
    ((2.0 * f64::from(iterations) + 1.0) * theta).sin().powi(2)
}

/// Marked mass on an `N`-state register after `r` rounds run over
/// `extended = N · 2^e` states, with the `e` extra qubits traced out.
///
/// Only the low copy of each marked index is marked in the extended space;
/// its `2^e - 1` high copies carry the unmarked share.
pub fn marginal_success_probability(
    size: u64,
    extended: u64,
    marked: u64,
    iterations: u32,
) -> f64 {
    let p = success_probability(extended, marked, iterations);
    if size == 0 || extended <= size || extended <= marked {
        return p;
    }
    let copies = (extended / size - 1) as f64;
    p + marked as f64 * copies * (1.0 - p) / (extended - marked) as f64
}

/// The round count chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Rounds to apply.
    pub iterations: u32,
    /// The formula's value, whatever was applied.
    pub optimal: u32,
    /// Whether `iterations` came from an override.
    pub forced: bool,
}

/// Picks the number of oracle + diffuser rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationScheduler {
    forced: Option<u32>,
}

impl IterationScheduler {
    /// Scheduler using the optimal formula.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler that applies a fixed round count, clamped to at least one.
    pub fn forced(iterations: u32) -> Self {
        Self {
            forced: Some(iterations),
        }
    }

    /// Scheduler from an optional override.
    pub fn with_override(forced: Option<u32>) -> Self {
        Self { forced }
    }

    /// The override, if any.
    pub fn override_iterations(&self) -> Option<u32> {
        self.forced
    }

    /// Schedule `N`, `M`.
    pub fn schedule(&self, size: u64, marked: u64) -> MotifResult<Schedule> {
        let optimal = optimal_iterations(size, marked)?;
        Ok(match self.forced {
            Some(r) => Schedule {
                iterations: r.max(1),
                optimal,
                forced: true,
            },
            None => Schedule {
                iterations: optimal,
                optimal,
                forced: false,
            },
        })
    }
}
