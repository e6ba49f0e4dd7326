//! Adaptive step-size control by step doubling.
//!
//! Each trial compares one RK4 step of size h against two steps of size h/2
//! from the same point. The max-norm discrepancy decides the outcome:
//!
//! | error                 | outcome                  |
//! |-----------------------|--------------------------|
//! | `<= tol / 2`          | accept, next h = h * 1.5 |
//! | `<= tol`              | accept, h unchanged      |
//! | `> tol`               | reject, retry h / 1.5    |
//!
//! A trial that produces NaN or infinity counts as a rejection; if the
//! point still cannot be resolved, the run fails as non-finite.
//!
//! Accepted points carry the two-half-step result. The loop stops once the
//! last accepted timestamp reaches the final time; the last point may
//! overshoot it and is never clamped back.

use crate::brusselator::Brusselator;
use crate::error::{IntegrationError, Result};
use crate::solvers::{step_doubling, RK4};
use crate::state::State;
use crate::trajectory::{Acceptance, StepReport, Trajectory};
use crate::traits::{PlanarSystem, Steppable};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Upper bound on the up-front buffer reservation. Steps usually grow, so the
/// h0-based estimate overshoots; the buffers grow on demand past this.
const MAX_RESERVED_POINTS: usize = 4096;

/// Outcome of a single step-doubling trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    Grow,
    Keep,
    Reject,
}

impl TrialOutcome {
    fn acceptance(self) -> Option<Acceptance> {
        match self {
            TrialOutcome::Grow => Some(Acceptance::Grow),
            TrialOutcome::Keep => Some(Acceptance::Keep),
            TrialOutcome::Reject => None,
        }
    }
}

/// Classifies a trial by its estimated local error. First match wins.
pub fn classify(error: f64, tolerance: f64) -> TrialOutcome {
    if error <= tolerance / 2.0 {
        TrialOutcome::Grow
    } else if error <= tolerance {
        TrialOutcome::Keep
    } else {
        TrialOutcome::Reject
    }
}

/// How far the timestamp moves when a trial is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Advance by h/2, the width of one half step.
    #[default]
    HalfStep,
    /// Advance by h, the span actually covered by the two half steps.
    FullStep,
}

/// Settings controlling the adaptive integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveSettings {
    pub initial_step: f64,
    pub tolerance: f64,
    /// Factor by which h grows after a Grow and shrinks after a Reject.
    pub adaptation_factor: f64,
    /// Rejections allowed at one trajectory point before giving up.
    pub max_rejections: usize,
    pub min_step_size: f64,
    /// Cap on stored points, initial condition included.
    pub max_points: usize,
    pub timestamp_policy: TimestampPolicy,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self {
            initial_step: 0.01,
            tolerance: 1e-5,
            adaptation_factor: 1.5,
            max_rejections: 200,
            min_step_size: 1e-14,
            max_points: 1_000_000,
            timestamp_policy: TimestampPolicy::HalfStep,
        }
    }
}

impl AdaptiveSettings {
    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        self.initial_step = initial_step;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_rejections(mut self, max_rejections: usize) -> Self {
        self.max_rejections = max_rejections;
        self
    }

    pub fn with_min_step_size(mut self, min_step_size: f64) -> Self {
        self.min_step_size = min_step_size;
        self
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn with_timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.timestamp_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(IntegrationError::invalid(
                "initial_step",
                self.initial_step,
                "must be positive and finite",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(IntegrationError::invalid(
                "tolerance",
                self.tolerance,
                "must be positive and finite",
            ));
        }
        if !(self.adaptation_factor.is_finite() && self.adaptation_factor > 1.0) {
            return Err(IntegrationError::invalid(
                "adaptation_factor",
                self.adaptation_factor,
                "must be finite and greater than one",
            ));
        }
        if self.max_rejections == 0 {
            return Err(IntegrationError::invalid(
                "max_rejections",
                0.0,
                "must be at least one",
            ));
        }
        if !(self.min_step_size.is_finite() && self.min_step_size >= 0.0) {
            return Err(IntegrationError::invalid(
                "min_step_size",
                self.min_step_size,
                "must be non-negative and finite",
            ));
        }
        if self.max_points < 2 {
            return Err(IntegrationError::invalid(
                "max_points",
                self.max_points as f64,
                "must allow at least one step",
            ));
        }
        Ok(())
    }

    fn advance(&self, accepted_step: f64) -> f64 {
        match self.timestamp_policy {
            TimestampPolicy::HalfStep => accepted_step / 2.0,
            TimestampPolicy::FullStep => accepted_step,
        }
    }

    fn reserved_points(&self, t_final: f64) -> usize {
        let estimate = (t_final / self.advance(self.initial_step)).ceil() + 1.0;
        let cap = self.max_points.min(MAX_RESERVED_POINTS);
        if estimate.is_finite() && estimate < cap as f64 {
            estimate as usize
        } else {
            cap
        }
    }
}

/// Step-doubling adaptive integrator over any single-step solver.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveIntegrator<S = RK4> {
    settings: AdaptiveSettings,
    solver: S,
}

impl AdaptiveIntegrator<RK4> {
    pub fn new(settings: AdaptiveSettings) -> Self {
        Self::with_solver(settings, RK4)
    }
}

impl<S: Steppable<f64>> AdaptiveIntegrator<S> {
    pub fn with_solver(settings: AdaptiveSettings, solver: S) -> Self {
        Self { settings, solver }
    }

    pub fn settings(&self) -> &AdaptiveSettings {
        &self.settings
    }

    /// Integrates from `initial` at t = 0 until the last accepted timestamp is >= `t_final`.
    pub fn integrate(
        &self,
        system: &impl PlanarSystem<f64>,
        initial: State<f64>,
        t_final: f64,
    ) -> Result<Trajectory> {
        let settings = &self.settings;
        settings.validate()?;
        if !(t_final.is_finite() && t_final > 0.0) {
            return Err(IntegrationError::invalid(
                "t_final",
                t_final,
                "must be positive and finite",
            ));
        }
        if !initial.x.is_finite() {
            return Err(IntegrationError::invalid("x0", initial.x, "must be finite"));
        }
        if !initial.y.is_finite() {
            return Err(IntegrationError::invalid("y0", initial.y, "must be finite"));
        }

        let mut trajectory = Trajectory::start(initial, settings.reserved_points(t_final));
        let mut state = initial;
        let mut t = 0.0;
        let mut h = settings.initial_step;

        while t < t_final {
            if trajectory.len() >= settings.max_points {
                return Err(IntegrationError::MaxPointsExceeded {
                    max_points: settings.max_points,
                });
            }

            let initial_step = h;
            let mut rejections = 0usize;

            let (next, report) = loop {
                let trial = step_doubling(&self.solver, system, state, h);
                let finite = trial.is_finite();
                let outcome = if finite {
                    classify(trial.error, settings.tolerance)
                } else {
                    TrialOutcome::Reject
                };

                if let Some(acceptance) = outcome.acceptance() {
                    let report = StepReport {
                        initial_step,
                        accepted_step: h,
                        error: trial.error,
                        acceptance,
                        rejections,
                    };
                    if acceptance == Acceptance::Grow {
                        h *= settings.adaptation_factor;
                    }
                    break (trial.fine, report);
                }

                if finite {
                    trace!(
                        "rejected trial at t = {t}: error {:e} > tolerance {:e} with h = {h:e}",
                        trial.error,
                        settings.tolerance
                    );
                } else {
                    debug!("non-finite trial at t = {t} with h = {h:e}");
                }

                rejections += 1;
                if rejections > settings.max_rejections {
                    if !finite {
                        return Err(IntegrationError::NonFiniteState { t, h });
                    }
                    return Err(IntegrationError::NonConvergence { t, rejections });
                }
                let shrunk = h / settings.adaptation_factor;
                if shrunk < settings.min_step_size {
                    if !finite {
                        return Err(IntegrationError::NonFiniteState { t, h });
                    }
                    return Err(IntegrationError::StepSizeUnderflow { t, h: shrunk });
                }
                h = shrunk;
            };

            let t_next = t + settings.advance(report.accepted_step);
            if t_next <= t {
                // The step no longer moves time at this magnitude.
                return Err(IntegrationError::StepSizeUnderflow {
                    t,
                    h: report.accepted_step,
                });
            }
            trace!(
                "accepted t = {t_next} with h = {:e} ({:?}, error {:e})",
                report.accepted_step,
                report.acceptance,
                report.error
            );

            trajectory.push(t_next, next, report);
            state = next;
            t = t_next;
        }

        debug!(
            "integration reached t = {} in {} points with {} rejections; final h = {:e}",
            t,
            trajectory.len(),
            trajectory.rejections(),
            h
        );
        Ok(trajectory)
    }
}

/// Integrates the Brusselator with parameters `(a, b)` from `(x0, y0)` with the
/// default safeguards.
pub fn integrate(
    a: f64,
    b: f64,
    x0: f64,
    y0: f64,
    h0: f64,
    t_f: f64,
    err: f64,
) -> Result<Trajectory> {
    if !a.is_finite() {
        return Err(IntegrationError::invalid("a", a, "must be finite"));
    }
    if !b.is_finite() {
        return Err(IntegrationError::invalid("b", b, "must be finite"));
    }
    let settings = AdaptiveSettings::default()
        .with_initial_step(h0)
        .with_tolerance(err);
    AdaptiveIntegrator::new(settings).integrate(&Brusselator::new(a, b), State::new(x0, y0), t_f)
}
