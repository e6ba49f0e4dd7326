//! Storage for an adaptively integrated trajectory.
//!
//! Points are appended only on acceptance. The three coordinate columns
//! always have equal length and index 0 is the initial condition at t = 0.

use crate::state::State;
use serde::{Deserialize, Serialize};

/// How an accepted trial affected the step size of the next trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acceptance {
    /// Error at most half the tolerance; the step grows.
    Grow,
    /// Error within tolerance; the step is kept.
    Keep,
}

/// Step-control record for one accepted trajectory point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step size of the first trial at this point.
    pub initial_step: f64,
    /// Step size of the accepted trial.
    pub accepted_step: f64,
    /// Estimated local error of the accepted trial.
    pub error: f64,
    pub acceptance: Acceptance,
    /// Trials rejected before acceptance.
    pub rejections: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "TrajectoryColumns")]
pub struct Trajectory {
    xs: Vec<f64>,
    ys: Vec<f64>,
    ts: Vec<f64>,
    reports: Vec<StepReport>,
}

/// Unchecked wire form of a [`Trajectory`].
#[derive(Deserialize)]
struct TrajectoryColumns {
    xs: Vec<f64>,
    ys: Vec<f64>,
    ts: Vec<f64>,
    reports: Vec<StepReport>,
}

impl TryFrom<TrajectoryColumns> for Trajectory {
    type Error = String;

    fn try_from(columns: TrajectoryColumns) -> Result<Self, Self::Error> {
        let TrajectoryColumns { xs, ys, ts, reports } = columns;
        if xs.len() != ts.len() || ys.len() != ts.len() {
            return Err(format!(
                "column lengths differ: xs = {}, ys = {}, ts = {}",
                xs.len(),
                ys.len(),
                ts.len()
            ));
        }
        if !ts.is_empty() && reports.len() + 1 != ts.len() {
            return Err(format!(
                "expected {} step reports for {} points, got {}",
                ts.len() - 1,
                ts.len(),
                reports.len()
            ));
        }
        if ts.is_empty() && !reports.is_empty() {
            return Err("step reports without points".to_string());
        }
        if ts.windows(2).any(|pair| !(pair[1] > pair[0])) {
            return Err("timestamps are not strictly increasing".to_string());
        }
        Ok(Self {
            xs,
            ys,
            ts,
            reports,
        })
    }
}

impl Trajectory {
    /// Starts a trajectory at `initial` with t = 0, reserving room for `capacity` points.
    pub(crate) fn start(initial: State<f64>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut xs = Vec::with_capacity(capacity);
        let mut ys = Vec::with_capacity(capacity);
        let mut ts = Vec::with_capacity(capacity);
        xs.push(initial.x);
        ys.push(initial.y);
        ts.push(0.0);
        Self {
            xs,
            ys,
            ts,
            reports: Vec::with_capacity(capacity - 1),
        }
    }

    pub(crate) fn push(&mut self, t: f64, state: State<f64>, report: StepReport) {
        debug_assert!(t > self.final_time());
        self.xs.push(state.x);
        self.ys.push(state.y);
        self.ts.push(t);
        self.reports.push(report);
    }

    pub fn len(&self) -> usize {
        self.ts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ts.is_empty()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn ts(&self) -> &[f64] {
        &self.ts
    }

    /// Step reports for points 1..len(); the initial point has none.
    pub fn reports(&self) -> &[StepReport] {
        &self.reports
    }

    pub fn state(&self, index: usize) -> Option<State<f64>> {
        Some(State::new(*self.xs.get(index)?, *self.ys.get(index)?))
    }

    /// Iterates over `(t, state)` pairs in time order.
    pub fn states(&self) -> impl Iterator<Item = (f64, State<f64>)> + '_ {
        self.ts
            .iter()
            .zip(self.xs.iter().zip(self.ys.iter()))
            .map(|(&t, (&x, &y))| (t, State::new(x, y)))
    }

    pub fn last(&self) -> Option<(f64, State<f64>)> {
        let i = self.len().checked_sub(1)?;
        Some((self.ts[i], self.state(i)?))
    }

    pub fn final_time(&self) -> f64 {
        self.ts.last().copied().unwrap_or(0.0)
    }

    /// Total rejected trials over the whole run.
    pub fn rejections(&self) -> usize {
        self.reports.iter().map(|r| r.rejections).sum()
    }

    /// Splits into the `(xs, ys, ts)` columns.
    pub fn into_columns(self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.xs, self.ys, self.ts)
    }
}

#[cfg(test)]
mod tests {
    use super::{Acceptance, StepReport, Trajectory, TrajectoryColumns};
    use crate::state::State;

    fn report(h: f64) -> StepReport {
        StepReport {
            initial_step: h,
            accepted_step: h,
            error: 0.0,
            acceptance: Acceptance::Keep,
            rejections: 1,
        }
    }

    #[test]
    fn start_holds_initial_condition_at_time_zero() {
        let trajectory = Trajectory::start(State::new(3.0, 3.0), 16);
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory.ts(), &[0.0]);
        assert_eq!(trajectory.state(0), Some(State::new(3.0, 3.0)));
        assert!(trajectory.reports().is_empty());
        assert_eq!(trajectory.final_time(), 0.0);
    }

    #[test]
    fn push_keeps_columns_aligned() {
        let mut trajectory = Trajectory::start(State::new(0.0, 1.0), 0);
        trajectory.push(0.5, State::new(1.0, 2.0), report(1.0));
        trajectory.push(1.25, State::new(2.0, 3.0), report(1.5));

        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.xs().len(), trajectory.ys().len());
        assert_eq!(trajectory.ts().len(), trajectory.xs().len());
        assert_eq!(trajectory.reports().len(), 2);
        assert_eq!(trajectory.last(), Some((1.25, State::new(2.0, 3.0))));
        assert_eq!(trajectory.rejections(), 2);

        let collected: Vec<_> = trajectory.states().collect();
        assert_eq!(collected[1], (0.5, State::new(1.0, 2.0)));
    }

    #[test]
    fn into_columns_returns_xs_ys_ts() {
        let mut trajectory = Trajectory::start(State::new(0.0, 1.0), 2);
        trajectory.push(0.5, State::new(1.0, 2.0), report(1.0));
        let (xs, ys, ts) = trajectory.into_columns();
        assert_eq!(xs, vec![0.0, 1.0]);
        assert_eq!(ys, vec![1.0, 2.0]);
        assert_eq!(ts, vec![0.0, 0.5]);
    }

    fn columns(xs: Vec<f64>, ys: Vec<f64>, ts: Vec<f64>, reports: usize) -> TrajectoryColumns {
        TrajectoryColumns {
            xs,
            ys,
            ts,
            reports: (0..reports).map(|_| report(0.1)).collect(),
        }
    }

    #[test]
    fn columns_with_mismatched_lengths_are_rejected() {
        let err = Trajectory::try_from(columns(vec![1.0], vec![], vec![0.0], 0))
            .expect_err("ys is shorter than ts");
        assert!(err.contains("column lengths differ"));

        let err = Trajectory::try_from(columns(vec![1.0, 2.0], vec![1.0, 2.0], vec![0.0, 0.5], 0))
            .expect_err("one report is missing");
        assert!(err.contains("step reports"));

        let err = Trajectory::try_from(columns(vec![1.0, 2.0], vec![1.0, 2.0], vec![0.5, 0.5], 1))
            .expect_err("time does not advance");
        assert!(err.contains("strictly increasing"));
    }

    #[test]
    fn consistent_columns_round_trip_through_try_from() {
        let trajectory =
            Trajectory::try_from(columns(vec![1.0, 2.0], vec![3.0, 4.0], vec![0.0, 0.5], 1))
                .expect("consistent columns");
        assert_eq!(trajectory.last(), Some((0.5, State::new(2.0, 4.0))));

        let empty = Trajectory::try_from(columns(vec![], vec![], vec![], 0)).expect("empty");
        assert!(empty.is_empty());
        assert_eq!(empty.last(), None);
        assert_eq!(Trajectory::default().last(), None);
    }
}
