use crate::traits::Scalar;
use serde::{Deserialize, Serialize};

/// Instantaneous state (x, y) of a planar system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State<T> {
    pub x: T,
    pub y: T,
}

impl<T: Scalar> State<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Returns `self + h * rate`.
    pub fn advanced(self, rate: State<T>, h: T) -> Self {
        Self {
            x: self.x + h * rate.x,
            y: self.y + h * rate.y,
        }
    }

    /// Max-norm distance between two states.
    pub fn max_abs_diff(self, other: State<T>) -> T {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<T> From<(T, T)> for State<T> {
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::State;

    #[test]
    fn advanced_scales_rate_by_step() {
        let state = State::new(1.0, -2.0);
        let next = state.advanced(State::new(4.0, 8.0), 0.25);
        assert_eq!(next, State::new(2.0, 0.0));
    }

    #[test]
    fn max_abs_diff_takes_larger_component() {
        let a = State::new(1.0, 1.0);
        let b = State::new(1.5, -2.0);
        assert_eq!(a.max_abs_diff(b), 3.0);
        assert_eq!(b.max_abs_diff(a), 3.0);
    }

    #[test]
    fn max_abs_diff_ignores_single_nan_component() {
        let a = State::new(f64::NAN, 0.0);
        let b = State::new(0.0, 0.0);
        assert!(!a.is_finite());
        assert!(b.is_finite());
        // Float::max drops a NaN operand, so finiteness must be checked on the states.
        assert_eq!(a.max_abs_diff(b), 0.0);
    }
}
