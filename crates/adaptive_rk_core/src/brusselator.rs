use crate::state::State;
use crate::traits::{PlanarSystem, Scalar};
use serde::{Deserialize, Serialize};

/// The Brusselator chemical oscillator.
///
/// dx/dt = a - (b + 1) x + x^2 y
/// dy/dt = b x - x^2 y
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brusselator<T> {
    pub a: T,
    pub b: T,
}

impl<T: Scalar> Brusselator<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    /// The unique equilibrium (a, b/a). `None` when `a == 0`.
    pub fn fixed_point(&self) -> Option<State<T>> {
        if self.a.is_zero() {
            return None;
        }
        Some(State::new(self.a, self.b / self.a))
    }

    /// Row-major Jacobian of the vector field at `state`.
    pub fn jacobian(&self, state: State<T>) -> [T; 4] {
        let one = T::one();
        let two = one + one;
        let State { x, y } = state;
        let xy2 = two * x * y;
        let xx = x * x;
        [xy2 - (self.b + one), xx, self.b - xy2, -xx]
    }
}

impl<T: Scalar> PlanarSystem<T> for Brusselator<T> {
    fn vector_field(&self, state: State<T>) -> State<T> {
        let State { x, y } = state;
        let x2y = x * x * y;
        State {
            x: self.a - (self.b + T::one()) * x + x2y,
            y: self.b * x - x2y,
        }
    }
}
