use crate::state::State;
use crate::traits::{PlanarSystem, Scalar, Steppable};

/// Classic Runge-Kutta 4th Order Solver.
/// Local truncation error is O(h^5).
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4;

impl<T: Scalar> Steppable<T> for RK4 {
    fn step(&self, system: &impl PlanarSystem<T>, state: State<T>, h: T) -> State<T> {
        let half = T::from_f64(0.5).unwrap();
        let sixth = T::from_f64(1.0 / 6.0).unwrap();
        let two = T::from_f64(2.0).unwrap();

        // k1 = f(y)
        let k1 = system.vector_field(state);
        // k2 = f(y + h*k1/2)
        let k2 = system.vector_field(state.advanced(k1, h * half));
        // k3 = f(y + h*k2/2)
        let k3 = system.vector_field(state.advanced(k2, h * half));
        // k4 = f(y + h*k3)
        let k4 = system.vector_field(state.advanced(k3, h));

        // y_next = y + h/6 * (k1 + 2k2 + 2k3 + k4)
        State {
            x: state.x + h * sixth * (k1.x + two * k2.x + two * k3.x + k4.x),
            y: state.y + h * sixth * (k1.y + two * k2.y + two * k3.y + k4.y),
        }
    }
}

/// Result of comparing one full step against two half steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubledStep<T> {
    /// One step of size h.
    pub coarse: State<T>,
    /// Two successive steps of size h/2.
    pub fine: State<T>,
    /// max(|fine.x - coarse.x|, |fine.y - coarse.y|)
    pub error: T,
}

impl<T: Scalar> DoubledStep<T> {
    pub fn is_finite(&self) -> bool {
        self.coarse.is_finite() && self.fine.is_finite() && self.error.is_finite()
    }
}

/// Step-doubling local error estimate around any single-step solver.
pub fn step_doubling<T: Scalar, S: Steppable<T>>(
    solver: &S,
    system: &impl PlanarSystem<T>,
    state: State<T>,
    h: T,
) -> DoubledStep<T> {
    let half_h = h * T::from_f64(0.5).unwrap();
    let coarse = solver.step(system, state, h);
    let midway = solver.step(system, state, half_h);
    let fine = solver.step(system, midway, half_h);
    DoubledStep {
        coarse,
        fine,
        error: fine.max_abs_diff(coarse),
    }
}
