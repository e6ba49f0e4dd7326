use crate::state::State;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in the integrator.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// An autonomous two-variable flow.
pub trait PlanarSystem<T: Scalar> {
    /// Evaluates the vector field (dx/dt, dy/dt) at `state`.
    fn vector_field(&self, state: State<T>) -> State<T>;
}

/// A trait for solvers that advance a planar system by one step.
pub trait Steppable<T: Scalar> {
    /// Returns the state reached after one step of size `h` from `state`.
    /// Must not mutate anything; the controller calls it for rejected trials too.
    fn step(&self, system: &impl PlanarSystem<T>, state: State<T>, h: T) -> State<T>;
}
