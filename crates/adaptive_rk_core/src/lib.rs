pub mod adaptive;
pub mod brusselator;
pub mod equilibrium;
pub mod error;
pub mod solvers;
pub mod state;
pub mod trajectory;
/// The `adaptive_rk_core` crate integrates the Brusselator with classical RK4
/// under step-doubling step-size control.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `PlanarSystem` (two-variable flows), `Steppable` (single-step solvers).
/// - **Solvers**: RK4 and the step-doubling local error estimate.
/// - **Adaptive**: the accept/reject controller and the `integrate` entry point.
/// - **Trajectory**: accepted points, timestamps and per-step control reports.
/// - **Equilibrium**: the fixed point and its linear stability.
pub mod traits;

pub use adaptive::{integrate, AdaptiveIntegrator, AdaptiveSettings, TimestampPolicy};
pub use brusselator::Brusselator;
pub use error::IntegrationError;
pub use state::State;
pub use trajectory::Trajectory;
