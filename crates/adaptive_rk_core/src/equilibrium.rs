use crate::brusselator::Brusselator;
use crate::error::{IntegrationError, Result};
use crate::state::State;
use nalgebra::Matrix2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Real parts within this band of zero are treated as neutral.
const NEUTRAL_BAND: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stability {
    /// All eigenvalues have negative real part; trajectories spiral or decay in.
    Stable,
    /// Some eigenvalue has positive real part; for the Brusselator this means a limit cycle.
    Unstable,
    /// Largest real part is zero (Hopf threshold).
    Center,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquilibriumReport {
    pub state: State<f64>,
    /// Row-major 2x2 Jacobian at `state`.
    pub jacobian: [f64; 4],
    pub eigenvalues: Vec<Complex<f64>>,
    pub stability: Stability,
}

/// Locates the Brusselator fixed point and classifies its linear stability.
pub fn analyze_equilibrium(system: &Brusselator<f64>) -> Result<EquilibriumReport> {
    if !system.a.is_finite() {
        return Err(IntegrationError::invalid("a", system.a, "must be finite"));
    }
    if !system.b.is_finite() {
        return Err(IntegrationError::invalid("b", system.b, "must be finite"));
    }
    let state = system.fixed_point().ok_or_else(|| {
        IntegrationError::invalid("a", system.a, "no finite equilibrium when a = 0")
    })?;
    if !state.is_finite() {
        return Err(IntegrationError::invalid(
            "b",
            system.b,
            "fixed point b / a overflows",
        ));
    }

    let jacobian = system.jacobian(state);
    let matrix = Matrix2::from_row_slice(&jacobian);
    let eigenvalues: Vec<Complex<f64>> = matrix.complex_eigenvalues().iter().copied().collect();
    let stability = classify_stability(&eigenvalues);

    Ok(EquilibriumReport {
        state,
        jacobian,
        eigenvalues,
        stability,
    })
}

fn classify_stability(eigenvalues: &[Complex<f64>]) -> Stability {
    let leading = eigenvalues
        .iter()
        .map(|lambda| lambda.re)
        .fold(f64::NEG_INFINITY, f64::max);
    if leading > NEUTRAL_BAND {
        Stability::Unstable
    } else if leading < -NEUTRAL_BAND {
        Stability::Stable
    } else {
        Stability::Center
    }
}
