use thiserror::Error;

/// Failures of an adaptive integration run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// An input was out of its valid range.
    #[error("Invalid argument: {name} = {value} ({reason}).")]
    InvalidArgument {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// A trial produced NaN or infinity.
    #[error("Non-finite state encountered at t = {t} with step size h = {h}.")]
    NonFiniteState { t: f64, h: f64 },
    /// A rejection would have pushed the step size below the configured floor.
    #[error("Step size underflow at t = {t}: h = {h} is below the minimum step size.")]
    StepSizeUnderflow { t: f64, h: f64 },
    /// Too many consecutive rejections at a single trajectory point.
    #[error("Step size control failed to converge at t = {t} after {rejections} rejections.")]
    NonConvergence { t: f64, rejections: usize },
    /// The trajectory grew past the configured point cap.
    #[error("Maximum number of trajectory points ({max_points}) exceeded.")]
    MaxPointsExceeded { max_points: usize },
}

pub type Result<T> = std::result::Result<T, IntegrationError>;

impl IntegrationError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        IntegrationError::InvalidArgument {
            name,
            value,
            reason,
        }
    }
}
