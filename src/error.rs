use thiserror::Error;

pub type FemResult<T> = Result<T, FemError>;

/// Everything that can go wrong between building a mesh and measuring the
/// discretization error.
///
/// Construction errors (mesh, space) abort the pipeline. Solver errors carry
/// enough diagnostics for the caller to retry with another solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FemError {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("inconsistent mesh: {0}")]
  InconsistentMesh(String),

  /// Zero-area or numerically collapsed triangle.
  #[error("degenerate cell: |det J| = {det:e}")]
  DegenerateCell { det: f64 },

  #[error("system is not positive definite: {0}")]
  SingularSystem(String),

  #[error("no convergence after {iterations} iterations (relative residual {residual:e})")]
  ConvergenceFailure { iterations: usize, residual: f64 },
}
