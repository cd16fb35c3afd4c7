//! Solvers for symmetric positive-definite sparse systems.

use crate::{
  error::{FemError, FemResult},
  sparse::SparseMatrix,
};

use faer::solvers::SpSolver as _;

pub trait LinearSolver {
  /// Solves `matrix * x = rhs` for a symmetric positive-definite `matrix`.
  fn solve(&self, matrix: &SparseMatrix, rhs: &na::DVector<f64>) -> FemResult<na::DVector<f64>>;
}

/// Which linear solver the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverKind {
  Cholesky,
  ConjugateGradient {
    rel_tol: f64,
    max_iter: Option<usize>,
    jacobi: bool,
  },
}

impl Default for SolverKind {
  fn default() -> Self {
    Self::Cholesky
  }
}

impl SolverKind {
  pub fn conjugate_gradient() -> Self {
    Self::ConjugateGradient {
      rel_tol: ConjugateGradient::DEFAULT_REL_TOL,
      max_iter: None,
      jacobi: false,
    }
  }

  pub fn build(&self) -> Box<dyn LinearSolver> {
    match *self {
      Self::Cholesky => Box::new(CholeskySolver),
      Self::ConjugateGradient {
        rel_tol,
        max_iter,
        jacobi,
      } => {
        let mut cg = ConjugateGradient::new()
          .with_tolerance(rel_tol)
          .with_jacobi_preconditioner(jacobi);
        if let Some(max_iter) = max_iter {
          cg = cg.with_max_iter(max_iter);
        }
        Box::new(cg)
      }
    }
  }
}

fn check_system(matrix: &SparseMatrix, rhs: &na::DVector<f64>) -> FemResult<()> {
  if !matrix.is_square() || matrix.nrows() != rhs.len() {
    return Err(FemError::InvalidArgument(format!(
      "cannot solve {}x{} system with rhs of length {}",
      matrix.nrows(),
      matrix.ncols(),
      rhs.len()
    )));
  }
  let diagonal = matrix.diagonal();
  if let Some((idof, &d)) = diagonal.iter().enumerate().find(|&(_, &d)| !(d > 0.0)) {
    tracing::warn!(idof, diagonal = d, "non-positive diagonal entry");
    return Err(FemError::SingularSystem(format!(
      "diagonal entry {idof} is {d}, matrix is not positive-definite"
    )));
  }
  Ok(())
}

/// Direct solver through a sparse Cholesky factorization.
///
/// A semi-definite matrix, such as a Laplacian without Dirichlet rows, may
/// factorize on round-off pivots. Such solves are recognized by their
/// relative residual and rejected as [`FemError::SingularSystem`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CholeskySolver;

impl CholeskySolver {
  /// Largest accepted relative residual `||A x - b|| / ||b||`.
  pub const RESIDUAL_TOL: f64 = 1e-8;
}

impl LinearSolver for CholeskySolver {
  fn solve(&self, matrix: &SparseMatrix, rhs: &na::DVector<f64>) -> FemResult<na::DVector<f64>> {
    check_system(matrix, rhs)?;

    let cholesky = matrix
      .to_faer_csc()
      .sp_cholesky(faer::Side::Upper)
      .map_err(|err| {
        FemError::SingularSystem(format!("sparse cholesky factorization failed: {err:?}"))
      })?;

    let b = faer::col::from_slice(rhs.as_slice());
    let solution = na::DVector::from_vec(cholesky.solve(b).as_slice().to_vec());
    if solution.iter().any(|v| !v.is_finite()) {
      tracing::warn!("cholesky solve produced non-finite values");
      return Err(FemError::SingularSystem(
        "cholesky solve produced non-finite values".into(),
      ));
    }

    let b_norm = rhs.norm();
    if b_norm > 0.0 {
      let residual = (matrix.mul_vec(&solution) - rhs).norm() / b_norm;
      if !(residual <= Self::RESIDUAL_TOL) {
        tracing::warn!(residual, "cholesky factorization hit a round-off pivot");
        return Err(FemError::SingularSystem(format!(
          "cholesky solve has relative residual {residual:e}, matrix is numerically singular"
        )));
      }
    }
    tracing::debug!(ndofs = rhs.len(), "solved system by sparse cholesky");
    Ok(solution)
  }
}

/// Result of a conjugate gradient solve.
#[derive(Debug, Clone)]
pub struct CgOutput {
  pub solution: na::DVector<f64>,
  pub iterations: usize,
  /// Relative residual `||r|| / ||b||` of the returned solution.
  pub residual: f64,
}

/// (Preconditioned) Conjugate Gradient method.
///
/// Stops once the relative residual satisfies `||r|| <= rel_tol * ||b||`.
/// Without an explicit iteration budget, at most `max(10 n, 100)`
/// iterations are taken for an `n`x`n` system.
#[derive(Debug, Clone)]
pub struct ConjugateGradient {
  rel_tol: f64,
  max_iter: Option<usize>,
  jacobi: bool,
}

impl Default for ConjugateGradient {
  fn default() -> Self {
    Self::new()
  }
}

impl ConjugateGradient {
  pub const DEFAULT_REL_TOL: f64 = 1e-10;

  pub fn new() -> Self {
    Self {
      rel_tol: Self::DEFAULT_REL_TOL,
      max_iter: None,
      jacobi: false,
    }
  }

  pub fn with_tolerance(self, rel_tol: f64) -> Self {
    Self { rel_tol, ..self }
  }
  pub fn with_max_iter(self, max_iter: usize) -> Self {
    Self {
      max_iter: Some(max_iter),
      ..self
    }
  }
  pub fn with_jacobi_preconditioner(self, jacobi: bool) -> Self {
    Self { jacobi, ..self }
  }

  pub fn rel_tol(&self) -> f64 {
    self.rel_tol
  }
  pub fn max_iter(&self) -> Option<usize> {
    self.max_iter
  }

  #[allow(non_snake_case)]
  pub fn solve_with_stats(
    &self,
    matrix: &SparseMatrix,
    rhs: &na::DVector<f64>,
  ) -> FemResult<CgOutput> {
    check_system(matrix, rhs)?;
    if !(self.rel_tol > 0.0) {
      return Err(FemError::InvalidArgument(format!(
        "relative tolerance must be positive, got {}",
        self.rel_tol
      )));
    }

    let n = rhs.len();
    let max_iter = self.max_iter.unwrap_or((10 * n).max(100));
    let A = matrix.to_nalgebra_csr();
    // diagonal is positive after `check_system`
    let inv_diagonal = self
      .jacobi
      .then(|| matrix.diagonal().map(|d| d.recip()));
    let precondition = |r: &na::DVector<f64>| match &inv_diagonal {
      Some(inv_diagonal) => r.component_mul(inv_diagonal),
      None => r.clone(),
    };

    let b_norm = rhs.norm();
    let mut x = na::DVector::zeros(n);
    if b_norm == 0.0 {
      return Ok(CgOutput {
        solution: x,
        iterations: 0,
        residual: 0.0,
      });
    }

    let mut r = rhs.clone();
    let mut z = precondition(&r);
    let mut p = z.clone();
    let mut rz = r.dot(&z);

    let mut iterations = 0;
    loop {
      let residual = r.norm() / b_norm;
      if residual <= self.rel_tol {
        tracing::debug!(iterations, residual, "conjugate gradient converged");
        return Ok(CgOutput {
          solution: x,
          iterations,
          residual,
        });
      }
      if iterations >= max_iter {
        tracing::warn!(iterations, residual, "conjugate gradient budget exhausted");
        return Err(FemError::ConvergenceFailure {
          iterations,
          residual,
        });
      }

      let Ap: na::DVector<f64> = &A * &p;
      let pAp = p.dot(&Ap);
      if !(pAp > 0.0) {
        tracing::warn!(iterations, pAp, "indefinite operator in conjugate gradient");
        return Err(FemError::SingularSystem(format!(
          "search direction with p^T A p = {pAp} in iteration {iterations}"
        )));
      }

      let alpha = rz / pAp;
      x.axpy(alpha, &p, 1.0);
      r.axpy(-alpha, &Ap, 1.0);
      z = precondition(&r);

      let rz_next = r.dot(&z);
      let beta = rz_next / rz;
      rz = rz_next;
      p.axpy(1.0, &z, beta);

      iterations += 1;
    }
  }
}

impl LinearSolver for ConjugateGradient {
  fn solve(&self, matrix: &SparseMatrix, rhs: &na::DVector<f64>) -> FemResult<na::DVector<f64>> {
    self
      .solve_with_stats(matrix, rhs)
      .map(|output| output.solution)
  }
}
