//! Module for the Poisson Equation, the prototypical elliptic PDE.
//!
//! $-Delta u = f$ in $Omega$, $u = u_D$ on $partial Omega$.

use crate::{
  assemble::{self, AssemblyConfig},
  bc::DirichletBc,
  error::FemResult,
  mesh::{
    cartesian::{CartesianMesh, Rect},
    Coord, TriangleMesh,
  },
  norm,
  solver::{LinearSolver, SolverKind},
  space::FeSpace,
};

use std::{fmt, rc::Rc};

/// Parameters of a Poisson solve on a rectangular domain.
#[derive(Debug, Clone, PartialEq)]
pub struct PoissonConfig {
  pub domain: Rect,
  pub nx: usize,
  pub ny: usize,
  pub degree: usize,
  /// Quadrature order of the assembly.
  pub quad_order: usize,
  /// Quadrature order of the L2 error.
  pub error_quad_order: usize,
  pub parallel: bool,
  pub solver: SolverKind,
}

impl Default for PoissonConfig {
  fn default() -> Self {
    Self {
      domain: Rect::new_unit_square(),
      nx: 8,
      ny: 8,
      degree: 1,
      quad_order: 2,
      error_quad_order: 4,
      parallel: false,
      solver: SolverKind::Cholesky,
    }
  }
}

impl PoissonConfig {
  pub fn with_resolution(self, nx: usize, ny: usize) -> Self {
    Self { nx, ny, ..self }
  }
  pub fn with_solver(self, solver: SolverKind) -> Self {
    Self { solver, ..self }
  }

  pub fn assembly(&self) -> AssemblyConfig {
    AssemblyConfig {
      quad_order: self.quad_order,
      parallel: self.parallel,
    }
  }

  pub fn build_space(&self) -> FemResult<FeSpace> {
    let mesh = CartesianMesh::new(self.domain.clone(), self.nx, self.ny)?.compute_mesh();
    FeSpace::new(Rc::new(mesh), self.degree)
  }
}

/// Solves the Poisson problem with source `source` and Dirichlet data
/// `boundary_value` on the whole boundary of `space`.
pub fn solve_poisson<F, G>(
  space: &FeSpace,
  source: F,
  boundary_value: G,
  assembly: &AssemblyConfig,
  solver: &dyn LinearSolver,
) -> FemResult<na::DVector<f64>>
where
  F: Fn(&Coord) -> f64 + Sync,
  G: Fn(&Coord) -> f64,
{
  let mut system = assemble::assemble_poisson_system(space, source, assembly)?;
  DirichletBc::from_boundary(space, boundary_value)?.apply(&mut system)?;
  solver.solve(&system.matrix, &system.rhs)
}

/// Outcome of a manufactured solution run.
#[derive(Debug, Clone)]
pub struct MmsReport {
  pub nx: usize,
  pub ny: usize,
  pub ndofs: usize,
  /// Mesh width, the longest edge.
  pub h: f64,
  pub mesh: Rc<TriangleMesh>,
  pub solution: na::DVector<f64>,
  pub error_l2: f64,
  pub error_max: f64,
}

impl fmt::Display for MmsReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "nx: {:4}, ny: {:4}, ndofs: {:6}, h: {:9.3e}, error_l2: {:9.3e}, error_max: {:9.3e}",
      self.nx, self.ny, self.ndofs, self.h, self.error_l2, self.error_max
    )
  }
}

/// Method of manufactured solutions: solves with `u_D = exact` and measures
/// the discretization error against `exact`, where `source = -Delta exact`.
pub fn run_manufactured<F, E>(config: &PoissonConfig, source: F, exact: E) -> FemResult<MmsReport>
where
  F: Fn(&Coord) -> f64 + Sync,
  E: Fn(&Coord) -> f64,
{
  let space = config.build_space()?;
  let solver = config.solver.build();
  let solution = solve_poisson(&space, source, &exact, &config.assembly(), solver.as_ref())?;

  let error_l2 = norm::l2_error(&space, &solution, &exact, config.error_quad_order)?;
  let error_max = norm::max_error(&solution, &exact, &space.dof_coords())?;

  let report = MmsReport {
    nx: config.nx,
    ny: config.ny,
    ndofs: space.ndofs(),
    h: space.mesh().mesh_width(),
    mesh: Rc::clone(space.mesh()),
    solution,
    error_l2,
    error_max,
  };
  tracing::debug!(%report, "manufactured solution run finished");
  Ok(report)
}

/// Observed algebraic order of the L2 error between two refinement levels,
/// $log(e_c / e_f) / log(h_c / h_f)$.
pub fn convergence_rate(coarse: &MmsReport, fine: &MmsReport) -> f64 {
  (coarse.error_l2 / fine.error_l2).ln() / (coarse.h / fine.h).ln()
}
