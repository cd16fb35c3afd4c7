//! Reference finite elements and the element matrix/vector providers
//! built on top of them.

use crate::{
  geometry::{AffineMap, RefCoord},
  mesh::{CellIdx, Coord},
  quadrature::QuadRule,
};

/// Number of degrees of freedom attached to each kind of mesh entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DofLayout {
  pub per_vertex: usize,
  pub per_edge: usize,
  pub per_cell: usize,
}

impl DofLayout {
  pub fn local_dof_count(&self) -> usize {
    3 * self.per_vertex + 3 * self.per_edge + self.per_cell
  }
}

/// Capabilities of a finite element on the reference triangle.
///
/// Local DOFs are ordered vertex DOFs first (by local vertex),
/// then edge DOFs (by local edge, see [`crate::mesh::LOCAL_EDGES`]),
/// then cell DOFs.
pub trait ReferenceElement: Send + Sync {
  fn degree(&self) -> usize;
  fn dof_layout(&self) -> DofLayout;

  fn local_dof_count(&self) -> usize {
    self.dof_layout().local_dof_count()
  }

  /// Reference coordinates of the nodes, in local DOF order.
  fn nodes(&self) -> Vec<RefCoord>;

  /// Values of all local basis functions at `xi`.
  fn basis_functions(&self, xi: &RefCoord) -> na::DVector<f64>;

  /// Reference gradients of all local basis functions at `xi`, one per column.
  fn gradients(&self, xi: &RefCoord) -> na::Matrix2xX<f64>;
}

/// Continuous piecewise-linear Lagrange element.
///
/// $N_0 = 1 - x - y, N_1 = x, N_2 = y$
#[derive(Debug, Clone, Copy, Default)]
pub struct LagrangeP1;

impl ReferenceElement for LagrangeP1 {
  fn degree(&self) -> usize {
    1
  }
  fn dof_layout(&self) -> DofLayout {
    DofLayout {
      per_vertex: 1,
      per_edge: 0,
      per_cell: 0,
    }
  }

  fn nodes(&self) -> Vec<RefCoord> {
    vec![
      RefCoord::new(0.0, 0.0),
      RefCoord::new(1.0, 0.0),
      RefCoord::new(0.0, 1.0),
    ]
  }

  fn basis_functions(&self, xi: &RefCoord) -> na::DVector<f64> {
    na::DVector::from_column_slice(&[1.0 - xi.x - xi.y, xi.x, xi.y])
  }

  fn gradients(&self, _xi: &RefCoord) -> na::Matrix2xX<f64> {
    #[rustfmt::skip]
    let grads = na::Matrix2xX::from_column_slice(&[
      -1.0, -1.0,
       1.0,  0.0,
       0.0,  1.0,
    ]);
    grads
  }
}

/// Everything an element provider needs to know about a single cell.
pub struct CellContext<'a> {
  pub icell: CellIdx,
  pub map: AffineMap,
  pub element: &'a dyn ReferenceElement,
  pub quad: &'a QuadRule,
}

impl CellContext<'_> {
  /// Physical gradients of the local basis functions at `xi`.
  pub fn phys_gradients(&self, xi: &RefCoord) -> na::Matrix2xX<f64> {
    self.map.transform_gradients(&self.element.gradients(xi))
  }
}

pub trait ElmatProvider {
  fn eval(&self, cell: &CellContext) -> na::DMatrix<f64>;
}

impl<F> ElmatProvider for F
where
  F: Fn(&CellContext) -> na::DMatrix<f64>,
{
  fn eval(&self, cell: &CellContext) -> na::DMatrix<f64> {
    self(cell)
  }
}

pub trait ElvecProvider {
  fn eval(&self, cell: &CellContext) -> na::DVector<f64>;
}

impl<F> ElvecProvider for F
where
  F: Fn(&CellContext) -> na::DVector<f64>,
{
  fn eval(&self, cell: &CellContext) -> na::DVector<f64> {
    self(cell)
  }
}

/// Element Matrix Provider for the Laplacian bilinear form
/// $a(u, v) = integral nabla u dot nabla v dif x$.
///
/// $A_(i j) = sum_q w_q (nabla N_i dot nabla N_j)(xi_q) |det J|$
pub fn laplace_elmat(cell: &CellContext) -> na::DMatrix<f64> {
  let n = cell.element.local_dof_count();
  let det_abs = cell.map.det_abs();

  let mut elmat = na::DMatrix::zeros(n, n);
  for (xi, w) in cell.quad.iter() {
    let grads = cell.phys_gradients(xi);
    elmat += grads.transpose() * &grads * (w * det_abs);
  }
  elmat
}

/// Element Matrix Provider for the mass bilinear form
/// $m(u, v) = integral u v dif x$.
pub fn mass_elmat(cell: &CellContext) -> na::DMatrix<f64> {
  let n = cell.element.local_dof_count();
  let det_abs = cell.map.det_abs();

  let mut elmat = na::DMatrix::zeros(n, n);
  for (xi, w) in cell.quad.iter() {
    let phi = cell.element.basis_functions(xi);
    elmat += &phi * phi.transpose() * (w * det_abs);
  }
  elmat
}

/// Element Vector Provider for a scalar source function
/// $L(v) = integral f v dif x$.
///
/// $b_i = sum_q w_q f(x_q) N_i(xi_q) |det J|$, where $x_q$ is the
/// physical image of the quadrature point.
pub struct LoadElvec<F> {
  source: F,
}

impl<F> LoadElvec<F>
where
  F: Fn(&Coord) -> f64,
{
  pub fn new(source: F) -> Self {
    Self { source }
  }
}

impl<F> ElvecProvider for LoadElvec<F>
where
  F: Fn(&Coord) -> f64,
{
  fn eval(&self, cell: &CellContext) -> na::DVector<f64> {
    let n = cell.element.local_dof_count();
    let det_abs = cell.map.det_abs();

    let mut elvec = na::DVector::zeros(n);
    for (xi, w) in cell.quad.iter() {
      let x = cell.map.apply(xi);
      let phi = cell.element.basis_functions(xi);
      elvec += phi * (w * (self.source)(&x) * det_abs);
    }
    elvec
  }
}
