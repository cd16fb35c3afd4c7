use crate::{
  error::{FemError, FemResult},
  mesh::Coord,
};

/// Coordinate on the reference triangle `(0,0), (1,0), (0,1)`.
pub type RefCoord = na::Vector2<f64>;

/// The (unsigned) area of the reference triangle.
pub const REF_AREA: f64 = 0.5;

/// Cells with `|det J| <= DEGENERACY_TOL * |J|^2` are considered collapsed.
/// Relative to the Jacobian's size, so the test is invariant under scaling.
pub const DEGENERACY_TOL: f64 = 1e-12;

/// Image of a reference point on the triangle spanned by `vertices`,
/// through its barycentric coordinates. Reproduces the vertices exactly.
pub fn ref2phys(vertices: &[Coord; 3], xi: &RefCoord) -> Coord {
  let bary = [1.0 - xi.x - xi.y, xi.x, xi.y];
  vertices
    .iter()
    .zip(bary)
    .fold(Coord::zeros(), |x, (v, l)| x + v * l)
}

/// The affine map `x = J xi + x0` from the reference triangle
/// onto a physical triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineMap {
  translation: Coord,
  jacobian: na::Matrix2<f64>,
  det: f64,
  /// $J^(-T)$, maps reference gradients to physical gradients.
  inv_transpose: na::Matrix2<f64>,
}

impl AffineMap {
  /// Fails with [`FemError::DegenerateCell`] for zero-area
  /// (or numerically collapsed) triangles.
  pub fn new(vertices: &[Coord; 3]) -> FemResult<Self> {
    let translation = vertices[0];
    let jacobian =
      na::Matrix2::from_columns(&[vertices[1] - vertices[0], vertices[2] - vertices[0]]);
    let det = jacobian.determinant();

    if !(det.abs() > DEGENERACY_TOL * jacobian.norm_squared()) {
      return Err(FemError::DegenerateCell { det });
    }
    let inverse = jacobian
      .try_inverse()
      .ok_or(FemError::DegenerateCell { det })?;

    Ok(Self {
      translation,
      jacobian,
      det,
      inv_transpose: inverse.transpose(),
    })
  }

  pub fn jacobian(&self) -> &na::Matrix2<f64> {
    &self.jacobian
  }
  /// Signed determinant. Negative for clockwise cells.
  pub fn det(&self) -> f64 {
    self.det
  }
  pub fn det_abs(&self) -> f64 {
    self.det.abs()
  }
  pub fn inv_transpose(&self) -> &na::Matrix2<f64> {
    &self.inv_transpose
  }
  /// The physical area of the image triangle.
  pub fn area(&self) -> f64 {
    REF_AREA * self.det_abs()
  }

  pub fn apply(&self, xi: &RefCoord) -> Coord {
    self.jacobian * xi + self.translation
  }

  /// $nabla_"phys" N_i = J^(-T) nabla_"ref" N_i$, column-wise.
  pub fn transform_gradients(&self, ref_gradients: &na::Matrix2xX<f64>) -> na::Matrix2xX<f64> {
    self.inv_transpose * ref_gradients
  }
}
