use crate::{
  error::{FemError, FemResult},
  geometry::{AffineMap, RefCoord},
  mesh::Coord,
};

use itertools::izip;

/// Highest polynomial order for which a triangle rule is tabulated.
pub const MAX_ORDER: usize = 4;

/// A quadrature rule defined on the reference triangle.
///
/// The weights sum to the reference area `1/2`.
#[derive(Debug, Clone)]
pub struct QuadRule {
  order: usize,
  points: Vec<RefCoord>,
  weights: Vec<f64>,
}

impl QuadRule {
  /// Symmetric rule on the reference triangle,
  /// exact for polynomials of total degree `<= order`.
  pub fn on_triangle(order: usize) -> FemResult<Self> {
    let (exact_order, table): (usize, &[([f64; 3], f64)]) = match order {
      0 | 1 => (1, &CENTROID[..]),
      2 => (2, &STRANG_FIX_3[..]),
      3 | 4 => (4, &DUNAVANT_6[..]),
      _ => {
        return Err(FemError::InvalidArgument(format!(
          "no triangle quadrature rule of order {order} (max {MAX_ORDER})"
        )))
      }
    };
    // tabulated in barycentric coordinates for the unit-area triangle
    let points = table
      .iter()
      .map(|&([_, l1, l2], _)| RefCoord::new(l1, l2))
      .collect();
    let weights = table.iter().map(|&(_, w)| 0.5 * w).collect();
    Ok(Self {
      order: exact_order,
      points,
      weights,
    })
  }

  /// The polynomial order up to which this rule is exact.
  pub fn order(&self) -> usize {
    self.order
  }
  pub fn npoints(&self) -> usize {
    self.points.len()
  }
  pub fn points(&self) -> &[RefCoord] {
    &self.points
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }
  pub fn iter(&self) -> impl Iterator<Item = (&RefCoord, f64)> {
    self.points.iter().zip(self.weights.iter().copied())
  }

  /// Integrates over the reference triangle.
  pub fn apply_ref<F>(&self, f: F) -> f64
  where
    F: Fn(&RefCoord) -> f64,
  {
    izip!(&self.points, &self.weights)
      .map(|(xi, w)| w * f(xi))
      .sum()
  }

  /// Integrates over the image of the reference triangle under `map`.
  pub fn apply<F>(&self, f: F, map: &AffineMap) -> f64
  where
    F: Fn(&Coord) -> f64,
  {
    map.det_abs() * self.apply_ref(|xi| f(&map.apply(xi)))
  }
}

const THIRD: f64 = 1.0 / 3.0;

const CENTROID: [([f64; 3], f64); 1] = [([THIRD, THIRD, THIRD], 1.0)];

const STRANG_FIX_3: [([f64; 3], f64); 3] = [
  ([2.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0], THIRD),
  ([1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0], THIRD),
  ([1.0 / 6.0, 1.0 / 6.0, 2.0 / 3.0], THIRD),
];

const DUNAVANT_A: f64 = 0.445_948_490_915_965;
const DUNAVANT_B: f64 = 0.091_576_213_509_771;
const DUNAVANT_WA: f64 = 0.223_381_589_678_011;
const DUNAVANT_WB: f64 = 0.109_951_743_655_322;

const DUNAVANT_6: [([f64; 3], f64); 6] = [
  ([1.0 - 2.0 * DUNAVANT_A, DUNAVANT_A, DUNAVANT_A], DUNAVANT_WA),
  ([DUNAVANT_A, 1.0 - 2.0 * DUNAVANT_A, DUNAVANT_A], DUNAVANT_WA),
  ([DUNAVANT_A, DUNAVANT_A, 1.0 - 2.0 * DUNAVANT_A], DUNAVANT_WA),
  ([1.0 - 2.0 * DUNAVANT_B, DUNAVANT_B, DUNAVANT_B], DUNAVANT_WB),
  ([DUNAVANT_B, 1.0 - 2.0 * DUNAVANT_B, DUNAVANT_B], DUNAVANT_WB),
  ([DUNAVANT_B, DUNAVANT_B, 1.0 - 2.0 * DUNAVANT_B], DUNAVANT_WB),
];
