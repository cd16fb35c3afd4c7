//! Discretization error of a FE solution against a known exact solution.

use crate::{
  assemble, fe,
  error::{FemError, FemResult},
  mesh::Coord,
  quadrature::QuadRule,
  space::FeSpace,
};

fn check_len(space: &FeSpace, solution: &na::DVector<f64>) -> FemResult<()> {
  if solution.len() != space.ndofs() {
    return Err(FemError::InvalidArgument(format!(
      "solution has {} coefficients, space has {} dofs",
      solution.len(),
      space.ndofs()
    )));
  }
  Ok(())
}

/// Cellwise quadrature sum `sum_K sum_q w_q g(x_q, u_h(x_q), nabla u_h(x_q)) |det J|`.
fn integrate<G>(
  space: &FeSpace,
  solution: &na::DVector<f64>,
  quad_order: usize,
  integrand: G,
) -> FemResult<f64>
where
  G: Fn(&Coord, f64, &na::Vector2<f64>) -> f64,
{
  check_len(space, solution)?;
  let quad = QuadRule::on_triangle(quad_order)?;
  let element = space.element();

  let mut sum = 0.0;
  for icell in 0..space.mesh().ncells() {
    let map = space.mesh().cell_map(icell)?;
    let coeffs = na::DVector::from_iterator(
      element.local_dof_count(),
      space.local2global(icell).iter().map(|&idof| solution[idof]),
    );
    for (xi, w) in quad.iter() {
      let x = map.apply(xi);
      let value = element.basis_functions(xi).dot(&coeffs);
      let grad = map.transform_gradients(&element.gradients(xi)) * &coeffs;
      sum += w * map.det_abs() * integrand(&x, value, &grad);
    }
  }
  Ok(sum)
}

/// $norm(u_h - u_e)_(L^2) = sqrt(integral (u_h - u_e)^2)$, evaluated with the
/// cellwise quadrature rule of order `quad_order`.
pub fn l2_error<F>(
  space: &FeSpace,
  solution: &na::DVector<f64>,
  exact: F,
  quad_order: usize,
) -> FemResult<f64>
where
  F: Fn(&Coord) -> f64,
{
  integrate(space, solution, quad_order, |x, uh, _| (uh - exact(x)).powi(2)).map(f64::sqrt)
}

/// $abs(u_h - u_e)_(H^1) = sqrt(integral abs(nabla u_h - nabla u_e)^2)$
pub fn h1_seminorm_error<F>(
  space: &FeSpace,
  solution: &na::DVector<f64>,
  exact_grad: F,
  quad_order: usize,
) -> FemResult<f64>
where
  F: Fn(&Coord) -> na::Vector2<f64>,
{
  integrate(space, solution, quad_order, |x, _, grad| {
    (grad - exact_grad(x)).norm_squared()
  })
  .map(f64::sqrt)
}

/// Maximum nodal deviation `max_d |u_h[d] - u_e(x_d)|`.
pub fn max_error<F>(solution: &na::DVector<f64>, exact: F, dof_coords: &[Coord]) -> FemResult<f64>
where
  F: Fn(&Coord) -> f64,
{
  if solution.len() != dof_coords.len() {
    return Err(FemError::InvalidArgument(format!(
      "solution has {} coefficients but {} dof coordinates are given",
      solution.len(),
      dof_coords.len()
    )));
  }
  Ok(
    solution
      .iter()
      .zip(dof_coords)
      .map(|(uh, x)| (uh - exact(x)).abs())
      .fold(0.0, f64::max),
  )
}

/// $norm(u_h)_(L^2) = sqrt(mu^T M mu)$ with the Galerkin mass matrix $M$.
pub fn l2_norm(space: &FeSpace, solution: &na::DVector<f64>, quad_order: usize) -> FemResult<f64> {
  check_len(space, solution)?;
  let quad = QuadRule::on_triangle(quad_order)?;
  let mass = assemble::assemble_galmat(space, &quad, fe::mass_elmat)?;
  Ok(solution.dot(&mass.mul_vec(solution)).sqrt())
}

#[cfg(test)]
mod test {
  use super::{h1_seminorm_error, l2_error, l2_norm, max_error};
  use crate::{
    error::FemError,
    mesh::{build_unit_square, Coord},
    space::FeSpace,
  };

  use approx::assert_relative_eq;
  use std::rc::Rc;

  fn p1_space(n: usize) -> FeSpace {
    let mesh = Rc::new(build_unit_square(n, n).unwrap());
    FeSpace::new(mesh, 1).unwrap()
  }

  fn interpolate(space: &FeSpace, f: impl Fn(&Coord) -> f64) -> na::DVector<f64> {
    na::DVector::from_iterator(space.ndofs(), space.dof_coords().iter().map(f))
  }

  #[test]
  fn linear_functions_are_reproduced() {
    let space = p1_space(3);
    let exact = |x: &Coord| 2.0 * x.x - 3.0 * x.y + 0.5;
    let uh = interpolate(&space, exact);

    assert!(l2_error(&space, &uh, exact, 2).unwrap() < 1e-14);
    assert!(max_error(&uh, exact, &space.dof_coords()).unwrap() < 1e-14);
    let grad = |_: &Coord| na::Vector2::new(2.0, -3.0);
    assert!(h1_seminorm_error(&space, &uh, grad, 1).unwrap() < 1e-13);
  }

  #[test]
  fn constant_offset_error_is_area() {
    let space = p1_space(2);
    let uh = na::DVector::from_element(space.ndofs(), 1.0);
    assert_relative_eq!(
      l2_error(&space, &uh, |_: &Coord| 0.0, 2).unwrap(),
      1.0,
      epsilon = 1e-14
    );
    assert_relative_eq!(l2_norm(&space, &uh, 2).unwrap(), 1.0, epsilon = 1e-14);
  }

  #[test]
  fn l2_norm_matches_l2_error_against_zero() {
    let space = p1_space(4);
    let uh = interpolate(&space, |x| (x.x * 3.0).sin() + x.y * x.y);
    let zero = |_: &Coord| 0.0;
    assert_relative_eq!(
      l2_norm(&space, &uh, 2).unwrap(),
      l2_error(&space, &uh, zero, 2).unwrap(),
      epsilon = 1e-13
    );
  }

  #[test]
  fn max_error_picks_largest_deviation() {
    let coords = [Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(0.0, 1.0)];
    let uh = na::DVector::from_column_slice(&[0.0, 1.5, 0.25]);
    let err = max_error(&uh, |x: &Coord| x.x, &coords).unwrap();
    assert_eq!(err, 0.5);
  }

  #[test]
  fn wrong_solution_length_is_rejected() {
    let space = p1_space(1);
    let uh = na::DVector::zeros(3);
    assert!(matches!(
      l2_error(&space, &uh, |_: &Coord| 0.0, 2),
      Err(FemError::InvalidArgument(_))
    ));
    assert!(matches!(
      max_error(&uh, |_: &Coord| 0.0, &space.dof_coords()),
      Err(FemError::InvalidArgument(_))
    ));
  }
}
