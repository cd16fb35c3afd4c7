//! Boundary identification and Dirichlet elimination on the unit square.

extern crate nalgebra as na;

use poissonfem::{
  assemble::{assemble_poisson_system, AssemblyConfig, SparseSystem},
  bc::{locate_boundary_dofs, DirichletBc},
  linalg::assert_mat_eq,
  mesh::{build_unit_square, Coord},
  solver::{CholeskySolver, LinearSolver},
  space::FeSpace,
  sparse::SparseMatrix,
};

use std::rc::Rc;

#[test]
fn single_square_boundary() {
  let mesh = build_unit_square(1, 1).unwrap();
  let facets = mesh.boundary_facets();
  assert_eq!(facets.len(), 4);
  // the diagonal is shared by both cells
  assert!(!facets.contains(&[0, 3]));
  for facet in facets {
    assert_eq!(mesh.edge_cells(mesh.edges().position(|e| *e == facet).unwrap()).len(), 1);
  }
}

#[test]
fn boundary_dofs_cover_the_boundary() {
  let mesh = Rc::new(build_unit_square(4, 3).unwrap());
  let space = FeSpace::new(mesh, 1).unwrap();
  let coords = space.dof_coords();
  let dofs = locate_boundary_dofs(&space);
  assert_eq!(dofs.len(), 2 * (4 + 3));
  for (idof, x) in coords.iter().enumerate() {
    let on_boundary = x.x == 0.0 || x.x == 1.0 || x.y == 0.0 || x.y == 1.0;
    assert_eq!(dofs.contains(&idof), on_boundary, "dof {idof} at {x:?}");
  }
}

#[test]
fn dirichlet_elimination_is_idempotent() {
  let mesh = Rc::new(build_unit_square(5, 5).unwrap());
  let space = FeSpace::new(mesh, 1).unwrap();
  let system = assemble_poisson_system(
    &space,
    |x: &Coord| x.x * x.y,
    &AssemblyConfig::default(),
  )
  .unwrap();
  assert!(system.matrix.is_symmetric(1e-14));

  let bc = DirichletBc::from_boundary(&space, |x: &Coord| (x.x + 2.0 * x.y).cos()).unwrap();
  let mut once = system;
  bc.apply(&mut once).unwrap();
  let mut twice = once.clone();
  bc.apply(&mut twice).unwrap();

  assert_mat_eq(
    &once.matrix.to_nalgebra_dense(),
    &twice.matrix.to_nalgebra_dense(),
  );
  assert!((&once.rhs - &twice.rhs).amax() < 1e-14);
  assert!(once.matrix.is_symmetric(1e-14));

  let solution = CholeskySolver.solve(&once.matrix, &once.rhs).unwrap();
  for &(idof, value) in bc.dof_values() {
    assert!((solution[idof] - value).abs() < 1e-12);
  }
}

#[test]
fn small_spd_system() {
  let system = SparseSystem {
    matrix: SparseMatrix::new(
      2,
      2,
      vec![(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)],
    ),
    rhs: na::DVector::from_column_slice(&[1.0, 2.0]),
  };
  let x = CholeskySolver.solve(&system.matrix, &system.rhs).unwrap();
  assert!((x[0] - 1.0 / 11.0).abs() < 1e-14);
  assert!((x[1] - 7.0 / 11.0).abs() < 1e-14);
}
