//! Verify the P1 Galerkin matrix of the negative Laplacian on cartesian
//! meshes by comparing to the tensor product finite difference operator.
//!
//! Mesh vertices are ordered lexicographically (x fastest).

// On the lower-left to upper-right split of a rectangle grid all diagonal
// couplings vanish, so the P1 stiffness matrix is the Kronecker sum
// $M_y times.o K_x + K_y times.o M_x$ of 1D Neumann stiffness $K$ and
// lumped 1D mass $M$.

extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

use poissonfem::{
  assemble, fe,
  linalg::assert_mat_eq,
  mesh::build_unit_square,
  quadrature::QuadRule,
  space::FeSpace,
};

use std::rc::Rc;

#[test]
fn fe_vs_fd() {
  for (nx, ny) in [(1, 1), (2, 2), (3, 2), (1, 4), (5, 3)] {
    let mesh = Rc::new(build_unit_square(nx, ny).unwrap());
    let space = FeSpace::new(mesh, 1).unwrap();
    let quad = QuadRule::on_triangle(1).unwrap();
    let fe_laplacian = assemble::assemble_galmat(&space, &quad, fe::laplace_elmat)
      .unwrap()
      .to_nalgebra_dense();

    let hx = (nx as f64).recip();
    let hy = (ny as f64).recip();
    let fd_laplacian = mass_1d(ny, hy).kronecker(&stiffness_1d_neumann(nx, hx))
      + stiffness_1d_neumann(ny, hy).kronecker(&mass_1d(nx, hx));

    println!("nx={nx} ny={ny}");
    assert_mat_eq(&fe_laplacian, &fd_laplacian);
  }
}

#[test]
fn galmat_is_symmetric_with_vanishing_row_sums() {
  let mesh = Rc::new(build_unit_square(7, 4).unwrap());
  let space = FeSpace::new(mesh, 1).unwrap();
  let quad = QuadRule::on_triangle(2).unwrap();
  let galmat = assemble::assemble_galmat(&space, &quad, fe::laplace_elmat).unwrap();

  assert!(galmat.is_symmetric(1e-14));
  // constants lie in the kernel of the Neumann Laplacian
  assert!(galmat.row_sums().amax() < 1e-13);
}

/// $1/h tridiag(-1, 2, -1)$ with halved corner entries.
fn stiffness_1d_neumann(ncells: usize, h: f64) -> na::DMatrix<f64> {
  let size = ncells + 1;
  let mut stiffness = na::DMatrix::zeros(size, size);
  for icell in 0..ncells {
    let [a, b] = [icell, icell + 1];
    stiffness[(a, a)] += 1.0;
    stiffness[(b, b)] += 1.0;
    stiffness[(a, b)] -= 1.0;
    stiffness[(b, a)] -= 1.0;
  }
  stiffness / h
}

/// Row-sum lumped 1D mass matrix.
fn mass_1d(ncells: usize, h: f64) -> na::DMatrix<f64> {
  let size = ncells + 1;
  let mut mass = na::DMatrix::zeros(size, size);
  for icell in 0..ncells {
    mass[(icell, icell)] += 0.5 * h;
    mass[(icell + 1, icell + 1)] += 0.5 * h;
  }
  mass
}
