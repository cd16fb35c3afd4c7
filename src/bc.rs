//! Essential (Dirichlet) boundary conditions.
//!
//! Constrained DOFs are eliminated from the system by lifting:
//! $mat(A_0, 0; 0, I) vec(mu_0, mu_diff) = vec(phi - A_(0 diff) gamma, gamma)$
//! which keeps the matrix symmetric positive-definite.

use crate::{
  assemble::SparseSystem,
  error::{FemError, FemResult},
  mesh::Coord,
  space::{DofIdx, FeSpace},
  util,
};

/// DOFs associated with the boundary facets of the mesh, sorted and unique.
pub fn locate_boundary_dofs(space: &FeSpace) -> Vec<DofIdx> {
  space.boundary_dofs()
}

/// Prescribed values on a subset of the DOFs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirichletBc {
  dof_values: Vec<(DofIdx, f64)>,
}

impl DirichletBc {
  pub fn new(dof_values: Vec<(DofIdx, f64)>) -> Self {
    Self { dof_values }
  }

  /// Evaluates `boundary_value` at the coordinates of each of `dofs`.
  pub fn evaluate<F>(dofs: &[DofIdx], dof_coords: &[Coord], boundary_value: F) -> FemResult<Self>
  where
    F: Fn(&Coord) -> f64,
  {
    let dof_values = dofs
      .iter()
      .map(|&idof| {
        let coord = dof_coords.get(idof).ok_or_else(|| {
          FemError::InvalidArgument(format!(
            "dof {idof} has no coordinate, only {} are given",
            dof_coords.len()
          ))
        })?;
        Ok::<_, FemError>((idof, boundary_value(coord)))
      })
      .collect::<FemResult<_>>()?;
    Ok(Self { dof_values })
  }

  /// The condition `u = boundary_value` on the whole boundary of the space.
  pub fn from_boundary<F>(space: &FeSpace, boundary_value: F) -> FemResult<Self>
  where
    F: Fn(&Coord) -> f64,
  {
    Self::evaluate(
      &locate_boundary_dofs(space),
      &space.dof_coords(),
      boundary_value,
    )
  }

  /// The condition `u = 0` on `dofs`.
  pub fn homogeneous(dofs: &[DofIdx]) -> Self {
    Self {
      dof_values: dofs.iter().map(|&idof| (idof, 0.0)).collect(),
    }
  }

  pub fn dof_values(&self) -> &[(DofIdx, f64)] {
    &self.dof_values
  }
  pub fn len(&self) -> usize {
    self.dof_values.len()
  }
  pub fn is_empty(&self) -> bool {
    self.dof_values.is_empty()
  }

  /// The prescribed value of `idof`, if it is constrained.
  pub fn value(&self, idof: DofIdx) -> Option<f64> {
    self
      .dof_values
      .iter()
      .rev()
      .find(|&&(i, _)| i == idof)
      .map(|&(_, v)| v)
  }

  /// Fixes the DOFs of the FE solution to the prescribed values.
  ///
  /// Modifies the supplied system in place, such that its solution has the
  /// given coefficients on the constrained DOFs. For a DOF listed more than
  /// once the last value wins. Applying the same condition twice leaves the
  /// system unchanged.
  pub fn apply(&self, system: &mut SparseSystem) -> FemResult<()> {
    let ndofs = system.ndofs();
    if !system.matrix.is_square() || system.matrix.nrows() != ndofs {
      return Err(FemError::InvalidArgument(format!(
        "system matrix is {}x{} but rhs has length {ndofs}",
        system.matrix.nrows(),
        system.matrix.ncols()
      )));
    }
    if let Some(&(idof, _)) = self.dof_values.iter().find(|&&(i, _)| i >= ndofs) {
      return Err(FemError::InvalidArgument(format!(
        "constrained dof {idof} out of range for {ndofs} dofs"
      )));
    }

    let dof_coeffs_opt = util::sparse_to_dense_data(self.dof_values.clone(), ndofs);
    let dof_coeffs_zeroed =
      na::DVector::from_iterator(ndofs, dof_coeffs_opt.iter().map(|v| v.unwrap_or(0.0)));

    // Lift the prescribed values to the right hand side.
    system.rhs -= system.matrix.mul_vec(&dof_coeffs_zeroed);

    // Set entries zero that share a (row or column) index with a fixed dof.
    system
      .matrix
      .set_zero(|r, c| dof_coeffs_opt[r].is_some() || dof_coeffs_opt[c].is_some());

    let mut nfixed = 0;
    for (idof, value) in dof_coeffs_opt.into_iter().enumerate() {
      if let Some(value) = value {
        system.matrix.push(idof, idof, 1.0);
        system.rhs[idof] = value;
        nfixed += 1;
      }
    }
    tracing::debug!(nfixed, "applied dirichlet boundary conditions");
    Ok(())
  }

  /// Consuming variant of [`DirichletBc::apply`].
  pub fn constrain(&self, mut system: SparseSystem) -> FemResult<SparseSystem> {
    self.apply(&mut system)?;
    Ok(system)
  }
}

#[cfg(test)]
mod test {
  use super::{locate_boundary_dofs, DirichletBc};
  use crate::{
    assemble::{assemble_poisson_system, AssemblyConfig, SparseSystem},
    error::FemError,
    linalg::assert_mat_eq,
    mesh::{build_unit_square, Coord},
    space::FeSpace,
    sparse::SparseMatrix,
  };

  use std::rc::Rc;

  fn poisson_system(n: usize) -> (FeSpace, SparseSystem) {
    let mesh = Rc::new(build_unit_square(n, n).unwrap());
    let space = FeSpace::new(mesh, 1).unwrap();
    let system =
      assemble_poisson_system(&space, |x: &Coord| x.x + 1.0, &AssemblyConfig::default()).unwrap();
    (space, system)
  }

  #[test]
  fn boundary_dofs_of_p1_are_boundary_vertices() {
    let (space, _) = poisson_system(3);
    let dofs = locate_boundary_dofs(&space);
    assert_eq!(dofs.len(), 12);
    assert!(!dofs.contains(&5));
    assert!(dofs.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn lifting_on_small_system() {
    #[rustfmt::skip]
    let dense = [
      (0, 0, 2.0), (0, 1, -1.0),
      (1, 0, -1.0), (1, 1, 2.0), (1, 2, -1.0),
      (2, 1, -1.0), (2, 2, 2.0),
    ];
    let mut system = SparseSystem {
      matrix: SparseMatrix::new(3, 3, dense.to_vec()),
      rhs: na::DVector::from_column_slice(&[1.0, 1.0, 1.0]),
    };
    DirichletBc::new(vec![(2, 3.0)]).apply(&mut system).unwrap();

    #[rustfmt::skip]
    let expected = na::DMatrix::from_row_slice(3, 3, &[
       2.0, -1.0, 0.0,
      -1.0,  2.0, 0.0,
       0.0,  0.0, 1.0,
    ]);
    assert_mat_eq(&system.matrix.to_nalgebra_dense(), &expected);
    // rhs[1] -= A[1,2] * 3
    assert_eq!(system.rhs, na::DVector::from_column_slice(&[1.0, 4.0, 3.0]));
  }

  #[test]
  fn apply_is_idempotent() {
    let (space, system) = poisson_system(4);
    let bc = DirichletBc::from_boundary(&space, |x: &Coord| x.x * x.x - x.y).unwrap();

    let once = bc.constrain(system).unwrap();
    let twice = bc.constrain(once.clone()).unwrap();
    assert_mat_eq(
      &once.matrix.to_nalgebra_dense(),
      &twice.matrix.to_nalgebra_dense(),
    );
    assert!((&once.rhs - &twice.rhs).amax() < 1e-14);
  }

  #[test]
  fn constrained_system_stays_symmetric() {
    let (space, system) = poisson_system(3);
    let bc = DirichletBc::from_boundary(&space, |x: &Coord| x.y).unwrap();
    let system = bc.constrain(system).unwrap();
    assert!(system.matrix.is_symmetric(1e-14));
    for &(idof, value) in bc.dof_values() {
      assert_eq!(system.matrix.get(idof, idof), 1.0);
      assert_eq!(system.rhs[idof], value);
    }
  }

  #[test]
  fn homogeneous_condition_zeroes_rhs() {
    let (space, system) = poisson_system(2);
    let dofs = locate_boundary_dofs(&space);
    let system = DirichletBc::homogeneous(&dofs).constrain(system).unwrap();
    for idof in dofs {
      assert_eq!(system.rhs[idof], 0.0);
    }
  }

  #[test]
  fn later_value_wins_for_repeated_dof() {
    let bc = DirichletBc::new(vec![(1, 2.0), (1, 5.0)]);
    assert_eq!(bc.value(1), Some(5.0));
    assert_eq!(bc.value(0), None);

    let mut system = SparseSystem {
      matrix: SparseMatrix::new(2, 2, vec![(0, 0, 1.0), (1, 1, 1.0)]),
      rhs: na::DVector::zeros(2),
    };
    bc.apply(&mut system).unwrap();
    assert_eq!(system.matrix.get(1, 1), 1.0);
    assert_eq!(system.rhs[1], 5.0);
  }

  #[test]
  fn out_of_range_dof_is_rejected() {
    let (_, mut system) = poisson_system(1);
    let result = DirichletBc::new(vec![(4, 1.0)]).apply(&mut system);
    assert!(matches!(result, Err(FemError::InvalidArgument(_))));
  }
}
