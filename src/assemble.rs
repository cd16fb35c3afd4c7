//! Assembly of the global Galerkin matrix and vector from element contributions.
//!
//! The serial path scatters each element contribution into the global
//! triplet matrix right away. The parallel path computes the element
//! contributions of all cells concurrently, then reduces them in cell order,
//! so both paths produce identical systems.

use crate::{
  error::FemResult,
  fe::{self, CellContext, ElmatProvider, ElvecProvider, LoadElvec, ReferenceElement},
  mesh::{CellIdx, Coord, TriangleMesh},
  quadrature::QuadRule,
  space::{DofHandler, DofIdx, FeSpace},
  sparse::SparseMatrix,
};

use rayon::prelude::*;

pub type GalMat = SparseMatrix;
pub type GalVec = na::DVector<f64>;

/// Global linear system `A u = b`.
#[derive(Debug, Clone)]
pub struct SparseSystem {
  pub matrix: GalMat,
  pub rhs: GalVec,
}

impl SparseSystem {
  pub fn ndofs(&self) -> usize {
    self.rhs.len()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyConfig {
  /// Order of the quadrature rule used on every cell.
  pub quad_order: usize,
  /// Compute element contributions on the rayon thread pool.
  pub parallel: bool,
}

impl Default for AssemblyConfig {
  fn default() -> Self {
    Self {
      quad_order: 2,
      parallel: false,
    }
  }
}

/// The parts of a space that can be shared between threads.
struct AssemblyView<'a> {
  mesh: &'a TriangleMesh,
  element: &'a dyn ReferenceElement,
  dof_handler: &'a DofHandler,
  quad: &'a QuadRule,
}

impl<'a> AssemblyView<'a> {
  fn new(space: &'a FeSpace, quad: &'a QuadRule) -> Self {
    Self {
      mesh: space.mesh().as_ref(),
      element: space.element(),
      dof_handler: space.dof_handler(),
      quad,
    }
  }

  fn cell_context(&self, icell: CellIdx) -> FemResult<CellContext<'a>> {
    Ok(CellContext {
      icell,
      map: self.mesh.cell_map(icell)?,
      element: self.element,
      quad: self.quad,
    })
  }

  fn local_triplets(
    &self,
    icell: CellIdx,
    elmat: &impl ElmatProvider,
  ) -> FemResult<Vec<(DofIdx, DofIdx, f64)>> {
    let cell = self.cell_context(icell)?;
    let elmat = elmat.eval(&cell);
    let dofs = self.dof_handler.local2global(icell);

    let mut local_triplets = Vec::with_capacity(dofs.len() * dofs.len());
    for (ilocal, &iglobal) in dofs.iter().enumerate() {
      for (jlocal, &jglobal) in dofs.iter().enumerate() {
        local_triplets.push((iglobal, jglobal, elmat[(ilocal, jlocal)]));
      }
    }
    Ok(local_triplets)
  }

  fn local_entries(
    &self,
    icell: CellIdx,
    elvec: &impl ElvecProvider,
  ) -> FemResult<Vec<(DofIdx, f64)>> {
    let cell = self.cell_context(icell)?;
    let elvec = elvec.eval(&cell);
    let dofs = self.dof_handler.local2global(icell);
    Ok(dofs.iter().copied().zip(elvec.iter().copied()).collect())
  }
}

/// Assembly algorithm for the Galerkin Matrix.
pub fn assemble_galmat(
  space: &FeSpace,
  quad: &QuadRule,
  elmat: impl ElmatProvider,
) -> FemResult<GalMat> {
  let view = AssemblyView::new(space, quad);
  let ndofs = space.ndofs();

  let mut galmat = GalMat::zeros(ndofs, ndofs);
  for icell in 0..view.mesh.ncells() {
    for (r, c, v) in view.local_triplets(icell, &elmat)? {
      galmat.push(r, c, v);
    }
  }
  tracing::debug!(ndofs, ntriplets = galmat.ntriplets(), "assembled galerkin matrix");
  Ok(galmat)
}

/// Assembly algorithm for the Galerkin Vector.
pub fn assemble_galvec(
  space: &FeSpace,
  quad: &QuadRule,
  elvec: impl ElvecProvider,
) -> FemResult<GalVec> {
  let view = AssemblyView::new(space, quad);

  let mut galvec = GalVec::zeros(space.ndofs());
  for icell in 0..view.mesh.ncells() {
    for (irow, v) in view.local_entries(icell, &elvec)? {
      galvec[irow] += v;
    }
  }
  Ok(galvec)
}

/// Parallel variant of [`assemble_galmat`] with identical output.
pub fn assemble_galmat_par(
  space: &FeSpace,
  quad: &QuadRule,
  elmat: impl ElmatProvider + Sync,
) -> FemResult<GalMat> {
  let view = AssemblyView::new(space, quad);
  let ndofs = space.ndofs();

  let cell_triplets: Vec<_> = (0..view.mesh.ncells())
    .into_par_iter()
    .map(|icell| view.local_triplets(icell, &elmat))
    .collect::<FemResult<_>>()?;

  let mut galmat = GalMat::zeros(ndofs, ndofs);
  for (r, c, v) in cell_triplets.into_iter().flatten() {
    galmat.push(r, c, v);
  }
  tracing::debug!(ndofs, ntriplets = galmat.ntriplets(), "assembled galerkin matrix in parallel");
  Ok(galmat)
}

/// Parallel variant of [`assemble_galvec`] with identical output.
pub fn assemble_galvec_par(
  space: &FeSpace,
  quad: &QuadRule,
  elvec: impl ElvecProvider + Sync,
) -> FemResult<GalVec> {
  let view = AssemblyView::new(space, quad);

  let cell_entries: Vec<_> = (0..view.mesh.ncells())
    .into_par_iter()
    .map(|icell| view.local_entries(icell, &elvec))
    .collect::<FemResult<_>>()?;

  let mut galvec = GalVec::zeros(space.ndofs());
  for (irow, v) in cell_entries.into_iter().flatten() {
    galvec[irow] += v;
  }
  Ok(galvec)
}

/// Assembles the Poisson system: the stiffness matrix of
/// $a(u, v) = integral nabla u dot nabla v$ and the load vector of
/// $L(v) = integral f v$.
pub fn assemble_poisson_system<F>(
  space: &FeSpace,
  source: F,
  config: &AssemblyConfig,
) -> FemResult<SparseSystem>
where
  F: Fn(&Coord) -> f64 + Sync,
{
  let quad = QuadRule::on_triangle(config.quad_order)?;
  let load = LoadElvec::new(source);

  let (matrix, rhs) = if config.parallel {
    (
      assemble_galmat_par(space, &quad, fe::laplace_elmat)?,
      assemble_galvec_par(space, &quad, load)?,
    )
  } else {
    (
      assemble_galmat(space, &quad, fe::laplace_elmat)?,
      assemble_galvec(space, &quad, load)?,
    )
  };
  Ok(SparseSystem { matrix, rhs })
}

#[cfg(test)]
mod test {
  use super::{assemble_galmat, assemble_poisson_system, AssemblyConfig};
  use crate::{
    error::FemError,
    fe,
    linalg::assert_mat_eq,
    mesh::{build_unit_square, Coord, TriangleMesh},
    quadrature::QuadRule,
    space::FeSpace,
  };

  use std::rc::Rc;

  #[test]
  fn single_square_stiffness() {
    let mesh = Rc::new(build_unit_square(1, 1).unwrap());
    let space = FeSpace::new(mesh, 1).unwrap();
    let quad = QuadRule::on_triangle(1).unwrap();
    let galmat = assemble_galmat(&space, &quad, fe::laplace_elmat).unwrap();

    // cells [0, 1, 3] and [0, 2, 3], diagonal 0-3 carries no coupling
    #[rustfmt::skip]
    let expected = 0.5 * na::DMatrix::from_row_slice(4, 4, &[
       2.0, -1.0, -1.0,  0.0,
      -1.0,  2.0,  0.0, -1.0,
      -1.0,  0.0,  2.0, -1.0,
       0.0, -1.0, -1.0,  2.0,
    ]);
    assert_mat_eq(&galmat.to_nalgebra_dense(), &expected);
  }

  #[test]
  fn shared_dofs_accumulate_from_all_cells() {
    let mesh = Rc::new(build_unit_square(2, 2).unwrap());
    let space = FeSpace::new(mesh, 1).unwrap();
    let system = assemble_poisson_system(&space, |_: &Coord| 1.0, &AssemblyConfig::default())
      .unwrap();

    // center vertex: 5-point stencil
    let center = 4;
    assert!((system.matrix.get(center, center) - 4.0).abs() < 1e-14);
    for neighbour in [1, 3, 5, 7] {
      assert!((system.matrix.get(center, neighbour) + 1.0).abs() < 1e-14);
    }
    // the center touches 6 cells of area 1/8, each contributing area/3
    assert!((system.rhs[center] - 6.0 / 24.0).abs() < 1e-14);
    // load integrates f = 1 over the unit square
    assert!((system.rhs.sum() - 1.0).abs() < 1e-14);
  }

  #[test]
  fn parallel_assembly_is_identical() {
    let mesh = Rc::new(build_unit_square(5, 3).unwrap());
    let space = FeSpace::new(mesh, 1).unwrap();
    let source = |x: &Coord| x.x.sin() * x.y;

    let serial = AssemblyConfig {
      quad_order: 3,
      parallel: false,
    };
    let parallel = AssemblyConfig {
      parallel: true,
      ..serial
    };
    let a = assemble_poisson_system(&space, source, &serial).unwrap();
    let b = assemble_poisson_system(&space, source, &parallel).unwrap();
    assert_eq!(a.matrix.triplets(), b.matrix.triplets());
    assert_eq!(a.rhs, b.rhs);
  }

  #[test]
  fn zero_area_cell_fails_assembly() {
    let vertices = vec![
      Coord::new(0.0, 0.0),
      Coord::new(1.0, 0.0),
      Coord::new(2.0, 0.0),
      Coord::new(0.0, 1.0),
    ];
    // first cell has three collinear vertices
    let mesh = Rc::new(TriangleMesh::new(vertices, vec![[0, 1, 2], [0, 1, 3]]));
    let space = FeSpace::new(mesh, 1).unwrap();
    for parallel in [false, true] {
      let config = AssemblyConfig {
        parallel,
        ..AssemblyConfig::default()
      };
      assert!(matches!(
        assemble_poisson_system(&space, |_: &Coord| 1.0, &config),
        Err(FemError::DegenerateCell { .. })
      ));
    }
  }
}
