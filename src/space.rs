use crate::{
  error::{FemError, FemResult},
  fe::{DofLayout, LagrangeP1, ReferenceElement},
  geometry,
  mesh::{CellIdx, Coord, EdgeIdx, TriangleMesh, VertexIdx, LOCAL_EDGES},
};

use std::{ops::Range, rc::Rc};

pub type DofIdx = usize;

/// A Finite Element Space of continuous piecewise polynomials.
pub struct FeSpace {
  /// The underlying mesh of the space.
  mesh: Rc<TriangleMesh>,
  element: Box<dyn ReferenceElement>,
  /// Degrees-of-Freedom handler
  dof_handler: DofHandler,
}

impl FeSpace {
  /// The Lagrange space of the given polynomial degree on `mesh`.
  ///
  /// Only degree 1 is available.
  pub fn new(mesh: Rc<TriangleMesh>, degree: usize) -> FemResult<Self> {
    let element: Box<dyn ReferenceElement> = match degree {
      1 => Box::new(LagrangeP1),
      _ => {
        return Err(FemError::InvalidArgument(format!(
          "unsupported polynomial degree {degree}, only degree 1 is available"
        )))
      }
    };
    Self::with_element(mesh, element)
  }

  pub fn with_element(
    mesh: Rc<TriangleMesh>,
    element: Box<dyn ReferenceElement>,
  ) -> FemResult<Self> {
    mesh.validate()?;
    let dof_handler = DofHandler::new(&mesh, element.dof_layout());
    tracing::debug!(
      degree = element.degree(),
      ndofs = dof_handler.ndofs(),
      "numbered degrees of freedom"
    );
    Ok(Self {
      mesh,
      element,
      dof_handler,
    })
  }

  pub fn mesh(&self) -> &Rc<TriangleMesh> {
    &self.mesh
  }
  pub fn element(&self) -> &dyn ReferenceElement {
    self.element.as_ref()
  }
  pub fn degree(&self) -> usize {
    self.element.degree()
  }
  pub fn ndofs(&self) -> usize {
    self.dof_handler.ndofs()
  }
  pub fn dof_handler(&self) -> &DofHandler {
    &self.dof_handler
  }
  pub fn local2global(&self, icell: CellIdx) -> &[DofIdx] {
    self.dof_handler.local2global(icell)
  }

  /// Physical coordinates of the nodes carrying the DOFs.
  pub fn dof_coords(&self) -> Vec<Coord> {
    let mut coords = vec![Coord::zeros(); self.ndofs()];
    let nodes = self.element.nodes();
    for icell in 0..self.mesh.ncells() {
      let vertices = self.mesh.cell_coords(icell);
      for (&idof, node) in self.local2global(icell).iter().zip(&nodes) {
        coords[idof] = geometry::ref2phys(&vertices, node);
      }
    }
    coords
  }

  /// DOFs living on the boundary facets, in ascending order.
  pub fn boundary_dofs(&self) -> Vec<DofIdx> {
    let mut dofs: Vec<_> = self
      .mesh
      .boundary_vertices()
      .into_iter()
      .flat_map(|ivertex| self.dof_handler.vertex_dofs(ivertex))
      .chain(
        self
          .mesh
          .boundary_edge_indices()
          .flat_map(|iedge| self.dof_handler.edge_dofs(iedge)),
      )
      .collect();
    dofs.sort_unstable();
    dofs
  }
}

/// Global numbering of the degrees of freedom.
///
/// Vertex DOFs come first (by vertex), then edge DOFs (by edge),
/// then cell DOFs (by cell). This makes the numbering dense and,
/// for P1, identical to the vertex numbering.
pub struct DofHandler {
  layout: DofLayout,
  nvertices: usize,
  nedges: usize,
  ncells: usize,
  local2global_idx: Vec<Vec<DofIdx>>,
}

impl DofHandler {
  pub fn new(mesh: &TriangleMesh, layout: DofLayout) -> Self {
    let mut this = Self {
      layout,
      nvertices: mesh.nvertices(),
      nedges: mesh.nedges(),
      ncells: mesh.ncells(),
      local2global_idx: Vec::with_capacity(mesh.ncells()),
    };

    for (icell, cell) in mesh.cells().iter().enumerate() {
      let mut dofs = Vec::with_capacity(layout.local_dof_count());
      for &ivertex in cell {
        dofs.extend(this.vertex_dofs(ivertex));
      }
      for (ilocal, &iedge) in mesh.cell_edges(icell).iter().enumerate() {
        let [a, b] = LOCAL_EDGES[ilocal];
        let edge_dofs = this.edge_dofs(iedge);
        // DOFs along an edge follow the ascending global vertex direction
        if cell[a] < cell[b] {
          dofs.extend(edge_dofs);
        } else {
          dofs.extend(edge_dofs.rev());
        }
      }
      dofs.extend(this.cell_dofs(icell));
      this.local2global_idx.push(dofs);
    }
    this
  }

  pub fn layout(&self) -> DofLayout {
    self.layout
  }

  pub fn ndofs(&self) -> usize {
    self.nvertices * self.layout.per_vertex
      + self.nedges * self.layout.per_edge
      + self.ncells * self.layout.per_cell
  }

  pub fn local2global(&self, icell: CellIdx) -> &[DofIdx] {
    &self.local2global_idx[icell]
  }

  pub fn vertex_dofs(&self, ivertex: VertexIdx) -> Range<DofIdx> {
    let n = self.layout.per_vertex;
    ivertex * n..(ivertex + 1) * n
  }

  pub fn edge_dofs(&self, iedge: EdgeIdx) -> Range<DofIdx> {
    let offset = self.nvertices * self.layout.per_vertex;
    let n = self.layout.per_edge;
    offset + iedge * n..offset + (iedge + 1) * n
  }

  pub fn cell_dofs(&self, icell: CellIdx) -> Range<DofIdx> {
    let offset = self.nvertices * self.layout.per_vertex + self.nedges * self.layout.per_edge;
    let n = self.layout.per_cell;
    offset + icell * n..offset + (icell + 1) * n
  }
}
