//! A mesh is the container of the triangles covering the domain.
//! It provides a global numbering of vertices, cells and edges,
//! the incidence between them and the vertex coordinates.
//!
//! Meshes are built once and never mutated afterwards. They are shared
//! between the function space and the evaluators through `Rc`.

pub mod boundary;
pub mod cartesian;

pub use cartesian::build_unit_square;

use crate::{
  error::{FemError, FemResult},
  geometry::AffineMap,
};

use indexmap::IndexMap;
use itertools::Itertools as _;

pub type VertexIdx = usize;
pub type CellIdx = usize;
pub type EdgeIdx = usize;

/// Physical coordinate of a point in the plane.
pub type Coord = na::Vector2<f64>;

/// A triangle given by its three vertex indices.
pub type Cell = [VertexIdx; 3];

/// An edge given by its two vertex indices in ascending order.
pub type Edge = [VertexIdx; 2];

/// Local vertex pairs spanning the edges of a triangle,
/// in lexicographic order.
pub const LOCAL_EDGES: [[usize; 2]; 3] = [[0, 1], [0, 2], [1, 2]];

#[derive(Debug, Clone)]
pub struct TriangleMesh {
  vertices: Vec<Coord>,
  cells: Vec<Cell>,
  /// Every edge together with the cells containing it,
  /// in order of first appearance.
  edges: IndexMap<Edge, Vec<CellIdx>>,
  /// Per cell, the global index of each local edge (see [`LOCAL_EDGES`]).
  cell_edges: Vec<[EdgeIdx; 3]>,
}

impl TriangleMesh {
  /// Builds the mesh topology from raw vertices and cells.
  ///
  /// No validation happens here; see [`TriangleMesh::validate`].
  pub fn new(vertices: Vec<Coord>, cells: Vec<Cell>) -> Self {
    let mut edges: IndexMap<Edge, Vec<CellIdx>> = IndexMap::new();
    let mut cell_edges = Vec::with_capacity(cells.len());

    for (icell, cell) in cells.iter().enumerate() {
      let mut local_edges = [0; 3];
      for (iedge, [a, b]) in LOCAL_EDGES.into_iter().enumerate() {
        let edge = sorted_edge(cell[a], cell[b]);
        let entry = edges.entry(edge);
        local_edges[iedge] = entry.index();
        entry.or_default().push(icell);
      }
      cell_edges.push(local_edges);
    }

    tracing::debug!(
      nvertices = vertices.len(),
      ncells = cells.len(),
      nedges = edges.len(),
      "built triangle mesh"
    );

    Self {
      vertices,
      cells,
      edges,
      cell_edges,
    }
  }

  /// Checks that the connectivity describes a conforming triangulation.
  ///
  /// Every cell must reference three distinct, existing vertices and every
  /// edge must be shared by at most two cells.
  pub fn validate(&self) -> FemResult<()> {
    let nvertices = self.nvertices();
    for (icell, cell) in self.cells.iter().enumerate() {
      if let Some(&ivertex) = cell.iter().find(|&&v| v >= nvertices) {
        return Err(FemError::InconsistentMesh(format!(
          "cell {icell} references vertex {ivertex}, but the mesh only has {nvertices} vertices"
        )));
      }
      if !cell.iter().all_unique() {
        return Err(FemError::InconsistentMesh(format!(
          "cell {icell} repeats a vertex: {cell:?}"
        )));
      }
    }
    if let Some((edge, cells)) = self.edges.iter().find(|(_, cells)| cells.len() > 2) {
      return Err(FemError::InconsistentMesh(format!(
        "edge {edge:?} is shared by {} cells",
        cells.len()
      )));
    }
    Ok(())
  }

  pub fn nvertices(&self) -> usize {
    self.vertices.len()
  }
  pub fn ncells(&self) -> usize {
    self.cells.len()
  }
  pub fn nedges(&self) -> usize {
    self.edges.len()
  }

  pub fn vertices(&self) -> &[Coord] {
    &self.vertices
  }
  pub fn vertex(&self, ivertex: VertexIdx) -> &Coord {
    &self.vertices[ivertex]
  }
  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }
  pub fn cell(&self, icell: CellIdx) -> &Cell {
    &self.cells[icell]
  }

  /// All edges, in order of first appearance while traversing the cells.
  pub fn edges(&self) -> impl ExactSizeIterator<Item = &Edge> {
    self.edges.keys()
  }
  pub fn edge(&self, iedge: EdgeIdx) -> &Edge {
    self
      .edges
      .get_index(iedge)
      .map(|(edge, _)| edge)
      .expect("edge index out of range")
  }
  /// The cells containing the given edge.
  pub fn edge_cells(&self, iedge: EdgeIdx) -> &[CellIdx] {
    self
      .edges
      .get_index(iedge)
      .map(|(_, cells)| cells.as_slice())
      .expect("edge index out of range")
  }
  pub fn cell_edges(&self, icell: CellIdx) -> &[EdgeIdx; 3] {
    &self.cell_edges[icell]
  }

  pub fn cell_coords(&self, icell: CellIdx) -> [Coord; 3] {
    self.cells[icell].map(|ivertex| self.vertices[ivertex])
  }

  /// The affine map from the reference triangle onto the given cell.
  pub fn cell_map(&self, icell: CellIdx) -> FemResult<AffineMap> {
    AffineMap::new(&self.cell_coords(icell)).inspect_err(|err| {
      tracing::warn!(icell, %err, "cell has no invertible reference map");
    })
  }

  /// The mesh width `h`: the length of the longest edge.
  pub fn mesh_width(&self) -> f64 {
    self
      .edges
      .keys()
      .map(|&[a, b]| (self.vertices[b] - self.vertices[a]).norm())
      .fold(0.0, f64::max)
  }
}

pub fn sorted_edge(a: VertexIdx, b: VertexIdx) -> Edge {
  if a <= b {
    [a, b]
  } else {
    [b, a]
  }
}
