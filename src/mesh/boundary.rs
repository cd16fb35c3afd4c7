use super::{CellIdx, Edge, EdgeIdx, TriangleMesh, VertexIdx};
use crate::util;

use itertools::Itertools;

impl TriangleMesh {
  pub fn has_boundary(&self) -> bool {
    self.boundary_edge_indices().next().is_some()
  }

  /// Indices of the edges lying on the boundary.
  ///
  /// The boundary edges are characterized by the fact that they
  /// only have 1 cell as super entity.
  pub fn boundary_edge_indices(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
    (0..self.nedges()).filter(|&iedge| self.edge_cells(iedge).len() == 1)
  }

  /// For a 2-mesh computes the boundary, which consists of facets (edges).
  ///
  /// Edges are reported as sorted vertex pairs, in order of first appearance.
  pub fn boundary_facets(&self) -> Vec<Edge> {
    self
      .boundary_edge_indices()
      .map(|iedge| *self.edge(iedge))
      .collect()
  }

  /// The vertices that lie on the boundary of the mesh, in ascending order.
  pub fn boundary_vertices(&self) -> Vec<VertexIdx> {
    self
      .boundary_facets()
      .into_iter()
      .flatten()
      .sorted_unstable()
      .dedup()
      .collect()
  }

  pub fn flag_boundary_vertices(&self) -> Vec<bool> {
    util::indices_to_flags(&self.boundary_vertices(), self.nvertices())
  }

  /// The cells having at least one edge on the boundary.
  pub fn boundary_cells(&self) -> Vec<CellIdx> {
    self
      .boundary_edge_indices()
      // the boundary has only one super by definition
      .map(|iedge| self.edge_cells(iedge)[0])
      .sorted_unstable()
      .dedup()
      .collect()
  }
}
