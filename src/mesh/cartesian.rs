use super::{Cell, Coord, TriangleMesh, VertexIdx};
use crate::error::{FemError, FemResult};

/// Uniform triangulation of the unit square `[0,1]^2`
/// with `nx` and `ny` subdivisions along the axes.
pub fn build_unit_square(nx: usize, ny: usize) -> FemResult<TriangleMesh> {
  CartesianMesh::new(Rect::new_unit_square(), nx, ny).map(|grid| grid.compute_mesh())
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
  min: Coord,
  max: Coord,
}

impl Rect {
  pub fn new_min_max(min: Coord, max: Coord) -> FemResult<Self> {
    if min.iter().zip(max.iter()).any(|(lo, hi)| !(lo < hi)) {
      return Err(FemError::InvalidArgument(format!(
        "empty rectangle: min={min:?} max={max:?}"
      )));
    }
    Ok(Self { min, max })
  }
  pub fn new_unit_square() -> Self {
    Self {
      min: Coord::zeros(),
      max: Coord::from_element(1.0),
    }
  }

  pub fn min(&self) -> &Coord {
    &self.min
  }
  pub fn max(&self) -> &Coord {
    &self.max
  }
  pub fn side_lengths(&self) -> Coord {
    self.max - self.min
  }
}

/// Tensor-product grid over a rectangle, split into triangles.
///
/// Vertices are numbered row-major (x fastest). Each grid cell is split
/// along its diagonal from the lower-left to the upper-right corner into
/// the triangles `[ll, lr, ur]` and `[ll, ul, ur]`.
#[derive(Debug, Clone)]
pub struct CartesianMesh {
  rect: Rect,
  nx: usize,
  ny: usize,
}

// constructors
impl CartesianMesh {
  pub fn new(rect: Rect, nx: usize, ny: usize) -> FemResult<Self> {
    if nx == 0 || ny == 0 {
      return Err(FemError::InvalidArgument(format!(
        "mesh resolution must be positive, got nx={nx} ny={ny}"
      )));
    }
    Ok(Self { rect, nx, ny })
  }
  pub fn new_unit(nx: usize, ny: usize) -> FemResult<Self> {
    Self::new(Rect::new_unit_square(), nx, ny)
  }
}

// getters
impl CartesianMesh {
  pub fn rect(&self) -> &Rect {
    &self.rect
  }
  pub fn nx(&self) -> usize {
    self.nx
  }
  pub fn ny(&self) -> usize {
    self.ny
  }
  pub fn nvertices_x(&self) -> usize {
    self.nx + 1
  }
  pub fn nvertices_y(&self) -> usize {
    self.ny + 1
  }
  pub fn nvertices(&self) -> usize {
    self.nvertices_x() * self.nvertices_y()
  }
  pub fn nquads(&self) -> usize {
    self.nx * self.ny
  }
  pub fn ncells(&self) -> usize {
    2 * self.nquads()
  }

  /// converts cartesian index `(ix, iy)` to linear vertex index
  pub fn vertex_idx(&self, ix: usize, iy: usize) -> VertexIdx {
    iy * self.nvertices_x() + ix
  }
  /// converts linear vertex index to cartesian index `(ix, iy)`
  pub fn vertex_cart_idx(&self, ivertex: VertexIdx) -> (usize, usize) {
    (ivertex % self.nvertices_x(), ivertex / self.nvertices_x())
  }
  pub fn vertex_pos(&self, ivertex: VertexIdx) -> Coord {
    let (ix, iy) = self.vertex_cart_idx(ivertex);
    let rel = Coord::new(ix as f64 / self.nx as f64, iy as f64 / self.ny as f64);
    rel.component_mul(&self.rect.side_lengths()) + self.rect.min()
  }

  pub fn is_vertex_on_boundary(&self, ivertex: VertexIdx) -> bool {
    let (ix, iy) = self.vertex_cart_idx(ivertex);
    ix == 0 || ix == self.nx || iy == 0 || iy == self.ny
  }

  /// The boundary vertices read off the grid structure, in ascending order.
  pub fn boundary_vertices(&self) -> Vec<VertexIdx> {
    (0..self.nvertices())
      .filter(|&ivertex| self.is_vertex_on_boundary(ivertex))
      .collect()
  }
}

impl CartesianMesh {
  pub fn compute_vertex_coords(&self) -> Vec<Coord> {
    (0..self.nvertices()).map(|i| self.vertex_pos(i)).collect()
  }

  pub fn compute_cells(&self) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(self.ncells());
    for iy in 0..self.ny {
      for ix in 0..self.nx {
        let ll = self.vertex_idx(ix, iy);
        let lr = self.vertex_idx(ix + 1, iy);
        let ul = self.vertex_idx(ix, iy + 1);
        let ur = self.vertex_idx(ix + 1, iy + 1);
        cells.push([ll, lr, ur]);
        cells.push([ll, ul, ur]);
      }
    }
    cells
  }

  pub fn compute_mesh(&self) -> TriangleMesh {
    TriangleMesh::new(self.compute_vertex_coords(), self.compute_cells())
  }
}
