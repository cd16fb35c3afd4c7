/// Sparse matrix in triplet form.
///
/// Pushing an entry adds to whatever is already stored at that position,
/// which is exactly what finite element assembly needs. Duplicates are only
/// summed up on [`SparseMatrix::compress`] or on conversion.
#[derive(Debug, Clone, Default)]
pub struct SparseMatrix {
  nrows: usize,
  ncols: usize,
  triplets: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self::new(nrows, ncols, Vec::new())
  }
  pub fn new(nrows: usize, ncols: usize, triplets: Vec<(usize, usize, f64)>) -> Self {
    Self {
      nrows,
      ncols,
      triplets,
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn is_square(&self) -> bool {
    self.nrows == self.ncols
  }
  pub fn ntriplets(&self) -> usize {
    self.triplets.len()
  }
  pub fn triplets(&self) -> &[(usize, usize, f64)] {
    &self.triplets
  }

  /// Accumulates `v` into entry `(r, c)`.
  pub fn push(&mut self, r: usize, c: usize, v: f64) {
    assert!(r < self.nrows && c < self.ncols, "entry ({r},{c}) out of bounds");
    if v != 0.0 {
      self.triplets.push((r, c, v));
    }
  }

  /// The value of entry `(r, c)`, zero if nothing was stored.
  pub fn get(&self, r: usize, c: usize) -> f64 {
    self
      .triplets
      .iter()
      .filter(|&&(tr, tc, _)| tr == r && tc == c)
      .map(|t| t.2)
      .sum()
  }

  /// Removes all entries whose position satisfies `predicate`.
  pub fn set_zero<F>(&mut self, predicate: F)
  where
    F: Fn(usize, usize) -> bool,
  {
    self.triplets.retain(|&(r, c, _)| !predicate(r, c));
  }

  /// Sums up duplicate entries and drops explicit zeros.
  /// Afterwards every position is stored at most once, in row-major order.
  pub fn compress(&mut self) {
    let csr = self.to_nalgebra_csr();
    self.triplets = csr
      .triplet_iter()
      .filter(|&(_, _, &v)| v != 0.0)
      .map(|(r, c, &v)| (r, c, v))
      .collect();
  }

  /// `y = A x`
  pub fn mul_vec(&self, x: &na::DVector<f64>) -> na::DVector<f64> {
    assert_eq!(x.len(), self.ncols);
    let mut y = na::DVector::zeros(self.nrows);
    for &(r, c, v) in &self.triplets {
      y[r] += v * x[c];
    }
    y
  }

  pub fn diagonal(&self) -> na::DVector<f64> {
    let mut diagonal = na::DVector::zeros(self.nrows.min(self.ncols));
    for &(r, c, v) in &self.triplets {
      if r == c {
        diagonal[r] += v;
      }
    }
    diagonal
  }

  pub fn row_sums(&self) -> na::DVector<f64> {
    let mut sums = na::DVector::zeros(self.nrows);
    for &(r, _, v) in &self.triplets {
      sums[r] += v;
    }
    sums
  }

  /// Whether `|A_ij - A_ji| <= tol` for all entries.
  pub fn is_symmetric(&self, tol: f64) -> bool {
    if !self.is_square() {
      return false;
    }
    let csr = self.to_nalgebra_csr();
    let transpose = csr.transpose();
    (&csr - &transpose).values().iter().all(|v| v.abs() <= tol)
  }

  pub fn to_nalgebra_coo(&self) -> nas::CooMatrix<f64> {
    let mut coo = nas::CooMatrix::new(self.nrows, self.ncols);
    for &(r, c, v) in &self.triplets {
      coo.push(r, c, v);
    }
    coo
  }

  pub fn to_nalgebra_csr(&self) -> nas::CsrMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_csc(&self) -> nas::CscMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_dense(&self) -> na::DMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_faer_csc(&self) -> faer::sparse::SparseColMat<usize, f64> {
    nalgebra2faer(self.to_nalgebra_csc())
  }
}

type SparseMatrixFaer = faer::sparse::SparseColMat<usize, f64>;

pub fn nalgebra2faer(m: nas::CscMatrix<f64>) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (col_ptrs, row_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseColMat::new_checked(nrows, ncols, col_ptrs, None, row_indices);
  faer::sparse::SparseColMat::new(symbolic, values)
}
