//! Comparison helpers for unit and integration tests.

pub fn assert_mat_eq(a: &na::DMatrix<f64>, b: &na::DMatrix<f64>) {
  const TOL: f64 = 10e-12;
  let diff = a - b;
  let error = diff.norm();
  let equal = error <= TOL;
  if !equal {
    println!("Matrix a={a:.3}");
    println!("Matrix b={b:.3}");
    println!("a-b={diff:.3}");
    panic!("Matrices not equal.");
  }
}

pub fn assert_vec_eq(a: &na::DVector<f64>, b: &na::DVector<f64>, tol: f64) {
  let diff = a - b;
  let error = diff.amax();
  if error > tol {
    println!("Vector a={a:.6}");
    println!("Vector b={b:.6}");
    println!("a-b={diff:.3}");
    panic!("Vectors not equal, max deviation {error:e} > {tol:e}.");
  }
}
