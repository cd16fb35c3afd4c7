extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod bc;
pub mod error;
pub mod fe;
pub mod geometry;
pub mod linalg;
pub mod mesh;
pub mod norm;
pub mod poisson;
pub mod quadrature;
pub mod solver;
pub mod space;
pub mod sparse;
pub mod util;

pub use error::{FemError, FemResult};
