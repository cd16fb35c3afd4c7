//! Solves a manufactured Poisson problem on the unit square
//! and determines the algebraic convergence rate.

use poissonfem::{
  mesh::Coord,
  poisson::{convergence_rate, run_manufactured, PoissonConfig},
};

use std::f64::consts::PI;

fn main() {
  tracing_subscriber::fmt::init();

  let exact = |x: &Coord| (PI * x.x).sin() * (PI * x.y).sin() + x.x * x.y;
  let source = |x: &Coord| 2.0 * PI * PI * (PI * x.x).sin() * (PI * x.y).sin();

  let mut reports = Vec::new();
  for refinement in 1..=6 {
    let n = 1 << refinement;
    let config = PoissonConfig {
      parallel: true,
      ..PoissonConfig::default().with_resolution(n, n)
    };
    let report = match run_manufactured(&config, source, exact) {
      Ok(report) => report,
      Err(err) => {
        eprintln!("refinement {refinement} failed: {err}");
        std::process::exit(1);
      }
    };

    let conv_rate = reports
      .last()
      .map(|prev| convergence_rate(prev, &report))
      .unwrap_or(f64::NAN);
    println!("{report}, conv_rate: {conv_rate:6.2}");
    reports.push(report);
  }
}
