//! Linear and nonlinear solvers for voltlab.
//!
//! - [`solve_dense`] / [`solve_complex`] - dense LU solves of the MNA system
//! - [`solve_newton_raphson`] - the Newton-Raphson loop for circuits with
//!   nonlinear devices, generic over the caller's restamp step
//!
//! # Example
//!
//! ```rust
//! use voltlab_core::mna::MnaSystem;
//! use voltlab_solver::solve_dense;
//!
//! // Voltage divider: V1 = 10V, R1 = R2 = 1k.
//! let mut mna = MnaSystem::new(3);
//! mna.stamp_source_branch(Some(0), None, 2, 10.0);
//! mna.stamp_conductance(Some(0), Some(1), 1e-3);
//! mna.stamp_conductance(Some(1), None, 1e-3);
//!
//! let x = solve_dense(mna.matrix(), mna.rhs()).expect("solve failed");
//! assert!((x[1] - 5.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod linear;
pub mod newton;

pub use error::{Error, Result};
pub use linear::{solve_complex, solve_dense};
pub use newton::{solve_newton_raphson, ConvergenceCriteria, NrResult};
