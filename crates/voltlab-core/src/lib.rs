//! Core circuit representation and MNA matrix structures for voltlab.
//!
//! This crate provides the fundamental building blocks shared by the rest of
//! the simulator:
//!
//! - [`NodeId`] / [`Node`] - identifiers for equipotential nets
//! - [`MnaSystem`](mna::MnaSystem) - the real-valued MNA equation Ax = b
//! - [`ComplexMna`](mna::ComplexMna) - its complex counterpart for AC sweeps
//! - [`MnaIndex`](mna::MnaIndex) - the per-assembly map from nodes and
//!   branch devices to dense matrix coordinates
//! - [`units::parse_value`] - engineering-notation literal parsing
//!
//! # Modified Nodal Analysis (MNA)
//!
//! MNA is a systematic method for formulating circuit equations. The system
//! `Ax = b` contains the node voltages of every non-ground net followed by
//! the branch currents of devices that cannot be expressed as an admittance
//! (voltage sources, inductors, and the controlled sources E and H).
//!
//! # Example: Building an MNA System
//!
//! ```rust
//! use voltlab_core::mna::MnaSystem;
//!
//! // Voltage divider: V1 = 10V at row 0, R1 = R2 = 1k, 2 nodes + 1 branch.
//! let mut mna = MnaSystem::new(3);
//!
//! // V1 between node 0 and ground; its branch current occupies row 2.
//! mna.stamp_source_branch(Some(0), None, 2, 10.0);
//! // R1 = 1k between nodes 0 and 1.
//! mna.stamp_conductance(Some(0), Some(1), 1.0 / 1000.0);
//! // R2 = 1k between node 1 and ground.
//! mna.stamp_conductance(Some(1), None, 1.0 / 1000.0);
//!
//! assert_eq!(mna.matrix().nrows(), 3);
//! ```

pub mod error;
pub mod mna;
pub mod node;
pub mod units;

pub use error::{Error, Result};
pub use mna::{ComplexMna, MnaIndex, MnaSystem};
pub use node::{Node, NodeId};
