//! Simulation engine for voltlab: topology management, MNA assembly, the
//! three analysis drivers, and the host-facing [`Session`] API.
//!
//! # Example
//!
//! ```rust
//! use voltlab_engine::Session;
//!
//! // Resistive divider: V1 = 10V, R1 = R2 = 1k.
//! let mut session = Session::new();
//! session.add_device('V', "V1", "in", "gnd", 10.0, &[], &[], false).unwrap();
//! session.add_device('R', "R1", "in", "mid", 1000.0, &[], &[], false).unwrap();
//! session.add_device('R', "R2", "mid", "gnd", 1000.0, &[], &[], false).unwrap();
//! session.add_ground("gnd");
//!
//! session.run_dc_sweep("V1", 10.0, 10.0, 1.0).unwrap();
//! let results = session.get_dc_results(&["V(mid)"]);
//! let series = &results["V(mid)"];
//! assert!((series[0].1 - 5.0).abs() < 1e-9);
//! ```

pub mod analysis;
pub mod assemble;
pub mod circuit;
pub mod error;
pub mod netlist;
pub mod query;
pub mod results;
pub mod session;

pub use analysis::{AcSweepParams, DcSweepParams, TransientParams};
pub use assemble::Assembler;
pub use circuit::Circuit;
pub use error::{Error, Result};
pub use query::{AnalysisKind, Probe};
pub use results::{AcResults, SweepResults};
pub use session::Session;
