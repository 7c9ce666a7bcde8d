//! Device models and MNA stamps for voltlab.
//!
//! This crate provides the closed device family of the simulator:
//! - Passive elements: R, C, L
//! - Independent sources: V, I (DC or sinusoidal) and the AC stimulus source
//! - Controlled sources: E (VCVS), G (VCCS), H (CCVS), F (CCCS)
//! - The ideal diode (the only nonlinear device)
//!
//! All variants are gathered in the [`Device`] enum, which dispatches the
//! stamping, state-update, and reset operations by `match`.

pub mod controlled;
pub mod device;
pub mod diode;
pub mod passive;
pub mod sources;
pub mod waveforms;

pub use controlled::{Cccs, Ccvs, Vccs, Vcvs};
pub use device::Device;
pub use diode::Diode;
pub use passive::{Capacitor, Inductor, Resistor};
pub use sources::{AcVoltageSource, CurrentSource, VoltageSource};
pub use waveforms::Waveform;
