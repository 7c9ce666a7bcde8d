//! MNA assembly: full-circuit stamping into reusable buffers.

use voltlab_core::mna::{ComplexMna, MnaIndex, MnaSystem};
use voltlab_devices::Device;

use crate::error::Result;

/// Reusable assembly buffers.
///
/// The matrix and RHS are kept across assemblies and only reallocate when
/// the dense unknown count changes.
#[derive(Debug)]
pub struct Assembler {
    pub real: MnaSystem,
    pub complex: ComplexMna,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// Create an assembler with empty buffers.
    pub fn new() -> Self {
        Self {
            real: MnaSystem::new(0),
            complex: ComplexMna::new(0),
        }
    }

    /// Zero the real buffers and stamp every device at `(t, h)`.
    pub fn assemble(
        &mut self,
        devices: &[Device],
        index: &MnaIndex,
        t: f64,
        h: f64,
    ) -> Result<&MnaSystem> {
        self.real.reset(index.size());
        for device in devices {
            device.stamp(&mut self.real, index, t, h)?;
        }
        Ok(&self.real)
    }

    /// Zero the complex buffers and stamp every device at `omega`.
    pub fn assemble_ac(
        &mut self,
        devices: &[Device],
        index: &MnaIndex,
        omega: f64,
    ) -> Result<&ComplexMna> {
        self.complex.reset(index.size());
        for device in devices {
            device.stamp_ac(&mut self.complex, index, omega)?;
        }
        Ok(&self.complex)
    }
}
