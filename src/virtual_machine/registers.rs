use std::fmt;

/// Number of registers observed in samples and used by plain-mode programs.
pub const SAMPLE_REGISTER_COUNT: usize = 4;

/// Number of registers on the device that runs instruction-pointer-bound programs.
pub const DEVICE_REGISTER_COUNT: usize = 6;

/// Register file holding `N` unsigned integers.
///
/// Register files are plain values: operations take one by reference and
/// return an updated copy, so a caller's registers are never changed behind
/// its back.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Registers<const N: usize>([u64; N]);

/// The four-register file seen in samples.
pub type RegisterFile = Registers<SAMPLE_REGISTER_COUNT>;

/// The six-register file of the instruction-pointer-bound device.
pub type DeviceRegisters = Registers<DEVICE_REGISTER_COUNT>;

impl<const N: usize> Default for Registers<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> Registers<N> {
    /// Creates a register file from explicit values.
    pub const fn new(values: [u64; N]) -> Self {
        Self(values)
    }

    /// Creates a register file with every register set to zero.
    pub const fn zeroed() -> Self {
        Self([0; N])
    }

    /// Returns the number of registers.
    pub const fn len(&self) -> usize {
        N
    }

    /// Returns `true` for the degenerate zero-width file.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Returns the value in register `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= N`.
    pub fn get(&self, idx: usize) -> u64 {
        self.0[idx]
    }

    /// Stores `value` into register `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= N`.
    pub fn set(&mut self, idx: usize, value: u64) {
        self.0[idx] = value;
    }

    /// Returns the value of the register named by an instruction operand, if it exists.
    pub fn try_get(&self, operand: u64) -> Option<u64> {
        let idx = usize::try_from(operand).ok()?;
        self.0.get(idx).copied()
    }

    /// Stores `value` into the register named by an instruction operand.
    ///
    /// Returns `None` and leaves the file untouched if the register does not exist.
    pub fn try_set(&mut self, operand: u64, value: u64) -> Option<()> {
        let idx = usize::try_from(operand).ok()?;
        let slot = self.0.get_mut(idx)?;
        *slot = value;
        Some(())
    }

    /// Returns the registers as a slice.
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Consumes the file and returns the raw values.
    pub const fn into_inner(self) -> [u64; N] {
        self.0
    }
}

impl<const N: usize> From<[u64; N]> for Registers<N> {
    fn from(values: [u64; N]) -> Self {
        Self(values)
    }
}

impl<const N: usize> fmt::Display for Registers<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}
