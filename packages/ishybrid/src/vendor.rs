use std::fmt::{self, Display};

use crate::RegisterQuad;

/// Length of the vendor string in bytes.
pub const VENDOR_STRING_LEN: usize = 12;

/// The 12-byte manufacturer identification string reported by the vendor leaf.
///
/// The bytes are taken from EBX, EDX and ECX in that order, each register contributing its four
/// bytes in little-endian order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VendorString {
    bytes: [u8; VENDOR_STRING_LEN],
}

impl VendorString {
    /// The vendor string of Intel processors.
    pub const INTEL: Self = Self::from_bytes(*b"GenuineIntel");

    /// The vendor string of AMD processors.
    pub const AMD: Self = Self::from_bytes(*b"AuthenticAMD");

    /// Creates a vendor string from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; VENDOR_STRING_LEN]) -> Self {
        Self { bytes }
    }

    /// Decodes the vendor string from the output of the vendor leaf.
    #[must_use]
    pub fn from_registers(registers: &RegisterQuad) -> Self {
        let mut bytes = [0_u8; VENDOR_STRING_LEN];

        for (chunk, register) in bytes
            .chunks_exact_mut(4)
            .zip([registers.ebx, registers.edx, registers.ecx])
        {
            chunk.copy_from_slice(&register.to_le_bytes());
        }

        Self { bytes }
    }

    /// The raw bytes of the vendor string.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; VENDOR_STRING_LEN] {
        &self.bytes
    }
}

impl Display for VendorString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hardware is not obliged to give us printable ASCII (emulators in particular are known
        // to get creative), so we escape anything unexpected instead of failing.
        for &byte in &self.bytes {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", char::from(byte))?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }

        Ok(())
    }
}

/// Processor manufacturer, as far as hybrid core detection is concerned.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Vendor {
    /// Intel processors, the only vendor for which the hybrid identification scheme is defined.
    Intel,

    /// AMD processors. Recognized but not covered by the hybrid identification scheme.
    Amd,

    /// Any other vendor string.
    Unknown(VendorString),
}

impl Vendor {
    /// Whether processors of this vendor report hybrid core types via the native model leaf.
    #[must_use]
    pub const fn is_hybrid_aware(&self) -> bool {
        matches!(self, Self::Intel)
    }
}

impl From<VendorString> for Vendor {
    fn from(value: VendorString) -> Self {
        if value == VendorString::INTEL {
            Self::Intel
        } else if value == VendorString::AMD {
            Self::Amd
        } else {
            Self::Unknown(value)
        }
    }
}

/// The outcome of vendor detection: the decoded string, its interpretation and the highest basic
/// leaf that the processor supports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VendorInfo {
    vendor_string: VendorString,
    max_basic_leaf: u32,
}

impl VendorInfo {
    /// Interprets the output of the vendor leaf.
    #[must_use]
    pub fn from_registers(registers: &RegisterQuad) -> Self {
        Self {
            vendor_string: VendorString::from_registers(registers),
            max_basic_leaf: registers.eax,
        }
    }

    /// The raw vendor string.
    #[must_use]
    pub const fn vendor_string(&self) -> VendorString {
        self.vendor_string
    }

    /// The recognized vendor.
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        self.vendor_string.into()
    }

    /// The highest basic leaf the processor answers meaningfully.
    #[must_use]
    pub const fn max_basic_leaf(&self) -> u32 {
        self.max_basic_leaf
    }
}
