use derive_more::derive::Display;

use crate::Leaf;

/// Leaf that reports the vendor string and the highest supported basic leaf.
pub const VENDOR_LEAF: Leaf = 0x0;

/// Leaf that reports structured extended feature flags, including the hybrid flag.
pub const EXTENDED_FEATURES_LEAF: Leaf = 0x7;

/// Leaf that reports the native model of the processor that answers the query.
pub const NATIVE_MODEL_LEAF: Leaf = 0x1A;

/// The four 32-bit output registers of one identification query.
///
/// Ephemeral: produced by one query and interpreted immediately afterwards.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[display("eax={eax:#010x} ebx={ebx:#010x} ecx={ecx:#010x} edx={edx:#010x}")]
#[expect(
    clippy::exhaustive_structs,
    reason = "mirrors the fixed register set of the instruction"
)]
pub struct RegisterQuad {
    /// Value of the EAX register.
    pub eax: u32,

    /// Value of the EBX register.
    pub ebx: u32,

    /// Value of the ECX register.
    pub ecx: u32,

    /// Value of the EDX register.
    pub edx: u32,
}

impl RegisterQuad {
    /// Creates a register set from the four register values.
    #[must_use]
    pub const fn new(eax: u32, ebx: u32, ecx: u32, edx: u32) -> Self {
        Self { eax, ebx, ecx, edx }
    }

    /// Whether every register is zero, which is what unsupported queries typically produce.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.eax == 0 && self.ebx == 0 && self.ecx == 0 && self.edx == 0
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl From<crate::cpuid::CpuidResult> for RegisterQuad {
    fn from(value: crate::cpuid::CpuidResult) -> Self {
        Self::new(value.eax, value.ebx, value.ecx, value.edx)
    }
}

/// Returns whether bit `position` of `value` is set.
///
/// # Panics
///
/// Panics if `position` is not in `0..32`.
#[must_use]
pub const fn bit(value: u32, position: u32) -> bool {
    assert!(position < u32::BITS, "bit position out of range");

    (value >> position) & 1 == 1
}

/// Extracts the inclusive bit field `start..=end` of `value`, shifted down to bit 0.
///
/// # Panics
///
/// Panics if `start > end` or if `end` is not in `0..32`.
#[must_use]
#[expect(
    clippy::arithmetic_side_effects,
    reason = "assertions keep all shifts and subtractions in range"
)]
pub const fn bits(value: u32, start: u32, end: u32) -> u32 {
    assert!(start <= end, "bit field start must be <= end");
    assert!(end < u32::BITS, "bit field end out of range");

    let width = end - start + 1;
    let mask = if width == u32::BITS {
        u32::MAX
    } else {
        (1 << width) - 1
    };

    (value >> start) & mask
}
