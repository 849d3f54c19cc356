use derive_more::derive::Display;

use crate::{RegisterQuad, bits};

/// Raw core type value reported by efficiency cores ("Atom" microarchitecture).
pub const RAW_EFFICIENCY_CORE_TYPE: u8 = 0x20;

/// Raw core type value reported by performance cores ("Core" microarchitecture).
pub const RAW_PERFORMANCE_CORE_TYPE: u8 = 0x40;

/// Classification of a single logical processor on the performance-efficiency axis.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the Unknown variant already absorbs any value the hardware may add"
)]
pub enum CoreType {
    /// A processor optimized for energy efficiency ("E-core").
    Efficiency,

    /// A processor optimized for throughput ("P-core").
    Performance,

    /// Reserved values, or a processor that does not report a core type at all.
    Unknown,
}

impl CoreType {
    /// Interprets a raw core type byte. Every value maps to some variant.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            RAW_EFFICIENCY_CORE_TYPE => Self::Efficiency,
            RAW_PERFORMANCE_CORE_TYPE => Self::Performance,
            _ => Self::Unknown,
        }
    }

    /// Extracts the raw core type byte (EAX bits 24-31) from the output of the native model leaf.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "an 8-bit field always fits in u8"
    )]
    pub const fn raw_from_registers(registers: &RegisterQuad) -> u8 {
        bits(registers.eax, 24, 31) as u8
    }

    /// Interprets the output of the native model leaf.
    #[must_use]
    pub const fn from_registers(registers: &RegisterQuad) -> Self {
        Self::from_raw(Self::raw_from_registers(registers))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(CoreType::from_raw(0x20), CoreType::Efficiency);
        assert_eq!(CoreType::from_raw(0x40), CoreType::Performance);
        assert_eq!(CoreType::from_raw(0x00), CoreType::Unknown);
        assert_eq!(CoreType::from_raw(0xFF), CoreType::Unknown);
    }

    #[test]
    fn mapping_is_total() {
        for raw in 0..=u8::MAX {
            let expected = match raw {
                0x20 => CoreType::Efficiency,
                0x40 => CoreType::Performance,
                _ => CoreType::Unknown,
            };

            assert_eq!(CoreType::from_raw(raw), expected, "raw value {raw:#04x}");
        }
    }

    #[test]
    fn only_top_byte_of_eax_matters() {
        let performance = RegisterQuad::new(0x4000_0001, 0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFF);
        let efficiency = RegisterQuad::new(0x20FF_FFFF, 0, 0, 0);
        let neither = RegisterQuad::new(0x0040_0000, 0, 0, 0);

        assert_eq!(CoreType::raw_from_registers(&performance), 0x40);
        assert_eq!(CoreType::from_registers(&performance), CoreType::Performance);
        assert_eq!(CoreType::from_registers(&efficiency), CoreType::Efficiency);
        assert_eq!(CoreType::from_registers(&neither), CoreType::Unknown);
    }

    #[test]
    fn unsupported_query_is_unknown() {
        assert_eq!(
            CoreType::from_registers(&RegisterQuad::default()),
            CoreType::Unknown
        );
    }

    #[test]
    fn display_names_variant() {
        assert_eq!(CoreType::Efficiency.to_string(), "Efficiency");
        assert_eq!(CoreType::Performance.to_string(), "Performance");
        assert_eq!(CoreType::Unknown.to_string(), "Unknown");
    }
}
