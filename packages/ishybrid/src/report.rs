use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::{Classification, CoreType, ProcessorId, Vendor};

/// How the ranges of a machine report are laid out.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum RangeLayout {
    /// One first-to-last range per core type.
    ///
    /// This assumes the processors of each core type are numbered contiguously. If they are not,
    /// the range also covers processors of the other core type.
    #[default]
    Contiguous,

    /// An exact list of disjoint ranges per core type.
    Disjoint,
}

/// What [`CoreClassifier::run()`][crate::CoreClassifier::run] should do.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[expect(
    clippy::exhaustive_structs,
    reason = "plain options bag, constructed field by field by the binary"
)]
pub struct RunOptions {
    /// Inspect only this processor instead of classifying all of them.
    ///
    /// The index is not validated up front. A processor that does not exist is reported by the
    /// operating system when the current thread is pinned to it.
    pub processor: Option<ProcessorId>,

    /// How the ranges of a machine report are laid out.
    pub layout: RangeLayout,
}

/// The outcome of a detection run, rendered as line-oriented text by its `Display` impl.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Report {
    /// The processor vendor does not define hybrid core types. Nothing else was examined.
    UnsupportedVendor(Vendor),

    /// The hybrid flag and the classification of every processor.
    Machine(MachineReport),

    /// Identification of the one processor the caller asked about.
    Processor(ProcessorReport),
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVendor(Vendor::Amd) => writeln!(f, "This is an AMD CPU."),
            Self::UnsupportedVendor(Vendor::Unknown(vendor_string)) => {
                writeln!(f, "Unknown CPU vendor: {vendor_string}")
            }
            // Not produced by the classifier, which treats Intel as hybrid-aware.
            Self::UnsupportedVendor(Vendor::Intel) => {
                writeln!(f, "Hybrid detection is not available for this Intel CPU.")
            }
            Self::Machine(machine) => Display::fmt(machine, f),
            Self::Processor(processor) => Display::fmt(processor, f),
        }
    }
}

/// Classification of the whole machine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MachineReport {
    hybrid: bool,

    classification: Option<Classification>,

    layout: RangeLayout,
}

impl MachineReport {
    /// Creates a report. Without a classification only the hybrid flag is reported.
    #[must_use]
    pub fn new(hybrid: bool, classification: Option<Classification>, layout: RangeLayout) -> Self {
        Self {
            hybrid,
            classification,
            layout,
        }
    }

    /// Whether the processor reports a hybrid design.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Trivial getter.
    pub fn hybrid(&self) -> bool {
        self.hybrid
    }

    /// The per-processor classification, if the processors were enumerated.
    #[must_use]
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    fn write_ranges(
        &self,
        f: &mut Formatter<'_>,
        classification: &Classification,
        core_type: CoreType,
        label: &str,
    ) -> fmt::Result {
        let ranges = match self.layout {
            RangeLayout::Contiguous => classification.range(core_type).into_iter().collect_vec(),
            RangeLayout::Disjoint => classification.disjoint_ranges(core_type),
        };

        if ranges.is_empty() {
            return Ok(());
        }

        writeln!(f, "{label}: {}", ranges.iter().join(","))
    }
}

impl Display for MachineReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hybrid CPU: {}", true_false(self.hybrid))?;

        // The P/E terminology only applies to hybrid parts.
        let (performance, efficiency) = if self.hybrid {
            ("P-Core", "E-Core")
        } else {
            ("Core", "Atom")
        };

        if let Some(classification) = &self.classification {
            self.write_ranges(f, classification, CoreType::Performance, performance)?;
            self.write_ranges(f, classification, CoreType::Efficiency, efficiency)?;
        }

        Ok(())
    }
}

/// Identification of one designated processor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProcessorReport {
    processor: ProcessorId,
    hybrid: bool,
    raw_core_type: u8,
}

impl ProcessorReport {
    /// Creates a report from the raw core type byte of `processor`.
    #[must_use]
    pub const fn new(processor: ProcessorId, hybrid: bool, raw_core_type: u8) -> Self {
        Self {
            processor,
            hybrid,
            raw_core_type,
        }
    }

    /// The processor that was inspected.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Trivial getter.
    pub const fn processor(&self) -> ProcessorId {
        self.processor
    }

    /// Whether the processor reports a hybrid design.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Trivial getter.
    pub const fn hybrid(&self) -> bool {
        self.hybrid
    }

    /// The core type byte exactly as the processor reported it.
    #[must_use]
    pub const fn raw_core_type(&self) -> u8 {
        self.raw_core_type
    }

    /// The interpretation of [`raw_core_type()`][Self::raw_core_type].
    #[must_use]
    pub const fn core_type(&self) -> CoreType {
        CoreType::from_raw(self.raw_core_type)
    }

    /// Human-readable name of the core type. The P/E suffix is only added on hybrid processors.
    const fn core_type_name(&self) -> &'static str {
        match (self.core_type(), self.hybrid) {
            (CoreType::Performance, true) => "Core (P-core)",
            (CoreType::Efficiency, true) => "Atom (E-core)",
            (CoreType::Performance, false) => "Core",
            (CoreType::Efficiency, false) => "Atom",
            (CoreType::Unknown, _) => "Reserved or unknown",
        }
    }
}

impl Display for ProcessorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "CPU {}:", self.processor)?;
        writeln!(f, "Hybrid CPU: {}", true_false(self.hybrid))?;
        writeln!(f, "Core type: {:#04x}", self.raw_core_type)?;
        writeln!(f, "Core type: {}", self.core_type_name())
    }
}

const fn true_false(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
