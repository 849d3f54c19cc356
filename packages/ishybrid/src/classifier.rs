use std::sync::OnceLock;

use crate::pal::{Platform, PlatformFacade};
use crate::{
    AffinityScope, Classification, CoreType, EXTENDED_FEATURES_LEAF, Leaf, MachineReport,
    NATIVE_MODEL_LEAF, ProcessorId, ProcessorReport, RegisterQuad, Report, Result, RunOptions,
    Subleaf, VENDOR_LEAF, VendorInfo, bit,
};

/// Position of the hybrid flag in EDX of the extended features leaf.
pub const HYBRID_FLAG_BIT: u32 = 15;

/// Extracts the hybrid flag from the output of the extended features leaf.
#[must_use]
pub const fn hybrid_flag_from_registers(registers: &RegisterQuad) -> bool {
    bit(registers.edx, HYBRID_FLAG_BIT)
}

/// Classifies the logical processors of the machine into performance and efficiency cores.
///
/// The classifier holds no state beyond a cache of the highest supported basic leaf, so it is
/// cheap to create and each operation is independent of the previous ones.
#[derive(Debug)]
pub struct CoreClassifier {
    platform: PlatformFacade,

    max_basic_leaf: OnceLock<Leaf>,
}

impl CoreClassifier {
    /// Creates a classifier that operates on the hardware and operating system of the current
    /// process.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::target())
    }

    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            platform,
            max_basic_leaf: OnceLock::new(),
        }
    }

    /// The number of logical processors available to the operating system scheduler.
    #[must_use]
    pub fn processor_count(&self) -> ProcessorId {
        self.platform.processor_count()
    }

    /// Reads the vendor string (and the highest supported basic leaf) from the vendor leaf.
    #[must_use]
    pub fn detect_vendor(&self) -> VendorInfo {
        let info = VendorInfo::from_registers(&self.platform.identify(VENDOR_LEAF, 0));

        // Free to cache, the vendor leaf reads the same on every processor.
        self.max_basic_leaf.get_or_init(|| info.max_basic_leaf());

        tracing::debug!(
            vendor = %info.vendor_string(),
            max_basic_leaf = info.max_basic_leaf(),
            "detected processor vendor"
        );

        info
    }

    /// Reads the hybrid flag (EDX bit 15 of the extended features leaf).
    ///
    /// Processors that do not support the extended features leaf are reported as not hybrid.
    #[must_use]
    pub fn detect_hybrid_capability(&self) -> bool {
        let hybrid = hybrid_flag_from_registers(&self.query(EXTENDED_FEATURES_LEAF, 0));

        tracing::debug!(hybrid, "detected hybrid capability");

        hybrid
    }

    /// Reads the raw core type byte of one processor by pinning the current thread to it for the
    /// duration of the query. The previous affinity of the thread is restored afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Affinity`][crate::Error::Affinity] if the thread cannot be pinned to the
    /// processor (e.g. because it does not exist) or the previous affinity cannot be restored.
    pub fn read_raw_core_type(&self, processor: ProcessorId) -> Result<u8> {
        let scope = AffinityScope::acquire(&self.platform, processor)?;

        let registers = self.query(NATIVE_MODEL_LEAF, 0);

        scope.release()?;

        Ok(CoreType::raw_from_registers(&registers))
    }

    /// Classifies one processor by pinning the current thread to it for the duration of the query.
    ///
    /// Processors that do not report a core type (e.g. because the native model leaf is not
    /// supported) are classified as [`CoreType::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Affinity`][crate::Error::Affinity] if the thread cannot be pinned to the
    /// processor (e.g. because it does not exist) or the previous affinity cannot be restored.
    pub fn classify_processor(&self, processor: ProcessorId) -> Result<CoreType> {
        let core_type = CoreType::from_raw(self.read_raw_core_type(processor)?);

        tracing::debug!(processor, %core_type, "classified processor");

        Ok(core_type)
    }

    /// Classifies processors `0..processor_count` in increasing order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Affinity`][crate::Error::Affinity] as soon as any processor cannot be
    /// classified. The remaining processors are not visited and no partial result is returned.
    pub fn classify_all(&self, processor_count: ProcessorId) -> Result<Classification> {
        let mut classification = Classification::with_capacity(processor_count as usize);

        for processor in 0..processor_count {
            debug_assert_eq!(processor, classification.next_processor());

            classification.push(self.classify_processor(processor)?);
        }

        for core_type in [CoreType::Performance, CoreType::Efficiency] {
            if !classification.is_contiguous(core_type) {
                tracing::warn!(
                    %core_type,
                    processors = ?classification.disjoint_ranges(core_type),
                    "processors of this core type are not numbered contiguously"
                );
            }
        }

        Ok(classification)
    }

    /// Reports on one designated processor: the hybrid flag, and the raw and interpreted core
    /// type of the processor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Affinity`][crate::Error::Affinity] if the thread cannot be pinned to the
    /// processor (e.g. because it does not exist) or the previous affinity cannot be restored.
    pub fn inspect_processor(&self, processor: ProcessorId) -> Result<ProcessorReport> {
        let hybrid = self.detect_hybrid_capability();
        let raw_core_type = self.read_raw_core_type(processor)?;

        Ok(ProcessorReport::new(processor, hybrid, raw_core_type))
    }

    /// Runs the whole detection sequence: vendor check, hybrid check, then either single-processor
    /// inspection or classification of every processor (on hybrid and non-hybrid parts alike).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Affinity`][crate::Error::Affinity] if any processor cannot be classified.
    pub fn run(&self, options: &RunOptions) -> Result<Report> {
        let vendor = self.detect_vendor().vendor();

        if !vendor.is_hybrid_aware() {
            tracing::debug!(?vendor, "vendor does not define hybrid core types, skipping");
            return Ok(Report::UnsupportedVendor(vendor));
        }

        if let Some(processor) = options.processor {
            return Ok(Report::Processor(self.inspect_processor(processor)?));
        }

        let hybrid = self.detect_hybrid_capability();

        // Non-hybrid parts are enumerated too. Some consist only of efficiency cores, which the
        // hybrid flag alone does not reveal.
        let classification = self.classify_all(self.processor_count())?;

        Ok(Report::Machine(MachineReport::new(
            hybrid,
            Some(classification),
            options.layout,
        )))
    }

    fn max_basic_leaf(&self) -> Leaf {
        *self
            .max_basic_leaf
            .get_or_init(|| self.platform.identify(VENDOR_LEAF, 0).eax)
    }

    /// Issues a query, substituting all-zero output for leaves the processor does not support.
    ///
    /// Intel processors answer leaves above the maximum with the data of the highest basic leaf,
    /// which would otherwise be misinterpreted.
    fn query(&self, leaf: Leaf, subleaf: Subleaf) -> RegisterQuad {
        if leaf > self.max_basic_leaf() {
            tracing::debug!(leaf, "leaf not supported by processor");
            return RegisterQuad::default();
        }

        self.platform.identify(leaf, subleaf)
    }
}

impl Default for CoreClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    reason = "we need not worry in tests"
)]
#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::CoreType::{Efficiency as E, Performance as P, Unknown as U};
    use crate::pal::MockPlatform;
    use crate::{AffinityOperation, CoreRange, Error, Vendor};

    const INTEL: RegisterQuad = RegisterQuad::new(0x23, 0x756e_6547, 0x6c65_746e, 0x4965_6e69);
    const AMD: RegisterQuad = RegisterQuad::new(0x10, 0x6874_7541, 0x444d_4163, 0x6974_6e65);

    const HYBRID: RegisterQuad = RegisterQuad::new(0, 0, 0, 1 << 15);
    const NOT_HYBRID: RegisterQuad = RegisterQuad::new(0, 0, 0, !(1 << 15));

    fn native_model(core_type: CoreType) -> RegisterQuad {
        let raw: u32 = match core_type {
            P => 0x40,
            E => 0x20,
            U => 0x00,
        };

        RegisterQuad::new((raw << 24) | 0x0001_0203, 0, 0, 0)
    }

    /// Simulates a machine where processor N reports `core_types[N]` from the native model leaf.
    ///
    /// Pinning is simulated by remembering the last processor the thread was pinned to.
    fn simulate_machine(
        vendor: RegisterQuad,
        features: RegisterQuad,
        core_types: Vec<CoreType>,
    ) -> MockPlatform {
        let mut platform = MockPlatform::new();
        let pinned = Arc::new(AtomicU32::new(u32::MAX));

        let processor_count = core_types.len() as ProcessorId;
        platform
            .expect_processor_count()
            .return_const(processor_count);

        platform
            .expect_current_thread_processors()
            .returning(move || Ok((0..processor_count).collect()));

        platform.expect_pin_current_thread_to().returning({
            let pinned = Arc::clone(&pinned);
            move |processor| {
                if processor >= processor_count {
                    return Err(io::Error::from(io::ErrorKind::InvalidInput));
                }

                pinned.store(processor, Ordering::Relaxed);
                Ok(())
            }
        });

        platform
            .expect_restore_current_thread_processors()
            .returning({
                let pinned = Arc::clone(&pinned);
                move |_| {
                    pinned.store(u32::MAX, Ordering::Relaxed);
                    Ok(())
                }
            });

        platform
            .expect_identify()
            .returning(move |leaf, _| match leaf {
                VENDOR_LEAF => vendor,
                EXTENDED_FEATURES_LEAF => features,
                NATIVE_MODEL_LEAF => {
                    let processor = pinned.load(Ordering::Relaxed);
                    assert_ne!(processor, u32::MAX, "native model leaf queried while unpinned");
                    native_model(core_types[processor as usize])
                }
                _ => RegisterQuad::default(),
            });

        platform
    }

    fn classifier_for(platform: MockPlatform) -> CoreClassifier {
        CoreClassifier::with_platform(PlatformFacade::from_mock(platform))
    }

    #[test]
    fn hybrid_flag_extraction() {
        assert!(hybrid_flag_from_registers(&HYBRID));
        assert!(!hybrid_flag_from_registers(&NOT_HYBRID));
        assert!(!hybrid_flag_from_registers(&RegisterQuad::default()));
        assert!(hybrid_flag_from_registers(&RegisterQuad::new(
            u32::MAX,
            u32::MAX,
            u32::MAX,
            u32::MAX
        )));
        assert!(!hybrid_flag_from_registers(&RegisterQuad::new(
            u32::MAX,
            u32::MAX,
            u32::MAX,
            0
        )));
    }

    #[test]
    fn detect_vendor_intel() {
        let classifier = classifier_for(simulate_machine(INTEL, HYBRID, vec![]));

        let info = classifier.detect_vendor();

        assert_eq!(info.vendor(), Vendor::Intel);
        assert_eq!(info.max_basic_leaf(), 0x23);
    }

    #[test]
    fn detect_hybrid_capability_reads_flag() {
        let classifier = classifier_for(simulate_machine(INTEL, HYBRID, vec![]));
        assert!(classifier.detect_hybrid_capability());

        let classifier = classifier_for(simulate_machine(INTEL, NOT_HYBRID, vec![]));
        assert!(!classifier.detect_hybrid_capability());
    }

    #[test]
    fn classify_all_performance_then_efficiency() {
        let classifier = classifier_for(simulate_machine(INTEL, HYBRID, vec![P, P, P, E, E]));

        let classification = classifier.classify_all(5).unwrap();

        assert_eq!(classification.range(P), Some(CoreRange::new(0, 2)));
        assert_eq!(classification.range(E), Some(CoreRange::new(3, 4)));
    }

    #[test]
    fn classify_all_interleaved_spans_first_to_last() {
        let classifier = classifier_for(simulate_machine(INTEL, HYBRID, vec![P, E, P]));

        let classification = classifier.classify_all(3).unwrap();

        assert_eq!(classification.range(P), Some(CoreRange::new(0, 2)));
        assert_eq!(classification.range(E), Some(CoreRange::single(1)));
    }

    #[test]
    fn classify_all_empty_does_not_touch_affinity() {
        let mut platform = MockPlatform::new();

        platform.expect_current_thread_processors().never();
        platform.expect_pin_current_thread_to().never();
        platform.expect_restore_current_thread_processors().never();
        platform.expect_identify().never();

        let classifier = classifier_for(platform);

        let classification = classifier.classify_all(0).unwrap();

        assert_eq!(classification.range(P), None);
        assert_eq!(classification.range(E), None);
    }

    #[test]
    fn classify_all_visits_in_increasing_order() {
        let mut platform = MockPlatform::new();
        let mut seq = mockall::Sequence::new();

        platform
            .expect_identify()
            .withf(|leaf, _| *leaf == VENDOR_LEAF)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(INTEL);

        for processor in 0..3 {
            platform
                .expect_current_thread_processors()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|| Ok(vec![0, 1, 2]));

            platform
                .expect_pin_current_thread_to()
                .withf(move |candidate| *candidate == processor)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));

            platform
                .expect_identify()
                .withf(|leaf, subleaf| *leaf == NATIVE_MODEL_LEAF && *subleaf == 0)
                .times(1)
                .in_sequence(&mut seq)
                .return_const(native_model(P));

            platform
                .expect_restore_current_thread_processors()
                .withf(|processors| processors == [0, 1, 2])
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        let classifier = classifier_for(platform);

        // Caches the highest supported leaf before any processor is visited.
        let _info = classifier.detect_vendor();

        let classification = classifier.classify_all(3).unwrap();
        assert_eq!(classification.range(P), Some(CoreRange::new(0, 2)));
    }

    #[test]
    fn classify_all_aborts_on_first_affinity_failure() {
        let mut platform = MockPlatform::new();
        let queried = Arc::new(AtomicU32::new(0));

        platform
            .expect_current_thread_processors()
            .returning(|| Ok(vec![0, 1, 2, 3, 4]));

        platform
            .expect_pin_current_thread_to()
            .withf(|processor| *processor < 2)
            .times(2)
            .returning(|_| Ok(()));

        platform
            .expect_pin_current_thread_to()
            .withf(|processor| *processor == 2)
            .times(1)
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        // Processors 3 and 4 must never be visited.
        platform
            .expect_pin_current_thread_to()
            .withf(|processor| *processor > 2)
            .never();

        platform
            .expect_restore_current_thread_processors()
            .times(2)
            .returning(|_| Ok(()));

        platform.expect_identify().returning({
            let queried = Arc::clone(&queried);
            move |leaf, _| match leaf {
                VENDOR_LEAF => INTEL,
                NATIVE_MODEL_LEAF => {
                    queried.fetch_add(1, Ordering::Relaxed);
                    native_model(P)
                }
                _ => RegisterQuad::default(),
            }
        });

        let classifier = classifier_for(platform);

        let error = classifier.classify_all(5).unwrap_err();

        assert!(matches!(
            error,
            Error::Affinity {
                operation: AffinityOperation::Pin,
                processor: 2,
                ..
            }
        ));
        assert_eq!(queried.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unsupported_native_model_leaf_is_unknown() {
        // Max basic leaf 0x16 - the native model leaf does not exist on this processor.
        let old_intel = RegisterQuad::new(0x16, INTEL.ebx, INTEL.ecx, INTEL.edx);

        let mut platform = MockPlatform::new();

        platform
            .expect_current_thread_processors()
            .returning(|| Ok(vec![0, 1]));
        platform
            .expect_pin_current_thread_to()
            .times(2)
            .returning(|_| Ok(()));
        platform
            .expect_restore_current_thread_processors()
            .times(2)
            .returning(|_| Ok(()));
        platform
            .expect_identify()
            .withf(|leaf, _| *leaf == VENDOR_LEAF)
            .return_const(old_intel);
        platform
            .expect_identify()
            .withf(|leaf, _| *leaf == NATIVE_MODEL_LEAF)
            .never();

        let classifier = classifier_for(platform);

        let classification = classifier.classify_all(2).unwrap();

        assert_eq!(classification.core_types(), &[U, U]);
        assert_eq!(classification.range(P), None);
    }

    #[test]
    fn unsupported_features_leaf_is_not_hybrid() {
        let ancient_intel = RegisterQuad::new(0x5, INTEL.ebx, INTEL.ecx, INTEL.edx);

        let mut platform = MockPlatform::new();
        platform
            .expect_identify()
            .withf(|leaf, _| *leaf == VENDOR_LEAF)
            .return_const(ancient_intel);
        platform
            .expect_identify()
            .withf(|leaf, _| *leaf == EXTENDED_FEATURES_LEAF)
            .never();

        let classifier = classifier_for(platform);

        assert!(!classifier.detect_hybrid_capability());
    }

    #[test]
    fn run_hybrid_machine() {
        let classifier = classifier_for(simulate_machine(
            INTEL,
            HYBRID,
            vec![P, P, P, P, E, E, E, E],
        ));

        let report = classifier.run(&RunOptions::default()).unwrap();

        let Report::Machine(machine) = report else {
            panic!("expected machine report, got {report:?}");
        };

        assert!(machine.hybrid());
        let classification = machine.classification().unwrap();
        assert_eq!(classification.range(P), Some(CoreRange::new(0, 3)));
        assert_eq!(classification.range(E), Some(CoreRange::new(4, 7)));
    }

    #[test]
    fn run_non_hybrid_machine_still_enumerates() {
        let classifier = classifier_for(simulate_machine(INTEL, NOT_HYBRID, vec![P, P, P, P]));

        let report = classifier.run(&RunOptions::default()).unwrap();

        let Report::Machine(machine) = report else {
            panic!("expected machine report, got {report:?}");
        };

        assert!(!machine.hybrid());
        let classification = machine.classification().unwrap();
        assert_eq!(classification.range(P), Some(CoreRange::new(0, 3)));
        assert_eq!(classification.range(E), None);
    }

    #[test]
    fn run_efficiency_only_machine_reports_atom_range() {
        // Efficiency-only parts do not set the hybrid flag but still report a core type.
        let classifier = classifier_for(simulate_machine(INTEL, NOT_HYBRID, vec![E, E, E, E]));

        let report = classifier.run(&RunOptions::default()).unwrap();

        assert_eq!(report.to_string(), "Hybrid CPU: False\nAtom: 0-3\n");
    }

    #[test]
    fn run_amd_short_circuits() {
        let mut platform = MockPlatform::new();

        platform
            .expect_identify()
            .withf(|leaf, _| *leaf == VENDOR_LEAF)
            .times(1)
            .return_const(AMD);
        platform.expect_pin_current_thread_to().never();
        platform.expect_processor_count().never();

        let classifier = classifier_for(platform);

        let report = classifier
            .run(&RunOptions {
                processor: Some(0),
                ..RunOptions::default()
            })
            .unwrap();

        assert_eq!(report, Report::UnsupportedVendor(Vendor::Amd));
    }

    #[test]
    fn run_single_processor() {
        let classifier = classifier_for(simulate_machine(INTEL, HYBRID, vec![P, P, E, E]));

        let report = classifier
            .run(&RunOptions {
                processor: Some(2),
                ..RunOptions::default()
            })
            .unwrap();

        let Report::Processor(processor) = report else {
            panic!("expected processor report, got {report:?}");
        };

        assert_eq!(processor.processor(), 2);
        assert!(processor.hybrid());
        assert_eq!(processor.raw_core_type(), 0x20);
        assert_eq!(processor.core_type(), E);
    }

    #[test]
    fn run_single_processor_out_of_range_fails() {
        let classifier = classifier_for(simulate_machine(INTEL, HYBRID, vec![P, E]));

        let error = classifier
            .run(&RunOptions {
                processor: Some(2),
                ..RunOptions::default()
            })
            .unwrap_err();

        assert!(matches!(
            error,
            Error::Affinity {
                operation: AffinityOperation::Pin,
                processor: 2,
                ..
            }
        ));
    }

    #[test]
    fn run_single_processor_on_non_hybrid_still_reads_core_type() {
        let classifier = classifier_for(simulate_machine(INTEL, NOT_HYBRID, vec![U, U]));

        let report = classifier
            .run(&RunOptions {
                processor: Some(1),
                ..RunOptions::default()
            })
            .unwrap();

        let Report::Processor(processor) = report else {
            panic!("expected processor report, got {report:?}");
        };

        assert!(!processor.hybrid());
        assert_eq!(processor.core_type(), U);
    }
}
