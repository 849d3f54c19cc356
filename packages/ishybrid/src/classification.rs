use crate::{CoreRange, CoreType, ProcessorId};

/// The result of classifying every processor of the machine.
///
/// Holds the core type of each processor in traversal order (processor 0 first) and one
/// first-to-last range per known core type.
///
/// The ranges assume that each core type occupies one contiguous block of processor indices.
/// If the processors of a type are interleaved with processors of another type, the range still
/// spans from the first to the last processor of the type and therefore also covers processors
/// that do not belong to it. Use [`disjoint_ranges()`][Self::disjoint_ranges] for an exact answer
/// and [`is_contiguous()`][Self::is_contiguous] to detect the situation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Classification {
    core_types: Vec<CoreType>,

    performance: Option<CoreRange>,
    efficiency: Option<CoreRange>,
}

impl Classification {
    pub(crate) fn with_capacity(processor_count: usize) -> Self {
        Self {
            core_types: Vec::with_capacity(processor_count),
            performance: None,
            efficiency: None,
        }
    }

    /// Aggregates a sequence of per-processor core types, where the first item belongs to
    /// processor 0, the second to processor 1 and so on.
    ///
    /// # Example
    ///
    /// ```
    /// use ishybrid::{Classification, CoreRange, CoreType};
    ///
    /// let classification = Classification::from_core_types([
    ///     CoreType::Performance,
    ///     CoreType::Performance,
    ///     CoreType::Efficiency,
    /// ]);
    ///
    /// assert_eq!(
    ///     classification.range(CoreType::Performance),
    ///     Some(CoreRange::new(0, 1))
    /// );
    /// assert_eq!(
    ///     classification.range(CoreType::Efficiency),
    ///     Some(CoreRange::new(2, 2))
    /// );
    /// ```
    #[must_use]
    pub fn from_core_types(core_types: impl IntoIterator<Item = CoreType>) -> Self {
        let mut result = Self::default();

        for core_type in core_types {
            result.push(core_type);
        }

        result
    }

    /// Records the core type of the next processor in traversal order.
    pub(crate) fn push(&mut self, core_type: CoreType) {
        let processor = self.next_processor();

        match core_type {
            CoreType::Performance => CoreRange::observe(&mut self.performance, processor),
            CoreType::Efficiency => CoreRange::observe(&mut self.efficiency, processor),
            CoreType::Unknown => {}
        }

        self.core_types.push(core_type);
    }

    /// The processor that the next [`push()`][Self::push] will describe.
    pub(crate) fn next_processor(&self) -> ProcessorId {
        to_processor_id(self.core_types.len())
    }

    /// The number of processors that were classified.
    #[must_use]
    pub fn processor_count(&self) -> usize {
        self.core_types.len()
    }

    /// The core type of each classified processor, indexed by processor ID.
    #[must_use]
    pub fn core_types(&self) -> &[CoreType] {
        &self.core_types
    }

    /// The core type of one processor, if it was classified.
    #[must_use]
    pub fn core_type(&self, processor: ProcessorId) -> Option<CoreType> {
        self.core_types.get(processor as usize).copied()
    }

    /// The first-to-last range of processors of the given core type.
    ///
    /// Returns `None` if no processor of that type was observed, and always for
    /// [`CoreType::Unknown`], which is never reported as a range.
    #[must_use]
    pub fn range(&self, core_type: CoreType) -> Option<CoreRange> {
        match core_type {
            CoreType::Performance => self.performance,
            CoreType::Efficiency => self.efficiency,
            CoreType::Unknown => None,
        }
    }

    /// The processors of the given core type, in ascending order.
    pub fn processors_of(&self, core_type: CoreType) -> impl Iterator<Item = ProcessorId> {
        self.core_types
            .iter()
            .enumerate()
            .filter(move |(_, candidate)| **candidate == core_type)
            .map(|(index, _)| to_processor_id(index))
    }

    /// The minimal ascending list of disjoint ranges that covers exactly the processors of the
    /// given core type.
    #[must_use]
    pub fn disjoint_ranges(&self, core_type: CoreType) -> Vec<CoreRange> {
        CoreRange::coalesce(self.processors_of(core_type))
    }

    /// Whether the first-to-last [`range()`][Self::range] of the core type covers only processors
    /// of that type. Vacuously true when no processor of the type was observed.
    #[must_use]
    pub fn is_contiguous(&self, core_type: CoreType) -> bool {
        self.range(core_type).is_none_or(|range| {
            self.core_types
                .iter()
                .skip(range.start() as usize)
                .take((range.end().saturating_sub(range.start()) as usize).saturating_add(1))
                .all(|candidate| *candidate == core_type)
        })
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "unrealistic to have more than u32::MAX processors"
)]
fn to_processor_id(index: usize) -> ProcessorId {
    index as ProcessorId
}
