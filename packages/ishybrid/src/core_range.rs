use derive_more::derive::Display;
use itertools::Itertools;

use crate::ProcessorId;

/// An inclusive range of processor indices believed to belong to one core type.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("{start}-{end}")]
pub struct CoreRange {
    start: ProcessorId,
    end: ProcessorId,
}

impl CoreRange {
    /// Creates a range covering `start..=end`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    #[must_use]
    pub const fn new(start: ProcessorId, end: ProcessorId) -> Self {
        assert!(start <= end, "range start must be <= end");

        Self { start, end }
    }

    /// Creates a range covering exactly one processor.
    #[must_use]
    pub const fn single(processor: ProcessorId) -> Self {
        Self {
            start: processor,
            end: processor,
        }
    }

    /// First processor in the range.
    #[must_use]
    pub const fn start(&self) -> ProcessorId {
        self.start
    }

    /// Last processor in the range (inclusive).
    #[must_use]
    pub const fn end(&self) -> ProcessorId {
        self.end
    }

    /// Number of processors covered by the range.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "end >= start is an invariant of the type"
    )]
    pub const fn processor_count(&self) -> u64 {
        self.end as u64 - self.start as u64 + 1
    }

    /// Whether `processor` falls within the range.
    #[must_use]
    pub const fn contains(&self, processor: ProcessorId) -> bool {
        self.start <= processor && processor <= self.end
    }

    /// Records another observation of the same core type.
    ///
    /// Processors are observed in increasing index order, so the observation always becomes the
    /// new end of the range. Whether the processors in between share the core type is not checked.
    pub(crate) fn observe(range: &mut Option<Self>, processor: ProcessorId) {
        match range {
            Some(existing) => {
                debug_assert!(
                    processor >= existing.end,
                    "processors must be observed in increasing order"
                );
                existing.end = processor;
            }
            None => *range = Some(Self::single(processor)),
        }
    }

    /// Compresses ascending processor indices into the minimal list of disjoint ranges.
    pub(crate) fn coalesce(processors: impl IntoIterator<Item = ProcessorId>) -> Vec<Self> {
        processors
            .into_iter()
            .map(Self::single)
            .coalesce(|previous, next| {
                if previous.end.checked_add(1) == Some(next.start) {
                    Ok(Self::new(previous.start, next.end))
                } else {
                    Err((previous, next))
                }
            })
            .collect()
    }
}
