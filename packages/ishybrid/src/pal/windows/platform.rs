use std::io;

use windows::Win32::System::SystemInformation::GROUP_AFFINITY;

use crate::pal::Platform;
use crate::pal::windows::{Bindings, BindingsFacade, ProcessorGroupIndex};
use crate::{Leaf, ProcessorId, RegisterQuad, Subleaf, cpuid};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(BindingsFacade::target());

/// A processor group holds at most this many processors, one per bit of the affinity mask.
const MAX_GROUP_SIZE: u32 = usize::BITS;

/// The platform that matches the crate's build target.
///
/// Global processor indices are assigned group by group: the processors of group 0 come first,
/// followed by those of group 1 and so on, matching how the operating system tools number them.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    bindings: BindingsFacade,
}

impl BuildTargetPlatform {
    pub(super) const fn new(bindings: BindingsFacade) -> Self {
        Self { bindings }
    }

    /// The number of active processors in each processor group.
    fn group_sizes(&self) -> Vec<u32> {
        (0..self.bindings.get_active_processor_group_count())
            .map(|group| {
                self.bindings
                    .get_active_processor_count(group)
                    .min(MAX_GROUP_SIZE)
            })
            .collect()
    }

    /// Translates a global processor index into a group and an index within that group.
    fn locate(&self, processor: ProcessorId) -> io::Result<(ProcessorGroupIndex, u32)> {
        let mut remaining = processor;

        for (group, size) in self.group_sizes().into_iter().enumerate() {
            if remaining < size {
                let group = ProcessorGroupIndex::try_from(group)
                    .map_err(|_| invalid_processor(processor))?;

                return Ok((group, remaining));
            }

            remaining = remaining.saturating_sub(size);
        }

        Err(invalid_processor(processor))
    }

    /// The global index of the first processor in the given group.
    fn group_start(&self, group: ProcessorGroupIndex) -> ProcessorId {
        self.group_sizes()
            .into_iter()
            .take(usize::from(group))
            .fold(0, ProcessorId::saturating_add)
    }
}

impl Platform for BuildTargetPlatform {
    #[cfg_attr(test, mutants::skip)] // Pass-through to hardware.
    fn identify(&self, leaf: Leaf, subleaf: Subleaf) -> RegisterQuad {
        cpuid::query(leaf, subleaf)
    }

    fn processor_count(&self) -> ProcessorId {
        self.group_sizes()
            .into_iter()
            .fold(0, ProcessorId::saturating_add)
    }

    fn current_thread_processors(&self) -> io::Result<Vec<ProcessorId>> {
        let affinity = self.bindings.get_current_thread_group_affinity()?;
        let group_start = self.group_start(affinity.Group);

        Ok((0..MAX_GROUP_SIZE)
            .filter(|index| affinity.Mask & (1 << index) != 0)
            .map(|index| group_start.saturating_add(index))
            .collect())
    }

    fn pin_current_thread_to(&self, processor: ProcessorId) -> io::Result<()> {
        let (group, index_in_group) = self.locate(processor)?;

        let affinity = GROUP_AFFINITY {
            Group: group,
            Mask: 1 << index_in_group,
            ..Default::default()
        };

        self.bindings.set_current_thread_group_affinity(&affinity)
    }

    fn restore_current_thread_processors(&self, processors: &[ProcessorId]) -> io::Result<()> {
        let mut affinity = GROUP_AFFINITY::default();
        let mut affinity_group = None;

        for &processor in processors {
            let (group, index_in_group) = self.locate(processor)?;

            // A thread belongs to exactly one processor group, so any set we previously read from
            // the operating system is confined to one group.
            if *affinity_group.get_or_insert(group) != group {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "processors from different processor groups cannot share a thread affinity",
                ));
            }

            affinity.Mask |= 1 << index_in_group;
        }

        affinity.Group = affinity_group.unwrap_or_default();

        self.bindings.set_current_thread_group_affinity(&affinity)
    }
}

fn invalid_processor(processor: ProcessorId) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("processor {processor} does not exist"),
    )
}

#[allow(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    reason = "we need not worry in tests"
)]
