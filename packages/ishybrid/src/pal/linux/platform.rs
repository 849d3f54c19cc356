use std::num::NonZeroUsize;
use std::{io, mem};

use libc::cpu_set_t;

use crate::pal::Platform;
use crate::pal::linux::{Bindings, BindingsFacade};
use crate::{Leaf, ProcessorId, RegisterQuad, Subleaf, cpuid};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(BindingsFacade::target());

/// Number of processors that fit into the fixed-size `cpu_set_t` used with the affinity calls.
#[expect(
    clippy::cast_sign_loss,
    reason = "libc constant is a small positive integer"
)]
const CPU_SET_CAPACITY: usize = libc::CPU_SETSIZE as usize;

/// The platform that matches the crate's build target.
///
/// You would only use a different platform in unit tests that need to mock the platform.
/// Even then, whenever possible, unit tests should use the real platform for maximum realism.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    bindings: BindingsFacade,
}

impl BuildTargetPlatform {
    pub(super) const fn new(bindings: BindingsFacade) -> Self {
        Self { bindings }
    }
}

impl Platform for BuildTargetPlatform {
    #[cfg_attr(test, mutants::skip)] // Pass-through to hardware.
    fn identify(&self, leaf: Leaf, subleaf: Subleaf) -> RegisterQuad {
        cpuid::query(leaf, subleaf)
    }

    fn processor_count(&self) -> ProcessorId {
        let online = self.bindings.sysconf_online_processors();

        match ProcessorId::try_from(online) {
            Ok(count) if count > 0 => count,
            _ => {
                // sysconf() only fails on exotic kernels. The standard library has its own
                // fallbacks, so we defer to it instead of reporting nonsense.
                tracing::warn!(
                    online,
                    "sysconf(_SC_NPROCESSORS_ONLN) failed, falling back to available parallelism"
                );

                std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .ok()
                    .and_then(|count| ProcessorId::try_from(count).ok())
                    .unwrap_or(1)
            }
        }
    }

    fn current_thread_processors(&self) -> io::Result<Vec<ProcessorId>> {
        let affinity = self.bindings.sched_getaffinity_current()?;

        Ok((0..CPU_SET_CAPACITY)
            // SAFETY: No safety requirements, the index is within the set.
            .filter(|index| unsafe { libc::CPU_ISSET(*index, &affinity) })
            .map(to_processor_id)
            .collect())
    }

    fn pin_current_thread_to(&self, processor: ProcessorId) -> io::Result<()> {
        let cpu_set = cpu_set_from([processor])?;

        self.bindings.sched_setaffinity_current(&cpu_set)
    }

    fn restore_current_thread_processors(&self, processors: &[ProcessorId]) -> io::Result<()> {
        let cpu_set = cpu_set_from(processors.iter().copied())?;

        self.bindings.sched_setaffinity_current(&cpu_set)
    }
}

/// Builds a CPU set containing the given processors.
///
/// Processors that do not fit into `cpu_set_t` are rejected with `EINVAL`, the same error the
/// kernel reports for processors that do not exist.
fn cpu_set_from(processors: impl IntoIterator<Item = ProcessorId>) -> io::Result<cpu_set_t> {
    // SAFETY: Zero-initialized cpu_set_t is a valid value.
    let mut cpu_set: cpu_set_t = unsafe { mem::zeroed() };

    for processor in processors {
        let index = processor as usize;

        if index >= CPU_SET_CAPACITY {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }

        // SAFETY: No safety requirements, the index was bounds-checked above.
        unsafe {
            libc::CPU_SET(index, &mut cpu_set);
        }
    }

    Ok(cpu_set)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "index is bounded by CPU_SETSIZE"
)]
fn to_processor_id(index: usize) -> ProcessorId {
    index as ProcessorId
}

#[allow(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    reason = "we need not worry in tests"
)]
