use std::io;
use std::num::NonZeroUsize;

use crate::pal::Platform;
use crate::{Leaf, ProcessorId, RegisterQuad, Subleaf, cpuid};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// Fallback platform implementation for operating systems without native support.
///
/// The identification registers can still be read but the current thread cannot be pinned, so
/// every affinity operation fails with [`io::ErrorKind::Unsupported`]. Classification of
/// individual processors is therefore impossible and fails loudly instead of silently reporting
/// whatever processor the thread happened to run on.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    fn identify(&self, leaf: Leaf, subleaf: Subleaf) -> RegisterQuad {
        cpuid::query(leaf, subleaf)
    }

    fn processor_count(&self) -> ProcessorId {
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .ok()
            .and_then(|count| ProcessorId::try_from(count).ok())
            .unwrap_or(1)
    }

    fn current_thread_processors(&self) -> io::Result<Vec<ProcessorId>> {
        Err(unsupported())
    }

    fn pin_current_thread_to(&self, _processor: ProcessorId) -> io::Result<()> {
        Err(unsupported())
    }

    fn restore_current_thread_processors(&self, _processors: &[ProcessorId]) -> io::Result<()> {
        Err(unsupported())
    }
}

fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "processor affinity is not supported on this operating system",
    )
}
