use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::MockPlatform;
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, Platform};
use crate::{Leaf, ProcessorId, RegisterQuad, Subleaf};

/// Hides the real/mock platform choice behind a single type.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Target(&'static BuildTargetPlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) const fn target() -> Self {
        Self::Target(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Platform for PlatformFacade {
    fn identify(&self, leaf: Leaf, subleaf: Subleaf) -> RegisterQuad {
        match self {
            Self::Target(p) => p.identify(leaf, subleaf),
            #[cfg(test)]
            Self::Mock(p) => p.identify(leaf, subleaf),
        }
    }

    fn processor_count(&self) -> ProcessorId {
        match self {
            Self::Target(p) => p.processor_count(),
            #[cfg(test)]
            Self::Mock(p) => p.processor_count(),
        }
    }

    fn current_thread_processors(&self) -> io::Result<Vec<ProcessorId>> {
        match self {
            Self::Target(p) => p.current_thread_processors(),
            #[cfg(test)]
            Self::Mock(p) => p.current_thread_processors(),
        }
    }

    fn pin_current_thread_to(&self, processor: ProcessorId) -> io::Result<()> {
        match self {
            Self::Target(p) => p.pin_current_thread_to(processor),
            #[cfg(test)]
            Self::Mock(p) => p.pin_current_thread_to(processor),
        }
    }

    fn restore_current_thread_processors(&self, processors: &[ProcessorId]) -> io::Result<()> {
        match self {
            Self::Target(p) => p.restore_current_thread_processors(processors),
            #[cfg(test)]
            Self::Mock(p) => p.restore_current_thread_processors(processors),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Default for PlatformFacade {
    fn default() -> Self {
        Self::target()
    }
}
