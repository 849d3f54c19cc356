#![cfg_attr(coverage_nightly, coverage(off))]

use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

use windows::Win32::System::SystemInformation::GROUP_AFFINITY;

#[cfg(test)]
use crate::pal::windows::MockBindings;
use crate::pal::windows::{Bindings, BuildTargetBindings};

/// Hide the real/mock bindings choice behind a single type.
#[derive(Clone)]
pub(crate) enum BindingsFacade {
    Target(&'static BuildTargetBindings),

    #[cfg(test)]
    Mock(Arc<MockBindings>),
}

impl BindingsFacade {
    pub(crate) const fn target() -> Self {
        Self::Target(&BuildTargetBindings)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockBindings) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

#[cfg_attr(test, mutants::skip)] // Trivial pass-through layer.
impl Bindings for BindingsFacade {
    fn get_active_processor_group_count(&self) -> u16 {
        match self {
            Self::Target(bindings) => bindings.get_active_processor_group_count(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.get_active_processor_group_count(),
        }
    }

    fn get_active_processor_count(&self, group_number: u16) -> u32 {
        match self {
            Self::Target(bindings) => bindings.get_active_processor_count(group_number),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.get_active_processor_count(group_number),
        }
    }

    fn get_current_thread_group_affinity(&self) -> io::Result<GROUP_AFFINITY> {
        match self {
            Self::Target(bindings) => bindings.get_current_thread_group_affinity(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.get_current_thread_group_affinity(),
        }
    }

    fn set_current_thread_group_affinity(&self, affinity: &GROUP_AFFINITY) -> io::Result<()> {
        match self {
            Self::Target(bindings) => bindings.set_current_thread_group_affinity(affinity),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.set_current_thread_group_affinity(affinity),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for BindingsFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
