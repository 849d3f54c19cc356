use std::io;

use windows::Win32::System::SystemInformation::GROUP_AFFINITY;
use windows::Win32::System::Threading::{
    GetActiveProcessorCount, GetActiveProcessorGroupCount, GetCurrentThread,
    GetThreadGroupAffinity, SetThreadGroupAffinity,
};

use crate::pal::windows::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock bindings.
/// Even then, whenever possible, unit tests should use real bindings for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Bindings for BuildTargetBindings {
    fn get_active_processor_group_count(&self) -> u16 {
        // SAFETY: No safety requirements.
        unsafe { GetActiveProcessorGroupCount() }
    }

    fn get_active_processor_count(&self, group_number: u16) -> u32 {
        // SAFETY: No safety requirements.
        unsafe { GetActiveProcessorCount(group_number) }
    }

    fn get_current_thread_group_affinity(&self) -> io::Result<GROUP_AFFINITY> {
        // SAFETY: No safety requirements. Does not require closing the handle.
        let current_thread = unsafe { GetCurrentThread() };

        let mut affinity = GROUP_AFFINITY::default();

        // SAFETY: No safety requirements beyond passing valid input.
        unsafe { GetThreadGroupAffinity(current_thread, &raw mut affinity) }
            .map_err(io::Error::other)?;

        Ok(affinity)
    }

    fn set_current_thread_group_affinity(&self, affinity: &GROUP_AFFINITY) -> io::Result<()> {
        // SAFETY: No safety requirements. Does not require closing the handle.
        let current_thread = unsafe { GetCurrentThread() };

        // SAFETY: No safety requirements beyond passing valid input.
        unsafe { SetThreadGroupAffinity(current_thread, affinity, None) }
            .map_err(io::Error::other)
    }
}
