use std::fmt::Debug;
use std::io;

use windows::Win32::System::SystemInformation::GROUP_AFFINITY;

/// Bindings for FFI calls into external libraries (either provided by operating system or not).
///
/// All PAL FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    fn get_active_processor_group_count(&self) -> u16;

    fn get_active_processor_count(&self, group_number: u16) -> u32;

    // GetThreadGroupAffinity() for the current thread
    fn get_current_thread_group_affinity(&self) -> io::Result<GROUP_AFFINITY>;

    // SetThreadGroupAffinity() for the current thread
    fn set_current_thread_group_affinity(&self, affinity: &GROUP_AFFINITY) -> io::Result<()>;
}
