use std::fmt::Debug;
use std::io;

use crate::{Leaf, ProcessorId, RegisterQuad, Subleaf};

/// Operations the classifier needs from the hardware and the operating system.
///
/// This trait is automatically mocked by mockall in test builds, generating `MockPlatform`.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Issues an identification query on whichever processor the current thread is running on.
    fn identify(&self, leaf: Leaf, subleaf: Subleaf) -> RegisterQuad;

    /// The number of logical processors available to the operating system scheduler.
    fn processor_count(&self) -> ProcessorId;

    /// The processors the current thread is currently allowed to run on, in ascending order.
    fn current_thread_processors(&self) -> io::Result<Vec<ProcessorId>>;

    /// Restricts the current thread to exactly one processor.
    ///
    /// Only the current thread is affected, never sibling threads of the process.
    fn pin_current_thread_to(&self, processor: ProcessorId) -> io::Result<()>;

    /// Allows the current thread to run on exactly the given processors again, typically a set
    /// previously obtained from [`current_thread_processors()`][Self::current_thread_processors].
    fn restore_current_thread_processors(&self, processors: &[ProcessorId]) -> io::Result<()>;
}
