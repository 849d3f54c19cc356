use std::cell::Cell;

use negative_impl::negative_impl;

use crate::pal::{Platform, PlatformFacade};
use crate::{AffinityOperation, Error, ProcessorId, Result};

thread_local! {
    /// Whether an `AffinityScope` currently exists on this thread.
    static SCOPE_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Binds the current thread to exactly one processor for as long as the scope exists.
///
/// Acquiring the scope records the processors the thread was allowed to run on and then pins the
/// thread. Releasing the scope (explicitly via [`release()`][Self::release] or implicitly on drop)
/// restores the recorded set, so a single-processor restriction never leaks into unrelated code.
///
/// Scopes are not reentrant: at most one may exist per thread at any time. They are also bound to
/// the thread that acquired them and can be neither sent nor shared across threads.
#[derive(Debug)]
pub(crate) struct AffinityScope<'a> {
    platform: &'a PlatformFacade,
    processor: ProcessorId,

    previous: Vec<ProcessorId>,

    // Set once the previous affinity has been restored (or restoring it was attempted).
    released: bool,
}

impl<'a> AffinityScope<'a> {
    /// Pins the current thread to `processor`.
    ///
    /// # Panics
    ///
    /// Panics if another scope is active on the current thread.
    pub(crate) fn acquire(platform: &'a PlatformFacade, processor: ProcessorId) -> Result<Self> {
        assert!(
            !SCOPE_ACTIVE.get(),
            "an affinity scope is already active on this thread - scopes cannot be nested"
        );

        let previous = platform
            .current_thread_processors()
            .map_err(|e| Error::affinity(AffinityOperation::Inspect, processor, e))?;

        platform
            .pin_current_thread_to(processor)
            .map_err(|e| Error::affinity(AffinityOperation::Pin, processor, e))?;

        SCOPE_ACTIVE.set(true);

        Ok(Self {
            platform,
            processor,
            previous,
            released: false,
        })
    }

    /// The processor the current thread is pinned to.
    #[cfg(test)]
    pub(crate) fn processor(&self) -> ProcessorId {
        self.processor
    }

    /// Restores the affinity the current thread had before the scope was acquired.
    pub(crate) fn release(mut self) -> Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        self.released = true;
        SCOPE_ACTIVE.set(false);

        self.platform
            .restore_current_thread_processors(&self.previous)
            .map_err(|e| Error::affinity(AffinityOperation::Restore, self.processor, e))
    }
}

impl Drop for AffinityScope<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        // Dropped without an explicit release, most likely due to an early return or a panic.
        // There is nobody to report the error to, so the best we can do is to make noise.
        if let Err(e) = self.restore() {
            tracing::warn!(
                processor = self.processor,
                error = %e,
                "current thread may remain pinned to a single processor"
            );
        }
    }
}

#[negative_impl]
impl<'a> !Send for AffinityScope<'a> {}
#[negative_impl]
impl<'a> !Sync for AffinityScope<'a> {}
