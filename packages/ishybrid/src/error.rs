use std::io;

use derive_more::derive::Display;
use thiserror::Error;

use crate::ProcessorId;

/// The affinity operation that the operating system refused to perform.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum AffinityOperation {
    /// Reading the processor affinity of the current thread, before pinning it.
    #[display("inspect current thread affinity")]
    Inspect,

    /// Restricting the current thread to a single processor.
    #[display("pin current thread")]
    Pin,

    /// Restoring the processor affinity the current thread had before it was pinned.
    #[display("restore current thread affinity")]
    Restore,
}

/// Errors that can occur when classifying processors.
///
/// There is no partial success: any error means the classification was abandoned and no
/// results were reported.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The operating system refused an affinity operation, for example because the processor
    /// index does not exist or the process lacks the privilege to run on it.
    #[error("failed to {operation} for processor {processor}: {source}")]
    Affinity {
        /// The operation that failed.
        operation: AffinityOperation,

        /// The processor that the current thread was being bound to.
        processor: ProcessorId,

        /// The error reported by the operating system.
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn affinity(
        operation: AffinityOperation,
        processor: ProcessorId,
        source: io::Error,
    ) -> Self {
        Self::Affinity {
            operation,
            processor,
            source,
        }
    }
}

/// A specialized `Result` type for classification operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::error::Error as _;
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn affinity_error_names_operation_and_processor() {
        let error = Error::affinity(
            AffinityOperation::Pin,
            17,
            io::Error::from_raw_os_error(22),
        );

        let message = error.to_string();

        assert!(message.starts_with("failed to pin current thread for processor 17: "));
        assert!(error.source().is_some());
    }

    #[test]
    fn operations_display() {
        assert_eq!(
            AffinityOperation::Inspect.to_string(),
            "inspect current thread affinity"
        );
        assert_eq!(AffinityOperation::Pin.to_string(), "pin current thread");
        assert_eq!(
            AffinityOperation::Restore.to_string(),
            "restore current thread affinity"
        );
    }
}
