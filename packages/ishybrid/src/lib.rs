#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Hybrid x86 processors combine more than one microarchitecture of logical core in one package:
//! fast "performance" cores and smaller, slower "efficiency" cores. Schedulers, tuning tools and
//! benchmark harnesses often need to know which logical processors belong to which class so they
//! can pin work to the right kind of core.
//!
//! This package answers that question using only the processor identification registers exposed
//! by the hardware (the `cpuid` instruction), without consulting any operating system topology
//! database.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # How it works
//!
//! 1. The vendor string (leaf 0) is checked. Only Intel defines the hybrid identification scheme,
//!    so other vendors receive an informational report and nothing else happens.
//! 1. The hybrid flag is read from leaf 7 (EDX bit 15).
//! 1. The current thread is pinned to each logical processor in turn and leaf 0x1A is read there.
//!    Bits 24-31 of EAX name the core type of the processor that answered the query. This also
//!    happens on non-hybrid parts, some of which consist only of efficiency cores.
//! 1. Observations are compressed into one inclusive index range per core type. Hybrid parts use
//!    the `P-Core`/`E-Core` labels, other parts the generic `Core`/`Atom` labels.
//!
//! # Example
//!
//! ```no_run
//! use ishybrid::{CoreClassifier, CoreType};
//!
//! let classifier = CoreClassifier::new();
//!
//! if classifier.detect_vendor().vendor().is_hybrid_aware() && classifier.detect_hybrid_capability()
//! {
//!     let classification = classifier.classify_all(classifier.processor_count())?;
//!
//!     if let Some(range) = classification.range(CoreType::Performance) {
//!         println!("Performance processors: {range}");
//!     }
//! }
//! # Ok::<(), ishybrid::Error>(())
//! ```
//!
//! # Known limitation: contiguity
//!
//! The default report describes each core type as a single `start-end` range spanning the first
//! and last processor of that type. If the operating system numbers the processors so that the
//! core types interleave, that span also covers processors of the other type. Use
//! [`RangeLayout::Disjoint`] to get an exact list of ranges instead.
//!
//! # Operating system compatibility
//!
//! Processor pinning is implemented for Linux and Windows. On other operating systems the
//! identification registers can still be read but any attempt to pin the current thread fails
//! with [`Error::Affinity`].

mod affinity_scope;
mod classification;
mod classifier;
mod core_range;
mod core_type;
mod cpuid;
mod error;
mod primitive_types;
mod registers;
mod report;
mod vendor;

pub(crate) use affinity_scope::*;
pub use classification::*;
pub use classifier::*;
pub use core_range::*;
pub use core_type::*;
pub use error::*;
pub use primitive_types::*;
pub use registers::*;
pub use report::*;
pub use vendor::*;

pub(crate) mod pal;
