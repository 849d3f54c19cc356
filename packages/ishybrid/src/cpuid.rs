//! The identification reader: issues one `cpuid` query and returns the output registers.
//!
//! The implementation is selected by the build target architecture. There is no runtime
//! detection because every x86 processor that can run this code supports the instruction.

#[cfg(target_arch = "x86")]
pub(crate) use std::arch::x86::{CpuidResult, __cpuid_count};
#[cfg(target_arch = "x86_64")]
pub(crate) use std::arch::x86_64::{CpuidResult, __cpuid_count};

use crate::{Leaf, RegisterQuad, Subleaf};

/// Executes the identification instruction for the given leaf and subleaf.
///
/// The answer comes from the logical processor the calling thread is running on at the time of
/// the call. On hybrid processors some leaves differ between processors, so callers interested in
/// a specific processor must pin the thread first.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[cfg_attr(test, mutants::skip)] // Pass-through to hardware, nothing to mutate.
pub(crate) fn query(leaf: Leaf, subleaf: Subleaf) -> RegisterQuad {
    // SAFETY: The instruction is available on every x86 processor this code can run on and has
    // no side effects beyond writing the output registers.
    #[allow(
        unused_unsafe,
        reason = "the intrinsic is safe in newer toolchains and unsafe in older ones"
    )]
    let result = unsafe { __cpuid_count(leaf, subleaf) };

    result.into()
}

/// Stand-in for architectures without the identification instruction.
///
/// All-zero output decodes to an unrecognized vendor, which stops classification before any
/// processor-specific query is made.
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
#[cfg_attr(test, mutants::skip)] // No logic to mutate.
pub(crate) fn query(_leaf: Leaf, _subleaf: Subleaf) -> RegisterQuad {
    RegisterQuad::default()
}
