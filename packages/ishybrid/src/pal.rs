//! Platform Abstraction Layer (PAL). Everything that touches operating system state (processor
//! count and thread affinity) or the hardware (identification queries) goes through here so that
//! the classification logic can be exercised against a mock platform.

mod abstractions;
pub(crate) use abstractions::*;

mod facade;
pub(crate) use facade::*;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub(crate) use linux::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::*;

// Compiled in test mode on every platform so its tests run everywhere. Only glob-imported where it
// is the primary implementation, elsewhere it must be reached via the explicit `fallback::` path.
#[cfg(any(test, not(any(target_os = "linux", windows))))]
pub(crate) mod fallback;
#[cfg(not(any(target_os = "linux", windows)))]
pub(crate) use fallback::*;
