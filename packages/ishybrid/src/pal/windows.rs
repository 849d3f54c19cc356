mod bindings;
mod platform;

pub(crate) use bindings::*;
pub(crate) use platform::*;

type ProcessorGroupIndex = u16;
