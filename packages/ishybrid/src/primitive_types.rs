/// Identifies a specific logical processor.
///
/// This will match the numeric identifier used by standard tooling of the operating system.
pub type ProcessorId = u32;

/// Input of an identification query, selecting which block of information to return.
pub type Leaf = u32;

/// Secondary input of an identification query, used by leaves that return more than one block.
pub type Subleaf = u32;
