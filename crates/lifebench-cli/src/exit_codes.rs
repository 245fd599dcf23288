//! Process exit codes. Part of the CLI contract; scripts may branch on them.

pub const SUCCESS: i32 = 0;
pub const SWEEP_FAILED: i32 = 1; // A run failed (launch, timeout, unparseable timing) or the log could not be written
pub const CONFIG_ERROR: i32 = 2; // Bad flags or config file; nothing was run
