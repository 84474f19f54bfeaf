//! Engine-wide constants.

/// Maximum number of restore points kept on the undo stack.
pub const MAX_UNDO_DEPTH: usize = 100;
