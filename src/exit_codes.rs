//! Exit code constants for the opsgate CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable files, unknown names)
//! - 2: Validation failure (workflow definition problems)
//! - 3: Node failure (handler returned Failed or a command could not run)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, or unknown gate/handler names.
pub const USER_ERROR: i32 = 1;

/// Validation failure: a workflow definition has one or more issues.
pub const VALIDATION_FAILURE: i32 = 2;

/// Node failure: the compute node finished with a Failed status.
pub const NODE_FAILURE: i32 = 3;
