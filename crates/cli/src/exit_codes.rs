//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part
//! of the shell contract — scripts rely on them to tell pipeline
//! stages apart.
//!
//! # Exit Code Ranges
//!
//! | Range | Domain    | Description                                |
//! |-------|-----------|--------------------------------------------|
//! | 0     | Universal | Success                                    |
//! | 1     | Universal | General error (unspecified)                |
//! | 2     | Universal | CLI usage error (bad args, missing file)   |
//! | 10-19 | input     | Upload could not be parsed into a table    |
//! | 20-29 | schema    | Required columns missing                   |
//! | 30-39 | service   | Classification service call failed         |
//! | 40-49 | export    | Prediction artifact could not be written   |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable input file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input (10-19)
// =============================================================================

/// Upload bytes could not be parsed into a rectangular table.
pub const EXIT_INPUT_MALFORMED: u8 = 10;

// =============================================================================
// Schema (20-29)
// =============================================================================

/// One or more required columns are missing (user-correctable; no
/// network call was made).
pub const EXIT_SCHEMA_MISSING: u8 = 20;

// =============================================================================
// Service (30-39)
// =============================================================================

/// Service unreachable: connection refused, DNS failure, timeout.
pub const EXIT_SERVICE_TRANSPORT: u8 = 30;

/// Service answered with a non-success HTTP status.
pub const EXIT_SERVICE_REJECTED: u8 = 31;

/// Service answered 2xx but the body doesn't match the contract.
pub const EXIT_SERVICE_SHAPE: u8 = 32;

// =============================================================================
// Export (40-49)
// =============================================================================

/// Prediction artifact could not be encoded or written.
pub const EXIT_EXPORT: u8 = 40;
