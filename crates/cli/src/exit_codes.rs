//! CLI Exit Code Registry
//!
//! Single source of truth for every exit code `introcheck` returns.
//! Exit codes are part of the shell contract; CI jobs rely on them.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success                                           |
//! | 1    | General error (unspecified)                       |
//! | 2    | Usage error (bad args, unreadable settings file)  |
//! | 3    | `compare --fail-on-regression` found a regression |
//! | 4    | `validate` found a schema violation               |
//! | 5    | Report input missing or malformed                 |
//! | 6    | Server or network error                           |
//! | 7    | Server rejected the API key                       |
//!
//! New codes go at the end of the table. Never renumber.

/// Command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments, missing required options, malformed settings file.
pub const EXIT_USAGE: u8 = 2;

/// At least one episode classified `only_previous` or `different`.
/// Only returned with `--fail-on-regression`.
pub const EXIT_REGRESSION: u8 = 3;

/// An intro response violated the version 1 API schema.
pub const EXIT_SCHEMA_VIOLATION: u8 = 4;

/// A report file could not be read or decoded.
pub const EXIT_REPORT_INPUT: u8 = 5;

/// Connection failure, timeout, unexpected status or undecodable response.
pub const EXIT_SERVER: u8 = 6;

/// HTTP 401 from the server.
pub const EXIT_UNAUTHORIZED: u8 = 7;
