//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract. Scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad mode)     |
//! | 3       | Universal        | Cannot read input / write output         |
//! | 60-69   | load             | Export loading and member lookup         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use rcptscope_receipts::LoadError;

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// Input file unreadable, or output could not be written.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Load (60-69)
// =============================================================================

/// Input has no data rows (header only, or empty).
pub const EXIT_LOAD_EMPTY: u8 = 60;

/// Required columns of the selected profile are missing from the header.
pub const EXIT_LOAD_SCHEMA: u8 = 61;

/// A data row has a time value that cannot be normalized.
pub const EXIT_LOAD_ROW_FORMAT: u8 = 62;

/// Profile file could not be parsed or failed validation.
pub const EXIT_LOAD_PROFILE_CONFIG: u8 = 63;

/// Requested member id has no lines in the export.
pub const EXIT_UNKNOWN_MEMBER: u8 = 64;

/// Map a load error to its exit code.
pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::EmptyInput => EXIT_LOAD_EMPTY,
        LoadError::MissingColumns { .. } => EXIT_LOAD_SCHEMA,
        LoadError::RowFormat { .. } => EXIT_LOAD_ROW_FORMAT,
        LoadError::ProfileConfig(_) => EXIT_LOAD_PROFILE_CONFIG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_map_to_distinct_codes() {
        let codes = [
            load_exit_code(&LoadError::EmptyInput),
            load_exit_code(&LoadError::MissingColumns { profile: "P".into(), columns: vec![] }),
            load_exit_code(&LoadError::RowFormat {
                record: 1,
                column: "t".into(),
                value: "x".into(),
            }),
            load_exit_code(&LoadError::ProfileConfig("bad".into())),
        ];
        assert_eq!(codes, [60, 61, 62, 63]);
    }
}
