//! Exit code constants for binaries built on job-lock.
//!
//! A successful run exits with 0; these are the failure codes.
//!
//! - 1: User error (bad configuration or arguments)
//! - 2: Filesystem failure on the acquisition path
//! - 4: Lock still not acquired after the retry ceiling

/// User error: invalid configuration or arguments.
pub const USER_ERROR: i32 = 1;

/// Filesystem failure while creating or inspecting a claim.
pub const IO_FAILURE: i32 = 2;

/// A waiting lock exhausted its iteration ceiling.
pub const LOCK_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [USER_ERROR, IO_FAILURE, LOCK_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn failure_codes_are_nonzero() {
        for code in [USER_ERROR, IO_FAILURE, LOCK_FAILURE] {
            assert_ne!(code, 0);
        }
    }
}
