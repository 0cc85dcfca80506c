//! Process exit codes. Part of the public contract for scripts driving ferry.

use ferry_bundle::BundleError;
use ferry_core::{IngestError, PackError};
use ferry_gitlab::GitLabError;
use ferry_store::StoreError;

pub const EXIT_SUCCESS: i32 = 0;
/// Operation failed (clone, push, API, I/O).
pub const EXIT_FAILED: i32 = 1;
/// Invalid arguments, configuration or input data.
pub const EXIT_CONFIG_ERROR: i32 = ferry_core::EXIT_USAGE;
/// Push rejected by branch protection; operator action required.
pub const EXIT_PROTECTED_BRANCH: i32 = ferry_core::EXIT_PROTECTED_BRANCH;
/// Bundle archive or manifest is unusable.
pub const EXIT_CORRUPT_BUNDLE: i32 = ferry_core::EXIT_CORRUPT_BUNDLE;

/// Exit code for the first typed error in the chain.
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<IngestError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<PackError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<StoreError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<BundleError>() {
            return if e.is_corrupt() {
                EXIT_CORRUPT_BUNDLE
            } else if e.is_validation() {
                EXIT_CONFIG_ERROR
            } else {
                EXIT_FAILED
            };
        }
        if let Some(e) = cause.downcast_ref::<GitLabError>() {
            return e.exit_code();
        }
    }
    EXIT_FAILED
}
