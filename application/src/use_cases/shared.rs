//! Shared utilities for use cases.

use tokio_util::sync::CancellationToken;

use crate::use_cases::run_fixup::FixupError;

/// Check if cancellation has been requested.
///
/// Returns `Err(FixupError::Cancelled)` if the token exists and is
/// cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), FixupError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(FixupError::Cancelled);
    }
    Ok(())
}
