//! Primary/fallback model retry
//!
//! Every adapter issues one request with its primary model. If that fails
//! with a model-unavailable class error and a distinct fallback model exists,
//! exactly one more request is issued with the fallback. Nothing else is
//! retried.

use std::future::Future;

use crate::{Error, Result};

/// Provider error code reported for unknown or inaccessible models
pub const MODEL_NOT_FOUND: &str = "model_not_found";

/// Whether an error warrants a retry with the fallback model
///
/// True for upstream replies with status 400 or 404, or carrying the
/// `model_not_found` code. Transport failures and every other error are
/// not eligible.
#[must_use]
pub fn is_fallback_eligible(err: &Error) -> bool {
    match err {
        Error::Upstream { status, code, .. } => {
            matches!(status, Some(400 | 404)) || code.as_deref() == Some(MODEL_NOT_FOUND)
        }
        _ => false,
    }
}

/// Run `attempt` with `primary`, retrying once with `fallback` when the
/// first failure is fallback-eligible and the fallback differs from primary
///
/// The fallback attempt's error, if any, is returned as-is.
///
/// # Errors
///
/// Returns the primary error when no retry applies, otherwise the fallback error
pub async fn with_fallback<T, F, Fut>(
    primary: &str,
    fallback: Option<&str>,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let err = match attempt(primary.to_string()).await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    if !is_fallback_eligible(&err) {
        return Err(err);
    }

    let Some(fallback) = fallback.filter(|f| *f != primary) else {
        tracing::debug!(primary, "no distinct fallback model, not retrying");
        return Err(err);
    };

    tracing::warn!(
        primary,
        fallback,
        error = %err,
        "primary model unavailable, retrying with fallback"
    );

    attempt(fallback.to_string()).await
}
