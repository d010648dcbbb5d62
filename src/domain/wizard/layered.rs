//! Shared backward resolution over the step list
//!
//! Both scoped stores read "as of" the current step: the newest step that
//! actually wrote the requested data wins, older steps are shadowed. The
//! walk itself lives here once, parameterized by a fetch strategy, so the
//! record store and the table store cannot diverge on resolution order.

use std::future::Future;

use crate::domain::DomainError;

/// Walks `steps_newest_first` and returns the first step for which `fetch`
/// yields a value, together with that value. `None` when no step has one.
pub async fn resolve_layered<T, F, Fut>(
    steps_newest_first: &[String],
    fetch: F,
) -> Result<Option<(String, T)>, DomainError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<T>, DomainError>>,
{
    for step in steps_newest_first {
        if let Some(value) = fetch(step.clone()).await? {
            return Ok(Some((step.clone(), value)));
        }
    }

    Ok(None)
}
