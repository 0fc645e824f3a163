//! One task per region, first failure cancels the rest.

use crate::error::{LayerError, LayerResult};
use crate::version::RegionSet;
use std::future::Future;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs `task` once per region concurrently and returns the results in region
/// order.
///
/// Every task gets a child of `cancel`. The first task error cancels that
/// child, so siblings stop at their next suspension point; their own errors are
/// discarded and only the first one is returned. Results are written into the
/// slot matching the region index, regardless of completion order.
pub(crate) async fn fan_out<T, F, Fut>(
    regions: &RegionSet,
    cancel: &CancellationToken,
    task: F,
) -> LayerResult<Vec<T>>
where
    T: Send + 'static,
    F: Fn(String, CancellationToken) -> Fut,
    Fut: Future<Output = LayerResult<T>> + Send + 'static,
{
    let group = cancel.child_token();
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None)
        .take(regions.len())
        .collect();

    let mut tasks = JoinSet::new();
    for (index, region) in regions.iter().enumerate() {
        let token = group.clone();
        let work = task(region.clone(), token.clone());
        tasks.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(LayerError::Cancelled),
                result = work => result,
            };
            (index, result)
        });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let failure = match joined {
            Ok((index, Ok(value))) => {
                slots[index] = Some(value);
                continue;
            }
            Ok((_, Err(err))) => err,
            Err(join_err) => LayerError::Task(join_err.to_string()),
        };

        if first_error.is_none() {
            group.cancel();
            first_error = Some(failure);
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    slots
        .into_iter()
        .collect::<Option<Vec<T>>>()
        .ok_or_else(|| LayerError::Task("region task finished without a result".to_string()))
}
