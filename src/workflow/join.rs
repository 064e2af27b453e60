//! Settle-all parallel join.

use std::future::Future;

/// Await both branches to completion and return each branch's own outcome.
///
/// Unlike a fail-fast join, a failure in one branch never cancels or masks
/// the other; callers inspect the two results independently.
pub async fn join_settled<A, B, E, FA, FB>(a: FA, b: FB) -> (Result<A, E>, Result<B, E>)
where
    FA: Future<Output = Result<A, E>>,
    FB: Future<Output = Result<B, E>>,
{
    tokio::join!(a, b)
}
