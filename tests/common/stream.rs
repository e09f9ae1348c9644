//! Stream collection utilities for testing walks.

use futures_core::Stream;
use snmpc::{Transport, VarBind, Walk};
use std::future::poll_fn;
use std::pin::Pin;
use std::task::Context;

/// Collect items from a stream up to a limit.
pub async fn collect_stream<S, T, E>(mut stream: Pin<&mut S>, limit: usize) -> Vec<Result<T, E>>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    let mut results = Vec::new();
    while results.len() < limit {
        let item = poll_fn(|cx: &mut Context<'_>| Pin::new(&mut stream).poll_next(cx)).await;

        match item {
            Some(result) => results.push(result),
            None => break,
        }
    }
    results
}

/// Drain a walk: the bindings emitted, then the error that ended it, if any.
pub async fn collect_walk<T: Transport + 'static>(
    walk: &mut Walk<T>,
) -> (Vec<VarBind>, Option<snmpc::Error>) {
    let mut bindings = Vec::new();
    for item in collect_stream(Pin::new(walk), 10_000).await {
        match item {
            Ok(vb) => bindings.push(vb),
            Err(e) => return (bindings, Some(e)),
        }
    }
    (bindings, None)
}
