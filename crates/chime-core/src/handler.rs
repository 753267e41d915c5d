//! Callback boxing.
//!
//! Every registry entry stores a directly invokable function value. Async
//! closures and `async fn`s taking a context and returning a
//! [`HandlerResult`] implement [`Callback`] automatically:
//!
//! ```rust,ignore
//! async fn ping(ctx: CommandContext) -> HandlerResult {
//!     ctx.reply("pong").await?;
//!     Ok(())
//! }
//!
//! let boxed: BoxedCallback<CommandContext> = into_callback(ping);
//! ```
//!
//! Requiring a future-returning callback is what guarantees, at compile time,
//! that every command, pattern handler and event extension can suspend
//! without blocking the dispatch loop.

use std::future::Future;
use std::sync::Arc;

pub use futures::future::BoxFuture;

use crate::error::HandlerResult;

/// An asynchronous callback receiving a context of type `C`.
pub trait Callback<C>: Send + Sync + 'static {
    /// Invokes the callback.
    fn call(&self, ctx: C) -> BoxFuture<'static, HandlerResult>;
}

impl<C, F, Fut> Callback<C> for F
where
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: C) -> BoxFuture<'static, HandlerResult> {
        Box::pin((self)(ctx))
    }
}

/// A type-erased callback that can be stored in the registries.
pub type BoxedCallback<C> = Arc<dyn Callback<C>>;

/// Boxes a callback.
pub fn into_callback<C, F, Fut>(f: F) -> BoxedCallback<C>
where
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_closure_becomes_callback() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let cb: BoxedCallback<usize> = into_callback(move |n: usize| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(n, Ordering::SeqCst);
                Ok(())
            }
        });

        cb.call(2).await.unwrap();
        cb.call(3).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_async_fn_becomes_callback() {
        async fn fails(_: ()) -> HandlerResult {
            Err("nope".into())
        }
        let cb: BoxedCallback<()> = into_callback(fails);
        assert!(cb.call(()).await.is_err());
    }
}
