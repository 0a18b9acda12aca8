use crate::{http::Context, runtime::task::Next};

/// One step of the request pipeline.
///
/// A handler decides whether the rest of the chain runs by calling
/// [`Next::run`]. Returning without calling it ends the pipeline for this
/// connection. Code after `next.run(ctx)` sees the response the later handlers built.
pub trait Handler: Send + Sync {
    /// Handles the connection state, optionally continuing with `next`.
    fn call(&self, ctx: &mut Context, next: Next<'_>);
}

impl<F> Handler for F
where
    F: Fn(&mut Context, Next<'_>) + Send + Sync,
{
    fn call(&self, ctx: &mut Context, next: Next<'_>) {
        self(ctx, next);
    }
}
