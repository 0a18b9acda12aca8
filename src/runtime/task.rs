use std::fmt;

use crate::{http::Context, runtime::handler::Handler};

/// The ordered list of handlers every connection runs through.
///
/// Handlers run in the order they were pushed. The list is only appended to while
/// the server is being set up and shared read-only once it serves.
#[derive(Default)]
pub struct TaskList {
    tasks: Vec<Box<dyn Handler>>,
}

/// Handle to the part of the chain after the current handler.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rest: &'a [Box<dyn Handler>],
}

impl TaskList {
    /// Returns an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the tail of the chain.
    pub fn push<H: Handler + 'static>(&mut self, handler: H) {
        self.tasks.push(Box::new(handler));
    }

    /// Number of handlers in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the chain has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs the chain from its first handler.
    pub fn run(&self, ctx: &mut Context) {
        self.head().run(ctx);
    }

    /// Continuation starting at the first handler.
    #[must_use]
    pub fn head(&self) -> Next<'_> {
        Next { rest: &self.tasks }
    }
}

impl Next<'_> {
    /// Calls the next handler with the continuation after it.
    ///
    /// Does nothing at the end of the chain.
    pub fn run(self, ctx: &mut Context) {
        if let Some((handler, rest)) = self.rest.split_first() {
            handler.call(ctx, Next { rest });
        }
    }

    /// Returns whether there is no handler left to run.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.rest.is_empty()
    }
}

impl fmt::Debug for TaskList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskList").field("len", &self.tasks.len()).finish()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("remaining", &self.rest.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::{
        http::Context,
        runtime::{
            handler::Handler,
            task::{Next, TaskList},
        },
        testing::MockStream,
    };

    fn context() -> Context {
        let (stream, _output) = MockStream::new("");
        Context::new(stream)
    }

    fn recorder(log: Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> impl Handler {
        move |ctx: &mut Context, next: Next<'_>| {
            log.lock().unwrap().push(name);
            next.run(ctx);
        }
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tasks = TaskList::new();
        tasks.push(recorder(Arc::clone(&log), "first"));
        tasks.push(recorder(Arc::clone(&log), "second"));
        tasks.push(recorder(Arc::clone(&log), "third"));

        tasks.run(&mut context());

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn handler_not_calling_next_stops_the_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tasks = TaskList::new();
        tasks.push(recorder(Arc::clone(&log), "first"));
        tasks.push(|_ctx: &mut Context, _next: Next<'_>| {});
        tasks.push(recorder(Arc::clone(&log), "unreachable"));

        tasks.run(&mut context());

        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }

    #[test]
    fn code_after_next_sees_downstream_changes() {
        let mut tasks = TaskList::new();
        tasks.push(|ctx: &mut Context, next: Next<'_>| {
            next.run(ctx);
            let status = ctx.resp.status.clone();
            ctx.resp.set_header("X-Seen-Status", status);
        });
        tasks.push(|ctx: &mut Context, _next: Next<'_>| ctx.resp.set_status("201 Created"));

        let mut ctx = context();
        tasks.run(&mut ctx);

        assert_eq!(ctx.resp.headers.get("X-Seen-Status"), Some("201 Created"));
    }

    #[test]
    fn next_at_end_of_chain_is_a_noop() {
        let tasks = TaskList::new();
        let head = tasks.head();

        assert!(head.is_end());
        head.run(&mut context());
        assert!(tasks.is_empty());
    }

    #[test]
    fn last_handler_sees_end_of_chain() {
        let seen_end = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&seen_end);
        let mut tasks = TaskList::new();
        tasks.push(move |_ctx: &mut Context, next: Next<'_>| {
            *seen.lock().unwrap() = Some(next.is_end());
        });

        tasks.run(&mut context());

        assert_eq!(*seen_end.lock().unwrap(), Some(true));
        assert_eq!(tasks.len(), 1);
    }
}
