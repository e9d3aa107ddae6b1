//! Execution context stack behaviour across scopes and threads

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;

use tracing::{Event, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use otter_host::context::{self, depth, peek, pop, push, with_context};
use otter_host::{ContextGuard, ExecutionContext};

#[derive(Debug, PartialEq)]
struct Invocation {
    script: &'static str,
}

fn frame(script: &'static str) -> ExecutionContext {
    ExecutionContext::new(Invocation { script })
}

fn current_script() -> Option<&'static str> {
    peek().and_then(|ctx| ctx.downcast_ref::<Invocation>().map(|inv| inv.script))
}

#[test]
fn test_empty_stack() {
    assert_eq!(peek(), None);
    assert_eq!(pop(), None);
    assert_eq!(depth(), 0);
}

#[test]
fn test_last_in_first_out() {
    let a = frame("a.js");
    let b = frame("b.js");
    push(a.clone());
    push(b.clone());
    assert_eq!(peek(), Some(b.clone()));
    assert_eq!(pop(), Some(b));
    assert_eq!(peek(), Some(a.clone()));
    assert_eq!(pop(), Some(a));
    assert_eq!(pop(), None);
}

#[test]
fn test_identity_not_structure() {
    let first = frame("same.js");
    let second = frame("same.js");
    assert_ne!(first, second);
    assert!(first.ptr_eq(&first.clone()));
}

#[test]
fn test_nested_invocations_see_the_innermost_frame() {
    let seen = with_context(frame("outer.js"), || {
        let inner = with_context(frame("inner.js"), current_script);
        (inner, current_script())
    });
    assert_eq!(seen, (Some("inner.js"), Some("outer.js")));
    assert_eq!(depth(), 0);
}

#[test]
fn test_guard_pops_on_panic() {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let _guard = ContextGuard::enter(frame("crash.js"));
        assert_eq!(depth(), 1);
        panic!("script failed");
    }));
    assert!(result.is_err());
    assert_eq!(depth(), 0);
}

#[test]
fn test_guard_discards_frames_left_by_nested_code() {
    {
        let _guard = ContextGuard::enter(frame("outer.js"));
        // A nested invocation that forgot to pop
        push(frame("leaky.js"));
        push(frame("leakier.js"));
        assert_eq!(depth(), 3);
    }
    assert_eq!(depth(), 0);
}

#[test]
fn test_threads_have_independent_stacks() {
    push(frame("main-thread.js"));

    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let before = context::peek().is_none();
        with_context(frame("worker.js"), || {
            tx.send((before, current_script())).expect("receiver alive");
        });
        context::depth()
    });
    let (worker_started_empty, worker_saw) = rx.recv().expect("worker reports");
    let worker_depth_after = worker.join().expect("worker finished");

    assert!(worker_started_empty);
    assert_eq!(worker_saw, Some("worker.js"));
    assert_eq!(worker_depth_after, 0);
    assert_eq!(current_script(), Some("main-thread.js"));
    pop();
}

// ============================================================================
// Re-entrancy from diagnostics
// ============================================================================

/// Tags every event with the running invocation, the way a log layer would.
struct InvocationTagger {
    tagged: Arc<AtomicUsize>,
    untagged: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for InvocationTagger {
    fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
        let counter = match peek() {
            Some(_) => &self.tagged,
            None => &self.untagged,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = depth();
    }
}

#[test]
fn test_subscriber_can_peek_during_stack_events() {
    let tagged = Arc::new(AtomicUsize::new(0));
    let untagged = Arc::new(AtomicUsize::new(0));
    let subscriber = Registry::default().with(InvocationTagger {
        tagged: tagged.clone(),
        untagged: untagged.clone(),
    });

    tracing::subscriber::with_default(subscriber, || {
        push(frame("a.js"));
        assert_eq!(current_script(), Some("a.js"));
        assert!(pop().is_some());
        assert_eq!(pop(), None);

        {
            let _guard = ContextGuard::enter(frame("outer.js"));
            push(frame("leaky.js"));
        }
        assert_eq!(depth(), 0);
    });

    assert!(tagged.load(Ordering::SeqCst) > 0);
    assert!(untagged.load(Ordering::SeqCst) > 0);
}

/// Frame state that looks at the stack while being released.
struct Inspecting {
    depth_on_drop: Rc<Cell<Option<usize>>>,
}

impl Drop for Inspecting {
    fn drop(&mut self) {
        self.depth_on_drop.set(Some(depth()));
    }
}

#[test]
fn test_discarded_frames_may_inspect_the_stack() {
    let depth_on_drop = Rc::new(Cell::new(None));
    {
        let _guard = ContextGuard::enter(frame("outer.js"));
        push(ExecutionContext::new(Inspecting {
            depth_on_drop: depth_on_drop.clone(),
        }));
    }
    assert_eq!(depth_on_drop.get(), Some(0));
    assert_eq!(depth(), 0);
}
