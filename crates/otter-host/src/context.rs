//! Per-thread execution context stack
//!
//! The evaluator pushes an [`ExecutionContext`] when a script invocation
//! starts and pops it when the invocation ends. Code running anywhere below
//! that frame on the same thread can call [`peek`] to find out which
//! invocation is active, without the context being passed around.
//!
//! Each thread has its own stack, created on the first push. Nothing pushed
//! on one thread is ever visible on another.
//!
//! # Usage
//!
//! ```ignore
//! use otter_host::context::{ContextGuard, ExecutionContext, peek};
//!
//! let frame = ExecutionContext::new(Invocation { script: "main.js" });
//! let _guard = ContextGuard::enter(frame);
//! // ... run the script; nested host calls can `peek()` the frame ...
//! // Guard drops when scope ends (also during unwinding), popping the frame
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::{debug, trace};

thread_local! {
    /// Context stack for this thread; `None` until the first push
    static CONTEXT_STACK: RefCell<Option<Vec<ExecutionContext>>> = const { RefCell::new(None) };
}

/// Opaque handle for one in-flight script invocation.
///
/// Clones share identity; two handles are equal only if they come from the
/// same [`ExecutionContext::new`] call.
#[derive(Clone)]
pub struct ExecutionContext(Rc<dyn Any>);

impl ExecutionContext {
    /// Wrap the evaluator's frame state.
    pub fn new<T: Any>(frame: T) -> Self {
        Self(Rc::new(frame))
    }

    /// Borrow the frame state if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// `true` when both handles refer to the same invocation.
    pub fn ptr_eq(&self, other: &ExecutionContext) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast()
    }
}

impl PartialEq for ExecutionContext {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ExecutionContext {}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionContext({:p})", self.addr())
    }
}

/// Push `context` onto this thread's stack.
pub fn push(context: ExecutionContext) {
    let depth = CONTEXT_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let frames = stack.get_or_insert_with(Vec::new);
        frames.push(context);
        frames.len()
    });
    // Events go out after the borrow ends; subscribers may call peek()
    trace!(depth, "execution context pushed");
}

/// Innermost context on this thread, without removing it.
pub fn peek() -> Option<ExecutionContext> {
    CONTEXT_STACK.with(|stack| stack.borrow().as_ref().and_then(|frames| frames.last().cloned()))
}

/// Remove and return the innermost context on this thread.
pub fn pop() -> Option<ExecutionContext> {
    let (popped, depth) = CONTEXT_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let popped = stack.as_mut().and_then(Vec::pop);
        (popped, depth_of(&stack))
    });
    match &popped {
        Some(_) => trace!(depth, "execution context popped"),
        None => debug!("pop on an empty execution context stack"),
    }
    popped
}

/// Number of contexts on this thread's stack.
pub fn depth() -> usize {
    CONTEXT_STACK.with(|stack| depth_of(&stack.borrow()))
}

fn depth_of(stack: &Option<Vec<ExecutionContext>>) -> usize {
    stack.as_ref().map_or(0, Vec::len)
}

/// Run `f` with `context` pushed, popping it afterwards even if `f` panics.
pub fn with_context<R>(context: ExecutionContext, f: impl FnOnce() -> R) -> R {
    let _guard = ContextGuard::enter(context);
    f()
}

/// RAII scope for one pushed context.
///
/// Dropping the guard pops the stack back to the depth it had before
/// [`ContextGuard::enter`], discarding any frames a nested invocation failed
/// to pop. The guard is tied to the thread that created it.
pub struct ContextGuard {
    base_depth: usize,
    _not_send: PhantomData<Rc<()>>,
}

impl ContextGuard {
    /// Push `context` and return the guard that will pop it.
    pub fn enter(context: ExecutionContext) -> Self {
        let base_depth = depth();
        push(context);
        Self {
            base_depth,
            _not_send: PhantomData,
        }
    }
}

impl fmt::Debug for ContextGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGuard")
            .field("base_depth", &self.base_depth)
            .finish()
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown
        let Ok(discarded) = CONTEXT_STACK.try_with(|stack| {
            stack
                .borrow_mut()
                .as_mut()
                .filter(|frames| frames.len() > self.base_depth)
                .map(|frames| frames.split_off(self.base_depth))
                .unwrap_or_default()
        }) else {
            return;
        };
        // Frames are released outside the borrow; their drop may peek()
        let leaked = discarded.len().saturating_sub(1);
        drop(discarded);
        if leaked > 0 {
            debug!(leaked, "discarded execution contexts left on the stack");
        }
        trace!(depth = self.base_depth, "execution context scope closed");
    }
}
