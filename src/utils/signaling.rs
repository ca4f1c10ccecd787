//! Synchronous, single-threaded signal delivery
//!
//! A [`Signaler`] keeps a list of callbacks and invokes all of them, in
//! registration order, whenever [`Signaler::signal`] is called. Delivery
//! happens on the calling stack before `signal` returns.
//!
//! Registering returns a [`SignalToken`]. The callback stays registered for
//! as long as the token is alive; dropping the token unregisters it.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use smallvec::SmallVec;
use tracing::warn;

type Callback<S> = RefCell<dyn FnMut(&S)>;

struct SignalInner<S> {
    callbacks: RefCell<Vec<Weak<Callback<S>>>>,
    pending: RefCell<Vec<Weak<Callback<S>>>>,
}

impl<S> SignalInner<S> {
    fn new() -> SignalInner<S> {
        SignalInner {
            callbacks: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
        }
    }

    fn insert_pending(&self) {
        let mut pending = self.pending.borrow_mut();
        self.callbacks.borrow_mut().extend(pending.drain(..));
    }
}

/// A signal that callbacks can be registered on
pub struct Signaler<S> {
    inner: Rc<SignalInner<S>>,
}

impl<S> fmt::Debug for Signaler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signaler")
            .field("callbacks", &self.inner.callbacks.borrow().len())
            .field("pending", &self.inner.pending.borrow().len())
            .finish()
    }
}

impl<S> Clone for Signaler<S> {
    fn clone(&self) -> Signaler<S> {
        Signaler {
            inner: self.inner.clone(),
        }
    }
}

impl<S> Default for Signaler<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Signaler<S> {
    /// Create a new signaler without any registered callback
    pub fn new() -> Signaler<S> {
        Signaler {
            inner: Rc::new(SignalInner::new()),
        }
    }

    /// Register a callback to this signal
    ///
    /// The callback is invoked for every subsequent call to [`Signaler::signal`]
    /// until the returned [`SignalToken`] is dropped. A callback registered
    /// from within a signal delivery is only invoked from the next delivery on.
    #[must_use = "the callback is unregistered when the token is dropped"]
    pub fn register<F: FnMut(&S) + 'static>(&self, f: F) -> SignalToken {
        let rc = Rc::new(RefCell::new(f));
        let weak = Rc::downgrade(&rc) as Weak<Callback<S>>;
        self.inner.pending.borrow_mut().push(weak);
        SignalToken { _signal: rc }
    }

    /// Invoke all registered callbacks with the given event
    ///
    /// Signalling is re-entrant: a callback may cause the same signal to be
    /// sent again. Callbacks already executing on the stack are skipped by the
    /// nested delivery.
    pub fn signal(&self, event: &S) {
        self.inner.insert_pending();

        let callbacks: SmallVec<[Rc<Callback<S>>; 4]> = {
            let mut list = self.inner.callbacks.borrow_mut();
            list.retain(|weak| weak.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };

        for callback in callbacks {
            match callback.try_borrow_mut() {
                Ok(mut cb) => (&mut *cb)(event),
                Err(_) => warn!("Skipping callback already executing on the stack."),
            }
        }
    }

    /// Number of registered callbacks still alive
    pub fn len(&self) -> usize {
        self.inner.insert_pending();
        self.inner
            .callbacks
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Whether no live callback is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a callback registered on a [`Signaler`]
///
/// Dropping the token unregisters the callback.
pub struct SignalToken {
    _signal: Rc<dyn std::any::Any>,
}

impl fmt::Debug for SignalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalToken").finish_non_exhaustive()
    }
}
