//! State plumbing shared by every container.
//!
//! A container owns one [`StateCell`]: its state record plus the view bound
//! to it. Every state change goes through [`StateCell::set_state`], which
//! mutates the record and immediately re-renders the view.

use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use todo_pubsub_core::{Subscription, TodoBus, TodoEvent};

use crate::view::View;

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A container's state record and its bound view.
///
/// Lock order is state, then view. Views never call back into containers
/// while rendering, so holding both during a render cannot cycle.
pub(crate) struct StateCell<S, V: ?Sized> {
    name: &'static str,
    state: Mutex<S>,
    view: Mutex<Option<Box<V>>>,
}

impl<S, V> StateCell<S, V>
where
    S: Clone + Debug,
    V: View<S> + ?Sized,
{
    pub(crate) const fn new(name: &'static str, initial: S) -> Self {
        Self {
            name,
            state: Mutex::new(initial),
            view: Mutex::new(None),
        }
    }

    /// Bind `view` and render the current state into it.
    pub(crate) fn bind(&self, mut view: Box<V>) {
        let state = lock(&self.state);
        view.update(&state);
        *lock(&self.view) = Some(view);
        tracing::debug!(container = self.name, "View bound");
    }

    /// Mutate the state, then re-render.
    ///
    /// Changes made before a view is bound are kept and rendered on bind.
    pub(crate) fn set_state<R>(&self, change: impl FnOnce(&mut S) -> R) -> R {
        let mut state = lock(&self.state);
        let result = change(&mut state);
        tracing::debug!(container = self.name, state = ?*state, "State updated");

        if let Some(view) = lock(&self.view).as_mut() {
            view.update(&state);
        }
        result
    }

    pub(crate) fn snapshot(&self) -> S {
        lock(&self.state).clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.state))
    }

    /// Run `f` against the bound view; `None` before `bind`.
    pub(crate) fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        lock(&self.view).as_mut().map(|view| f(&mut **view))
    }
}

/// Bus registrations a container holds until it is disposed or dropped.
#[derive(Default)]
pub(crate) struct Subscriptions {
    held: Mutex<Vec<Subscription<TodoEvent>>>,
}

impl Subscriptions {
    pub(crate) fn hold(&self, subscription: Subscription<TodoEvent>) {
        lock(&self.held).push(subscription);
    }

    /// Unsubscribe everything; returns how many registrations were removed.
    pub(crate) fn release(&self) -> usize {
        let held = std::mem::take(&mut *lock(&self.held));
        held.into_iter()
            .map(Subscription::unsubscribe)
            .filter(|removed| *removed)
            .count()
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        let released = self.release();
        if released > 0 {
            tracing::trace!(released, "Subscriptions dropped");
        }
    }
}

/// Subscribe `handler` on `topic` without keeping `target` alive.
///
/// The callback does nothing once the container behind `target` is gone;
/// dropping the container's [`Subscriptions`] then removes it from the bus.
pub(crate) fn subscribe_weak<T>(
    bus: &TodoBus,
    topic: &str,
    target: &Arc<T>,
    handler: fn(&T, &TodoEvent),
) -> Subscription<TodoEvent>
where
    T: Send + Sync + 'static,
{
    let target = Arc::downgrade(target);
    bus.subscribe(topic, move |event| {
        if let Some(target) = target.upgrade() {
            handler(&target, event);
        }
    })
}
