//! Observable value cells.
//!
//! An [`Observable`] holds one value and a list of subscribers. Every write
//! replaces the value and then calls each subscriber with the previous and the
//! new value, synchronously, on the writing task. Subscribers run outside the
//! internal lock, so they may read the observable but must not write to it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

struct Inner<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Listener<T>)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking subscriber never holds the lock, so poisoned data is still consistent
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A shared value cell that notifies subscribers on every write
///
/// Cloning an `Observable` yields another handle to the same cell.
///
/// # Example
///
/// ```
/// use order_detail_runtime::Observable;
/// use std::sync::{Arc, Mutex};
///
/// let notes = Observable::new(Vec::<String>::new());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let subscription = notes.subscribe(move |_previous, current| {
///     sink.lock().unwrap().push(current.len());
/// });
///
/// notes.update(|list| list.push("packed".to_string()));
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
///
/// drop(subscription);
/// notes.set(Vec::new());
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// ```
pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Observable<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T> Default for Observable<T>
where
    T: Clone + Default + Send + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T>
where
    T: Clone + Send + 'static,
{
    /// Create a cell holding `value` with no subscribers
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone the current value
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Read the current value without cloning it
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&lock(&self.inner).value)
    }

    /// Replace the value and notify every subscriber
    pub fn set(&self, value: T) {
        self.replace_with(|_| value);
    }

    /// Modify the value in place, notify every subscriber and return the new value
    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(&mut T),
    {
        self.replace_with(|current| {
            let mut next = current.clone();
            f(&mut next);
            next
        })
    }

    /// Register a subscriber called with `(previous, current)` after each write
    ///
    /// The subscriber stays registered until the returned [`Subscription`] is
    /// dropped or explicitly cancelled.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        let id = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).subscribers.retain(|(existing, _)| *existing != id);
                }
            })),
        }
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }

    fn replace_with<F>(&self, next: F) -> T
    where
        F: FnOnce(&T) -> T,
    {
        let (previous, current, listeners) = {
            let mut inner = lock(&self.inner);
            let value = next(&inner.value);
            let previous = std::mem::replace(&mut inner.value, value);
            let listeners: Vec<Listener<T>> = inner
                .subscribers
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (previous, inner.value.clone(), listeners)
        };

        for listener in listeners {
            listener(&previous, &current);
        }

        current
    }
}

/// Registration token returned by [`Observable::subscribe`]
///
/// Dropping it removes the subscriber.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the subscriber now
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
