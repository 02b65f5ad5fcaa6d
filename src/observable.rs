//! Observable values for presentation layers.
//!
//! An [`Observable`] holds a current value and a set of subscribers. A new
//! subscriber receives the current value immediately, then every later
//! change, in publish order.
//!
//! Handlers run on the thread that calls [`Observable::set`]. A handler must
//! not call `set` or `subscribe` on the observable that is invoking it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Token returned by [`Observable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(u64);

struct State<T> {
    value: T,
    next_token: u64,
    handlers: BTreeMap<u64, Handler<T>>,
}

/// A value that notifies subscribers on change.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use sentinel_core::Observable;
///
/// let value = Observable::new(1);
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let token = value.subscribe(move |v| sink.lock().unwrap().push(*v));
/// value.set(2);
/// value.unsubscribe(token);
/// value.set(3);
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
pub struct Observable<T> {
    state: Mutex<State<T>>,
    // Serializes deliveries so every subscriber sees changes in publish order.
    delivery: Mutex<()>,
}

impl<T: Clone> Observable<T> {
    /// Creates an observable holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(State {
                value,
                next_token: 0,
                handlers: BTreeMap::new(),
            }),
            delivery: Mutex::new(()),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.lock_state().value.clone()
    }

    /// Replaces the value and notifies every live subscriber.
    pub fn set(&self, value: T) {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let handlers: Vec<Handler<T>> = {
            let mut state = self.lock_state();
            state.value = value.clone();
            state.handlers.values().cloned().collect()
        };

        for handler in handlers {
            handler(&value);
        }
    }

    /// Registers `handler`, calling it immediately with the current value.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionToken
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let handler: Handler<T> = Arc::new(handler);
        let (token, current) = {
            let mut state = self.lock_state();
            let token = state.next_token;
            state.next_token += 1;
            state.handlers.insert(token, Arc::clone(&handler));
            (token, state.value.clone())
        };

        handler(&current);
        SubscriptionToken(token)
    }

    /// Removes a subscriber. Returns `false` if the token was not live.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.lock_state().handlers.remove(&token.0).is_some()
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock_state().handlers.len()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("Observable")
            .field("value", &state.value)
            .field("subscribers", &state.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v: &T| sink.lock().unwrap().push(v.clone()))
    }

    #[test]
    fn subscribe_delivers_current_value() {
        let value = Observable::new("initial".to_string());
        let (seen, handler) = recorder();
        value.subscribe(handler);
        assert_eq!(*seen.lock().unwrap(), vec!["initial".to_string()]);
    }

    #[test]
    fn set_notifies_in_order() {
        let value = Observable::new(0);
        let (seen, handler) = recorder();
        value.subscribe(handler);

        value.set(1);
        value.set(2);
        value.set(3);

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn set_notifies_every_subscriber() {
        let value = Observable::new(false);
        let (first, first_handler) = recorder();
        let (second, second_handler) = recorder();
        value.subscribe(first_handler);
        value.subscribe(second_handler);

        value.set(true);

        assert_eq!(*first.lock().unwrap(), vec![false, true]);
        assert_eq!(*second.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let value = Observable::new(0);
        let (seen, handler) = recorder();
        let token = value.subscribe(handler);

        assert!(value.unsubscribe(token));
        value.set(5);

        assert_eq!(*seen.lock().unwrap(), vec![0]);
        assert_eq!(value.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_twice_returns_false() {
        let value = Observable::new(0);
        let token = value.subscribe(|_| {});
        assert!(value.unsubscribe(token));
        assert!(!value.unsubscribe(token));
    }

    #[test]
    fn get_returns_latest() {
        let value = Observable::new(Some(1));
        value.set(None);
        assert_eq!(value.get(), None);
    }

    #[test]
    fn handler_may_read_value() {
        let value = Arc::new(Observable::new(0));
        let reader = Arc::clone(&value);
        let (seen, _) = recorder::<i32>();
        let sink = Arc::clone(&seen);
        value.subscribe(move |_| sink.lock().unwrap().push(reader.get()));

        value.set(7);

        assert_eq!(*seen.lock().unwrap(), vec![0, 7]);
    }
}
