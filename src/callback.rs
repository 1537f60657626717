//! Eviction callback type.

use std::rc::Rc;

use crate::error::CallbackError;

/// Shared handle to a function notified once per evicted entry.
///
/// The callback borrows the evicted key and value; the cache releases them
/// after the callback returns. A returned [`CallbackError`] is logged and
/// counted, never propagated. The handle is reference counted so the purge
/// engine can keep the callback alive even if it is replaced mid-purge.
pub type EvictionCallback<K, V> = Rc<dyn Fn(&K, &V) -> Result<(), CallbackError>>;

/// Wraps a closure as an [`EvictionCallback`].
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use lrudict::{LruDict, eviction_callback};
///
/// let evicted = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&evicted);
///
/// let cache = LruDict::builder(1)
///     .callback(eviction_callback(move |k: &u32, v: &&'static str| {
///         sink.borrow_mut().push((*k, *v));
///         Ok(())
///     }))
///     .build()
///     .unwrap();
///
/// cache.set(1, "one").unwrap();
/// cache.set(2, "two").unwrap();
/// assert_eq!(*evicted.borrow(), vec![(1, "one")]);
/// ```
pub fn eviction_callback<K, V, F>(f: F) -> EvictionCallback<K, V>
where
    F: Fn(&K, &V) -> Result<(), CallbackError> + 'static,
{
    Rc::new(f)
}
