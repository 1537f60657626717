// ==============================================
// REENTRANCY TESTS (integration)
// ==============================================
//
// Eviction callbacks and key/value destructors calling back into the cache
// that produced them.

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use lrudict::{CallbackError, LruDict, LruDictError, eviction_callback};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

mod from_callback {
    use super::*;

    type Outcomes = Rc<RefCell<Vec<Result<Option<u32>, LruDictError>>>>;

    fn cache_with_recorder(detect: bool, capacity: usize) -> (Rc<LruDict<u32, u32>>, Outcomes) {
        let cache = Rc::new(
            LruDict::builder(capacity)
                .detect_reentrancy(detect)
                .build()
                .unwrap(),
        );
        let outcomes: Outcomes = Rc::new(RefCell::new(Vec::new()));
        let weak: Weak<LruDict<u32, u32>> = Rc::downgrade(&cache);
        let sink = Rc::clone(&outcomes);
        cache
            .set_callback(Some(eviction_callback(move |k: &u32, v: &u32| {
                if let Some(cache) = weak.upgrade() {
                    sink.borrow_mut().push(cache.set(*k + 100, *v));
                }
                Ok(())
            })))
            .unwrap();
        (cache, outcomes)
    }

    #[test]
    fn set_is_rejected_and_outer_call_succeeds() {
        init_logging();
        let (cache, outcomes) = cache_with_recorder(true, 2);
        cache.set(1, 10).unwrap();
        cache.set(2, 20).unwrap();

        assert_eq!(cache.set(3, 30), Ok(None));
        assert_eq!(*outcomes.borrow(), vec![Err(LruDictError::Reentrancy)]);
        assert_eq!(cache.keys(), vec![3, 2]);
        assert_eq!(cache.purge_queue_len(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn every_guarded_operation_is_rejected() {
        let cache: Rc<LruDict<u32, u32>> = Rc::new(LruDict::new(1).unwrap());
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let weak = Rc::downgrade(&cache);
        let sink = Rc::clone(&outcomes);
        cache
            .set_callback(Some(eviction_callback(move |k: &u32, _: &u32| {
                let Some(cache) = weak.upgrade() else {
                    return Ok(());
                };
                let mut sink = sink.borrow_mut();
                sink.push(cache.get(k).err());
                sink.push(cache.lookup(k).err());
                sink.push(cache.delete(k).err());
                sink.push(cache.pop(k).err());
                sink.push(cache.popitem(true).err());
                sink.push(cache.setdefault(*k, 0).err());
                sink.push(cache.update([(*k, 0)]).err());
                sink.push(cache.clear().err());
                sink.push(cache.set_capacity(5).err());
                sink.push(cache.set_callback(None).err());
                Ok(())
            })))
            .unwrap();

        cache.set(1, 1).unwrap();
        cache.set(2, 2).unwrap();

        let outcomes = outcomes.borrow();
        assert_eq!(outcomes.len(), 10);
        assert!(outcomes.iter().all(|o| *o == Some(LruDictError::Reentrancy)));
        assert!(cache.callback().is_some());
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn reads_are_allowed_during_callback() {
        let cache: Rc<LruDict<&'static str, i32>> = Rc::new(LruDict::new(2).unwrap());
        let seen = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&cache);
        let sink = Rc::clone(&seen);
        cache
            .set_callback(Some(eviction_callback(move |k: &&'static str, _: &i32| {
                if let Some(cache) = weak.upgrade() {
                    *sink.borrow_mut() = Some((
                        cache.contains(k),
                        cache.len(),
                        cache.keys(),
                        cache.peek_first().ok(),
                        cache.purge_queue_len(),
                    ));
                }
                Ok(())
            })))
            .unwrap();

        cache.update([("a", 1), ("b", 2), ("c", 3)]).unwrap();
        assert_eq!(
            *seen.borrow(),
            Some((false, 2, vec!["c", "b"], Some(("c", 3)), 0))
        );
    }

    #[test]
    fn nested_set_goes_through_without_detection() {
        let (cache, outcomes) = cache_with_recorder(false, 2);
        cache.set(1, 10).unwrap();
        cache.set(2, 20).unwrap();
        cache.set(3, 30).unwrap();

        // The callback for key 1 inserted 101, evicting 2 into the next batch.
        assert_eq!(*outcomes.borrow(), vec![Ok(None)]);
        assert_eq!(cache.keys(), vec![101, 3]);
        assert_eq!(cache.purge_queue_len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn failing_callback_is_swallowed() {
        init_logging();
        let cache: LruDict<u32, u32> = LruDict::builder(1)
            .callback(eviction_callback(|k: &u32, _: &u32| {
                Err(CallbackError::msg(format!("cannot persist {k}")))
            }))
            .build()
            .unwrap();
        for i in 0..5 {
            assert!(cache.set(i, i).is_ok());
        }
        assert_eq!(cache.keys(), vec![4]);
        assert_eq!(cache.purge_queue_len(), 0);
    }
}

mod from_drop {
    use super::*;

    /// Value whose destructor re-inserts a marker entry into its own cache.
    struct Boomerang {
        id: u32,
        cache: Weak<LruDict<u32, Boomerang>>,
        results: Rc<RefCell<Vec<Result<(), LruDictError>>>>,
        armed: bool,
    }

    impl Boomerang {
        fn inert(id: u32, results: &Rc<RefCell<Vec<Result<(), LruDictError>>>>) -> Self {
            Self {
                id,
                cache: Weak::new(),
                results: Rc::clone(results),
                armed: false,
            }
        }
    }

    impl Clone for Boomerang {
        fn clone(&self) -> Self {
            Self {
                id: self.id,
                cache: self.cache.clone(),
                results: Rc::clone(&self.results),
                armed: false,
            }
        }
    }

    impl Drop for Boomerang {
        fn drop(&mut self) {
            if !self.armed {
                return;
            }
            if let Some(cache) = self.cache.upgrade() {
                let marker = Boomerang::inert(self.id + 1000, &self.results);
                let outcome = cache.set(self.id + 1000, marker).map(|_| ());
                self.results.borrow_mut().push(outcome);
            }
        }
    }

    #[test]
    fn evicted_value_drop_can_reenter() {
        init_logging();
        let results = Rc::new(RefCell::new(Vec::new()));
        let cache: Rc<LruDict<u32, Boomerang>> = Rc::new(LruDict::new(1).unwrap());

        let mut armed = Boomerang::inert(1, &results);
        armed.cache = Rc::downgrade(&cache);
        armed.armed = true;
        cache.set(1, armed).unwrap();
        cache.set(2, Boomerang::inert(2, &results)).unwrap();

        assert_eq!(*results.borrow(), vec![Ok(())]);
        assert_eq!(cache.keys(), vec![1001]);
        // Key 2 was pushed out by the marker while the first purge ran.
        assert_eq!(cache.purge_queue_len(), 1);
        assert_eq!(cache.purge(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn cleared_value_drop_can_reenter() {
        let results = Rc::new(RefCell::new(Vec::new()));
        let cache: Rc<LruDict<u32, Boomerang>> = Rc::new(LruDict::new(4).unwrap());

        let mut armed = Boomerang::inert(7, &results);
        armed.cache = Rc::downgrade(&cache);
        armed.armed = true;
        cache.set(7, armed).unwrap();
        cache.clear().unwrap();

        assert_eq!(*results.borrow(), vec![Ok(())]);
        assert_eq!(cache.keys(), vec![1007]);
    }

    #[test]
    fn replaced_value_drop_can_reenter() {
        let results = Rc::new(RefCell::new(Vec::new()));
        let cache: Rc<LruDict<u32, Boomerang>> = Rc::new(LruDict::new(4).unwrap());

        let mut armed = Boomerang::inert(3, &results);
        armed.cache = Rc::downgrade(&cache);
        armed.armed = true;
        cache.set(3, armed).unwrap();
        let old = cache.set(3, Boomerang::inert(3, &results)).unwrap();
        assert!(results.borrow().is_empty());
        drop(old);

        assert_eq!(*results.borrow(), vec![Ok(())]);
        assert_eq!(cache.keys(), vec![1003, 3]);
    }
}

mod from_key_drop {
    use super::*;

    type DropLog = Rc<RefCell<Vec<(u32, usize, bool)>>>;

    /// Key that, when dropped, reads its cache and runs a guarded call on it.
    ///
    /// Equality and hashing use `id` only. Every copy records `(id, len,
    /// resize accepted)` so the log shows where each copy was released.
    #[derive(Clone)]
    struct Tracer {
        id: u32,
        cache: Weak<LruDict<Tracer, u32>>,
        log: DropLog,
    }

    impl PartialEq for Tracer {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    impl Eq for Tracer {}

    impl Hash for Tracer {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl Drop for Tracer {
        fn drop(&mut self) {
            if let Some(cache) = self.cache.upgrade() {
                let len = cache.len();
                let resized = cache.set_capacity(cache.capacity()).is_ok();
                self.log.borrow_mut().push((self.id, len, resized));
            }
        }
    }

    fn fixture(capacity: usize) -> (Rc<LruDict<Tracer, u32>>, DropLog) {
        (Rc::new(LruDict::new(capacity).unwrap()), DropLog::default())
    }

    fn tracked(id: u32, cache: &Rc<LruDict<Tracer, u32>>, log: &DropLog) -> Tracer {
        Tracer {
            id,
            cache: Rc::downgrade(cache),
            log: Rc::clone(log),
        }
    }

    fn lookup(id: u32) -> Tracer {
        Tracer {
            id,
            cache: Weak::new(),
            log: DropLog::default(),
        }
    }

    #[test]
    fn duplicate_key_is_dropped_after_replacement() {
        init_logging();
        let (cache, log) = fixture(4);
        cache.set(tracked(1, &cache, &log), 10).unwrap();
        assert!(log.borrow().is_empty());

        assert_eq!(cache.set(tracked(1, &cache, &log), 20), Ok(Some(10)));
        assert_eq!(*log.borrow(), vec![(1, 1, true)]);
        assert_eq!(cache.get(&lookup(1)), Ok(20));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn evicted_key_copies_are_dropped_by_the_purge() {
        let (cache, log) = fixture(1);
        cache.set(tracked(1, &cache, &log), 1).unwrap();
        cache.set(tracked(2, &cache, &log), 2).unwrap();

        // The entry's key and the index's copy.
        assert_eq!(*log.borrow(), vec![(1, 1, true), (1, 1, true)]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_queue_len(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn evicted_key_is_dropped_after_its_callback() {
        let (cache, log) = fixture(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let drops = Rc::clone(&log);
        cache
            .set_callback(Some(eviction_callback(move |k: &Tracer, _: &u32| {
                sink.borrow_mut().push((k.id, drops.borrow().len()));
                Ok(())
            })))
            .unwrap();
        cache.set(tracked(1, &cache, &log), 1).unwrap();
        cache.set(tracked(2, &cache, &log), 2).unwrap();

        assert_eq!(*seen.borrow(), vec![(1, 0)]);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn removed_keys_are_dropped_outside_the_guard() {
        let (cache, log) = fixture(4);
        for id in 1..=4 {
            cache.set(tracked(id, &cache, &log), id).unwrap();
        }

        assert_eq!(cache.delete(&lookup(1)), Ok(1));
        assert_eq!(*log.borrow(), vec![(1, 3, true); 2]);
        log.borrow_mut().clear();

        assert_eq!(cache.pop(&lookup(2)), Ok(2));
        assert_eq!(*log.borrow(), vec![(2, 2, true); 2]);
        log.borrow_mut().clear();

        let (key, value) = cache.popitem(true).unwrap();
        assert_eq!((key.id, value), (3, 3));
        assert_eq!(*log.borrow(), vec![(3, 1, true)]);
        drop(key);
        assert_eq!(*log.borrow(), vec![(3, 1, true); 2]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn cleared_keys_are_dropped_outside_the_guard() {
        let (cache, log) = fixture(4);
        cache.set(tracked(1, &cache, &log), 1).unwrap();
        cache.set(tracked(2, &cache, &log), 2).unwrap();
        cache.clear().unwrap();

        let mut dropped = log.borrow().clone();
        dropped.sort_unstable();
        assert_eq!(
            dropped,
            vec![(1, 0, true), (1, 0, true), (2, 0, true), (2, 0, true)]
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn duplicate_keys_in_update_are_dropped_between_batches() {
        let (cache, log) = fixture(4);
        cache
            .update([
                (tracked(5, &cache, &log), 1),
                (tracked(5, &cache, &log), 2),
            ])
            .unwrap();

        assert_eq!(*log.borrow(), vec![(5, 1, true)]);
        assert_eq!(cache.get(&lookup(5)), Ok(2));
    }
}
