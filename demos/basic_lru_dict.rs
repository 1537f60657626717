use lrudict::{LruDict, eviction_callback};

fn main() {
    env_logger::init();

    let cache: LruDict<u32, String> = LruDict::builder(2)
        .callback(eviction_callback(|key: &u32, value: &String| {
            println!("evicted {key}: {value}");
            Ok(())
        }))
        .build()
        .expect("capacity is positive");

    cache.set(1, "alpha".to_string()).expect("not reentrant");
    cache.set(2, "beta".to_string()).expect("not reentrant");

    if let Ok(value) = cache.get(&1) {
        println!("hit 1: {value}");
    }

    cache.set(3, "gamma".to_string()).expect("not reentrant");
    println!("contains 2? {}", cache.contains(&2));

    cache.set_suspend_auto_purge(true);
    cache.set(4, "delta".to_string()).expect("not reentrant");
    println!("staged: {}", cache.purge_queue_len());
    println!("purged: {}", cache.purge());
    println!("keys: {:?}", cache.keys());
}

// Expected output:
// hit 1: alpha
// evicted 2: beta
// contains 2? false
// staged: 1
// evicted 1: alpha
// purged: 1
// keys: [4, 3]
//
// Explanation: capacity=2; after get(&1), key 1 is MRU and key 2 is LRU.
// Inserting key 3 evicts key 2 and the callback fires before set() returns.
// With auto-purge suspended, inserting key 4 only stages key 1; the explicit
// purge() delivers it.
