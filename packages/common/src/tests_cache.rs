use crate::cache::SelfClearingCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_computes_once_within_window() {
    let cache: SelfClearingCache<String, u32> = SelfClearingCache::new(Duration::from_secs(30));
    let calls = AtomicUsize::new(0);

    for _ in 0..25 {
        let value = cache.get_or_cache("logo.png".to_string(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            42
        });
        assert_eq!(value, 42);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.is_armed());
}

#[test]
fn test_recomputes_after_flush() {
    let cache: SelfClearingCache<&'static str, u32> = SelfClearingCache::new(Duration::from_millis(40));
    let calls = AtomicUsize::new(0);
    let compute = || calls.fetch_add(1, Ordering::SeqCst) as u32;

    assert_eq!(cache.get_or_cache("a", compute), 0);
    assert_eq!(cache.get_or_cache("a", compute), 0);

    thread::sleep(Duration::from_millis(250));
    assert!(cache.is_empty());
    assert!(!cache.is_armed());

    assert_eq!(cache.get_or_cache("a", compute), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_flush_clears_whole_batch() {
    let cache: SelfClearingCache<u32, u32> = SelfClearingCache::new(Duration::from_millis(40));
    cache.get_or_cache(1, || 10);
    cache.get_or_cache(2, || 20);
    cache.get_or_cache(3, || 30);
    assert_eq!(cache.len(), 3);

    thread::sleep(Duration::from_millis(250));
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_errors_are_not_cached() {
    let cache: SelfClearingCache<&'static str, u32> = SelfClearingCache::new(Duration::from_secs(30));

    let first: Result<u32, String> = cache.get_or_try_cache("missing", || Err("io".to_string()));
    assert_eq!(first, Err("io".to_string()));
    assert!(cache.is_empty());
    assert!(!cache.is_armed());

    let second: Result<u32, String> = cache.get_or_try_cache("missing", || Ok(7));
    assert_eq!(second, Ok(7));
    assert_eq!(cache.get(&"missing"), Some(7));
}

#[test]
fn test_manual_clear_disarms_timer() {
    let cache: SelfClearingCache<u32, u32> = SelfClearingCache::new(Duration::from_millis(200));
    cache.get_or_cache(1, || 1);
    thread::sleep(Duration::from_millis(100));
    cache.clear();
    assert!(!cache.is_armed());

    // The first timer fires inside the second window and must leave it alone.
    cache.get_or_cache(2, || 2);
    thread::sleep(Duration::from_millis(150));
    assert_eq!(cache.get(&2), Some(2));
    assert!(cache.is_armed());
}

#[test]
fn test_shared_between_threads() {
    let cache: SelfClearingCache<u32, u32> = SelfClearingCache::new(Duration::from_secs(30));
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            thread::spawn(move || {
                cache.get_or_cache(5, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    99
                })
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 99);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
