use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::join_all;
use playlist_analyzer::management::LookupCache;

#[tokio::test]
async fn test_concurrent_lookups_of_one_key_initialize_once() {
    let cache: Arc<LookupCache<String, u32>> = Arc::new(LookupCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let lookups = (0..8).map(|_| {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        async move {
            cache
                .get_or_try_insert_with("Berlin".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, String>(7)
                })
                .await
        }
    });
    let handles: Vec<_> = lookups.map(tokio::spawn).collect();

    let results: Vec<u32> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(results, vec![7; 8]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_failed_initialization_is_not_cached() {
    let cache: LookupCache<String, u32> = LookupCache::new();

    let first = cache
        .get_or_try_insert_with("Oslo".to_string(), || async { Err::<u32, _>("timeout") })
        .await;
    assert_eq!(first, Err("timeout"));
    assert!(cache.get(&"Oslo".to_string()).is_none());
    assert!(cache.is_empty());

    let second = cache
        .get_or_try_insert_with("Oslo".to_string(), || async { Ok::<_, &str>(3) })
        .await;
    assert_eq!(second, Ok(3));
    assert_eq!(cache.get(&"Oslo".to_string()), Some(3));
}

#[tokio::test]
async fn test_clear_forgets_values() {
    let cache: LookupCache<String, u32> = LookupCache::new();
    cache
        .get_or_try_insert_with("Lima".to_string(), || async { Ok::<_, ()>(1) })
        .await
        .unwrap();

    cache.clear();

    assert!(cache.is_empty());
    assert!(cache.get(&"Lima".to_string()).is_none());
}
