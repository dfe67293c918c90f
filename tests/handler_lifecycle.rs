//! Shared-ownership lifetime of handler instances: concurrent acquire and
//! release from many threads, destruction exactly once when the last owner
//! lets go.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sync_overlays::{create_handler, OverlayHandler, CLASS_ID_SYNC};

/// Wraps a handler so its destruction is observable
struct DropProbe {
    handler: Arc<OverlayHandler>,
    drops: Arc<AtomicUsize>,
}

impl Drop for DropProbe {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn concurrent_acquire_release_keeps_handler_alive() {
    let handler = create_handler(CLASS_ID_SYNC).unwrap();

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let local = Arc::clone(&handler);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    let acquired = Arc::clone(&local);
                    assert_eq!(acquired.priority(), 3);
                }
            })
        })
        .collect();

    for thread in threads {
        thread.join().unwrap();
    }

    // Every acquire was balanced by a release; we are the sole owner again.
    assert!(Arc::try_unwrap(handler).is_ok());
}

#[test]
fn handler_is_destroyed_exactly_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let probe = Arc::new(DropProbe {
        handler: create_handler(CLASS_ID_SYNC).unwrap(),
        drops: Arc::clone(&drops),
    });

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let local = Arc::clone(&probe);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    let acquired = Arc::clone(&local);
                    assert_eq!(acquired.handler.category().priority(), 3);
                    drop(acquired);
                }
            })
        })
        .collect();

    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(drops.load(Ordering::SeqCst), 0, "alive while referenced");
    drop(probe);
    assert_eq!(drops.load(Ordering::SeqCst), 1, "destroyed exactly once");
}
