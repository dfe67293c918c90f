//! Membership decision for overlay handlers
//!
//! The resolver combines three inputs into one tri-state answer: the
//! current watch-set snapshot, the live per-path state from the status
//! channel, and the category the asking handler is bound to. The watch-set
//! check runs first because it is a local computation: a file manager may
//! probe thousands of paths per second while redrawing a view, and only
//! paths inside a watched tree are worth an IPC round trip.

use std::sync::Arc;

use crate::category::OverlayCategory;
use crate::watch_set::WatchSet;

/// Tri-state outcome of a membership query.
///
/// The host treats `Indeterminate`-like outcomes the same as a plain "no"
/// (no overlay rendered); the distinction exists for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// No overlay of any category should render for this path
    NotApplicable,
    /// The path is in the asking handler's category
    Applies,
    /// The path is watched but currently in a different category
    DoesNotApply,
}

/// Source of watch-set snapshots and per-path states.
///
/// Implemented by [`StatusChannelClient`](crate::channel::StatusChannelClient);
/// tests substitute counting doubles to observe which queries actually run.
pub trait StatusSource {
    /// Current immutable watch-set snapshot
    fn watched_directories(&self) -> Arc<WatchSet>;

    /// Live state of `path`, `None` when untracked or unavailable
    fn state_of(&self, path: &str) -> Option<OverlayCategory>;
}

/// Decide whether the overlay bound to `own_category` applies to `path`.
///
/// Paths outside every watched directory (and any path while the watch set
/// is empty) resolve to [`Membership::NotApplicable`] without a state
/// query.
pub fn resolve<S: StatusSource + ?Sized>(
    path: &str,
    own_category: OverlayCategory,
    source: &S,
) -> Membership {
    let watched = source.watched_directories();
    if watched.is_empty() || !watched.contains(path) {
        return Membership::NotApplicable;
    }

    match source.state_of(path) {
        None => Membership::NotApplicable,
        Some(state) if state == own_category => Membership::Applies,
        Some(state) => {
            tracing::trace!("{} is {} (asked for {})", path, state, own_category);
            Membership::DoesNotApply
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double with scripted answers and per-query call counts
    struct ScriptedSource {
        watched: Arc<WatchSet>,
        state: Option<OverlayCategory>,
        watched_calls: AtomicUsize,
        state_calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(directories: &[&str], state: Option<OverlayCategory>) -> Self {
            Self {
                watched: Arc::new(WatchSet::new(
                    directories.iter().map(|d| d.to_string()).collect(),
                )),
                state,
                watched_calls: AtomicUsize::new(0),
                state_calls: AtomicUsize::new(0),
            }
        }
    }

    impl StatusSource for ScriptedSource {
        fn watched_directories(&self) -> Arc<WatchSet> {
            self.watched_calls.fetch_add(1, Ordering::SeqCst);
            Arc::clone(&self.watched)
        }

        fn state_of(&self, _path: &str) -> Option<OverlayCategory> {
            self.state_calls.fetch_add(1, Ordering::SeqCst);
            self.state
        }
    }

    #[test]
    fn test_resolve_applies_on_matching_category() {
        let source = ScriptedSource::new(&["/home/u/Nextcloud"], Some(OverlayCategory::Ok));
        let result = resolve("/home/u/Nextcloud/doc.txt", OverlayCategory::Ok, &source);
        assert_eq!(result, Membership::Applies);
    }

    #[test]
    fn test_resolve_does_not_apply_on_other_category() {
        let source = ScriptedSource::new(&["/home/u/Nextcloud"], Some(OverlayCategory::Ok));
        let result = resolve("/home/u/Nextcloud/doc.txt", OverlayCategory::Error, &source);
        assert_eq!(result, Membership::DoesNotApply);
    }

    #[test]
    fn test_resolve_not_applicable_without_state() {
        let source = ScriptedSource::new(&["/home/u/Nextcloud"], None);
        let result = resolve("/home/u/Nextcloud/doc.txt", OverlayCategory::Ok, &source);
        assert_eq!(result, Membership::NotApplicable);
        assert_eq!(source.state_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_empty_watch_set_skips_state_query() {
        let source = ScriptedSource::new(&[], Some(OverlayCategory::Ok));
        let result = resolve("/anywhere/file", OverlayCategory::Ok, &source);
        assert_eq!(result, Membership::NotApplicable);
        assert_eq!(source.state_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolve_sibling_path_skips_state_query() {
        let source = ScriptedSource::new(&["/sync"], Some(OverlayCategory::Ok));
        let result = resolve("/sync2/file", OverlayCategory::Ok, &source);
        assert_eq!(result, Membership::NotApplicable);
        assert_eq!(source.state_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolve_truth_table_over_all_categories() {
        for own in OverlayCategory::all_bindable() {
            for state in OverlayCategory::all_bindable() {
                let source = ScriptedSource::new(&["/sync"], Some(state));
                let expected = if own == state {
                    Membership::Applies
                } else {
                    Membership::DoesNotApply
                };
                assert_eq!(resolve("/sync/file", own, &source), expected);
            }
        }
    }
}
