/// Per-image retry state machine
///
/// Tracks which images currently have a reload in flight and which are
/// waiting for connectivity to return. The `retrying` flag is an explicit
/// field in this side table keyed by `ImageId`; it is set for the entire
/// interval between a retry being requested and its reload settling, and it
/// gates re-entry so at most one retry per image is ever in flight.
///
/// The controller is deliberately free of timers and I/O: delayed scheduling
/// and the actual fetch are `Task`s issued by the caller, which keeps every
/// transition here synchronous and unit-testable.

use std::collections::HashSet;

use super::monitor::ImageId;
use super::notify::{Notifications, Refresh};

/// What the caller must do after requesting a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// A retry is already in flight for this image; the request is a no-op
    AlreadyRetrying,
    /// Connectivity is present: issue the reload now
    Reload,
    /// Offline: the reload is parked until connectivity returns
    Deferred,
}

/// Retry side table
#[derive(Debug, Default)]
pub struct RetryController {
    /// Images with a retry in flight (reload issued or deferred)
    retrying: HashSet<ImageId>,
    /// Retrying images whose reload waits for the connectivity-restored
    /// signal, in request order
    deferred: Vec<ImageId>,
}

impl RetryController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a retry for `id`.
    ///
    /// Marks the image retrying and bumps the notification counter before
    /// the connectivity branch, so a duplicate request while offline is a
    /// no-op too (it neither double-counts nor parks a second reload).
    pub fn request_retry(
        &mut self,
        id: ImageId,
        online: bool,
        notify: &mut Notifications,
    ) -> RetryAction {
        if !self.retrying.insert(id) {
            return RetryAction::AlreadyRetrying;
        }

        notify.increment(online);

        if online {
            RetryAction::Reload
        } else {
            self.deferred.push(id);
            RetryAction::Deferred
        }
    }

    /// The reload for `id` settled, successfully or not.
    ///
    /// Clears the retrying mark and decrements the counter; returns the
    /// display refresh when this settle actually completed a retry (initial
    /// page loads settle through here as well and are ignored).
    pub fn finish(&mut self, id: ImageId, notify: &mut Notifications) -> Option<Refresh> {
        if self.retrying.remove(&id) {
            Some(notify.decrement())
        } else {
            None
        }
    }

    /// Connectivity came back: hand out every deferred reload exactly once.
    pub fn connectivity_restored(&mut self) -> Vec<ImageId> {
        let deferred = std::mem::take(&mut self.deferred);
        deferred
            .into_iter()
            .filter(|id| self.retrying.contains(id))
            .collect()
    }

    pub fn is_retrying(&self, id: ImageId) -> bool {
        self.retrying.contains(&id)
    }

    /// Number of retries currently in flight
    pub fn active(&self) -> usize {
        self.retrying.len()
    }

    /// Number of reloads parked until connectivity returns
    pub fn deferred(&self) -> usize {
        self.deferred.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> ImageId {
        ImageId(n)
    }

    #[test]
    fn test_request_issues_reload_when_online() {
        let mut retries = RetryController::new();
        let mut notify = Notifications::new();

        let action = retries.request_retry(id(0), true, &mut notify);

        assert_eq!(action, RetryAction::Reload);
        assert!(retries.is_retrying(id(0)));
        assert_eq!(notify.count(), 1);
    }

    #[test]
    fn test_duplicate_request_is_noop() {
        let mut retries = RetryController::new();
        let mut notify = Notifications::new();

        retries.request_retry(id(0), true, &mut notify);
        let action = retries.request_retry(id(0), true, &mut notify);

        assert_eq!(action, RetryAction::AlreadyRetrying);
        assert_eq!(notify.count(), 1);
        assert_eq!(retries.active(), 1);
    }

    #[test]
    fn test_duplicate_request_while_offline_is_noop() {
        let mut retries = RetryController::new();
        let mut notify = Notifications::new();

        assert_eq!(
            retries.request_retry(id(0), false, &mut notify),
            RetryAction::Deferred
        );
        assert_eq!(
            retries.request_retry(id(0), false, &mut notify),
            RetryAction::AlreadyRetrying
        );

        assert_eq!(notify.count(), 1);
        assert_eq!(retries.deferred(), 1);
    }

    #[test]
    fn test_finish_clears_mark_and_counter() {
        let mut retries = RetryController::new();
        let mut notify = Notifications::new();

        retries.request_retry(id(0), true, &mut notify);
        let refresh = retries.finish(id(0), &mut notify);

        assert!(refresh.is_some());
        assert!(!retries.is_retrying(id(0)));
        assert_eq!(notify.count(), 0);

        // A settle that was not a retry leaves the counter alone
        assert!(retries.finish(id(0), &mut notify).is_none());
        assert_eq!(notify.count(), 0);
    }

    #[test]
    fn test_counter_matches_active_retries() {
        let mut retries = RetryController::new();
        let mut notify = Notifications::new();

        retries.request_retry(id(0), true, &mut notify);
        retries.request_retry(id(1), true, &mut notify);
        retries.request_retry(id(2), false, &mut notify);
        assert_eq!(notify.count() as usize, retries.active());

        retries.finish(id(1), &mut notify);
        assert_eq!(notify.count() as usize, retries.active());

        retries.finish(id(0), &mut notify);
        retries.finish(id(2), &mut notify);
        assert_eq!(notify.count(), 0);
        assert_eq!(retries.active(), 0);
    }

    #[test]
    fn test_deferred_reload_issued_exactly_once() {
        let mut retries = RetryController::new();
        let mut notify = Notifications::new();

        retries.request_retry(id(0), false, &mut notify);
        retries.request_retry(id(1), false, &mut notify);

        let restored = retries.connectivity_restored();
        assert_eq!(restored, vec![id(0), id(1)]);

        // A second restore edge hands out nothing
        assert!(retries.connectivity_restored().is_empty());

        // Both are still mid-retry until their reloads settle
        assert!(retries.is_retrying(id(0)));
        assert!(retries.is_retrying(id(1)));
    }

    #[test]
    fn test_retries_interleave_across_images() {
        let mut retries = RetryController::new();
        let mut notify = Notifications::new();

        retries.request_retry(id(0), true, &mut notify);
        retries.request_retry(id(1), true, &mut notify);

        // Completion order is independent of request order
        retries.finish(id(1), &mut notify);
        assert!(retries.is_retrying(id(0)));
        assert_eq!(notify.count(), 1);
    }
}
