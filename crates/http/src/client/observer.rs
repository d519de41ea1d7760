//! Session invalidation callback

/// Notified when a failed token refresh has discarded the stored credentials
///
/// Implemented for any `Fn()` closure.
pub trait SessionObserver: Send + Sync {
    fn session_invalidated(&self);
}

impl<F> SessionObserver for F
where
    F: Fn() + Send + Sync,
{
    fn session_invalidated(&self) {
        self()
    }
}
