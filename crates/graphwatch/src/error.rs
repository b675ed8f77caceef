#![forbid(unsafe_code)]

//! Consumer-visible failures.
//!
//! Only construction-time misuse and resubscription of a terminal watcher
//! reach the consumer. Everything else — unobservable values, transient
//! enumeration conflicts, double disposal — is absorbed as a skipped or
//! retried internal transition.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WatchError {
    /// The root instance supports neither scalar-change nor
    /// membership-change notification; an observer must never be attached
    /// to nothing observable.
    #[error("root instance supports neither property-change nor membership-change notification")]
    Unobservable,

    /// The watcher was already disposed; the subscription lifecycle is
    /// single-use.
    #[error("watcher already disposed; a disposed watcher cannot be resubscribed")]
    Disposed,
}
