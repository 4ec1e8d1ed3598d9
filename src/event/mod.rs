//! This module contains backbeat's core event system. The module is organized
//! into the following sub modules:
//! * `notification` which implements the [Event](notification::Event) type -
//!   a single value, error or completion in an event sequence.
//! * `disposable` which implements the handles used to release subscriptions
//!   and timers.
//! * `observer` and `observable` which implement the delivery and subscription
//!   contracts, including the [Producer](observable::Producer) protocol every
//!   operator is built on.
//! * `sink` which implements the per-subscription state shared by every
//!   operator.
//! * `ops` which contains the operators and the fluent traits used to chain
//!   them.
//! * `scheduler` which implements relative-delay scheduling.
//! * `sources` and `subject` which implement the roots of an event chain.
//! * `subscription` which implements the
//!   [Subscription](subscription::Subscription) type which is used to tie a
//!   chain to the current scope.
//!
pub mod disposable;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod scheduler;
pub mod sink;
pub mod sources;
pub mod subject;
pub mod subscription;

pub use notification::{Event, EventConvertible, EventError};
pub use observable::{Observable, Producer, Source};
pub use observer::Observer;
