use super::disposable::{Cancelable, Disposable};
use super::observer::Observer;
use super::sink::SinkDisposer;

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub trait ObservableType: Send + Sync + Clone + Debug + 'static {}

impl<T> ObservableType for T where T: Send + Sync + Clone + Debug + 'static {}

/// A subscribable source of events
///
/// Every call to `subscribe` creates an independent subscription delivering
/// to `observer`. The returned disposable cancels that subscription, after
/// disposal returns the source delivers nothing more to `observer`.
pub trait Observable<T>: Send + Sync {
  fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Arc<dyn Disposable>;
}

/// A shared handle to an observable, this is what operators are chained on
pub type Source<T> = Arc<dyn Observable<T>>;

/// A stateless description of how an operator wires a sink between a
/// downstream observer and its upstream source
///
/// `run` builds the operator's sink bound to `observer` and `cancel`,
/// subscribes it upstream and returns both handles. Nothing is shared between
/// two runs of the same producer.
pub trait Producer<T>: Send + Sync {
  fn run<O>(
    &self,
    observer: O,
    cancel: Arc<dyn Cancelable>,
  ) -> (Arc<dyn Disposable>, Arc<dyn Disposable>)
  where
    O: Observer<T> + 'static;
}

/// Subscribes `observer` to `producer`, the returned disposable tears down
/// the whole subscription.
///
/// The cancellation token is created before the sink so a sink terminating
/// while `run` is still on the stack is disposed as soon as `run` returns.
pub fn subscribe_producer<T, P, O>(
  producer: &P,
  observer: O,
) -> Arc<dyn Disposable>
where
  P: Producer<T>,
  O: Observer<T> + 'static,
{
  let disposer = Arc::new(SinkDisposer::new());
  let (sink, subscription) = producer.run(observer, disposer.clone());
  disposer.set_sink_and_subscription(sink, subscription);
  disposer
}

pub(super) fn id() -> usize {
  static ID: AtomicUsize = AtomicUsize::new(0);
  ID.fetch_add(1, Ordering::Relaxed)
}
