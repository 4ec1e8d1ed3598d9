use super::disposable::{Cancelable, Disposable};
use super::notification::Event;
use super::observable::id;
use super::observer::Observer;
use log::{trace, warn};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The per-subscription state every operator sink is composed of
///
/// A sink owns the cancellation token of its subscription and shares the
/// downstream observer. Forwarding a terminal event disposes the sink, as
/// does an external cancellation, whichever comes first wins and the other
/// finds the sink already disposed.
pub struct Sink<O> {
  id: usize,
  observer: O,
  cancel: Arc<dyn Cancelable>,
  disposed: AtomicBool,
}

impl<O> Sink<O> {
  pub fn new(observer: O, cancel: Arc<dyn Cancelable>) -> Self {
    let id = id();
    trace!("sink {} created", id);
    Sink {
      id,
      observer,
      cancel,
      disposed: AtomicBool::new(false),
    }
  }

  pub fn id(&self) -> usize {
    self.id
  }

  /// Delivers `event` downstream unless the sink is already disposed, the
  /// sink disposes itself right after delivering a terminal event.
  pub fn forward_on<T>(&self, event: Event<T>)
  where
    O: Observer<T>,
  {
    if self.is_disposed() {
      return;
    }
    let stop = event.is_stop_event();
    self.observer.on(event);
    if stop {
      self.dispose();
    }
  }

  pub fn dispose(&self) {
    if !self.disposed.swap(true, Ordering::AcqRel) {
      trace!("sink {} disposed", self.id);
      self.cancel.dispose();
    }
  }

  pub fn is_disposed(&self) -> bool {
    self.disposed.load(Ordering::Acquire)
  }

  /// True once nothing forwarded through this sink can be delivered anymore:
  /// the sink or its cancellation token is disposed, or downstream is closed
  pub fn is_closed<T>(&self) -> bool
  where
    O: Observer<T>,
  {
    self.is_disposed()
      || self.cancel.is_disposed()
      || <O as Observer<T>>::is_closed(&self.observer)
  }
}

type SinkPair = (Arc<dyn Disposable>, Arc<dyn Disposable>);

#[derive(Default)]
struct DisposerState {
  disposed: bool,
  pair: Option<SinkPair>,
}

/// The cancellation token handed to [Producer::run](super::Producer::run)
///
/// The token exists before the sink and its upstream subscription do. When
/// the sink disposes itself while `run` is still wiring it up, the token
/// remembers it and disposes the pair as soon as it is handed over.
#[derive(Default)]
pub struct SinkDisposer {
  state: Mutex<DisposerState>,
}

impl SinkDisposer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_sink_and_subscription(
    &self,
    sink: Arc<dyn Disposable>,
    subscription: Arc<dyn Disposable>,
  ) {
    let release = {
      let mut guard = match self.state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
      };
      if guard.pair.is_some() {
        warn!("sink and subscription already set, releasing the new pair");
        debug_assert!(false, "sink and subscription already set");
        true
      } else if guard.disposed {
        true
      } else {
        guard.pair = Some((sink.clone(), subscription.clone()));
        false
      }
    };
    if release {
      sink.dispose();
      subscription.dispose();
    }
  }
}

impl Disposable for SinkDisposer {
  fn dispose(&self) {
    let pair = {
      let mut guard = match self.state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
      };
      if guard.disposed {
        return;
      }
      guard.disposed = true;
      guard.pair.take()
    };
    if let Some((sink, subscription)) = pair {
      sink.dispose();
      subscription.dispose();
    }
  }
}

impl Cancelable for SinkDisposer {
  fn is_disposed(&self) -> bool {
    match self.state.lock() {
      Ok(guard) => guard.disposed,
      Err(poisoned) => poisoned.into_inner().disposed,
    }
  }
}
