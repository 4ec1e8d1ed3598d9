use super::disposable::{self, Cancelable, CompositeDisposable, Disposable};
use super::notification::Event;
use super::observable::Observable;
use super::observer::Observer;
use log::trace;

use std::sync::Arc;

/// The observer at the end of a chain, it ends the subscription on the first
/// terminal event and drops anything arriving after it ended
struct LeafObserver<O> {
  observer: O,
  composite: Arc<CompositeDisposable>,
}

impl<T, O> Observer<T> for LeafObserver<O>
where
  O: Observer<T>,
{
  fn on(&self, event: Event<T>) {
    if self.composite.is_disposed() {
      return;
    }
    let stop = event.is_stop_event();
    self.observer.on(event);
    if stop {
      self.composite.dispose();
    }
  }

  fn is_closed(&self) -> bool {
    self.composite.is_disposed() || <O as Observer<T>>::is_closed(&self.observer)
  }
}

/// Ties an event chain to the scope holding it
///
/// Dropping a subscription unsubscribes from the chain. Use
/// [dangling](Self::dangling) to let a chain live on until it terminates.
pub struct Subscription {
  composite: Option<Arc<CompositeDisposable>>,
}

impl Subscription {
  pub fn new<T, O>(source: &dyn Observable<T>, observer: O) -> Self
  where
    T: 'static,
    O: Observer<T> + 'static,
  {
    let composite = disposable::create(Vec::new());
    let leaf = Arc::new(LeafObserver {
      observer,
      composite: composite.clone(),
    });
    // A chain terminating synchronously has already disposed the composite,
    // inserting into it then releases the chain right away.
    let chain = source.subscribe(leaf);
    composite.insert(chain);
    Subscription {
      composite: Some(composite),
    }
  }

  pub fn unsubscribe(&mut self) {
    if let Some(composite) = self.composite.take() {
      trace!("unsubscribing");
      composite.dispose();
    }
  }

  /// Returns false once unsubscribed or once the chain terminated
  pub fn active(&self) -> bool {
    self
      .composite
      .as_ref()
      .map_or(false, |composite| !composite.is_disposed())
  }

  /// Runs `task` when the chain ends, by termination or by unsubscribing
  ///
  /// A chain which already ended runs `task` immediately.
  pub fn finalize<F>(self, task: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    match &self.composite {
      Some(composite) => composite.insert(disposable::from_fn(task)),
      None => task(),
    }
    self
  }

  /// Releases the subscription without unsubscribing
  pub fn dangling(mut self) {
    self.composite.take();
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.unsubscribe();
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::event::sources;
  use crate::event::subject::{BasicSubject, Subject};
  use crate::utils::testing::RecordingObserver;

  use std::sync::atomic::{AtomicBool, Ordering};

  #[test]
  fn drop_unsubscribes_test() {
    let subject = BasicSubject::new();
    let observer = RecordingObserver::new();
    {
      let _subscription = Subscription::new(&*subject.observe(), observer.clone());
      subject.next(1);
      assert_eq!(subject.observer_count(), 1);
    }
    subject.next(2);
    assert_eq!(subject.observer_count(), 0);
    assert_eq!(observer.values(), [1]);
  }

  #[test]
  fn terminal_deactivates_test() {
    let subject = BasicSubject::<u8>::new();
    let subscription =
      Subscription::new(&*subject.observe(), RecordingObserver::new());
    assert!(subscription.active());
    subject.complete();
    assert!(!subscription.active());
  }

  #[test]
  fn synchronous_terminal_test() {
    let observer = RecordingObserver::new();
    let subscription = Subscription::new(&*sources::of(vec![1]), observer.clone());
    assert!(!subscription.active());
    assert_eq!(observer.events(), [Event::Next(1), Event::Completed]);
  }

  #[test]
  fn finalize_test() {
    let finalized = Arc::new(AtomicBool::new(false));
    let cloned = finalized.clone();
    let subject = BasicSubject::<u8>::new();
    let mut subscription =
      Subscription::new(&*subject.observe(), RecordingObserver::new())
        .finalize(move || cloned.store(true, Ordering::Relaxed));
    assert!(!finalized.load(Ordering::Relaxed));
    subscription.unsubscribe();
    assert!(finalized.load(Ordering::Relaxed));
    assert!(!subscription.active());

    let finalized = Arc::new(AtomicBool::new(false));
    let cloned = finalized.clone();
    let _subscription =
      Subscription::new(&*sources::empty::<u8>(), RecordingObserver::new())
        .finalize(move || cloned.store(true, Ordering::Relaxed));
    assert!(finalized.load(Ordering::Relaxed));
  }

  #[test]
  fn dangling_test() {
    let subject = BasicSubject::new();
    let observer = RecordingObserver::new();
    Subscription::new(&*subject.observe(), observer.clone()).dangling();
    subject.next("kept");
    assert_eq!(subject.observer_count(), 1);
    subject.complete();
    assert_eq!(subject.observer_count(), 0);
    assert_eq!(observer.events(), [Event::Next("kept"), Event::Completed]);
  }
}
