use super::notification::Event;

use std::marker::PhantomData;
use std::sync::Arc;

/// The delivery end of the observer pattern
///
/// An observer receives every [Event] of a subscription through `on`, in the
/// order the upstream emitted them. After a terminal event nothing else is
/// delivered. Observers may be invoked from any thread the upstream or a
/// scheduler runs on.
///
/// `is_closed` lets a source stop producing early: it returns true once the
/// observer drops everything it is given, e.g. after its subscription ended.
pub trait Observer<T>: Send + Sync {
  fn on(&self, event: Event<T>);

  fn is_closed(&self) -> bool {
    false
  }
}

impl<T, O> Observer<T> for Arc<O>
where
  O: Observer<T> + ?Sized,
{
  fn on(&self, event: Event<T>) {
    (**self).on(event)
  }

  fn is_closed(&self) -> bool {
    (**self).is_closed()
  }
}

type ObserverFn<T> = dyn Fn(Event<T>) + Send + Sync;

/// An observer invoking a closure for every event
pub struct AnonymousObserver<T> {
  func: Box<ObserverFn<T>>,
  _marker: PhantomData<fn(T)>,
}

impl<T> AnonymousObserver<T> {
  pub fn new<F>(func: F) -> Self
  where
    F: Fn(Event<T>) + Send + Sync + 'static,
  {
    AnonymousObserver {
      func: Box::new(func),
      _marker: PhantomData,
    }
  }
}

impl<T> Observer<T> for AnonymousObserver<T> {
  fn on(&self, event: Event<T>) {
    (self.func)(event)
  }
}

/// Wraps `func` into an observer
pub fn from_fn<T, F>(func: F) -> Arc<AnonymousObserver<T>>
where
  F: Fn(Event<T>) + Send + Sync + 'static,
{
  Arc::new(AnonymousObserver::new(func))
}

#[cfg(test)]
mod test {
  use super::*;

  use std::sync::Mutex;

  #[test]
  fn anonymous_observer_test() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let cloned = received.clone();
    let observer = from_fn(move |event: Event<i32>| {
      cloned.lock().unwrap().push(event);
    });
    observer.on(Event::Next(1));
    observer.on(Event::Completed);
    assert_eq!(
      *received.lock().unwrap(),
      [Event::Next(1), Event::Completed]
    );
  }

  #[test]
  fn shared_observer_test() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let cloned = received.clone();
    let observer: Arc<dyn Observer<&'static str>> =
      from_fn(move |event: Event<&'static str>| {
        cloned.lock().unwrap().push(event);
      });
    let shared = Arc::new(observer);
    shared.on(Event::Next("a"));
    assert_eq!(*received.lock().unwrap(), [Event::Next("a")]);
  }
}
