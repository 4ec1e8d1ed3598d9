//! Operators and the fluent traits used to chain them onto a
//! [Source](super::observable::Source).
//!
//! Every operator is a [Producer](super::observable::Producer) paired with a
//! per-subscription sink, the traits below only wrap a source into one.
pub mod dematerialize;
pub mod materialize;
pub mod skip;

use super::notification::{Event, EventConvertible};
use super::observable::{ObservableType, Source};
use super::observer::{AnonymousObserver, Observer};
use super::scheduler::Scheduler;
use super::subscription::Subscription;

use dematerialize::Dematerializer;
use materialize::Materializer;
use skip::{SkipCount, SkipTime};

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub trait Skip<T>
where
  T: ObservableType,
{
  /// Chains a skip operator onto the source
  ///
  /// `skip` drops the first `count` values, errors and completion pass
  /// through untouched. A count of zero or less drops nothing.
  ///
  /// # Example
  /// ```
  /// use backbeat::event::sources;
  /// use backbeat::event::ops::*;
  ///
  /// let rx = sources::of(vec![1, 2, 3, 4, 5])
  ///   .skip(2)
  ///   .collect();
  ///
  /// let values: Vec<i32> =
  ///   rx.recv().unwrap().iter().filter_map(|x| x.element().cloned()).collect();
  /// assert_eq!(values, [3, 4, 5]);
  /// ```
  fn skip(&self, count: isize) -> Source<T>;
  /// Chains a time based skip operator onto the source
  ///
  /// `skip_for` drops every value emitted before `duration` has elapsed on
  /// `scheduler`, counted from the moment of subscription.
  ///
  /// # Example
  /// ```
  /// use backbeat::event::Event;
  /// use backbeat::event::ops::*;
  /// use backbeat::event::scheduler::VirtualTimeScheduler;
  /// use backbeat::event::subject::{BasicSubject, Subject};
  /// use std::sync::Arc;
  /// use std::time::Duration;
  ///
  /// let scheduler = Arc::new(VirtualTimeScheduler::new());
  /// let subject = BasicSubject::new();
  /// let rx = subject
  ///   .observe()
  ///   .skip_for(Duration::from_secs(1), scheduler.clone())
  ///   .collect();
  ///
  /// subject.next("early");
  /// scheduler.advance_by(Duration::from_secs(1));
  /// subject.next("late");
  /// subject.complete();
  ///
  /// assert_eq!(rx.recv().unwrap(), [Event::Next("late"), Event::Completed]);
  /// ```
  fn skip_for(
    &self,
    duration: Duration,
    scheduler: Arc<dyn Scheduler>,
  ) -> Source<T>;
}

impl<T> Skip<T> for Source<T>
where
  T: ObservableType,
{
  fn skip(&self, count: isize) -> Source<T> {
    Arc::new(SkipCount::new(self.clone(), count))
  }

  fn skip_for(
    &self,
    duration: Duration,
    scheduler: Arc<dyn Scheduler>,
  ) -> Source<T> {
    Arc::new(SkipTime::new(self.clone(), duration, scheduler))
  }
}

pub trait Materialize<T>
where
  T: ObservableType,
{
  /// Chains a materialize operator onto the source
  ///
  /// `materialize` turns each event into a value, the resulting sequence
  /// completes after delivering the reified terminal event.
  ///
  /// # Example
  /// ```
  /// use backbeat::event::{Event, EventError};
  /// use backbeat::event::sources;
  /// use backbeat::event::ops::*;
  ///
  /// let error = EventError::msg("failed");
  /// let rx = sources::from_events(vec![Event::Next(1), Event::Error(error.clone())])
  ///   .materialize()
  ///   .collect();
  ///
  /// assert_eq!(
  ///   rx.recv().unwrap(),
  ///   [
  ///     Event::Next(Event::Next(1)),
  ///     Event::Next(Event::Error(error)),
  ///     Event::Completed,
  ///   ]
  /// );
  /// ```
  fn materialize(&self) -> Source<Event<T>>;
}

impl<T> Materialize<T> for Source<T>
where
  T: ObservableType,
{
  fn materialize(&self) -> Source<Event<T>> {
    Arc::new(Materializer::new(self.clone()))
  }
}

pub trait Dematerialize<E>
where
  E: EventConvertible + ObservableType,
{
  /// Chains a dematerialize operator onto the source
  ///
  /// `dematerialize` replays the events carried by the values of the source,
  /// a carried error or completion terminates the output right away.
  ///
  /// # Example
  /// ```
  /// use backbeat::event::Event;
  /// use backbeat::event::sources;
  /// use backbeat::event::ops::*;
  ///
  /// let rx = sources::of(vec![
  ///   Event::Next(1),
  ///   Event::Completed,
  ///   Event::Next(2),
  /// ])
  ///   .dematerialize()
  ///   .collect();
  ///
  /// assert_eq!(rx.recv().unwrap(), [Event::Next(1), Event::Completed]);
  /// ```
  fn dematerialize(&self) -> Source<E::Value>;
}

impl<E> Dematerialize<E> for Source<E>
where
  E: EventConvertible + ObservableType,
{
  fn dematerialize(&self) -> Source<E::Value> {
    Arc::new(Dematerializer::new(self.clone()))
  }
}

pub trait Subscribe<T>
where
  T: ObservableType,
{
  /// Subscribes `observer` to the end of the chain
  ///
  /// The returned [Subscription] tears the chain down when dropped.
  fn subscribe_with<O>(&self, observer: O) -> Subscription
  where
    O: Observer<T> + 'static;
  /// Subscribes a closure receiving every event
  fn subscribe_on<F>(&self, on: F) -> Subscription
  where
    F: Fn(Event<T>) + Send + Sync + 'static;
  /// Subscribes a closure receiving every value, terminal events are ignored
  ///
  /// # Example
  /// ```
  /// use backbeat::event::subject::{BasicSubject, Subject};
  /// use backbeat::event::ops::*;
  /// use std::sync::Arc;
  /// use std::sync::atomic::{AtomicI32, Ordering};
  ///
  /// let sum = Arc::new(AtomicI32::new(0));
  /// let capture = sum.clone();
  /// let subject = BasicSubject::new();
  /// {
  ///   let _subscription = subject
  ///     .observe()
  ///     .skip(1)
  ///     .subscribe_next(move |x| {
  ///       capture.fetch_add(x, Ordering::Relaxed);
  ///     });
  ///   subject.next(1);
  ///   subject.next(2);
  /// }
  /// subject.next(3);
  /// assert_eq!(sum.load(Ordering::Relaxed), 2);
  /// ```
  fn subscribe_next<F>(&self, next: F) -> Subscription
  where
    F: Fn(T) + Send + Sync + 'static;
}

impl<T> Subscribe<T> for Source<T>
where
  T: ObservableType,
{
  fn subscribe_with<O>(&self, observer: O) -> Subscription
  where
    O: Observer<T> + 'static,
  {
    Subscription::new(self.as_ref(), observer)
  }

  fn subscribe_on<F>(&self, on: F) -> Subscription
  where
    F: Fn(Event<T>) + Send + Sync + 'static,
  {
    self.subscribe_with(AnonymousObserver::new(on))
  }

  fn subscribe_next<F>(&self, next: F) -> Subscription
  where
    F: Fn(T) + Send + Sync + 'static,
  {
    self.subscribe_on(move |event| {
      if let Event::Next(value) = event {
        next(value);
      }
    })
  }
}

pub trait Collect<T>
where
  T: ObservableType,
{
  /// Subscribes a collector to the end of the chain
  ///
  /// `collect` returns a channel which receives every event of the chain once
  /// it terminates. The chain is left dangling, it lives until it terminates.
  ///
  /// # Example
  /// ```
  /// use backbeat::event::Event;
  /// use backbeat::event::sources;
  /// use backbeat::event::ops::*;
  ///
  /// let rx = sources::of(vec![1, 2, 3]).collect();
  ///
  /// assert_eq!(
  ///   rx.recv().unwrap(),
  ///   [Event::Next(1), Event::Next(2), Event::Next(3), Event::Completed]
  /// );
  /// ```
  fn collect(&self) -> Receiver<Vec<Event<T>>>;
}

impl<T> Collect<T> for Source<T>
where
  T: ObservableType,
{
  fn collect(&self) -> Receiver<Vec<Event<T>>> {
    let (tx, rx) = std::sync::mpsc::channel();
    let tx = Mutex::new(Some(tx));
    let events = Mutex::new(Vec::new());
    self
      .subscribe_on(move |event| {
        let stop = event.is_stop_event();
        let mut guard = match events.lock() {
          Ok(guard) => guard,
          Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(event);
        if stop {
          let sender = match tx.lock() {
            Ok(mut sender) => sender.take(),
            Err(poisoned) => poisoned.into_inner().take(),
          };
          if let Some(sender) = sender {
            let _ = sender.send(std::mem::take(&mut *guard));
          }
        }
      })
      .dangling();
    rx
  }
}
