//! Cold sources replaying a fixed list of events to every subscriber.
use super::disposable::{self, Cancelable, Disposable};
use super::notification::{Event, EventError};
use super::observable::{
  subscribe_producer, Observable, ObservableType, Producer, Source,
};
use super::observer::Observer;
use super::sink::Sink;
use log::trace;

use std::sync::Arc;

/// Replays `events` synchronously on subscribe
///
/// Replay stops after the first terminal event, or as soon as the
/// subscription is cancelled or downstream reports it is closed, which a
/// downstream operator does once it terminated.
pub struct Sequence<T> {
  events: Vec<Event<T>>,
}

impl<T> Sequence<T> {
  pub fn new(events: Vec<Event<T>>) -> Self {
    Sequence { events }
  }
}

struct SequenceSink<O> {
  sink: Sink<O>,
}

impl<O> Disposable for SequenceSink<O>
where
  O: Send + Sync,
{
  fn dispose(&self) {
    self.sink.dispose();
  }
}

impl<T> Producer<T> for Sequence<T>
where
  T: ObservableType,
{
  fn run<O>(
    &self,
    observer: O,
    cancel: Arc<dyn Cancelable>,
  ) -> (Arc<dyn Disposable>, Arc<dyn Disposable>)
  where
    O: Observer<T> + 'static,
  {
    let sink = Arc::new(SequenceSink {
      sink: Sink::new(observer, cancel),
    });
    for event in self.events.iter() {
      if sink.sink.is_closed::<T>() {
        trace!("sink {} stopped replaying", sink.sink.id());
        break;
      }
      sink.sink.forward_on(event.clone());
    }
    (sink, disposable::nop())
  }
}

impl<T> Observable<T> for Sequence<T>
where
  T: ObservableType,
{
  fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Arc<dyn Disposable> {
    subscribe_producer(self, observer)
  }
}

/// Emits each of `values` then completes
pub fn of<T>(values: Vec<T>) -> Source<T>
where
  T: ObservableType,
{
  let events = values
    .into_iter()
    .map(Event::Next)
    .chain(std::iter::once(Event::Completed))
    .collect();
  from_events(events)
}

/// Emits `events` as they are, the source does not terminate unless a
/// terminal event is part of the list
pub fn from_events<T>(events: Vec<Event<T>>) -> Source<T>
where
  T: ObservableType,
{
  Arc::new(Sequence::new(events))
}

pub fn empty<T>() -> Source<T>
where
  T: ObservableType,
{
  from_events(vec![Event::Completed])
}

pub fn never<T>() -> Source<T>
where
  T: ObservableType,
{
  from_events(Vec::new())
}

pub fn fail<T>(error: EventError) -> Source<T>
where
  T: ObservableType,
{
  from_events(vec![Event::Error(error)])
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::utils::testing::RecordingObserver;

  use std::sync::atomic::{AtomicUsize, Ordering};

  #[test]
  fn of_test() {
    let observer = RecordingObserver::new();
    of(vec![1, 2]).subscribe(observer.clone());
    assert_eq!(
      observer.events(),
      [Event::Next(1), Event::Next(2), Event::Completed]
    );
  }

  #[test]
  fn stop_at_terminal_test() {
    let error = EventError::msg("stop");
    let observer = RecordingObserver::new();
    from_events(vec![
      Event::Next('x'),
      Event::Error(error.clone()),
      Event::Next('y'),
      Event::Completed,
    ])
    .subscribe(observer.clone());
    assert_eq!(observer.events(), [Event::Next('x'), Event::Error(error)]);
  }

  #[test]
  fn empty_never_fail_test() {
    let observer = RecordingObserver::<u8>::new();
    empty().subscribe(observer.clone());
    assert_eq!(observer.events(), [Event::Completed]);

    let observer = RecordingObserver::<u8>::new();
    never().subscribe(observer.clone());
    assert!(observer.events().is_empty());

    let error = EventError::msg("fail");
    let observer = RecordingObserver::<u8>::new();
    fail(error.clone()).subscribe(observer.clone());
    assert_eq!(observer.events(), [Event::Error(error)]);
  }

  #[test]
  fn replay_per_subscription_test() {
    let source = of(vec!["a"]);
    let first = RecordingObserver::new();
    let second = RecordingObserver::new();
    source.subscribe(first.clone());
    source.subscribe(second.clone());
    assert_eq!(first.events(), second.events());
  }

  struct Closing {
    received: AtomicUsize,
    limit: usize,
  }

  impl Observer<i32> for Closing {
    fn on(&self, _: Event<i32>) {
      self.received.fetch_add(1, Ordering::Relaxed);
    }

    fn is_closed(&self) -> bool {
      self.received.load(Ordering::Relaxed) >= self.limit
    }
  }

  #[test]
  fn closed_observer_stops_replay_test() {
    let observer = Arc::new(Closing {
      received: AtomicUsize::new(0),
      limit: 2,
    });
    of((0..1000).collect::<Vec<i32>>()).subscribe(observer.clone());
    assert_eq!(observer.received.load(Ordering::Relaxed), 2);
  }
}
