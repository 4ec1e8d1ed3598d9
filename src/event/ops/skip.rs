use crate::event::disposable::{self, Cancelable, Disposable};
use crate::event::notification::Event;
use crate::event::observable::{
  subscribe_producer, Observable, ObservableType, Producer, Source,
};
use crate::event::observer::Observer;
use crate::event::scheduler::{schedule_relative, Scheduler};
use crate::event::sink::Sink;
use log::trace;

use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Drops the first `count` values of its source, a count of zero or less
/// passes everything through
pub struct SkipCount<T> {
  source: Source<T>,
  count: isize,
}

impl<T> SkipCount<T> {
  pub fn new(source: Source<T>, count: isize) -> Self {
    SkipCount { source, count }
  }
}

struct SkipCountSink<O> {
  sink: Sink<O>,
  remaining: AtomicIsize,
}

impl<T, O> Observer<T> for SkipCountSink<O>
where
  O: Observer<T>,
{
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(value) => {
        // Events of one subscription are serialized, only `on` touches this.
        if self.remaining.load(Ordering::Relaxed) <= 0 {
          self.sink.forward_on(Event::Next(value));
        } else {
          self.remaining.fetch_sub(1, Ordering::Relaxed);
        }
      }
      Event::Error(_) | Event::Completed => self.sink.forward_on(event),
    }
  }

  fn is_closed(&self) -> bool {
    self.sink.is_closed::<T>()
  }
}

impl<O> Disposable for SkipCountSink<O>
where
  O: Send + Sync,
{
  fn dispose(&self) {
    self.sink.dispose();
  }
}

impl<T> Producer<T> for SkipCount<T>
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
    let sink = Arc::new(SkipCountSink {
      sink: Sink::new(observer, cancel),
      remaining: AtomicIsize::new(self.count),
    });
    let subscription = self.source.subscribe(sink.clone());
    (sink, subscription)
  }
}

impl<T> Observable<T> for SkipCount<T>
where
  T: ObservableType,
{
  fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Arc<dyn Disposable> {
    subscribe_producer(self, observer)
  }
}

/// Drops every value its source emits until `duration` has elapsed on
/// `scheduler` since subscribing
pub struct SkipTime<T> {
  source: Source<T>,
  duration: Duration,
  scheduler: Arc<dyn Scheduler>,
}

impl<T> SkipTime<T> {
  pub fn new(
    source: Source<T>,
    duration: Duration,
    scheduler: Arc<dyn Scheduler>,
  ) -> Self {
    SkipTime {
      source,
      duration,
      scheduler,
    }
  }
}

struct SkipTimeSink<O> {
  sink: Sink<O>,
  open: AtomicBool,
}

impl<O> SkipTimeSink<O> {
  fn tick(&self) {
    trace!("sink {} opened", self.sink.id());
    // Pairs with the acquire in `on`, the timer may fire on another thread.
    self.open.store(true, Ordering::Release);
  }
}

impl<T, O> Observer<T> for SkipTimeSink<O>
where
  O: Observer<T>,
{
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(value) => {
        if self.open.load(Ordering::Acquire) {
          self.sink.forward_on(Event::Next(value));
        }
      }
      Event::Error(_) | Event::Completed => self.sink.forward_on(event),
    }
  }

  fn is_closed(&self) -> bool {
    self.sink.is_closed::<T>()
  }
}

impl<O> Disposable for SkipTimeSink<O>
where
  O: Send + Sync,
{
  fn dispose(&self) {
    self.sink.dispose();
  }
}

impl<T> Producer<T> for SkipTime<T>
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
    let sink = Arc::new(SkipTimeSink {
      sink: Sink::new(observer, cancel),
      open: AtomicBool::new(false),
    });
    let timer = schedule_relative(
      self.scheduler.as_ref(),
      Arc::downgrade(&sink),
      self.duration,
      |sink| {
        if let Some(sink) = sink.upgrade() {
          sink.tick();
        }
      },
    );
    let subscription = self.source.subscribe(sink.clone());
    (sink, disposable::create(vec![timer, subscription]))
  }
}

impl<T> Observable<T> for SkipTime<T>
where
  T: ObservableType,
{
  fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Arc<dyn Disposable> {
    subscribe_producer(self, observer)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::event::notification::EventError;
  use crate::event::scheduler::{default_scheduler, Blocking, VirtualTimeScheduler};
  use crate::event::sources;
  use crate::event::subject::{BasicSubject, Subject};
  use crate::utils::testing::{async_context, RecordingObserver};

  fn skip_count(values: Vec<i32>, count: isize) -> Vec<Event<i32>> {
    let observer = RecordingObserver::new();
    SkipCount::new(sources::of(values), count).subscribe(observer.clone());
    observer.events()
  }

  #[test]
  fn skip_count_test() {
    assert_eq!(
      skip_count(vec![1, 2, 3, 4, 5], 2),
      [Event::Next(3), Event::Next(4), Event::Next(5), Event::Completed]
    );
  }

  #[test]
  fn skip_count_zero_test() {
    let expected: Vec<Event<i32>> = (1..=5)
      .map(Event::Next)
      .chain(std::iter::once(Event::Completed))
      .collect();
    assert_eq!(skip_count(vec![1, 2, 3, 4, 5], 0), expected);
    assert_eq!(skip_count(vec![1, 2, 3, 4, 5], -3), expected);
  }

  #[test]
  fn skip_count_exceeds_length_test() {
    assert_eq!(skip_count(vec![1, 2, 3, 4, 5], 10), [Event::Completed]);
  }

  #[test]
  fn skip_count_error_test() {
    let error = EventError::msg("boom");
    let observer = RecordingObserver::new();
    let source = sources::from_events(vec![
      Event::Next(1),
      Event::Next(2),
      Event::Error(error.clone()),
      Event::Next(3),
    ]);
    SkipCount::new(source, 1).subscribe(observer.clone());
    assert_eq!(observer.events(), [Event::Next(2), Event::Error(error)]);
  }

  #[test]
  fn skip_count_independent_sinks_test() {
    let subject = BasicSubject::new();
    let producer = Arc::new(SkipCount::new(subject.observe(), 2));
    let first = RecordingObserver::new();
    let second = RecordingObserver::new();
    producer.subscribe(first.clone());
    subject.next(1);
    subject.next(2);
    producer.subscribe(second.clone());
    subject.next(3);
    subject.next(4);
    subject.next(5);
    assert_eq!(first.values(), [3, 4, 5]);
    assert_eq!(second.values(), [5]);
  }

  #[test]
  fn skip_count_external_cancel_test() {
    let subject = BasicSubject::new();
    let observer = RecordingObserver::new();
    let disposable =
      SkipCount::new(subject.observe(), 0).subscribe(observer.clone());
    subject.next(1);
    disposable.dispose();
    disposable.dispose();
    subject.next(2);
    subject.complete();
    assert_eq!(observer.events(), [Event::Next(1)]);
    assert_eq!(subject.observer_count(), 0);
  }

  #[test]
  fn skip_time_test() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let subject = BasicSubject::new();
    let observer = RecordingObserver::new();
    SkipTime::new(subject.observe(), Duration::from_secs(10), scheduler.clone())
      .subscribe(observer.clone());
    subject.next(1);
    scheduler.advance_by(Duration::from_secs(5));
    subject.next(2);
    scheduler.advance_by(Duration::from_secs(5));
    subject.next(3);
    scheduler.advance_by(Duration::from_secs(1));
    subject.next(4);
    subject.complete();
    assert_eq!(observer.events(), [Event::Next(3), Event::Next(4), Event::Completed]);
  }

  #[test]
  fn skip_time_complete_cancels_timer_test() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let subject = BasicSubject::new();
    let observer = RecordingObserver::new();
    SkipTime::new(subject.observe(), Duration::from_secs(10), scheduler.clone())
      .subscribe(observer.clone());
    assert_eq!(scheduler.pending(), 1);
    subject.next(1);
    subject.complete();
    assert_eq!(scheduler.pending(), 0);
    scheduler.advance_by(Duration::from_secs(20));
    assert_eq!(observer.events(), [Event::Completed]);
    assert_eq!(subject.observer_count(), 0);
  }

  #[test]
  fn skip_time_dispose_cancels_timer_test() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let subject = BasicSubject::<i32>::new();
    let observer = RecordingObserver::new();
    let disposable =
      SkipTime::new(subject.observe(), Duration::from_secs(1), scheduler.clone())
        .subscribe(observer.clone());
    disposable.dispose();
    assert_eq!(scheduler.pending(), 0);
    assert_eq!(subject.observer_count(), 0);
    subject.next(1);
    assert!(observer.events().is_empty());
  }

  #[test]
  fn skip_time_duration_max_test() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    scheduler.advance_by(Duration::from_secs(1));
    let subject = BasicSubject::new();
    let observer = RecordingObserver::new();
    SkipTime::new(subject.observe(), Duration::MAX, scheduler.clone())
      .subscribe(observer.clone());
    subject.next(1);
    scheduler.advance_by(Duration::from_secs(3600));
    subject.next(2);
    subject.complete();
    assert_eq!(observer.events(), [Event::Completed]);

    let observer = RecordingObserver::new();
    SkipTime::new(sources::of(vec![1, 2, 3]), Duration::MAX, default_scheduler())
      .subscribe(observer.clone());
    assert_eq!(observer.events(), [Event::Completed]);
  }

  #[test]
  fn skip_time_blocking_test() {
    async_context(|| {
      let observer = RecordingObserver::new();
      SkipTime::new(
        sources::of(vec![1, 2, 3]),
        Duration::from_millis(50),
        Arc::new(Blocking),
      )
      .subscribe(observer.clone());
      assert_eq!(observer.events(), [Event::Completed]);

      let subject = BasicSubject::new();
      let observer = RecordingObserver::new();
      SkipTime::new(
        subject.observe(),
        Duration::from_millis(50),
        Arc::new(Blocking),
      )
      .subscribe(observer.clone());
      subject.next(1);
      std::thread::sleep(Duration::from_millis(200));
      subject.next(2);
      subject.complete();
      assert_eq!(observer.events(), [Event::Next(2), Event::Completed]);
    });
  }
}
