use crate::event::disposable::{Cancelable, Disposable};
use crate::event::notification::Event;
use crate::event::observable::{
  subscribe_producer, Observable, ObservableType, Producer, Source,
};
use crate::event::observer::Observer;
use crate::event::sink::Sink;

use std::sync::Arc;

/// Reifies every event of its source as a value, the reified sequence
/// completes right after the reified terminal event
pub struct Materializer<T> {
  source: Source<T>,
}

impl<T> Materializer<T> {
  pub fn new(source: Source<T>) -> Self {
    Materializer { source }
  }
}

struct MaterializeSink<O> {
  sink: Sink<O>,
}

impl<T, O> Observer<T> for MaterializeSink<O>
where
  O: Observer<Event<T>>,
{
  fn on(&self, event: Event<T>) {
    let stop = event.is_stop_event();
    self.sink.forward_on(Event::Next(event));
    if stop {
      self.sink.forward_on(Event::Completed);
    }
  }

  fn is_closed(&self) -> bool {
    self.sink.is_closed::<Event<T>>()
  }
}

impl<O> Disposable for MaterializeSink<O>
where
  O: Send + Sync,
{
  fn dispose(&self) {
    self.sink.dispose();
  }
}

impl<T> Producer<Event<T>> for Materializer<T>
where
  T: ObservableType,
{
  fn run<O>(
    &self,
    observer: O,
    cancel: Arc<dyn Cancelable>,
  ) -> (Arc<dyn Disposable>, Arc<dyn Disposable>)
  where
    O: Observer<Event<T>> + 'static,
  {
    let sink = Arc::new(MaterializeSink {
      sink: Sink::new(observer, cancel),
    });
    let subscription = self.source.subscribe(sink.clone());
    (sink, subscription)
  }
}

impl<T> Observable<Event<T>> for Materializer<T>
where
  T: ObservableType,
{
  fn subscribe(
    &self,
    observer: Arc<dyn Observer<Event<T>>>,
  ) -> Arc<dyn Disposable> {
    subscribe_producer(self, observer)
  }
}
