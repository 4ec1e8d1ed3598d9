use crate::event::disposable::{Cancelable, Disposable};
use crate::event::notification::{Event, EventConvertible};
use crate::event::observable::{
  subscribe_producer, Observable, ObservableType, Producer, Source,
};
use crate::event::observer::Observer;
use crate::event::sink::Sink;
use log::trace;

use std::sync::Arc;

/// Replays the events reified in the values of its source
///
/// The output terminates on whichever comes first: a reified terminal event
/// carried in a value, or the source terminating on its own.
pub struct Dematerializer<E> {
  source: Source<E>,
}

impl<E> Dematerializer<E> {
  pub fn new(source: Source<E>) -> Self {
    Dematerializer { source }
  }
}

struct DematerializeSink<O> {
  sink: Sink<O>,
}

impl<E, O> Observer<E> for DematerializeSink<O>
where
  E: EventConvertible,
  O: Observer<E::Value>,
{
  fn on(&self, event: Event<E>) {
    match event {
      Event::Next(element) => {
        if element.is_stop_event() {
          trace!("sink {} replaying a reified stop event", self.sink.id());
        }
        self.sink.forward_on(element.into_event());
      }
      Event::Error(error) => self.sink.forward_on(Event::Error(error)),
      Event::Completed => self.sink.forward_on(Event::Completed),
    }
  }

  fn is_closed(&self) -> bool {
    self.sink.is_closed::<E::Value>()
  }
}

impl<O> Disposable for DematerializeSink<O>
where
  O: Send + Sync,
{
  fn dispose(&self) {
    self.sink.dispose();
  }
}

impl<E> Producer<E::Value> for Dematerializer<E>
where
  E: EventConvertible + ObservableType,
{
  fn run<O>(
    &self,
    observer: O,
    cancel: Arc<dyn Cancelable>,
  ) -> (Arc<dyn Disposable>, Arc<dyn Disposable>)
  where
    O: Observer<E::Value> + 'static,
  {
    let sink = Arc::new(DematerializeSink {
      sink: Sink::new(observer, cancel),
    });
    let subscription = self.source.subscribe(sink.clone());
    (sink, subscription)
  }
}

impl<E> Observable<E::Value> for Dematerializer<E>
where
  E: EventConvertible + ObservableType,
{
  fn subscribe(
    &self,
    observer: Arc<dyn Observer<E::Value>>,
  ) -> Arc<dyn Disposable> {
    subscribe_producer(self, observer)
  }
}
