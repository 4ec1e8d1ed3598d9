use super::disposable::{self, Disposable};
use super::notification::{Error, Event, EventError};
use super::observable::{ObservableType, Observable, Source};
use super::observer::Observer;
use super::scheduler::{make_scheduler, schedule_relative, Scheduler, SchedulerType};
use log::{debug, warn};

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// A hot source of events driven by its owner
pub trait Subject<T>
where
  T: ObservableType,
{
  fn observe(&self) -> Source<T>;
  fn next(&self, value: T);
  fn error(&self, error: EventError);
  fn complete(&self);
}

struct SubjectState<T> {
  observers: Vec<(usize, Arc<dyn Observer<T>>)>,
  stopped: Option<Event<T>>,
  disposed: bool,
}

impl<T> Default for SubjectState<T> {
  fn default() -> Self {
    SubjectState {
      observers: Vec::new(),
      stopped: None,
      disposed: false,
    }
  }
}

fn lock<T>(state: &Mutex<SubjectState<T>>) -> MutexGuard<'_, SubjectState<T>> {
  match state.lock() {
    Ok(guard) => guard,
    Err(poisoned) => poisoned.into_inner(),
  }
}

fn remove_observer<T>(state: &Weak<Mutex<SubjectState<T>>>, id: usize) {
  if let Some(state) = state.upgrade() {
    lock(&state).observers.retain(|(observer, _)| *observer != id);
  }
}

fn deliver<T>(state: &Mutex<SubjectState<T>>, event: Event<T>)
where
  T: Clone,
{
  // Observers unsubscribe from within `on`, which needs the lock.
  let observers: Vec<Arc<dyn Observer<T>>> = {
    let mut guard = lock(state);
    let snapshot = guard
      .observers
      .iter()
      .map(|(_, observer)| observer.clone())
      .collect();
    if event.is_stop_event() {
      guard.observers.clear();
    }
    snapshot
  };
  for observer in observers {
    observer.on(event.clone());
  }
}

struct SubjectInner<T> {
  id: usize,
  state: Arc<Mutex<SubjectState<T>>>,
  scheduler: Arc<dyn Scheduler>,
}

impl<T> SubjectInner<T>
where
  T: ObservableType,
{
  fn emit(&self, event: Event<T>) {
    {
      let mut state = lock(&self.state);
      if state.disposed {
        warn!("subject {} is disposed, dropped {:?}", self.id, event);
        return;
      }
      if state.stopped.is_some() {
        warn!("subject {} already terminated, dropped {:?}", self.id, event);
        return;
      }
      if event.is_stop_event() {
        debug!("subject {} terminated with {:?}", self.id, event);
        state.stopped = Some(event.clone());
      }
    }
    schedule_relative(
      self.scheduler.as_ref(),
      (self.state.clone(), event),
      Duration::from_secs(0),
      |(state, event)| deliver(&state, event),
    );
  }
}

impl<T> Observable<T> for SubjectInner<T>
where
  T: ObservableType,
{
  fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Arc<dyn Disposable> {
    let mut state = lock(&self.state);
    if state.disposed {
      drop(state);
      let error = Error::Disposed(format!("subject {}", self.id));
      observer.on(Event::Error(EventError::new(error)));
      return disposable::nop();
    }
    let stopped = state.stopped.clone();
    if let Some(stop) = stopped {
      drop(state);
      observer.on(stop);
      return disposable::nop();
    }
    let id = super::observable::id();
    state.observers.push((id, observer));
    let weak = Arc::downgrade(&self.state);
    disposable::from_fn(move || remove_observer(&weak, id))
  }
}

pub struct BasicSubjectBuilder {
  scheduler: SchedulerType,
}

impl Default for BasicSubjectBuilder {
  fn default() -> Self {
    BasicSubjectBuilder {
      scheduler: SchedulerType::Blocking,
    }
  }
}

impl BasicSubjectBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Chooses where events are delivered, `Blocking` (the default) delivers
  /// on the thread emitting them
  pub fn scheduler(mut self, scheduler: SchedulerType) -> Self {
    self.scheduler = scheduler;
    self
  }

  pub fn build<T>(self) -> BasicSubject<T>
  where
    T: ObservableType,
  {
    let id = super::observable::id();
    BasicSubject {
      inner: Arc::new(SubjectInner {
        id,
        state: Arc::new(Mutex::new(SubjectState::default())),
        scheduler: make_scheduler("subject".to_owned(), id, self.scheduler),
      }),
    }
  }
}

/// A subject broadcasting every event to its current observers
///
/// Handles are cheap to clone and share the same observers. Once terminated,
/// late observers immediately receive the terminal event; once disposed they
/// receive a [Disposed](Error::Disposed) error.
pub struct BasicSubject<T> {
  inner: Arc<SubjectInner<T>>,
}

impl<T> Clone for BasicSubject<T> {
  fn clone(&self) -> Self {
    BasicSubject {
      inner: self.inner.clone(),
    }
  }
}

impl<T> BasicSubject<T>
where
  T: ObservableType,
{
  pub fn new() -> Self {
    BasicSubjectBuilder::new().build()
  }

  pub fn observer_count(&self) -> usize {
    lock(&self.inner.state).observers.len()
  }
}

impl<T> Default for BasicSubject<T>
where
  T: ObservableType,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Subject<T> for BasicSubject<T>
where
  T: ObservableType,
{
  fn observe(&self) -> Source<T> {
    self.inner.clone()
  }

  fn next(&self, value: T) {
    self.inner.emit(Event::Next(value));
  }

  fn error(&self, error: EventError) {
    self.inner.emit(Event::Error(error));
  }

  fn complete(&self) {
    self.inner.emit(Event::Completed);
  }
}

impl<T> Disposable for BasicSubject<T>
where
  T: ObservableType,
{
  fn dispose(&self) {
    let observers = {
      let mut state = lock(&self.inner.state);
      if state.disposed {
        return;
      }
      state.disposed = true;
      std::mem::take(&mut state.observers)
    };
    debug!(
      "subject {} disposed, released {} observers",
      self.inner.id,
      observers.len()
    );
  }
}
