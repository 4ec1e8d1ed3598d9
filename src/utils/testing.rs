use crate::event::disposable::{Cancelable, Disposable};
use crate::event::notification::Event;
use crate::event::observer::Observer;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::{thread, time::Duration};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn panic_after<T, F>(d: Duration, f: F) -> T
where
  T: Send + 'static,
  F: FnOnce() -> T + Send + 'static,
{
  let (done_tx, done_rx) = mpsc::channel();
  let handle = thread::Builder::new()
    .name("testing-thread".to_owned())
    .spawn(move || {
      let val = f();
      done_tx.send(()).expect("failed to send complete signal");
      val
    })
    .expect("failed to spawn testing thread");
  match done_rx.recv_timeout(d) {
    Ok(_) => handle.join().expect("thread panicked"),
    Err(error) => match error {
      mpsc::RecvTimeoutError::Timeout => panic!("thread took too long"),
      mpsc::RecvTimeoutError::Disconnected => panic!("thread panicked"),
    },
  }
}

/// Runs `f` on its own thread and panics if it does not return within
/// [DEFAULT_TIMEOUT]
pub fn async_context<T, F>(f: F) -> T
where
  T: Send + 'static,
  F: FnOnce() -> T + Send + 'static,
{
  panic_after(DEFAULT_TIMEOUT, f)
}

/// An observer recording every event it receives
///
/// # Example
/// ```
/// use backbeat::event::{sources, Event};
/// use backbeat::utils::testing::RecordingObserver;
///
/// let observer = RecordingObserver::new();
/// sources::of(vec![1]).subscribe(observer.clone());
/// assert_eq!(observer.events(), [Event::Next(1), Event::Completed]);
/// ```
pub struct RecordingObserver<T> {
  events: Mutex<Vec<Event<T>>>,
}

impl<T> RecordingObserver<T>
where
  T: Clone,
{
  pub fn new() -> Arc<Self> {
    Arc::new(RecordingObserver {
      events: Mutex::new(Vec::new()),
    })
  }

  pub fn events(&self) -> Vec<Event<T>> {
    match self.events.lock() {
      Ok(events) => events.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }

  /// The values received so far, terminal events left out
  pub fn values(&self) -> Vec<T> {
    self
      .events()
      .into_iter()
      .filter_map(|event| match event {
        Event::Next(value) => Some(value),
        _ => None,
      })
      .collect()
  }
}

impl<T> Observer<T> for RecordingObserver<T>
where
  T: Send,
{
  fn on(&self, event: Event<T>) {
    match self.events.lock() {
      Ok(mut events) => events.push(event),
      Err(poisoned) => poisoned.into_inner().push(event),
    }
  }
}

/// A disposable counting how often it is disposed
///
/// `count` is the number of times the resource was released, which is at
/// most one, `calls` is the number of `dispose` calls.
#[derive(Default)]
pub struct CountingDisposable {
  released: AtomicUsize,
  calls: AtomicUsize,
}

impl CountingDisposable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn count(&self) -> usize {
    self.released.load(Ordering::Acquire)
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::Acquire)
  }
}

impl Disposable for CountingDisposable {
  fn dispose(&self) {
    if self.calls.fetch_add(1, Ordering::AcqRel) == 0 {
      self.released.fetch_add(1, Ordering::AcqRel);
    }
  }
}

impl Cancelable for CountingDisposable {
  fn is_disposed(&self) -> bool {
    self.count() > 0
  }
}
