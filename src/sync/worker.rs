use super::task::{ScheduledTask, Task};
use crate::event::disposable::{BooleanDisposable, Disposable};
use log::{debug, error, warn};

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How often a closing worker re-checks its remaining tasks for cancellation
const CLOSING_POLL: Duration = Duration::from_millis(20);

/// Flags the worker as unhealthy when its thread unwinds
struct HealthUnwinder {
  name: String,
  flag: Arc<AtomicBool>,
}

impl Drop for HealthUnwinder {
  fn drop(&mut self) {
    if std::thread::panicking() {
      self.flag.store(false, Ordering::Release);
      error!("timer worker '{}' panicked while running a task", self.name);
    }
  }
}

enum WorkerSignal {
  Schedule(ScheduledTask<Instant>),
  Close,
}

struct WorkerInner {
  name: String,
  sender: Mutex<Sender<WorkerSignal>>,
  sequence: AtomicUsize,
  healthy: Arc<AtomicBool>,
}

impl WorkerInner {
  fn enqueue(&self, due: Duration, task: Task) -> Arc<BooleanDisposable> {
    if !self.healthy.load(Ordering::Acquire) {
      warn!("refusing to schedule on unhealthy timer worker '{}'", self.name);
      return Arc::new(BooleanDisposable::disposed());
    }
    let deadline = match Instant::now().checked_add(due) {
      Some(deadline) => deadline,
      None => {
        debug!("timer worker '{}' dropped a task never due", self.name);
        return Arc::new(BooleanDisposable::new());
      }
    };
    let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
    let scheduled = ScheduledTask::new(deadline, sequence, task);
    let token = scheduled.token.clone();
    let sent = match self.sender.lock() {
      Ok(guard) => guard.send(WorkerSignal::Schedule(scheduled)).is_ok(),
      Err(_) => false,
    };
    if !sent {
      warn!("timer worker '{}' is gone, task dropped", self.name);
      token.dispose();
    } else {
      debug!("timer worker '{}' scheduled task in {:?}", self.name, due);
    }
    token
  }
}

impl Drop for WorkerInner {
  fn drop(&mut self) {
    if let Ok(guard) = self.sender.lock() {
      let _ = guard.send(WorkerSignal::Close);
    }
  }
}

/// A background thread running tasks once their delay elapsed
///
/// Tasks due at the same instant run in submission order. Cancelling a
/// task before its deadline guarantees it never runs. Dropping the last
/// handle to the worker stops the thread once every task still pending has
/// run or been cancelled.
#[derive(Clone)]
pub struct TimerWorker {
  inner: Arc<WorkerInner>,
}

pub struct TimerWorkerBuilder {
  name: String,
}

impl TimerWorkerBuilder {
  pub fn named<S: Into<String>>(name: S) -> Self {
    TimerWorkerBuilder { name: name.into() }
  }

  pub fn build(self) -> TimerWorker {
    TimerWorker::spawn(self.name).0
  }
}

impl Default for TimerWorker {
  fn default() -> Self {
    TimerWorkerBuilder::named("timer").build()
  }
}

impl TimerWorker {
  pub fn new() -> Self {
    Self::default()
  }

  fn spawn(name: String) -> (Self, JoinHandle<()>) {
    let (tx, rx) = std::sync::mpsc::channel();
    let healthy = Arc::new(AtomicBool::new(true));
    let handle = Self::run(name.clone(), rx, healthy.clone());
    (
      TimerWorker {
        inner: Arc::new(WorkerInner {
          name,
          sender: Mutex::new(tx),
          sequence: AtomicUsize::new(0),
          healthy,
        }),
      },
      handle,
    )
  }

  fn run(
    name: String,
    receiver: Receiver<WorkerSignal>,
    healthy: Arc<AtomicBool>,
  ) -> JoinHandle<()> {
    static ID: AtomicUsize = AtomicUsize::new(0);
    let id = ID.fetch_add(1, Ordering::Relaxed);
    std::thread::Builder::new()
      .name(format!("{}{}", name, id))
      .spawn(move || {
        let _unwinder = HealthUnwinder {
          name: name.clone(),
          flag: healthy,
        };
        debug!("timer worker '{}' started", name);
        let mut queue: BinaryHeap<Reverse<ScheduledTask<Instant>>> =
          BinaryHeap::new();
        let mut closing = false;
        loop {
          if closing {
            // No handle is left to schedule more, drain what is still live.
            queue = queue
              .into_iter()
              .filter(|Reverse(task)| !task.cancelled())
              .collect();
            match queue.peek() {
              Some(Reverse(next)) => std::thread::sleep(std::cmp::min(
                next.due.saturating_duration_since(Instant::now()),
                CLOSING_POLL,
              )),
              None => break,
            }
          } else {
            let signal = match queue.peek() {
              Some(Reverse(next)) => receiver
                .recv_timeout(next.due.saturating_duration_since(Instant::now())),
              None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match signal {
              Ok(WorkerSignal::Schedule(task)) => queue.push(Reverse(task)),
              Ok(WorkerSignal::Close) | Err(RecvTimeoutError::Disconnected) => {
                debug!("timer worker '{}' closing", name);
                closing = true;
              }
              Err(RecvTimeoutError::Timeout) => (),
            }
          }
          let now = Instant::now();
          while queue.peek().map_or(false, |Reverse(next)| next.due <= now) {
            if let Some(Reverse(task)) = queue.pop() {
              task.run();
            }
          }
        }
        debug!("timer worker '{}' stopped", name);
      })
      .expect("failed to spawn timer worker thread")
  }

  /// Runs `task` on the worker thread once `due` has elapsed
  ///
  /// The returned handle cancels the task if it has not started yet. When
  /// the worker is unhealthy the task is dropped and the handle is returned
  /// already disposed.
  ///
  /// # Example
  /// ```
  /// use backbeat::sync::task::Task;
  /// use backbeat::sync::worker::TimerWorker;
  /// use std::time::Duration;
  ///
  /// let worker = TimerWorker::new();
  /// let (tx, rx) = std::sync::mpsc::channel();
  /// worker.submit(Duration::from_millis(5), Task::new(move || {
  ///   tx.send("fired").unwrap();
  /// }));
  /// assert_eq!(rx.recv().unwrap(), "fired");
  /// ```
  pub fn submit(&self, due: Duration, task: Task) -> Arc<BooleanDisposable> {
    self.inner.enqueue(due, task)
  }

  pub fn healthy(&self) -> bool {
    self.inner.healthy.load(Ordering::Acquire)
  }

  pub fn name(&self) -> &str {
    &self.inner.name
  }
}
