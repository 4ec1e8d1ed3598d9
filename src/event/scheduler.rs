use super::disposable::{self, BooleanDisposable, Disposable};
use crate::sync::task::{ScheduledTask, Task};
use crate::sync::worker::{TimerWorker, TimerWorkerBuilder};
use log::debug;

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SchedulerType {
  Worker,
  Runtime,
  Blocking,
}

/// Relative-delay, cancellable execution of a unit of work
///
/// `schedule_relative` runs `task` once after `due` has elapsed unless the
/// returned disposable is disposed first. Disposing after the task ran is a
/// no-op.
pub trait Scheduler: Send + Sync {
  fn schedule_relative(&self, due: Duration, task: Task) -> Arc<dyn Disposable>;
}

/// Schedules `action` to be invoked with `state` once `due` has elapsed
pub fn schedule_relative<S, F>(
  scheduler: &dyn Scheduler,
  state: S,
  due: Duration,
  action: F,
) -> Arc<dyn Disposable>
where
  S: Send + 'static,
  F: FnOnce(S) + Send + 'static,
{
  scheduler.schedule_relative(due, Task::new(move || action(state)))
}

impl Scheduler for TimerWorker {
  fn schedule_relative(&self, due: Duration, task: Task) -> Arc<dyn Disposable> {
    self.submit(due, task)
  }
}

lazy_static! {
  static ref RUNTIME: TimerWorker = TimerWorkerBuilder::named("runtime").build();
}

/// Schedules on a process-wide timer worker shared by every runtime scheduler
pub struct Runtime;

impl Scheduler for Runtime {
  fn schedule_relative(&self, due: Duration, task: Task) -> Arc<dyn Disposable> {
    RUNTIME.submit(due, task)
  }
}

/// Runs immediate work inline on the calling thread
///
/// Delayed work is handed to the runtime worker, running it inline would have
/// it fire before `schedule_relative` even returns. Inline work returns an
/// already disposed handle since nothing is left to cancel.
pub struct Blocking;

impl Scheduler for Blocking {
  fn schedule_relative(&self, due: Duration, task: Task) -> Arc<dyn Disposable> {
    if due > Duration::from_secs(0) {
      return RUNTIME.submit(due, task);
    }
    task.invoke();
    disposable::nop()
  }
}

pub fn default_scheduler() -> Arc<dyn Scheduler> {
  Arc::new(Runtime)
}

pub fn make_scheduler(
  name: String,
  id: usize,
  strategy: SchedulerType,
) -> Arc<dyn Scheduler> {
  match strategy {
    SchedulerType::Worker => {
      Arc::new(TimerWorkerBuilder::named(format!("{}{}", name, id)).build())
    }
    SchedulerType::Runtime => Arc::new(Runtime),
    SchedulerType::Blocking => Arc::new(Blocking),
  }
}

#[derive(Default)]
struct VirtualState {
  clock: Duration,
  sequence: usize,
  queue: BinaryHeap<Reverse<ScheduledTask<Duration>>>,
}

/// A scheduler running on a virtual clock which only moves when told to
///
/// Tasks run on the thread calling [advance_to](Self::advance_to), ordered by
/// due time then by scheduling order. A task scheduled while advancing runs in
/// the same advance if it falls due before the target.
///
/// # Example
/// ```
/// use backbeat::event::scheduler::{schedule_relative, VirtualTimeScheduler};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::time::Duration;
///
/// let scheduler = VirtualTimeScheduler::new();
/// let fired = Arc::new(AtomicBool::new(false));
/// schedule_relative(&scheduler, fired.clone(), Duration::from_secs(5), |fired| {
///   fired.store(true, Ordering::Relaxed);
/// });
/// scheduler.advance_by(Duration::from_secs(4));
/// assert!(!fired.load(Ordering::Relaxed));
/// scheduler.advance_by(Duration::from_secs(1));
/// assert!(fired.load(Ordering::Relaxed));
/// ```
#[derive(Default)]
pub struct VirtualTimeScheduler {
  state: Mutex<VirtualState>,
}

impl VirtualTimeScheduler {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, VirtualState> {
    match self.state.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    }
  }

  pub fn now(&self) -> Duration {
    self.lock().clock
  }

  /// Number of scheduled tasks which are neither run nor cancelled
  pub fn pending(&self) -> usize {
    self
      .lock()
      .queue
      .iter()
      .filter(|Reverse(task)| !task.cancelled())
      .count()
  }

  pub fn advance_by(&self, duration: Duration) {
    let target = self.now().checked_add(duration).unwrap_or(Duration::MAX);
    self.advance_to(target);
  }

  pub fn advance_to(&self, target: Duration) {
    loop {
      let next = {
        let mut state = self.lock();
        match state.queue.peek().map(|Reverse(task)| task.due) {
          Some(due) if due <= target => {
            if due > state.clock {
              state.clock = due;
            }
            state.queue.pop()
          }
          _ => None,
        }
      };
      match next {
        Some(Reverse(task)) => {
          task.run();
        }
        None => break,
      }
    }
    let mut state = self.lock();
    if target > state.clock {
      state.clock = target;
    }
  }
}

impl Scheduler for VirtualTimeScheduler {
  fn schedule_relative(&self, due: Duration, task: Task) -> Arc<dyn Disposable> {
    let mut state = self.lock();
    let deadline = match state.clock.checked_add(due) {
      Some(deadline) => deadline,
      None => {
        debug!("virtual task never due, dropped");
        return Arc::new(BooleanDisposable::new());
      }
    };
    let sequence = state.sequence;
    state.sequence += 1;
    let scheduled = ScheduledTask::new(deadline, sequence, task);
    let token = scheduled.token.clone();
    debug!("virtual task scheduled at {:?}", scheduled.due);
    state.queue.push(Reverse(scheduled));
    token
  }
}
