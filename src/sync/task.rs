use crate::event::disposable::{BooleanDisposable, Cancelable};

use std::cmp::Ordering;
use std::sync::Arc;

type TaskFn = dyn FnOnce() + Send;

/// A unit of work run at most once
pub struct Task {
  func: Box<TaskFn>,
}

impl Task {
  pub fn new<F>(func: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    Task {
      func: Box::new(func),
    }
  }

  pub fn invoke(self) {
    (self.func)()
  }
}

/// A task waiting in a timer queue until `due`
///
/// Ordering is by `due` then by submission `sequence` so tasks due at the same
/// time run in the order they were scheduled. The `token` is handed out to
/// the scheduling caller, disposing it cancels the task.
pub(crate) struct ScheduledTask<K> {
  pub(crate) due: K,
  pub(crate) sequence: usize,
  pub(crate) task: Task,
  pub(crate) token: Arc<BooleanDisposable>,
}

impl<K> ScheduledTask<K> {
  pub(crate) fn new(due: K, sequence: usize, task: Task) -> Self {
    ScheduledTask {
      due,
      sequence,
      task,
      token: Arc::new(BooleanDisposable::new()),
    }
  }

  pub(crate) fn cancelled(&self) -> bool {
    self.token.is_disposed()
  }

  /// Runs the task unless it was cancelled, returns whether it ran
  pub(crate) fn run(self) -> bool {
    if self.cancelled() {
      false
    } else {
      self.task.invoke();
      true
    }
  }
}

impl<K: Ord> PartialEq for ScheduledTask<K> {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl<K: Ord> Eq for ScheduledTask<K> {}

impl<K: Ord> PartialOrd for ScheduledTask<K> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<K: Ord> Ord for ScheduledTask<K> {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .due
      .cmp(&other.due)
      .then_with(|| self.sequence.cmp(&other.sequence))
  }
}
