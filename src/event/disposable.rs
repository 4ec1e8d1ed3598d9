use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A handle to a cancellable resource such as a subscription or a pending
/// timer
///
/// - Disposing is idempotent, the resource is released by the first call and
///   every following call is a no-op.
/// - Disposing never fails observably, it is a cleanup path.
pub trait Disposable: Send + Sync {
  fn dispose(&self);
}

/// A disposable which can report whether it has been disposed
pub trait Cancelable: Disposable {
  fn is_disposed(&self) -> bool;
}

/// A disposable which only tracks its disposed state
#[derive(Default)]
pub struct BooleanDisposable {
  disposed: AtomicBool,
}

impl BooleanDisposable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn disposed() -> Self {
    BooleanDisposable {
      disposed: AtomicBool::new(true),
    }
  }
}

impl Disposable for BooleanDisposable {
  fn dispose(&self) {
    self.disposed.store(true, Ordering::Release);
  }
}

impl Cancelable for BooleanDisposable {
  fn is_disposed(&self) -> bool {
    self.disposed.load(Ordering::Acquire)
  }
}

type DisposeFn = dyn FnOnce() + Send;

/// A disposable which runs an action the first time it is disposed
pub struct AnonymousDisposable {
  action: Mutex<Option<Box<DisposeFn>>>,
  disposed: AtomicBool,
}

impl AnonymousDisposable {
  pub fn new<F>(action: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    AnonymousDisposable {
      action: Mutex::new(Some(Box::new(action))),
      disposed: AtomicBool::new(false),
    }
  }
}

impl Disposable for AnonymousDisposable {
  fn dispose(&self) {
    if !self.disposed.swap(true, Ordering::AcqRel) {
      let action = match self.action.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
      };
      if let Some(action) = action {
        action();
      }
    }
  }
}

impl Cancelable for AnonymousDisposable {
  fn is_disposed(&self) -> bool {
    self.disposed.load(Ordering::Acquire)
  }
}

/// A group of disposables which are disposed together
///
/// Members are disposed exactly once each, in insertion order. Inserting into
/// an already disposed composite disposes the newcomer immediately.
pub struct CompositeDisposable {
  members: Mutex<Option<Vec<Arc<dyn Disposable>>>>,
}

impl CompositeDisposable {
  pub fn new(members: Vec<Arc<dyn Disposable>>) -> Self {
    CompositeDisposable {
      members: Mutex::new(Some(members)),
    }
  }

  pub fn insert(&self, disposable: Arc<dyn Disposable>) {
    let rejected = {
      let mut guard = match self.members.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
      };
      match guard.as_mut() {
        Some(members) => {
          members.push(disposable);
          None
        }
        None => Some(disposable),
      }
    };
    if let Some(disposable) = rejected {
      disposable.dispose();
    }
  }

  pub fn len(&self) -> usize {
    match self.members.lock() {
      Ok(guard) => guard.as_ref().map_or(0, |members| members.len()),
      Err(poisoned) => {
        poisoned.into_inner().as_ref().map_or(0, |members| members.len())
      }
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for CompositeDisposable {
  fn default() -> Self {
    Self::new(Vec::new())
  }
}

impl Disposable for CompositeDisposable {
  fn dispose(&self) {
    // Members are taken out before disposing so a member may call back into
    // this composite without deadlocking.
    let members = match self.members.lock() {
      Ok(mut guard) => guard.take(),
      Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(members) = members {
      for member in members.iter() {
        member.dispose();
      }
    }
  }
}

impl Cancelable for CompositeDisposable {
  fn is_disposed(&self) -> bool {
    match self.members.lock() {
      Ok(guard) => guard.is_none(),
      Err(poisoned) => poisoned.into_inner().is_none(),
    }
  }
}

/// Builds a composite disposing every member of `members`
pub fn create(members: Vec<Arc<dyn Disposable>>) -> Arc<CompositeDisposable> {
  Arc::new(CompositeDisposable::new(members))
}

/// Builds a disposable running `action` on first disposal
pub fn from_fn<F>(action: F) -> Arc<AnonymousDisposable>
where
  F: FnOnce() + Send + 'static,
{
  Arc::new(AnonymousDisposable::new(action))
}

/// A disposable holding no resource
pub fn nop() -> Arc<BooleanDisposable> {
  Arc::new(BooleanDisposable::disposed())
}
