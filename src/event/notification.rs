use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Errors originated by backbeat itself
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
  #[error("object `{0}` was already disposed")]
  Disposed(String),
}

/// The opaque error value carried by [Event::Error]
///
/// Any error converts into an `EventError`, the [anyhow::Error] inside is
/// shared between clones so forwarding an error never copies or rewraps it.
/// Two event errors are equal only if they are the same error instance.
#[derive(Clone)]
pub struct EventError(Arc<anyhow::Error>);

impl EventError {
  pub fn new<E>(error: E) -> Self
  where
    E: Into<anyhow::Error>,
  {
    EventError(Arc::new(error.into()))
  }

  pub fn msg<S: Into<String>>(message: S) -> Self {
    let message: String = message.into();
    EventError(Arc::new(anyhow::anyhow!(message)))
  }

  pub fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
    &**self.0
  }

  pub fn downcast_ref<E>(&self) -> Option<&E>
  where
    E: Display + Debug + Send + Sync + 'static,
  {
    self.0.downcast_ref::<E>()
  }
}

impl<E> From<E> for EventError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(error: E) -> Self {
    Self::new(error)
  }
}

impl PartialEq for EventError {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Display for EventError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    Display::fmt(&self.0, f)
  }
}

impl Debug for EventError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "EventError({:?})", self.0)
  }
}

/// A single occurrence in an event sequence
///
/// `Error` and `Completed` are terminal: once one of them has been observed on
/// a subscription nothing else follows it.
#[derive(Clone, Debug, PartialEq)]
pub enum Event<T> {
  Next(T),
  Error(EventError),
  Completed,
}

impl<T> Event<T> {
  pub fn is_stop_event(&self) -> bool {
    !matches!(self, Event::Next(_))
  }

  pub fn element(&self) -> Option<&T> {
    match self {
      Event::Next(value) => Some(value),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&EventError> {
    match self {
      Event::Error(error) => Some(error),
      _ => None,
    }
  }

  pub fn map<B, F>(self, map: F) -> Event<B>
  where
    F: FnOnce(T) -> B,
  {
    match self {
      Event::Next(value) => Event::Next(map(value)),
      Event::Error(error) => Event::Error(error),
      Event::Completed => Event::Completed,
    }
  }
}

impl<T> Display for Event<T>
where
  T: Debug,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Event::Next(value) => write!(f, "next({:?})", value),
      Event::Error(error) => write!(f, "error({})", error),
      Event::Completed => write!(f, "completed"),
    }
  }
}

/// A value that reifies an [Event], this is what a materialized sequence is
/// made of and what [dematerialize](super::ops::Dematerialize) unwraps
pub trait EventConvertible {
  type Value;

  fn event(&self) -> &Event<Self::Value>;
  fn into_event(self) -> Event<Self::Value>;

  fn is_stop_event(&self) -> bool {
    self.event().is_stop_event()
  }
}

impl<T> EventConvertible for Event<T> {
  type Value = T;

  fn event(&self) -> &Event<T> {
    self
  }

  fn into_event(self) -> Event<T> {
    self
  }
}
