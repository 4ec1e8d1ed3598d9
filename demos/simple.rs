//! A simple example of what backbeat has to offer

use backbeat::event::ops::*;
use backbeat::event::scheduler::default_scheduler;
use backbeat::event::subject::{BasicSubject, Subject};
use backbeat::event::Event;

use std::time::Duration;

#[derive(Debug, Clone)]
enum Reading {
  Warmup(i32),
  Sample(i32),
}

impl std::fmt::Display for Reading {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Warmup(value) => write!(f, "warmup reading '{}'", value),
      Self::Sample(value) => write!(f, "sample reading '{}'", value),
    }
  }
}

fn main() {
  let sensor = BasicSubject::<Reading>::new();
  // Readings in the first 100ms are the sensor warming up, the first
  // reading after that is a calibration value.
  let rx = sensor
    .observe()
    .skip_for(Duration::from_millis(100), default_scheduler())
    .skip(1)
    .materialize()
    .collect();
  for i in 0..3 {
    sensor.next(Reading::Warmup(i));
  }
  std::thread::sleep(Duration::from_millis(150));
  for i in 0..4 {
    sensor.next(Reading::Sample(i));
  }
  sensor.complete();
  for event in rx.recv().unwrap() {
    match event {
      Event::Next(Event::Next(reading)) => println!("{}", reading),
      Event::Next(stop) => println!("sensor stopped: {:?}", stop),
      Event::Error(error) => println!("error: {}", error),
      Event::Completed => println!("done"),
    }
  }
}
