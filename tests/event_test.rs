use backbeat::event::ops::*;
use backbeat::event::scheduler::{SchedulerType, VirtualTimeScheduler};
use backbeat::event::sources;
use backbeat::event::subject::{BasicSubject, BasicSubjectBuilder, Subject};
use backbeat::event::{Event, EventError};
use backbeat::utils::testing;

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[test]
fn simple_event_test() {
  println!("START simple_event_test");
  testing::async_context(|| {
    let basic = BasicSubject::new();
    let finalize = Arc::new(AtomicBool::new(false));
    let (tx, rx) = std::sync::mpsc::channel();
    let tx = Mutex::new(tx);
    {
      let cloned = finalize.clone();
      let _subscription = basic
        .observe()
        .subscribe_next(move |x| {
          tx.lock().unwrap().send(x).unwrap();
        })
        .finalize(move || {
          cloned.store(true, Ordering::Relaxed);
        });
      basic.next("test".to_owned());
      assert_eq!(rx.recv().unwrap(), "test");
      assert_eq!(finalize.load(Ordering::Relaxed), false);
    }
    assert_eq!(finalize.load(Ordering::Relaxed), true);
  });
  println!("END simple_event_test");
}

#[test]
fn skip_of_test() {
  println!("START skip_of_test");
  testing::async_context(|| {
    let sum = Arc::new(AtomicI32::new(0));
    let subscribe_sum = sum.clone();
    let finalize_sum = sum.clone();
    let (tx, rx) = std::sync::mpsc::channel();
    let tx = Mutex::new(tx);
    let _subscription = sources::of(vec![1, 2, 3, 4, 5])
      .skip(2)
      .subscribe_next(move |x| {
        subscribe_sum.fetch_add(x, Ordering::Relaxed);
      })
      .finalize(move || {
        tx.lock()
          .unwrap()
          .send(finalize_sum.load(Ordering::Relaxed))
          .unwrap();
      });
    assert_eq!(rx.recv().unwrap(), 12);
  });
  println!("END skip_of_test");
}

#[test]
fn skip_chain_test() {
  println!("START skip_chain_test");
  testing::async_context(|| {
    let subject = BasicSubject::new();
    let rx = subject.observe().skip(1).skip(1).collect();
    for i in 0..5 {
      subject.next(i);
    }
    subject.complete();
    assert_eq!(
      rx.recv().unwrap(),
      [Event::Next(2), Event::Next(3), Event::Next(4), Event::Completed]
    );
  });
  println!("END skip_chain_test");
}

#[test]
fn terminal_once_test() {
  println!("START terminal_once_test");
  testing::async_context(|| {
    let error = EventError::msg("first");
    let subject = BasicSubject::new();
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let chains = vec![
      subject.observe().skip(1),
      subject.observe().skip_for(Duration::from_secs(0), scheduler.clone()),
      subject.observe().materialize().dematerialize(),
    ];
    let receivers: Vec<_> = chains.iter().map(|chain| chain.collect()).collect();
    scheduler.advance_by(Duration::from_secs(0));
    subject.next(1);
    subject.next(2);
    subject.error(error.clone());
    subject.complete();
    for rx in receivers {
      let events = rx.recv().unwrap();
      let stops = events.iter().filter(|x| x.is_stop_event()).count();
      assert_eq!(stops, 1);
      assert_eq!(events.last(), Some(&Event::Error(error.clone())));
    }
  });
  println!("END terminal_once_test");
}

#[test]
fn dematerialize_inner_stop_test() {
  println!("START dematerialize_inner_stop_test");
  testing::async_context(|| {
    let subject = BasicSubject::new();
    let rx = subject.observe().dematerialize().collect();
    subject.next(Event::Next("a"));
    subject.next(Event::Completed);
    assert_eq!(subject.observer_count(), 0);
    subject.next(Event::Next("b"));
    assert_eq!(rx.recv().unwrap(), [Event::Next("a"), Event::Completed]);
  });
  println!("END dematerialize_inner_stop_test");
}

#[test]
fn skip_for_worker_test() {
  println!("START skip_for_worker_test");
  testing::async_context(|| {
    let scheduler = backbeat::event::scheduler::make_scheduler(
      "skip".to_owned(),
      0,
      SchedulerType::Worker,
    );
    let subject = BasicSubjectBuilder::new()
      .scheduler(SchedulerType::Blocking)
      .build();
    let rx = subject
      .observe()
      .skip_for(Duration::from_millis(50), scheduler)
      .collect();
    subject.next(1);
    std::thread::sleep(Duration::from_millis(200));
    subject.next(2);
    subject.complete();
    assert_eq!(rx.recv().unwrap(), [Event::Next(2), Event::Completed]);
  });
  println!("END skip_for_worker_test");
}

#[test]
fn skip_for_runtime_subject_test() {
  println!("START skip_for_runtime_subject_test");
  testing::async_context(|| {
    let subject = BasicSubjectBuilder::new()
      .scheduler(SchedulerType::Runtime)
      .build();
    let rx = subject
      .observe()
      .skip_for(
        Duration::from_secs(0),
        backbeat::event::scheduler::default_scheduler(),
      )
      .skip(1)
      .collect();
    std::thread::sleep(Duration::from_millis(50));
    subject.next(1);
    subject.next(2);
    subject.complete();
    assert_eq!(rx.recv().unwrap(), [Event::Next(2), Event::Completed]);
  });
  println!("END skip_for_runtime_subject_test");
}
