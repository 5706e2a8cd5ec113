use std::{
  panic::{self, AssertUnwindSafe},
  sync::{mpsc, Arc, Barrier, Mutex, PoisonError},
  thread::{self, JoinHandle, ThreadId},
};

use tracing::{trace, warn};

use crate::{Error, Result};

/// A unit of work queued onto the designated thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on the one thread that is allowed to touch the wake lock.
///
/// `dispatch` must not block and must not run the task inline. Tasks run in the order they were
/// dispatched. Hosts that already own a UI loop implement this on top of it; everyone else can use
/// [`MainThread`].
pub trait Dispatcher: Send + Sync {
  fn dispatch(&self, task: Task);
}

impl<F> Dispatcher for F
where
  F: Fn(Task) + Send + Sync,
{
  fn dispatch(&self, task: Task) {
    self(task)
  }
}

/// A dedicated thread draining a FIFO work queue.
pub struct MainThread {
  queue: Mutex<Option<mpsc::Sender<Task>>>,
  thread: Option<JoinHandle<()>>,
  thread_id: ThreadId,
}

impl MainThread {
  pub fn spawn(name: &str) -> Result<Self> {
    let (queue_tx, queue_rx) = mpsc::channel::<Task>();
    let (id_tx, id_rx) = mpsc::channel();
    let barrier = Arc::new(Barrier::new(2));
    let thread_barrier = barrier.clone();

    let thread = thread::Builder::new()
      .name(name.to_owned())
      .spawn(move || run_queue(queue_rx, id_tx, thread_barrier))
      .map_err(|e| Error::Dispatch(format!("failed to spawn {name:?}: {e}")))?;

    // wait for the thread to come up before handing out the queue
    let thread_id = id_rx
      .recv()
      .map_err(|_| Error::Dispatch(format!("{name:?} exited during startup")))?;
    barrier.wait();

    Ok(Self {
      queue: Mutex::new(Some(queue_tx)),
      thread: Some(thread),
      thread_id,
    })
  }

  /// The id of the thread tasks run on.
  pub fn thread_id(&self) -> ThreadId {
    self.thread_id
  }

  /// True when called from inside a task.
  pub fn is_current(&self) -> bool {
    thread::current().id() == self.thread_id
  }
}

impl Dispatcher for MainThread {
  fn dispatch(&self, task: Task) {
    let queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
    match queue.as_ref() {
      Some(tx) => {
        if tx.send(task).is_err() {
          warn!("main thread has exited, dropping task");
        }
      }
      None => warn!("main thread is shutting down, dropping task"),
    }
  }
}

fn run_queue(queue: mpsc::Receiver<Task>, id_tx: mpsc::Sender<ThreadId>, barrier: Arc<Barrier>) {
  if id_tx.send(thread::current().id()).is_err() {
    return;
  }
  drop(id_tx);
  barrier.wait();
  drop(barrier);

  trace!("main thread started");

  // runs until every sender is gone, so queued work drains before shutdown
  for task in queue {
    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
      warn!("main thread task panicked");
    }
  }

  trace!("main thread exiting");
}

impl Drop for MainThread {
  fn drop(&mut self) {
    // closing the queue lets the thread finish what's left and return
    self
      .queue
      .get_mut()
      .unwrap_or_else(PoisonError::into_inner)
      .take();

    if let Some(thread) = self.thread.take() {
      // a task dropping the last handle can't wait on itself
      if self.is_current() {
        return;
      }
      if thread.join().is_err() {
        warn!("main thread panicked during shutdown");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn runs_tasks_in_order_on_its_own_thread() {
    let main = MainThread::spawn("test-main").expect("spawn failed");
    let main_id = main.thread_id();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for i in 0..10 {
      let seen = seen.clone();
      main.dispatch(Box::new(move || {
        assert_eq!(thread::current().id(), main_id);
        seen.lock().unwrap().push(i);
      }));
    }
    drop(main);

    assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    assert_ne!(thread::current().id(), main_id);
  }

  #[test]
  fn thread_carries_its_name() {
    let main = MainThread::spawn("named-main").expect("spawn failed");
    let (tx, rx) = mpsc::channel();
    main.dispatch(Box::new(move || {
      tx.send(thread::current().name().map(str::to_owned)).unwrap();
    }));
    assert_eq!(rx.recv().unwrap().as_deref(), Some("named-main"));
  }

  #[test]
  fn survives_a_panicking_task() {
    let main = MainThread::spawn("panicky-main").expect("spawn failed");
    let (tx, rx) = mpsc::channel();
    main.dispatch(Box::new(|| panic!("boom")));
    main.dispatch(Box::new(move || tx.send(()).unwrap()));
    rx.recv().expect("queue stopped after a panic");
  }

  #[test]
  fn closures_are_dispatchers() {
    let ran = Arc::new(Mutex::new(false));
    let inline = |task: Task| task();
    let flag = ran.clone();
    inline.dispatch(Box::new(move || *flag.lock().unwrap() = true));
    assert!(*ran.lock().unwrap());
  }
}
