// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fixed-width pool of OS threads draining an unbounded FIFO task queue.
//!
//! # Architecture
//!
//! ```text
//! enqueue ──► crossbeam unbounded channel ──► worker 0..N ──► task()
//!    │                                                          │
//!    └── pending += 1                        pending -= 1 ◄─────┘
//!                                                 │
//!                              drain() waits for pending == 0
//! ```
//!
//! A task that panics is caught on the worker, logged and counted; the worker
//! keeps serving the queue and the task still counts as complete for `drain`.
//! Dropping the pool closes the channel and joins every worker after the
//! queue has emptied.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::errors::PoolError;
use crate::observability::messages::pool::{WorkerPoolStarted, WorkerTaskPanicked};
use crate::observability::messages::StructuredLog;

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn increment(&self) {
        *self.count.lock().unwrap_or_else(|e| e.into_inner()) += 1;
    }

    fn decrement(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        while *count > 0 {
            count = self.idle.wait(count).unwrap_or_else(|e| e.into_inner());
        }
    }

    fn get(&self) -> usize {
        *self.count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    pending: Arc<Pending>,
    panicked: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Spawn `threads` workers. If any spawn fails the already started
    /// workers are shut down before the error is returned.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let (sender, receiver) = unbounded::<Task>();
        let pending = Arc::new(Pending::default());
        let panicked = Arc::new(AtomicUsize::new(0));

        let mut pool = Self {
            sender: Some(sender),
            workers: Vec::with_capacity(threads),
            pending,
            panicked,
        };

        for id in 0..threads {
            let receiver = receiver.clone();
            let pending = Arc::clone(&pool.pending);
            let panicked = Arc::clone(&pool.panicked);
            let name = format!("vmaf-worker-{}", id);
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&name, receiver, pending, panicked));
            match spawned {
                Ok(handle) => pool.workers.push(handle),
                // Dropping `pool` closes the channel and joins what was started.
                Err(error) => return Err(PoolError::Spawn(error)),
            }
        }

        WorkerPoolStarted { threads }.log();
        Ok(pool)
    }

    #[cfg(test)]
    pub(crate) fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Queue `task` for execution on some worker. Never blocks.
    pub fn enqueue<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolError::Closed)?;
        self.pending.increment();
        if sender.send(Box::new(task)).is_err() {
            self.pending.decrement();
            return Err(PoolError::Closed);
        }
        Ok(())
    }

    /// Block until every task enqueued so far has finished.
    pub fn drain(&self) {
        self.pending.wait_idle();
    }

    /// Tasks queued or running.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Tasks that panicked since the pool started.
    #[cfg(test)]
    pub(crate) fn panicked(&self) -> usize {
        self.panicked.load(Ordering::SeqCst)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(name: &str, receiver: Receiver<Task>, pending: Arc<Pending>, panicked: Arc<AtomicUsize>) {
    for task in receiver.iter() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            panicked.fetch_add(1, Ordering::SeqCst);
            WorkerTaskPanicked {
                worker: name,
                reason: &panic_reason(payload.as_ref()),
            }
            .log();
        }
        pending.decrement();
    }
}

pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .field("pending", &self.pending.get())
            .finish()
    }
}
