//! Fixed-size pool of OS threads pulling jobs from a shared queue.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

pub(crate) struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `size` threads. Fails if `size` is 0.
    pub(crate) fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidPoolSize(size));
        }
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let mut workers = Vec::with_capacity(size);
        for i in 0..size {
            let receiver = Arc::clone(&receiver);
            let worker = thread::Builder::new()
                .name(format!("imgdl-worker-{i}"))
                .spawn(move || work(&receiver))
                .map_err(Error::Spawn)?;
            workers.push(worker);
        }
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    pub(crate) fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues `job`; never blocks.
    pub(crate) fn execute(&self, job: Job) {
        if let Some(sender) = &self.sender {
            // Send only fails once every worker is gone; the job is dropped then.
            if sender.send(job).is_err() {
                tracing::error!("worker pool has no live threads; job dropped");
            }
        }
    }
}

fn work(receiver: &Mutex<Receiver<Job>>) {
    loop {
        // The queue lock is released before the job runs.
        let next = receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();
        match next {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}

impl Drop for WorkerPool {
    /// Closes the queue and joins every thread once it drained.
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
    }
}
