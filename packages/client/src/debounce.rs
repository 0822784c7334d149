//! Trailing-edge debouncer.
//!
//! Each [`Debouncer`] owns a small actor task. `schedule` replaces the pending
//! payload and restarts the quiet window; when the window elapses without a
//! new payload, the latest one is handed to the flush function. Flushes run
//! one at a time, in schedule order.

use std::{future::Future, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep_until},
};

enum Command<T> {
    Schedule(T),
    Cancel,
}

pub struct Debouncer<T> {
    window: Duration,
    tx: mpsc::UnboundedSender<Command<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debouncer on the current runtime.
    pub fn spawn<F, Fut>(window: Duration, flush: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(window, rx, flush));
        Self { window, tx, task }
    }

    pub fn schedule(&self, payload: T) {
        if self.tx.send(Command::Schedule(payload)).is_err() {
            tracing::debug!("Debouncer already stopped, payload dropped");
        }
    }

    /// Drop the pending payload, if any. A flush already running is not interrupted.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T, F, Fut>(window: Duration, mut rx: mpsc::UnboundedReceiver<Command<T>>, flush: F)
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<(T, Instant)> = None;

    loop {
        let deadline = pending.as_ref().map(|(_, deadline)| *deadline);

        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Schedule(payload)) => {
                    pending = Some((payload, Instant::now() + window));
                }
                Some(Command::Cancel) => {
                    pending = None;
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some((payload, _)) = pending.take() {
                    flush(payload).await;
                }
            }
        }
    }
}
