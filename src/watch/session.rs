// src/watch/session.rs

//! The polling session: a background loop that sweeps the watch set on a
//! fixed interval and reports changes.
//!
//! The loop is a small state machine:
//!
//! - **Armed**: waiting on the exit signal, a replacement watch set, or the
//!   timer (checked in that order).
//! - **Sweeping**: runs one sweep on the blocking pool, sends the result if
//!   anything changed, then rearms the timer for a full interval. While the
//!   send waits on the consumer, exit and watch set updates are still
//!   accepted.
//! - **Exited**: reached only through [`Session::stop`] (or by dropping every
//!   handle to the session).
//!
//! A replacement watch set received mid-sweep is applied on the next tick;
//! an in-flight sweep is never interrupted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::hash::{default_workers, FileHashes};
use crate::watch::sweep::{Sweeper, WatchResult};

/// Tuning knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Time between the end of one sweep and the start of the next.
    pub poll_interval: Duration,
    /// Number of hashing workers per sweep.
    pub workers: usize,
    /// How many undelivered results may queue before the loop waits for
    /// the consumer. `1` is the closest to a rendezvous channel.
    pub notify_capacity: usize,
}

impl WatchOptions {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            workers: default_workers(),
            notify_capacity: 1,
        }
    }
}

/// Start watching `files`, polling every `poll_interval`.
///
/// The first sweep happens one full interval after this call. Must be
/// called from within a Tokio runtime.
pub fn watch<I, S>(poll_interval: Duration, files: I) -> Session
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    watch_with(
        WatchOptions::new(poll_interval),
        files,
        Arc::new(RealFileSystem),
    )
}

/// Like [`watch`], with explicit options and filesystem.
pub fn watch_with<I, S>(options: WatchOptions, files: I, fs: Arc<dyn FileSystem>) -> Session
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let files: Vec<String> = files.into_iter().map(Into::into).collect();
    let sweeper = Sweeper::new(fs, options.workers);

    let (notify_tx, notify_rx) = mpsc::channel::<WatchResult>(options.notify_capacity.max(1));
    let (update_tx, update_rx) = mpsc::channel::<Vec<String>>(1);
    let (exit_tx, exit_rx) = oneshot::channel::<()>();

    info!(
        interval_ms = options.poll_interval.as_millis() as u64,
        files = files.len(),
        workers = sweeper.workers(),
        "watch session started"
    );

    tokio::spawn(run_loop(SessionLoop {
        sweeper: sweeper.clone(),
        interval: options.poll_interval,
        files,
        updates: update_rx,
        exit: exit_rx,
        notify: notify_tx,
    }));

    Session {
        handle: SessionHandle {
            control: Arc::new(Control {
                closed: AtomicBool::new(false),
                channels: Mutex::new(ControlChannels {
                    exit: Some(exit_tx),
                    updates: update_tx,
                }),
            }),
            sweeper,
        },
        notifications: notify_rx,
    }
}

/// A running watch session.
///
/// Owns the notification stream. Use [`Session::handle`] to update or stop
/// the session from other tasks.
#[derive(Debug)]
pub struct Session {
    handle: SessionHandle,
    notifications: mpsc::Receiver<WatchResult>,
}

impl Session {
    /// Cloneable control handle for this session.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Wait for the next detected change.
    ///
    /// Returns `None` once the session has stopped and every queued result
    /// has been received.
    pub async fn recv(&mut self) -> Option<WatchResult> {
        self.notifications.recv().await
    }

    /// Direct access to the notification channel.
    pub fn notifications(&mut self) -> &mut mpsc::Receiver<WatchResult> {
        &mut self.notifications
    }

    /// See [`SessionHandle::update_set`].
    pub async fn update_set<I, S>(&self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handle.update_set(files).await
    }

    /// See [`SessionHandle::stop`].
    pub async fn stop(&self) {
        self.handle.stop().await
    }

    pub fn current_hashes(&self) -> Arc<FileHashes> {
        self.handle.current_hashes()
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_stopped()
    }
}

/// Control side of a [`Session`]; safe to clone and use concurrently.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    control: Arc<Control>,
    sweeper: Sweeper,
}

#[derive(Debug)]
struct Control {
    closed: AtomicBool,
    /// Serializes `stop` / `update_set` callers.
    channels: Mutex<ControlChannels>,
}

#[derive(Debug)]
struct ControlChannels {
    exit: Option<oneshot::Sender<()>>,
    updates: mpsc::Sender<Vec<String>>,
}

impl SessionHandle {
    /// Replace the watched file list, effective from the next sweep.
    ///
    /// Waits until the loop has room for the update. No-op once the
    /// session is stopped.
    pub async fn update_set<I, S>(&self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels = self.control.channels.lock().await;
        if self.control.closed.load(Ordering::SeqCst) {
            debug!("session stopped; dropping watch set update");
            return;
        }

        let files: Vec<String> = files.into_iter().map(Into::into).collect();
        if channels.updates.send(files).await.is_err() {
            debug!("watch loop already exited; dropping watch set update");
        }
    }

    /// Request termination of the session.
    ///
    /// Idempotent. Does not wait for an in-flight sweep; the loop observes
    /// the request once it is back to waiting for its next event.
    pub async fn stop(&self) {
        let mut channels = self.control.channels.lock().await;
        if self.control.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(exit) = channels.exit.take() {
            if exit.send(()).is_err() {
                debug!("watch loop already exited before stop");
            }
        }
        info!("watch session stopped");
    }

    /// The hash map published by the most recent sweep.
    pub fn current_hashes(&self) -> Arc<FileHashes> {
        self.sweeper.current()
    }

    pub fn is_stopped(&self) -> bool {
        self.control.closed.load(Ordering::SeqCst)
    }
}

struct SessionLoop {
    sweeper: Sweeper,
    interval: Duration,
    files: Vec<String>,
    updates: mpsc::Receiver<Vec<String>>,
    exit: oneshot::Receiver<()>,
    notify: mpsc::Sender<WatchResult>,
}

async fn run_loop(state: SessionLoop) {
    let SessionLoop {
        sweeper,
        interval,
        mut files,
        mut updates,
        mut exit,
        notify,
    } = state;

    let timer = sleep(interval);
    tokio::pin!(timer);

    'session: loop {
        tokio::select! {
            biased;

            _ = &mut exit => {
                debug!("exit signal received");
                break;
            }

            Some(next) = updates.recv() => {
                debug!(files = next.len(), "watch set replaced");
                files = next;
            }

            () = &mut timer => {
                if let Some(result) = sweep_once(&sweeper, &files).await {
                    debug!(changed = result.changed_paths().len(), "change detected; notifying");

                    // Exit and updates stay live while the consumer is slow.
                    let send = notify.send(result);
                    tokio::pin!(send);
                    loop {
                        tokio::select! {
                            biased;

                            _ = &mut exit => {
                                debug!("exit signal received while notifying");
                                break 'session;
                            }

                            Some(next) = updates.recv() => {
                                debug!(files = next.len(), "watch set replaced while notifying");
                                files = next;
                            }

                            sent = &mut send => {
                                if sent.is_err() {
                                    debug!("notification receiver dropped");
                                    break 'session;
                                }
                                break;
                            }
                        }
                    }
                }
                timer.as_mut().reset(Instant::now() + interval);
            }
        }
    }

    debug!("watch loop exited");
}

/// Run one sweep on the blocking pool.
async fn sweep_once(sweeper: &Sweeper, files: &[String]) -> Option<WatchResult> {
    let sweeper = sweeper.clone();
    let files = files.to_vec();

    match tokio::task::spawn_blocking(move || sweeper.sweep(&files)).await {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "sweep task failed; skipping this tick");
            None
        }
    }
}
