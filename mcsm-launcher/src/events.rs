//! Message passing between background jobs and the presentation thread.
//!
//! Workers never call into presentation code directly. They hold an
//! [`EventSender`] (a [`ProgressSink`]) and, for restores, a
//! [`ChannelPrompt`] (an [`OverwritePrompt`]). The presentation thread owns
//! the [`EventReceiver`] and drains it either with `blocking_recv` or from
//! an async event loop.
//!
//! ```ignore
//! let (tx, mut rx) = events::channel();
//! jobs::spawn_backup(source, archive, tx);
//! while let Some(event) = rx.blocking_recv() {
//!     match event {
//!         Event::Progress { percent, message } => println!("{percent}% {message}"),
//!         Event::Completed(_) | Event::Failed { .. } => break,
//!         Event::OverwriteRequested(request) => request.respond(false),
//!     }
//! }
//! ```

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::manager::{ErrorKind, JobResult, OverwritePrompt, ProgressSink};
use crate::saves::ConflictSet;

/// Something a background job wants the presentation thread to know.
#[derive(Debug)]
pub enum Event {
    /// Percentage and status line.
    Progress { percent: u8, message: String },
    /// The job finished successfully.
    Completed(JobResult),
    /// The job failed.
    Failed { kind: ErrorKind, message: String },
    /// The job is blocked until this request is answered.
    OverwriteRequested(OverwriteRequest),
}

/// Receiving half of the event channel.
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Create a connected sender/receiver pair.
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

/// Sending half of the event channel.
///
/// Cloneable and usable from plain threads. Sends after the receiver is gone
/// are dropped silently.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Send an event, ignoring a closed channel.
    pub fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }

    /// A prompt that asks over this channel.
    pub fn prompt(&self) -> ChannelPrompt {
        ChannelPrompt {
            events: self.clone(),
        }
    }
}

impl ProgressSink for EventSender {
    fn on_progress(&self, percent: u8, message: &str) {
        self.send(Event::Progress {
            percent,
            message: message.to_string(),
        });
    }

    fn on_complete(&self, result: JobResult) {
        self.send(Event::Completed(result));
    }

    fn on_error(&self, kind: ErrorKind, message: &str) {
        self.send(Event::Failed {
            kind,
            message: message.to_string(),
        });
    }
}

/// A pending overwrite decision.
///
/// Answer it exactly once with [`respond`](Self::respond). Dropping it
/// unanswered declines.
#[derive(Debug)]
pub struct OverwriteRequest {
    conflicts: ConflictSet,
    reply: oneshot::Sender<bool>,
}

impl OverwriteRequest {
    /// The files that would be overwritten.
    pub fn conflicts(&self) -> &ConflictSet {
        &self.conflicts
    }

    /// Send the decision back to the waiting worker.
    pub fn respond(self, allow: bool) {
        if self.reply.send(allow).is_err() {
            warn!("Worker stopped waiting for the overwrite decision");
        }
    }
}

/// [`OverwritePrompt`] that forwards the question through the event channel
/// and blocks the calling worker until it is answered.
///
/// Must not be called from inside an async runtime.
#[derive(Debug, Clone)]
pub struct ChannelPrompt {
    events: EventSender,
}

impl OverwritePrompt for ChannelPrompt {
    fn ask_overwrite(&self, conflicts: &ConflictSet) -> bool {
        let (reply, answer) = oneshot::channel();
        self.events.send(Event::OverwriteRequested(OverwriteRequest {
            conflicts: conflicts.clone(),
            reply,
        }));

        match answer.blocking_recv() {
            Ok(allow) => allow,
            Err(_) => {
                debug!("Overwrite request dropped unanswered, declining");
                false
            }
        }
    }
}
