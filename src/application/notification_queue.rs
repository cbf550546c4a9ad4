//! In-process notification queue.
//!
//! Producers (order and user services) enqueue jobs after their row is
//! committed and return immediately. A background worker delivers each job on
//! its own task, retrying transient failures with exponential backoff. A job
//! that still fails is logged and dropped; nothing flows back to the caller.

use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::config::RetryPolicy;
use crate::domain::errors::DeliveryError;
use crate::domain::notification::NotificationJob;
use crate::domain::ports::{Mailer, MessagingClient};

#[derive(Clone)]
pub struct NotificationQueue {
    tx: UnboundedSender<NotificationJob>,
}

impl NotificationQueue {
    /// Creates a queue without a worker. The receiver is handed to the caller.
    pub fn channel() -> (Self, UnboundedReceiver<NotificationJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Creates a queue and spawns `worker` to drain it. Must be called inside a
    /// Tokio runtime.
    pub fn start(worker: NotificationWorker) -> (Self, JoinHandle<()>) {
        let (queue, rx) = Self::channel();
        let handle = tokio::spawn(worker.run(rx));
        (queue, handle)
    }

    pub fn enqueue(&self, job: NotificationJob) {
        let channel = job.channel();
        let recipient = job.recipient().to_string();
        if self.tx.send(job).is_err() {
            error!(
                "Notification queue is closed; dropped {} notification for {}",
                channel, recipient
            );
        }
    }
}

/// Outcome of delivering a single job, including retries.
#[derive(Debug)]
pub struct DeliveryReport {
    pub attempts: u32,
    pub result: Result<(), DeliveryError>,
}

#[derive(Clone)]
pub struct NotificationWorker {
    mailer: Arc<dyn Mailer>,
    messenger: Arc<dyn MessagingClient>,
    policy: RetryPolicy,
}

impl NotificationWorker {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        messenger: Arc<dyn MessagingClient>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            mailer,
            messenger,
            policy,
        }
    }

    pub async fn run(self, mut rx: UnboundedReceiver<NotificationJob>) {
        let worker = Arc::new(self);
        while let Some(job) = rx.recv().await {
            let worker = Arc::clone(&worker);
            tokio::spawn(async move {
                worker.deliver(job).await;
            });
        }
        info!("Notification queue closed; worker stopped");
    }

    pub async fn deliver(&self, job: NotificationJob) -> DeliveryReport {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(&job).await {
                Ok(()) => {
                    info!(
                        "Sent {} notification to {} (attempt {})",
                        job.channel(),
                        job.recipient(),
                        attempt
                    );
                    return DeliveryReport {
                        attempts: attempt,
                        result: Ok(()),
                    };
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        "{} notification to {} failed (attempt {}/{}): {}; retrying in {:?}",
                        job.channel(),
                        job.recipient(),
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        "Giving up on {} notification to {} after {} attempt(s): {}",
                        job.channel(),
                        job.recipient(),
                        attempt,
                        e
                    );
                    return DeliveryReport {
                        attempts: attempt,
                        result: Err(e),
                    };
                }
            }
        }
    }

    async fn attempt(&self, job: &NotificationJob) -> Result<(), DeliveryError> {
        match job {
            NotificationJob::Email(email) => self.mailer.send(email).await,
            NotificationJob::WhatsApp { to, body } => self.messenger.send_whatsapp(to, body).await,
        }
    }
}
