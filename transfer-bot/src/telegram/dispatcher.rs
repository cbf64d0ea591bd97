//! Long-polling loop that feeds chat messages to the command handler.
//!
//! Each chat gets its own worker task with a mailbox: commands from one chat
//! run one at a time in the order Telegram delivered them, while different
//! chats proceed in parallel. Every command produces exactly one reply.
//!
//! A worker that sits idle for `WORKER_IDLE_TIMEOUT` closes its mailbox and
//! exits. The next command for that chat starts a fresh worker, which waits
//! for its predecessor to finish before handling anything.

use super::{Command, TelegramClient, TelegramError, Update, User};
use crate::handlers::CommandHandler;
use crate::models::ChatId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);
pub const WORKER_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

struct Job {
    sender: Option<User>,
    command: Command,
}

struct Mailbox {
    jobs: mpsc::UnboundedSender<Job>,
    worker: JoinHandle<()>,
}

pub struct Dispatcher {
    client: TelegramClient,
    handler: CommandHandler,
    poll_timeout_secs: u64,
    idle_timeout: Duration,
    offset: Option<i64>,
    mailboxes: HashMap<ChatId, Mailbox>,
}

impl Dispatcher {
    pub fn new(client: TelegramClient, handler: CommandHandler, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            handler,
            poll_timeout_secs,
            idle_timeout: WORKER_IDLE_TIMEOUT,
            offset: None,
            mailboxes: HashMap::new(),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Number of chats with a live worker. Forgets workers that have exited.
    pub fn active_workers(&mut self) -> usize {
        self.mailboxes.retain(|_, mailbox| !mailbox.worker.is_finished());
        self.mailboxes.len()
    }

    /// Poll forever. Poll failures are logged and retried after a pause.
    pub async fn run(mut self) {
        tracing::info!("Polling Telegram for updates");
        loop {
            if let Err(e) = self.poll_once().await {
                tracing::warn!("Failed to fetch updates: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }

    /// Fetch one batch of updates and queue the commands it contains.
    /// Returns how many commands were queued.
    pub async fn poll_once(&mut self) -> Result<usize, TelegramError> {
        let updates = self
            .client
            .get_updates(self.offset, self.poll_timeout_secs)
            .await?;

        let mut queued = 0;
        for update in updates {
            self.offset = Some(match self.offset {
                Some(offset) => offset.max(update.update_id + 1),
                None => update.update_id + 1,
            });
            if self.dispatch(update) {
                queued += 1;
            }
        }
        self.active_workers();
        Ok(queued)
    }

    fn dispatch(&mut self, update: Update) -> bool {
        let Some(message) = update.message else {
            return false;
        };
        let Some(command) = message.text.as_deref().and_then(Command::parse) else {
            return false;
        };
        let chat_id = ChatId(message.chat.id);
        let mut job = Job {
            sender: message.from,
            command,
        };

        let previous = match self.mailboxes.remove(&chat_id) {
            Some(mailbox) => match mailbox.jobs.send(job) {
                Ok(()) => {
                    self.mailboxes.insert(chat_id, mailbox);
                    return true;
                }
                // Worker went idle and closed its mailbox; start a fresh one below.
                Err(mpsc::error::SendError(returned)) => {
                    job = returned;
                    Some(mailbox.worker)
                }
            },
            None => None,
        };

        let (jobs, rx) = mpsc::unbounded_channel::<Job>();
        let queued = jobs.send(job).is_ok();
        let worker = self.spawn_worker(chat_id, rx, previous);
        self.mailboxes.insert(chat_id, Mailbox { jobs, worker });
        queued
    }

    fn spawn_worker(
        &self,
        chat_id: ChatId,
        mut rx: mpsc::UnboundedReceiver<Job>,
        previous: Option<JoinHandle<()>>,
    ) -> JoinHandle<()> {
        let client = self.client.clone();
        let handler = self.handler.clone();
        let idle_timeout = self.idle_timeout;

        tokio::spawn(async move {
            if let Some(previous) = previous {
                // Keep the chat's commands in order across worker restarts.
                let _ = previous.await;
            }

            loop {
                match tokio::time::timeout(idle_timeout, rx.recv()).await {
                    Ok(Some(job)) => handle_job(&client, &handler, chat_id, job).await,
                    Ok(None) => break,
                    Err(_) => {
                        rx.close();
                        while let Some(job) = rx.recv().await {
                            handle_job(&client, &handler, chat_id, job).await;
                        }
                        tracing::debug!(chat_id = %chat_id, "Chat worker idle, exiting");
                        break;
                    }
                }
            }
        })
    }
}

async fn handle_job(client: &TelegramClient, handler: &CommandHandler, chat_id: ChatId, job: Job) {
    tracing::debug!(chat_id = %chat_id, command = job.command.name(), "Handling command");
    let reply = handler
        .handle(chat_id, job.sender.as_ref(), job.command)
        .await;
    if let Err(e) = client
        .send_message(chat_id.0, &reply.text, reply.parse_mode)
        .await
    {
        tracing::error!(chat_id = %chat_id, "Failed to send reply: {}", e);
    }
}
