//! The single writer task behind the coordinator.
//!
//! Storage commands are sent over an unbounded channel and applied one at a
//! time, in the order they were sent. Enqueueing happens synchronously in the
//! coordinator call, so program order is storage order. Nothing is batched,
//! coalesced or reordered.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

use crate::entity::favorite_repository::Model as FavoriteRecord;
use crate::source::SourceRepository;
use crate::storage::FavoritesStorage;

use super::events::{FavoritesEvent, emit};
use super::membership::{self, SharedMembership};

/// A queued storage operation and where to send its outcome.
pub(crate) enum StorageCommand {
    Add {
        source: SourceRepository,
        reply: oneshot::Sender<Option<FavoriteRecord>>,
    },
    Delete {
        id: Uuid,
        source_id: String,
        reply: oneshot::Sender<()>,
    },
    Reorder {
        records: Vec<FavoriteRecord>,
        reply: oneshot::Sender<()>,
    },
    Update {
        id: Uuid,
        name: String,
        description: Option<String>,
        reply: oneshot::Sender<Option<FavoriteRecord>>,
    },
    List {
        reply: oneshot::Sender<Vec<FavoriteRecord>>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
}

impl StorageCommand {
    fn label(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Reorder { .. } => "reorder",
            Self::Update { .. } => "update",
            Self::List { .. } => "list",
            Self::Flush { .. } => "flush",
        }
    }
}

/// Outcome of a queued storage operation.
///
/// Await it to wait for the write to be applied, or drop it to fire and
/// forget; the write happens either way. If the writer task is gone the
/// result is `T::default()` (`None`, `()` or an empty list), in keeping with
/// the fail-soft storage contract.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Pending<T> {
    pub(crate) fn new(rx: oneshot::Receiver<T>) -> Self {
        Self { rx }
    }

    /// An already-resolved outcome, for operations that need no write.
    pub fn ready(value: T) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(value);
        Self { rx }
    }
}

impl<T: Default> Future for Pending<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or_default())
    }
}

async fn apply(
    storage: &dyn FavoritesStorage,
    events: &broadcast::Sender<FavoritesEvent>,
    membership: &SharedMembership,
    command: StorageCommand,
) {
    match command {
        StorageCommand::Add { source, reply } => {
            let record = storage.add(&source).await;
            match &record {
                Some(record) => emit(
                    events,
                    FavoritesEvent::Added {
                        record: record.clone(),
                    },
                ),
                None => {
                    membership::write(membership, |m| m.release_source(&source.id));
                    emit(
                        events,
                        FavoritesEvent::AddFailed {
                            source_id: source.id.clone(),
                        },
                    );
                }
            }
            let _ = reply.send(record);
        }
        StorageCommand::Delete {
            id,
            source_id,
            reply,
        } => {
            storage.delete(id).await;
            emit(events, FavoritesEvent::Deleted { id, source_id });
            let _ = reply.send(());
        }
        StorageCommand::Reorder { records, reply } => {
            storage.reorder(&records).await;
            emit(
                events,
                FavoritesEvent::Reordered {
                    count: records.len(),
                },
            );
            let _ = reply.send(());
        }
        StorageCommand::Update {
            id,
            name,
            description,
            reply,
        } => {
            let record = storage
                .update_details(id, &name, description.as_deref())
                .await;
            if let Some(record) = &record {
                emit(
                    events,
                    FavoritesEvent::Updated {
                        record: record.clone(),
                    },
                );
            }
            let _ = reply.send(record);
        }
        StorageCommand::List { reply } => {
            let _ = reply.send(storage.list_all().await);
        }
        StorageCommand::Flush { reply } => {
            let _ = reply.send(());
        }
    }
}

/// Spawn the writer task.
///
/// The task exits once every sender is dropped, after draining whatever is
/// still queued.
pub(crate) fn spawn_writer(
    storage: Arc<dyn FavoritesStorage>,
    mut rx: mpsc::UnboundedReceiver<StorageCommand>,
    events: broadcast::Sender<FavoritesEvent>,
    membership: SharedMembership,
) -> tokio::task::JoinHandle<u64> {
    tokio::spawn(async move {
        let mut applied = 0u64;
        tracing::debug!("Favorites writer started");

        while let Some(command) = rx.recv().await {
            let label = command.label();
            let start = std::time::Instant::now();
            apply(storage.as_ref(), &events, &membership, command).await;
            applied += 1;
            tracing::trace!(
                command = label,
                elapsed_ms = start.elapsed().as_millis(),
                "Applied storage command"
            );
        }

        tracing::debug!(applied, "Favorites writer stopped");
        applied
    })
}
