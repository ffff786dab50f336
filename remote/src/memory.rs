//! In-process `todos` table.
//!
//! Behaves like the hosted store as far as the client can tell: ids and
//! timestamps are assigned on insert, blank labels are refused, matching zero
//! rows on update or delete succeeds silently, and every affected row is
//! announced on the change feed. Clones share the same table, so two clones
//! act as two clients of one backend.

use crate::error::RemoteError;
use crate::feed::{ChangeBroadcaster, ChangeEvent, ChangeFeed, ChangeKind, ChangeSubscription};
use crate::row::{NewTodoRow, OrderBy, OrderColumn, TodoPatch, TodoRow};
use crate::table::{RemoteFuture, TodoTable};
use std::sync::{Arc, Mutex, PoisonError};
use todo_sync_core::environment::{Clock, SystemClock};

#[derive(Debug)]
struct StoredRow {
    seq: u64,
    row: TodoRow,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<StoredRow>,
    next_seq: u64,
}

impl Table {
    fn push(&mut self, row: TodoRow) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.push(StoredRow { seq, row });
    }

    fn sorted(&self, order: OrderBy) -> Vec<TodoRow> {
        let mut rows: Vec<&StoredRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            let by_column = match order.column {
                OrderColumn::CreatedAt => a.row.created_at.cmp(&b.row.created_at),
                OrderColumn::Text => a.row.text.cmp(&b.row.text),
            };
            let ordering = by_column.then(a.seq.cmp(&b.seq));
            if order.ascending { ordering } else { ordering.reverse() }
        });
        rows.into_iter().map(|stored| stored.row.clone()).collect()
    }
}

/// In-memory backend implementing [`TodoTable`] and [`ChangeFeed`]
#[derive(Clone)]
pub struct MemoryRemote {
    table: Arc<Mutex<Table>>,
    changes: ChangeBroadcaster,
    clock: Arc<dyn Clock>,
}

impl MemoryRemote {
    /// Empty table stamped by `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table::default())),
            changes: ChangeBroadcaster::default(),
            clock,
        }
    }

    /// Table pre-filled with `rows`, kept as given
    #[must_use]
    pub fn with_rows(clock: Arc<dyn Clock>, rows: impl IntoIterator<Item = TodoRow>) -> Self {
        let remote = Self::new(clock);
        {
            let mut table = remote.lock();
            for row in rows {
                table.push(row);
            }
        }
        remote
    }

    /// Snapshot of every row, newest first
    #[must_use]
    pub fn rows(&self) -> Vec<TodoRow> {
        self.lock().sorted(OrderBy::created_at_desc())
    }

    /// Number of change subscriptions not yet released
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.changes.active_subscriptions()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn validate_text(text: &str) -> Result<(), RemoteError> {
        if text.trim().is_empty() {
            return Err(RemoteError::Rejected(
                "new row violates check constraint \"todos_text_check\"".to_string(),
            ));
        }
        Ok(())
    }

    fn insert_rows(&self, rows: Vec<NewTodoRow>) -> Result<Vec<TodoRow>, RemoteError> {
        for row in &rows {
            Self::validate_text(&row.text)?;
        }

        let created_at = self.clock.now();
        let stored: Vec<TodoRow> = rows
            .into_iter()
            .map(|new| TodoRow {
                id: uuid::Uuid::new_v4().to_string(),
                created_at,
                text: new.text,
                content: new.content,
                completed: new.completed,
                user_id: None,
            })
            .collect();

        {
            let mut table = self.lock();
            for row in &stored {
                table.push(row.clone());
            }
        }

        for row in &stored {
            self.changes.publish(ChangeEvent::row(ChangeKind::Insert, row.id.clone()));
        }
        tracing::debug!(count = stored.len(), "Inserted rows");
        Ok(stored)
    }

    fn update_row(&self, id: &str, patch: &TodoPatch) -> Result<(), RemoteError> {
        if let Some(text) = &patch.text {
            Self::validate_text(text)?;
        }
        if patch.is_empty() {
            return Ok(());
        }

        let found = {
            let mut table = self.lock();
            match table.rows.iter_mut().find(|stored| stored.row.id == id) {
                Some(stored) => {
                    patch.apply(&mut stored.row);
                    true
                },
                None => false,
            }
        };

        if found {
            self.changes.publish(ChangeEvent::row(ChangeKind::Update, id));
        }
        tracing::debug!(id, found, "Updated row");
        Ok(())
    }

    fn delete_row(&self, id: &str) -> Result<(), RemoteError> {
        let removed = {
            let mut table = self.lock();
            let before = table.rows.len();
            table.rows.retain(|stored| stored.row.id != id);
            before != table.rows.len()
        };

        if removed {
            self.changes.publish(ChangeEvent::row(ChangeKind::Delete, id));
        }
        tracing::debug!(id, removed, "Deleted row");
        Ok(())
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for MemoryRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRemote")
            .field("rows", &self.lock().rows.len())
            .field("active_subscriptions", &self.active_subscriptions())
            .finish_non_exhaustive()
    }
}

impl TodoTable for MemoryRemote {
    fn select_all(&self, order: OrderBy) -> RemoteFuture<'_, Option<Vec<TodoRow>>> {
        Box::pin(async move { Ok(Some(self.lock().sorted(order))) })
    }

    fn insert(&self, rows: Vec<NewTodoRow>) -> RemoteFuture<'_, Vec<TodoRow>> {
        Box::pin(async move { self.insert_rows(rows) })
    }

    fn update(&self, id: &str, patch: TodoPatch) -> RemoteFuture<'_, ()> {
        let id = id.to_string();
        Box::pin(async move { self.update_row(&id, &patch) })
    }

    fn delete(&self, id: &str) -> RemoteFuture<'_, ()> {
        let id = id.to_string();
        Box::pin(async move { self.delete_row(&id) })
    }
}

impl ChangeFeed for MemoryRemote {
    fn subscribe(&self) -> ChangeSubscription {
        self.changes.subscribe()
    }
}
