//! Column ordering service.
//!
//! Every board keeps its column positions dense and 1-based. Mutations take
//! the board's ordering lock before reading positions, so concurrent
//! reorders on one board are applied one after another.

use std::time::Duration;
use tracing::{debug, warn};

use super::access::{AccessGuard, BoardOperation};
use super::{WorkspaceError, WorkspaceResult};
use crate::cache::Cache;
use crate::transaction::RequestScope;
use crate::workspace::domain::{BoardId, Column, ColumnId, ColumnName, ColumnPosition};
use crate::workspace::ports::{WorkspaceRepositoryError, WorkspaceSession};

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The column does not exist; nothing was written.
    ColumnMissing,
    /// The column already sits at the requested position; nothing was
    /// written.
    Unchanged,
    /// The column and the columns between its old and new slots were
    /// renumbered.
    Moved {
        /// Previous position.
        from: ColumnPosition,
        /// New position.
        to: ColumnPosition,
    },
}

/// Returns the cache key holding a board's ordered column listing.
#[must_use]
pub fn columns_cache_key(board_id: BoardId) -> String {
    format!("board:{board_id}:columns")
}

/// Returns the cache key prefix covering every cached entry of a board.
#[must_use]
pub fn board_cache_prefix(board_id: BoardId) -> String {
    format!("board:{board_id}:")
}

/// Maintains dense column ordering on boards.
#[derive(Debug, Clone, Copy)]
pub struct ColumnService {
    cache_ttl: Duration,
}

impl ColumnService {
    /// Creates a service caching column listings for `cache_ttl`.
    #[must_use]
    pub const fn new(cache_ttl: Duration) -> Self {
        Self { cache_ttl }
    }

    /// Appends a column at the end of the board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`] for unknown boards,
    /// [`WorkspaceError::DuplicateColumnName`] when the board already has a
    /// column with that name, and access errors when the actor is not at
    /// least a maintainer.
    pub async fn create_column<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
        name: &str,
    ) -> WorkspaceResult<Column> {
        let column_name = ColumnName::new(name)?;
        let store = scope.store();
        store
            .find_board(board_id)
            .await?
            .ok_or(WorkspaceError::BoardNotFound(board_id))?;
        AccessGuard::authorize(store, BoardOperation::ManageColumns, scope.actor(), board_id)
            .await?;
        store.lock_board(board_id).await?;

        if store
            .find_column_by_name(board_id, &column_name)
            .await?
            .is_some()
        {
            return Err(WorkspaceError::DuplicateColumnName {
                board_id,
                name: column_name.to_string(),
            });
        }
        let position = store
            .max_position(board_id)
            .await?
            .map_or(ColumnPosition::FIRST, ColumnPosition::next);
        let column = Column::new(board_id, column_name, position);
        store
            .insert_column(&column)
            .await
            .map_err(map_duplicate_name)?;
        invalidate_board(scope, board_id).await?;

        debug!(%board_id, column_id = %column.id(), %position, "column created");
        Ok(column)
    }

    /// Moves a column to `new_position`, shifting the columns in between.
    ///
    /// Moving right shifts the columns in `(old, new]` one slot left, in
    /// ascending order; moving left shifts `[new, old)` one slot right, in
    /// descending order. The moved column is written last.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::PositionOutOfRange`] when `new_position` is
    /// below 1 or above the board's highest position, and access errors when
    /// the actor is not at least a maintainer.
    pub async fn move_column<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        column_id: ColumnId,
        new_position: i64,
    ) -> WorkspaceResult<MoveOutcome> {
        let store = scope.store();
        let Some(located) = store.find_column(column_id).await? else {
            return Ok(MoveOutcome::ColumnMissing);
        };
        let board_id = located.board_id();
        AccessGuard::authorize(store, BoardOperation::ManageColumns, scope.actor(), board_id)
            .await?;
        store.lock_board(board_id).await?;

        // Re-read under the lock: a concurrent reorder may have moved it.
        let Some(mut column) = store.find_column(column_id).await? else {
            return Ok(MoveOutcome::ColumnMissing);
        };
        let from = column.position();
        let max = store.max_position(board_id).await?.unwrap_or(from);
        let to = u32::try_from(new_position)
            .ok()
            .and_then(|value| ColumnPosition::new(value).ok())
            .filter(|position| *position <= max)
            .ok_or(WorkspaceError::PositionOutOfRange {
                requested: new_position,
                max: max.value(),
            })?;
        if to == from {
            return Ok(MoveOutcome::Unchanged);
        }

        if to > from {
            let shifted = store
                .list_columns_between(board_id, from.next(), to)
                .await?;
            for mut neighbour in shifted.into_iter().filter(|other| other.id() != column_id) {
                neighbour.set_position(neighbour.position().previous());
                store.update_column(&neighbour).await?;
            }
        } else {
            let shifted = store
                .list_columns_between(board_id, to, from.previous())
                .await?;
            for mut neighbour in shifted
                .into_iter()
                .rev()
                .filter(|other| other.id() != column_id)
            {
                neighbour.set_position(neighbour.position().next());
                store.update_column(&neighbour).await?;
            }
        }
        column.set_position(to);
        store.update_column(&column).await?;
        invalidate_board(scope, board_id).await?;

        debug!(%board_id, %column_id, %from, %to, "column moved");
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Makes the column the board's only final column.
    ///
    /// Returns `None` when the column does not exist. Marking a column that
    /// is already final writes nothing.
    ///
    /// # Errors
    ///
    /// Returns access errors when the actor is not at least a maintainer.
    pub async fn mark_final<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        column_id: ColumnId,
    ) -> WorkspaceResult<Option<Column>> {
        let store = scope.store();
        let Some(located) = store.find_column(column_id).await? else {
            return Ok(None);
        };
        let board_id = located.board_id();
        AccessGuard::authorize(store, BoardOperation::ManageColumns, scope.actor(), board_id)
            .await?;
        store.lock_board(board_id).await?;

        let Some(mut column) = store.find_column(column_id).await? else {
            return Ok(None);
        };
        if column.is_final() {
            return Ok(Some(column));
        }
        store.clear_final_flags(board_id).await?;
        column.set_final(true);
        store.update_column(&column).await?;
        invalidate_board(scope, board_id).await?;

        debug!(%board_id, %column_id, "column marked final");
        Ok(Some(column))
    }

    /// Renames a column.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::ColumnNotFound`] for unknown columns and
    /// [`WorkspaceError::DuplicateColumnName`] when another column on the
    /// board already uses the name.
    pub async fn rename_column<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        column_id: ColumnId,
        name: &str,
    ) -> WorkspaceResult<Column> {
        let column_name = ColumnName::new(name)?;
        let store = scope.store();
        let board_id = store
            .find_column(column_id)
            .await?
            .ok_or(WorkspaceError::ColumnNotFound(column_id))?
            .board_id();
        AccessGuard::authorize(store, BoardOperation::ManageColumns, scope.actor(), board_id)
            .await?;
        store.lock_board(board_id).await?;

        let mut column = store
            .find_column(column_id)
            .await?
            .ok_or(WorkspaceError::ColumnNotFound(column_id))?;
        let taken = store
            .find_column_by_name(board_id, &column_name)
            .await?
            .is_some_and(|existing| existing.id() != column_id);
        if taken {
            return Err(WorkspaceError::DuplicateColumnName {
                board_id,
                name: column_name.to_string(),
            });
        }
        column.rename(column_name);
        store
            .update_column(&column)
            .await
            .map_err(map_duplicate_name)?;
        invalidate_board(scope, board_id).await?;
        Ok(column)
    }

    /// Deletes a column together with its tasks.
    ///
    /// Remaining columns keep their positions, so the board may have a gap
    /// until the next reorder.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::ColumnNotFound`] for unknown columns and
    /// access errors when the actor is not at least a maintainer.
    pub async fn delete_column<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        column_id: ColumnId,
    ) -> WorkspaceResult<()> {
        let store = scope.store();
        let board_id = store
            .find_column(column_id)
            .await?
            .ok_or(WorkspaceError::ColumnNotFound(column_id))?
            .board_id();
        AccessGuard::authorize(store, BoardOperation::ManageColumns, scope.actor(), board_id)
            .await?;
        store.lock_board(board_id).await?;

        store.delete_column(column_id).await.map_err(|err| match err {
            WorkspaceRepositoryError::ColumnNotFound(id) => WorkspaceError::ColumnNotFound(id),
            other => WorkspaceError::Repository(other),
        })?;
        invalidate_board(scope, board_id).await?;

        debug!(%board_id, %column_id, "column deleted");
        Ok(())
    }

    /// Returns the board's columns ordered by position.
    ///
    /// Listings are served from the cache when present and cached for the
    /// configured TTL otherwise. A listing read before a concurrent mutation
    /// commits can outlive that mutation's invalidation until the TTL
    /// expires.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`] for unknown boards and
    /// access errors for private boards the actor cannot view.
    pub async fn list_columns<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
    ) -> WorkspaceResult<Vec<Column>> {
        let store = scope.store();
        AccessGuard::readable_board(store, scope.actor(), board_id).await?;

        let key = columns_cache_key(board_id);
        if let Some(payload) = scope.cache().get(&key).await? {
            match serde_json::from_str::<Vec<Column>>(&payload) {
                Ok(columns) => return Ok(columns),
                Err(err) => warn!(%key, error = %err, "discarding unreadable cached columns"),
            }
        }

        let columns = store.list_columns(board_id).await?;
        let payload = serde_json::to_string(&columns).map_err(WorkspaceError::CachePayload)?;
        scope
            .cache()
            .set(&key, payload, Some(self.cache_ttl))
            .await?;
        Ok(columns)
    }
}

async fn invalidate_board<S>(scope: &RequestScope<S>, board_id: BoardId) -> WorkspaceResult<()> {
    scope
        .cache()
        .delete_by_prefix(&board_cache_prefix(board_id))
        .await?;
    Ok(())
}

fn map_duplicate_name(err: WorkspaceRepositoryError) -> WorkspaceError {
    match err {
        WorkspaceRepositoryError::DuplicateColumnName { board_id, name } => {
            WorkspaceError::DuplicateColumnName { board_id, name }
        }
        other => WorkspaceError::Repository(other),
    }
}
