//! Workspace behaviour against a real `PostgreSQL` database.

use super::helpers::{BoxError, TestSchema};
use corkboard::workspace::domain::{BoardId, ColumnId, UserId};
use corkboard::workspace::services::{ErrorKind, MoveOutcome, WorkspaceError};
use rstest::rstest;

async fn board_with_columns(
    schema: &TestSchema,
    owner: UserId,
    names: &[&str],
) -> Result<(BoardId, Vec<ColumnId>), BoxError> {
    let boards = schema.workspace.boards();
    let columns = schema.workspace.columns();
    let board = schema
        .request(owner, |scope| async move {
            boards.create_board(&scope, "Postgres board", false).await
        })
        .await?;
    let board_id = board.id();
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let column = schema
            .request(owner, |scope| async move {
                columns.create_column(&scope, board_id, name).await
            })
            .await?;
        ids.push(column.id());
    }
    Ok((board_id, ids))
}

async fn layout(
    schema: &TestSchema,
    actor: UserId,
    board_id: BoardId,
) -> Result<Vec<(String, u32)>, WorkspaceError> {
    let columns = schema.workspace.columns();
    let listed = schema
        .request(actor, |scope| async move {
            columns.list_columns(&scope, board_id).await
        })
        .await?;
    Ok(listed
        .iter()
        .map(|column| (column.name().to_string(), column.position().value()))
        .collect())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_shifts_neighbours() -> Result<(), BoxError> {
    let Some(schema) = TestSchema::provision()? else {
        return Ok(());
    };
    let owner = schema.register("olivia").await?;
    let (board_id, ids) = board_with_columns(&schema, owner.id(), &["A", "B", "C", "D"]).await?;
    let c_id = *ids.get(2).ok_or("missing column C")?;
    let columns = schema.workspace.columns();

    let outcome = schema
        .request(owner.id(), |scope| async move {
            columns.move_column(&scope, c_id, 1).await
        })
        .await?;

    assert!(matches!(outcome, MoveOutcome::Moved { .. }));
    assert_eq!(
        layout(&schema, owner.id(), board_id).await?,
        vec![
            ("C".to_owned(), 1),
            ("A".to_owned(), 2),
            ("B".to_owned(), 3),
            ("D".to_owned(), 4),
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_request_rolls_back_every_row() -> Result<(), BoxError> {
    let Some(schema) = TestSchema::provision()? else {
        return Ok(());
    };
    let owner = schema.register("olivia").await?;
    let boards = schema.workspace.boards();
    let columns = schema.workspace.columns();

    let result = schema
        .request(owner.id(), |scope| async move {
            let board = boards.create_board(&scope, "Doomed", false).await?;
            columns.create_column(&scope, board.id(), "Todo").await?;
            columns.move_column(&scope, ColumnId::new(), 1).await?;
            Err::<(), _>(WorkspaceError::ColumnNotFound(ColumnId::new()))
        })
        .await;
    assert!(result.is_err());

    let listed = schema
        .request(owner.id(), |scope| async move {
            boards.list_boards_for_user(&scope).await
        })
        .await?;
    assert!(listed.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_membership_conflicts() -> Result<(), BoxError> {
    let Some(schema) = TestSchema::provision()? else {
        return Ok(());
    };
    let owner = schema.register("olivia").await?;
    let guest = schema.register("gus").await?;
    let (board_id, _) = board_with_columns(&schema, owner.id(), &[]).await?;
    let membership = schema.workspace.membership();
    let guest_id = guest.id();

    for attempt in 0..2 {
        let result = schema
            .request(owner.id(), |scope| async move {
                membership
                    .invite_user(&scope, board_id, guest_id, "editor")
                    .await
            })
            .await;
        if attempt == 0 {
            result?;
        } else {
            let err = result.err().ok_or("second invite succeeded")?;
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }
    }
    assert_eq!(schema.notifier.sent().len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reorders_stay_dense() -> Result<(), BoxError> {
    let Some(schema) = TestSchema::provision()? else {
        return Ok(());
    };
    let owner = schema.register("olivia").await?;
    let (board_id, ids) =
        board_with_columns(&schema, owner.id(), &["A", "B", "C", "D", "E"]).await?;
    let first = *ids.first().ok_or("missing column A")?;
    let last = *ids.get(4).ok_or("missing column E")?;
    let columns = schema.workspace.columns();

    let (left, right) = tokio::join!(
        schema.request(owner.id(), |scope| async move {
            columns.move_column(&scope, first, 5).await
        }),
        schema.request(owner.id(), |scope| async move {
            columns.move_column(&scope, last, 1).await
        }),
    );
    left?;
    right?;

    let mut positions: Vec<u32> = layout(&schema, owner.id(), board_id)
        .await?
        .into_iter()
        .map(|(_, position)| position)
        .collect();
    positions.sort_unstable();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_board_cascades() -> Result<(), BoxError> {
    let Some(schema) = TestSchema::provision()? else {
        return Ok(());
    };
    let owner = schema.register("olivia").await?;
    let (board_id, _) = board_with_columns(&schema, owner.id(), &["Todo", "Done"]).await?;
    let boards = schema.workspace.boards();

    schema
        .request(owner.id(), |scope| async move {
            boards.delete_board(&scope, board_id).await
        })
        .await?;

    let err = layout(&schema, owner.id(), board_id)
        .await
        .err()
        .ok_or("board still listed")?;
    assert!(matches!(err, WorkspaceError::BoardNotFound(_)));
    Ok(())
}
