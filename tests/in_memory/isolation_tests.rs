//! Unit-of-work isolation between requests.

use super::helpers::{TestWorkspace, app};
use corkboard::transaction::Committer;
use corkboard::workspace::domain::{Board, BoardName};
use corkboard::workspace::ports::BoardRepository;
use eyre::{Result, WrapErr};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn uncommitted_writes_stay_private(app: TestWorkspace) -> Result<()> {
    let owner = app.register("olivia").await?;
    let coordinator = app.workspace.coordinator();
    let board = Board::new(owner.id(), BoardName::new("Draft")?, false, &DefaultClock);

    let (writer, writer_commit) = coordinator.begin(owner.id()).await?;
    writer.store().insert_board(&board).await?;

    let (reader, reader_commit) = coordinator.begin(owner.id()).await?;
    assert!(reader.store().find_board(board.id()).await?.is_none());
    reader_commit.rollback().await?;

    writer_commit.commit().await.wrap_err("commit writer")?;

    let (late_reader, late_commit) = coordinator.begin(owner.id()).await?;
    assert_eq!(late_reader.store().find_board(board.id()).await?, Some(board));
    late_commit.rollback().await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_request_leaves_no_trace(app: TestWorkspace) -> Result<()> {
    let owner = app.register("olivia").await?;
    let boards = app.workspace.boards();
    let owner_id = owner.id();

    let result = app
        .request(owner_id, |scope| async move {
            boards.create_board(&scope, "Doomed", false).await?;
            boards.create_board(&scope, "   ", false).await
        })
        .await;
    assert!(result.is_err());

    let listed = app
        .request(owner_id, |scope| async move {
            boards.list_boards_for_user(&scope).await
        })
        .await?;
    assert!(listed.is_empty());
    assert!(app.notifier.sent().is_empty());
    Ok(())
}
