//! End-to-end flows through the composition root.

use super::helpers::{TestWorkspace, app};
use corkboard::notification::NotificationChannel;
use corkboard::workspace::domain::RoleKind;
use corkboard::workspace::services::{CreateTask, ErrorKind, MoveOutcome};
use eyre::{Result, WrapErr};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_setup_reorder_and_finalise(app: TestWorkspace) -> Result<()> {
    let owner = app.register("olivia").await.wrap_err("register owner")?;
    let boards = app.workspace.boards();
    let columns = app.workspace.columns();

    let board = app
        .request(owner.id(), |scope| async move {
            boards.create_board(&scope, "Release 1.0", false).await
        })
        .await
        .wrap_err("create board")?;
    let board_id = board.id();

    let mut created = Vec::new();
    for name in ["Backlog", "Doing", "Review", "Done"] {
        let column = app
            .request(owner.id(), |scope| async move {
                columns.create_column(&scope, board_id, name).await
            })
            .await
            .wrap_err("create column")?;
        created.push(column);
    }
    let review = created.get(2).map(|column| column.id()).ok_or_else(|| eyre::eyre!("review"))?;
    let done = created.get(3).map(|column| column.id()).ok_or_else(|| eyre::eyre!("done"))?;

    let outcome = app
        .request(owner.id(), |scope| async move {
            columns.move_column(&scope, review, 1).await
        })
        .await
        .wrap_err("move review")?;
    assert!(matches!(outcome, MoveOutcome::Moved { .. }));
    app.request(owner.id(), |scope| async move {
        columns.mark_final(&scope, done).await
    })
    .await
    .wrap_err("mark done final")?;

    let listed = app
        .request(owner.id(), |scope| async move {
            columns.list_columns(&scope, board_id).await
        })
        .await
        .wrap_err("list columns")?;
    let layout: Vec<(String, u32, bool)> = listed
        .iter()
        .map(|column| {
            (
                column.name().to_string(),
                column.position().value(),
                column.is_final(),
            )
        })
        .collect();
    assert_eq!(
        layout,
        vec![
            ("Review".to_owned(), 1, false),
            ("Backlog".to_owned(), 2, false),
            ("Doing".to_owned(), 3, false),
            ("Done".to_owned(), 4, true),
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invited_editor_works_tasks(app: TestWorkspace) -> Result<()> {
    let owner = app.register("olivia").await.wrap_err("register owner")?;
    let editor = app.register("eddie").await.wrap_err("register editor")?;
    let boards = app.workspace.boards();
    let columns = app.workspace.columns();
    let membership = app.workspace.membership();
    let tasks = app.workspace.tasks();

    let board = app
        .request(owner.id(), |scope| async move {
            boards.create_board(&scope, "Ops", true).await
        })
        .await?;
    let board_id = board.id();
    let todo = app
        .request(owner.id(), |scope| async move {
            columns.create_column(&scope, board_id, "Todo").await
        })
        .await?;
    let editor_id = editor.id();
    app.request(owner.id(), |scope| async move {
        membership
            .invite_user(&scope, board_id, editor_id, "editor")
            .await
    })
    .await?;

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(
        sent.iter()
            .all(|notice| notice.recipient == editor_id
                && notice.channel == NotificationChannel::InApp)
    );

    let request = CreateTask {
        column_id: todo.id(),
        title: "Rotate credentials".to_owned(),
        description: Some("Quarterly rotation".to_owned()),
        parent_id: None,
    };
    let task = app
        .request(editor_id, |scope| async move {
            tasks.create_task(&scope, request).await
        })
        .await
        .wrap_err("editor creates task")?;
    assert_eq!(task.created_by(), editor_id);
    assert_eq!(task.board_id(), board_id);

    let members = app
        .request(editor_id, |scope| async move {
            membership.list_members(&scope, board_id).await
        })
        .await?;
    let roles: Vec<RoleKind> = members.iter().map(|(_, role)| *role).collect();
    assert_eq!(roles, vec![RoleKind::Owner, RoleKind::Editor]);

    let err = app
        .request(editor_id, |scope| async move {
            columns.create_column(&scope, board_id, "Blocked").await
        })
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("editor created a column"))?;
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    Ok(())
}
