//! Task service tests.

use rstest::rstest;

use super::support::{Harness, harness, team};
use crate::workspace::domain::{ColumnId, Task, TaskId, UserId, WorkspaceDomainError};
use crate::workspace::ports::WorkspaceRepositoryError;
use crate::workspace::services::{CreateTask, ErrorKind, WorkspaceError, WorkspaceResult};

async fn add_task(
    harness: &Harness,
    actor: UserId,
    column_id: ColumnId,
    title: &str,
    parent_id: Option<TaskId>,
) -> WorkspaceResult<Task> {
    let tasks = harness.workspace.tasks();
    let request = CreateTask {
        column_id,
        title: title.to_owned(),
        description: None,
        parent_id,
    };
    harness
        .run(actor, |scope| async move { tasks.create_task(&scope, request).await })
        .await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subtasks_are_listed_breadth_first(harness: Harness) {
    let team = team(&harness).await;
    let editor = team.editor.id();
    let columns = harness
        .columns(team.owner.id(), team.board.id(), &["Todo"])
        .await;
    let todo = columns.first().map(|column| column.id()).expect("column");

    let root = add_task(&harness, editor, todo, "Epic", None).await.expect("root");
    let left = add_task(&harness, editor, todo, "Left", Some(root.id()))
        .await
        .expect("left");
    let right = add_task(&harness, editor, todo, "Right", Some(root.id()))
        .await
        .expect("right");
    let leaf = add_task(&harness, editor, todo, "Leaf", Some(left.id()))
        .await
        .expect("leaf");

    let tasks = harness.workspace.tasks();
    let root_id = root.id();
    let tree: Vec<TaskId> = harness
        .run(team.viewer.id(), |scope| async move {
            tasks.list_children(&scope, root_id).await
        })
        .await
        .expect("children")
        .iter()
        .map(Task::id)
        .collect();

    assert_eq!(tree, vec![left.id(), right.id(), leaf.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn viewers_cannot_create_tasks(harness: Harness) {
    let team = team(&harness).await;
    let columns = harness
        .columns(team.owner.id(), team.board.id(), &["Todo"])
        .await;
    let todo = columns.first().map(|column| column.id()).expect("column");

    let err = add_task(&harness, team.viewer.id(), todo, "Nope", None)
        .await
        .expect_err("denied");

    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cross_board_references_are_rejected(harness: Harness) {
    let team = team(&harness).await;
    let owner = team.owner.id();
    let other_board = harness.board(owner, "Elsewhere", false).await;
    let here = harness.columns(owner, team.board.id(), &["Todo"]).await;
    let there = harness.columns(owner, other_board.id(), &["Todo"]).await;
    let here_col = here.first().map(|column| column.id()).expect("column");
    let there_col = there.first().map(|column| column.id()).expect("column");

    let parent = add_task(&harness, owner, here_col, "Parent", None)
        .await
        .expect("parent");
    let err = add_task(&harness, owner, there_col, "Child", Some(parent.id()))
        .await
        .expect_err("cross-board parent");
    assert!(matches!(err, WorkspaceError::CrossBoardReference { .. }));

    let tasks = harness.workspace.tasks();
    let parent_id = parent.id();
    let err = harness
        .run(owner, |scope| async move {
            tasks.move_task(&scope, parent_id, there_col).await
        })
        .await
        .expect_err("cross-board move");
    assert_eq!(err.kind(), ErrorKind::Invalid);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_move_between_columns(harness: Harness) {
    let team = team(&harness).await;
    let columns = harness
        .columns(team.owner.id(), team.board.id(), &["Todo", "Done"])
        .await;
    let todo = columns.first().map(|column| column.id()).expect("todo");
    let done = columns.get(1).map(|column| column.id()).expect("done");
    let task = add_task(&harness, team.editor.id(), todo, "Ship", None)
        .await
        .expect("task");
    let tasks = harness.workspace.tasks();
    let task_id = task.id();

    let moved = harness
        .run(team.editor.id(), |scope| async move {
            tasks.move_task(&scope, task_id, done).await
        })
        .await
        .expect("move");

    assert_eq!(moved.column_id(), done);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependency_edges_reject_self_and_duplicates(harness: Harness) {
    let team = team(&harness).await;
    let editor = team.editor.id();
    let columns = harness
        .columns(team.owner.id(), team.board.id(), &["Todo"])
        .await;
    let todo = columns.first().map(|column| column.id()).expect("column");
    let design = add_task(&harness, editor, todo, "Design", None).await.expect("design");
    let build = add_task(&harness, editor, todo, "Build", None).await.expect("build");
    let (design_id, build_id) = (design.id(), build.id());
    let tasks = harness.workspace.tasks();

    let err = harness
        .run(editor, |scope| async move {
            tasks.add_dependency(&scope, design_id, design_id).await
        })
        .await
        .expect_err("self edge");
    assert!(matches!(
        err,
        WorkspaceError::Domain(WorkspaceDomainError::SelfDependency(_))
    ));
    assert_eq!(err.kind(), ErrorKind::Invalid);

    harness
        .run(editor, |scope| async move {
            tasks.add_dependency(&scope, design_id, build_id).await
        })
        .await
        .expect("edge");
    let err = harness
        .run(editor, |scope| async move {
            tasks.add_dependency(&scope, design_id, build_id).await
        })
        .await
        .expect_err("duplicate edge");
    assert!(matches!(
        err,
        WorkspaceError::Repository(WorkspaceRepositoryError::DuplicateDependency { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let waits_on = harness
        .run(editor, |scope| async move {
            tasks.list_dependencies(&scope, build_id).await
        })
        .await
        .expect("dependencies");
    assert_eq!(waits_on.len(), 1);
    assert!(
        waits_on
            .iter()
            .all(|edge| edge.task_id() == design_id && edge.dependent_task_id() == build_id)
    );

    harness
        .run(editor, |scope| async move {
            tasks.remove_dependency(&scope, design_id, build_id).await
        })
        .await
        .expect("remove");
    let err = harness
        .run(editor, |scope| async move {
            tasks.remove_dependency(&scope, design_id, build_id).await
        })
        .await
        .expect_err("already removed");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_removes_its_subtree(harness: Harness) {
    let team = team(&harness).await;
    let editor = team.editor.id();
    let columns = harness
        .columns(team.owner.id(), team.board.id(), &["Todo"])
        .await;
    let todo = columns.first().map(|column| column.id()).expect("column");
    let root = add_task(&harness, editor, todo, "Root", None).await.expect("root");
    let child = add_task(&harness, editor, todo, "Child", Some(root.id()))
        .await
        .expect("child");
    let tasks = harness.workspace.tasks();
    let (root_id, child_id) = (root.id(), child.id());

    harness
        .run(editor, |scope| async move { tasks.delete_task(&scope, root_id).await })
        .await
        .expect("delete");

    let err = harness
        .run(editor, |scope| async move {
            tasks.list_children(&scope, child_id).await
        })
        .await
        .expect_err("child removed");
    assert!(matches!(err, WorkspaceError::TaskNotFound(id) if id == child_id));
}
