//! Given steps for column ordering BDD scenarios.

use super::world::ColumnWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a board owned by "{owner}" with columns "{names}""#)]
fn board_with_columns(
    world: &mut ColumnWorld,
    owner: String,
    names: String,
) -> Result<(), eyre::Report> {
    let owner_id = world.user(&owner)?;
    world.owner_id = Some(owner_id);
    let boards = world.workspace.boards();
    let board = world
        .request(owner_id, |scope| async move {
            boards.create_board(&scope, "Scenario board", false).await
        })
        .wrap_err("create scenario board")?;
    let board_id = board.id();
    world.board_id = Some(board_id);

    let service = world.workspace.columns();
    for name in names.split(',').map(str::trim) {
        let column = world
            .request(owner_id, |scope| async move {
                service.create_column(&scope, board_id, name).await
            })
            .wrap_err_with(|| format!("create column {name}"))?;
        world.columns.insert(name.to_owned(), column.id());
    }
    Ok(())
}

#[given(r#""{name}" is a viewer on the board"#)]
fn viewer_on_board(world: &mut ColumnWorld, name: String) -> Result<(), eyre::Report> {
    let board_id = world.board_id()?;
    let owner_id = world
        .owner_id
        .ok_or_else(|| eyre::eyre!("missing board owner"))?;
    let viewer_id = world.user(&name)?;
    let membership = world.workspace.membership();
    world
        .request(owner_id, |scope| async move {
            membership
                .invite_user(&scope, board_id, viewer_id, "viewer")
                .await
        })
        .wrap_err("invite viewer")?;
    Ok(())
}
