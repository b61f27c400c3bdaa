//! When steps for column ordering BDD scenarios.

use super::world::ColumnWorld;
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#""{actor}" moves column "{name}" to position {position:i64}"#)]
fn move_column(
    world: &mut ColumnWorld,
    actor: String,
    name: String,
    position: i64,
) -> Result<(), eyre::Report> {
    let actor_id = world.user(&actor)?;
    let column_id = world.column_id(&name)?;
    let service = world.workspace.columns();
    world.writes_before_move = world.write_count();
    world.last_move = Some(world.request(actor_id, |scope| async move {
        service.move_column(&scope, column_id, position).await
    }));
    Ok(())
}

#[when(r#""{actor}" marks column "{name}" as final"#)]
fn mark_final(world: &mut ColumnWorld, actor: String, name: String) -> Result<(), eyre::Report> {
    let actor_id = world.user(&actor)?;
    let column_id = world.column_id(&name)?;
    let service = world.workspace.columns();
    world
        .request(actor_id, |scope| async move {
            service.mark_final(&scope, column_id).await
        })
        .wrap_err("mark column final")?
        .ok_or_else(|| eyre::eyre!("column {name:?} vanished"))?;
    Ok(())
}
