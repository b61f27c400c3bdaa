//! Then steps for column ordering BDD scenarios.

use super::world::ColumnWorld;
use corkboard::workspace::services::{ErrorKind, MoveOutcome};
use rstest_bdd_macros::then;

#[then(r#"the columns are ordered "{names}""#)]
fn columns_ordered(world: &ColumnWorld, names: String) -> Result<(), eyre::Report> {
    let expected: Vec<(String, u32)> = names
        .split(',')
        .map(str::trim)
        .zip(1..)
        .map(|(name, position)| (name.to_owned(), position))
        .collect();
    let reader = world
        .owner_id
        .ok_or_else(|| eyre::eyre!("missing board owner"))?;
    let actual: Vec<(String, u32)> = world
        .listed_columns(reader)?
        .iter()
        .map(|column| (column.name().to_string(), column.position().value()))
        .collect();
    if actual != expected {
        return Err(eyre::eyre!("expected {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("the move reports no change")]
fn move_unchanged(world: &ColumnWorld) -> Result<(), eyre::Report> {
    match world.last_move.as_ref() {
        Some(Ok(MoveOutcome::Unchanged)) => Ok(()),
        other => Err(eyre::eyre!("expected an unchanged move, got {other:?}")),
    }
}

#[then("no rows were written by the move")]
fn no_rows_written(world: &ColumnWorld) -> Result<(), eyre::Report> {
    let writes = world.write_count();
    if writes != world.writes_before_move {
        return Err(eyre::eyre!(
            "expected no writes, found {} new",
            writes.saturating_sub(world.writes_before_move)
        ));
    }
    Ok(())
}

#[then("the move fails as out of range")]
fn move_out_of_range(world: &ColumnWorld) -> Result<(), eyre::Report> {
    match world.last_move.as_ref() {
        Some(Err(err)) if err.kind() == ErrorKind::OutOfRange => Ok(()),
        other => Err(eyre::eyre!("expected an out-of-range error, got {other:?}")),
    }
}

#[then("the move is forbidden")]
fn move_forbidden(world: &ColumnWorld) -> Result<(), eyre::Report> {
    match world.last_move.as_ref() {
        Some(Err(err)) if err.kind() == ErrorKind::Forbidden => Ok(()),
        other => Err(eyre::eyre!("expected a forbidden error, got {other:?}")),
    }
}

#[then(r#"only column "{name}" is final"#)]
fn only_final(world: &ColumnWorld, name: String) -> Result<(), eyre::Report> {
    let expected = world.column_id(&name)?;
    let reader = world
        .owner_id
        .ok_or_else(|| eyre::eyre!("missing board owner"))?;
    let finals: Vec<_> = world
        .listed_columns(reader)?
        .iter()
        .filter(|column| column.is_final())
        .map(|column| column.id())
        .collect();
    if finals != vec![expected] {
        return Err(eyre::eyre!("expected only {name:?} final, found {finals:?}"));
    }
    Ok(())
}
