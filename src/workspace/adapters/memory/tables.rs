//! Committed tables and per-session staged overlays.

use std::collections::HashMap;
use std::hash::Hash;

use crate::workspace::domain::{
    Board, BoardId, BoardMember, Column, ColumnId, MemberId, Role, RoleId, Task, TaskDependency,
    TaskId, User, UserId,
};

/// Rows visible to every session.
#[derive(Debug, Default)]
pub(super) struct WorkspaceTables {
    pub(super) users: HashMap<UserId, User>,
    pub(super) roles: HashMap<RoleId, Role>,
    pub(super) boards: HashMap<BoardId, Board>,
    pub(super) columns: HashMap<ColumnId, Column>,
    pub(super) members: HashMap<MemberId, BoardMember>,
    pub(super) tasks: HashMap<TaskId, Task>,
    pub(super) dependencies: HashMap<TaskDependency, ()>,
}

/// Uncommitted row changes for one table. `None` marks a deletion.
#[derive(Debug)]
pub(super) struct Staged<K, V> {
    rows: HashMap<K, Option<V>>,
}

impl<K, V> Default for Staged<K, V> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy, V: Clone> Staged<K, V> {
    pub(super) fn get(&self, committed: &HashMap<K, V>, key: &K) -> Option<V> {
        match self.rows.get(key) {
            Some(staged) => staged.clone(),
            None => committed.get(key).cloned(),
        }
    }

    pub(super) fn contains(&self, committed: &HashMap<K, V>, key: &K) -> bool {
        match self.rows.get(key) {
            Some(staged) => staged.is_some(),
            None => committed.contains_key(key),
        }
    }

    /// Iterates the merged view of committed and staged rows.
    pub(super) fn scan<'a>(&'a self, committed: &'a HashMap<K, V>) -> impl Iterator<Item = &'a V> {
        committed
            .iter()
            .filter(|(key, _)| !self.rows.contains_key(*key))
            .map(|(_, value)| value)
            .chain(self.rows.values().filter_map(Option::as_ref))
    }

    pub(super) fn keys<'a>(&'a self, committed: &'a HashMap<K, V>) -> impl Iterator<Item = K> {
        committed
            .keys()
            .filter(|key| !self.rows.contains_key(*key))
            .copied()
            .chain(
                self.rows
                    .iter()
                    .filter(|(_, value)| value.is_some())
                    .map(|(key, _)| *key),
            )
    }

    pub(super) fn put(&mut self, key: K, value: V) {
        self.rows.insert(key, Some(value));
    }

    pub(super) fn remove(&mut self, key: K) {
        self.rows.insert(key, None);
    }

    pub(super) fn apply(self, committed: &mut HashMap<K, V>) {
        for (key, row) in self.rows {
            match row {
                Some(value) => {
                    committed.insert(key, value);
                }
                None => {
                    committed.remove(&key);
                }
            }
        }
    }
}

/// Every table's staged changes for one session.
#[derive(Debug, Default)]
pub(super) struct StagedTables {
    pub(super) users: Staged<UserId, User>,
    pub(super) boards: Staged<BoardId, Board>,
    pub(super) columns: Staged<ColumnId, Column>,
    pub(super) members: Staged<MemberId, BoardMember>,
    pub(super) tasks: Staged<TaskId, Task>,
    pub(super) dependencies: Staged<TaskDependency, ()>,
}

impl StagedTables {
    pub(super) fn apply(self, committed: &mut WorkspaceTables) {
        self.users.apply(&mut committed.users);
        self.boards.apply(&mut committed.boards);
        self.columns.apply(&mut committed.columns);
        self.members.apply(&mut committed.members);
        self.tasks.apply(&mut committed.tasks);
        self.dependencies.apply(&mut committed.dependencies);
    }

    /// Returns the first staged membership whose (board, user) pair another
    /// committed row already holds.
    pub(super) fn conflicting_member(&self, committed: &WorkspaceTables) -> Option<&BoardMember> {
        self.members
            .rows
            .values()
            .filter_map(Option::as_ref)
            .find(|staged| {
                committed.members.values().any(|existing| {
                    existing.id() != staged.id()
                        && !self.members.rows.contains_key(&existing.id())
                        && existing.board_id() == staged.board_id()
                        && existing.user_id() == staged.user_id()
                })
            })
    }

    /// Stages removal of `roots`, their descendant subtasks, and every
    /// dependency edge touching a removed task.
    pub(super) fn remove_task_trees(&mut self, committed: &WorkspaceTables, roots: Vec<TaskId>) {
        let mut doomed = roots;
        let mut cursor = 0;
        while let Some(current) = doomed.get(cursor).copied() {
            let children: Vec<TaskId> = self
                .tasks
                .scan(&committed.tasks)
                .filter(|task| task.parent_id() == Some(current))
                .map(Task::id)
                .filter(|id| !doomed.contains(id))
                .collect();
            doomed.extend(children);
            cursor += 1;
        }

        let edges: Vec<TaskDependency> = self
            .dependencies
            .keys(&committed.dependencies)
            .filter(|edge| {
                doomed.contains(&edge.task_id()) || doomed.contains(&edge.dependent_task_id())
            })
            .collect();
        for edge in edges {
            self.dependencies.remove(edge);
        }
        for id in doomed {
            self.tasks.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn staged_rows_shadow_committed_rows() {
        let mut committed = HashMap::from([(1_u8, "a"), (2, "b")]);
        let mut staged = Staged::default();
        staged.put(2, "B");
        staged.remove(1);
        staged.put(3, "c");

        let mut merged: Vec<&str> = staged.scan(&committed).copied().collect();
        merged.sort_unstable();
        assert_eq!(merged, vec!["B", "c"]);
        assert!(!staged.contains(&committed, &1));
        assert_eq!(staged.get(&committed, &2), Some("B"));

        staged.apply(&mut committed);
        assert_eq!(committed, HashMap::from([(2, "B"), (3, "c")]));
    }
}
