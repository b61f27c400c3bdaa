//! Diesel schema for workspace persistence.

diesel::table! {
    /// Registered users.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Login name.
        #[max_length = 255]
        username -> Varchar,
        /// Contact address.
        #[max_length = 255]
        email -> Varchar,
    }
}

diesel::table! {
    /// Seeded board roles.
    roles (id) {
        /// Role identifier.
        id -> Uuid,
        /// Canonical role name.
        #[max_length = 50]
        name -> Varchar,
    }
}

diesel::table! {
    /// Boards.
    boards (id) {
        /// Board identifier.
        id -> Uuid,
        /// Creating user.
        owner_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Privacy flag.
        is_private -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered board columns.
    board_columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Display name, unique per board.
        #[max_length = 255]
        name -> Varchar,
        /// 1-based ordinal position.
        position -> Int4,
        /// Final-column flag.
        is_final -> Bool,
    }
}

diesel::table! {
    /// Board membership rows.
    board_members (id) {
        /// Membership identifier.
        id -> Uuid,
        /// Board.
        board_id -> Uuid,
        /// Member user.
        user_id -> Uuid,
        /// Granted role.
        role_id -> Uuid,
        /// Join timestamp.
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks and subtasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Holding column.
        column_id -> Uuid,
        /// Parent task for subtasks.
        parent_id -> Nullable<Uuid>,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form description.
        description -> Nullable<Text>,
        /// Creating user.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed task dependency edges.
    task_dependencies (task_id, dependent_task_id) {
        /// Prerequisite task.
        task_id -> Uuid,
        /// Dependent task.
        dependent_task_id -> Uuid,
    }
}

diesel::joinable!(board_columns -> boards (board_id));
diesel::joinable!(board_members -> boards (board_id));
diesel::joinable!(board_members -> roles (role_id));
diesel::joinable!(tasks -> board_columns (column_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    roles,
    boards,
    board_columns,
    board_members,
    tasks,
    task_dependencies,
);
