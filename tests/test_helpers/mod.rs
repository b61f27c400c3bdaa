//! Scoped process environment overrides for integration tests.

use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Applies environment overrides until dropped, then restores the previous
/// values. Holds a process-wide lock so overrides never interleave.
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Sets (`Some`) or clears (`None`) each variable.
    pub fn apply(overrides: &[(&str, Option<&str>)]) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let saved = overrides
            .iter()
            .map(|(key, value)| {
                let previous = env::var(key).ok();
                write_var(key, *value);
                ((*key).to_owned(), previous)
            })
            .collect();
        Self { saved, _lock: lock }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            write_var(&key, previous.as_deref());
        }
    }
}

fn write_var(key: &str, value: Option<&str>) {
    unsafe {
        // SAFETY: ENV_LOCK serializes every environment mutation in tests.
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}
