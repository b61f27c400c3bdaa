//! Unit tests for the workspace domain and services.

mod support;
mod task_tests;
