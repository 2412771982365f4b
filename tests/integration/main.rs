//! HTTP integration tests against the in-memory token store.

mod auth_test;
mod health_test;
mod helpers;
