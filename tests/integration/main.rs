//! End-to-end tests driving the HTTP router against an in-memory catalog
//! and a local content directory.

mod folders_test;
mod health_test;
mod helpers;
