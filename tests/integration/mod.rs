//! End-to-end tests driving the `aikit` binary against temporary projects and toolkits

#[path = "../common/mod.rs"]
mod common;

mod generate;
mod list;
mod resolve;
mod validate;
