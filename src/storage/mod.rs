//! Persistence for notes and extracted action items.

pub mod action_store;

pub use action_store::{ActionItemStore, SqliteActionItemStore, StoreFuture};
