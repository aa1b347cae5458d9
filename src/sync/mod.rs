//! Session sync layer.
//!
//! A [`SessionClient`] seeds its observation from the session record, then
//! folds the record's change stream. Local actions are writes; nothing is
//! applied locally until the store echoes it back.

mod client;

pub use client::{SessionClient, SyncEvent};
