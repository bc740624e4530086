pub mod json_store;
pub mod stores;

pub use json_store::{Record, store_dir};
pub use stores::{ArchiveStore, CompletionStore, NotificationStateStore, archive_key};
