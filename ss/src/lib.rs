//! SessionStore - local blob store for wizard session records
//!
//! Persists one JSON blob per wizard session, keyed by the generated session
//! identifier. Saves replace the prior blob entirely - there is no append and
//! no versioning. The store is the local leg of the persistence boundary; a
//! remote leg (when configured) lives in the main crate and falls back here.
//!
//! # Architecture
//!
//! ```text
//! .sessionstore/
//! ├── {session_id}.json
//! ├── {session_id}.json
//! └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sessionstore::{SessionRecord, SessionStore};
//!
//! let store = SessionStore::open(".sessionstore")?;
//! let record = SessionRecord::new("0192e4c2-...".to_string());
//! store.save(&record)?;
//! let loaded = store.load(&record.session_id)?;
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{SessionId, SessionRecord, SessionStore, SessionSummary, StoredMessage, VisionMission};
