//! Typed per-entity CRUD (§C1), the append-only status journal (§C2), and
//! advisory locking, with in-memory and Postgres implementations of each.

pub mod dao;
pub mod entity;
mod entity_impls;
pub mod error;
pub mod journal;
pub mod lock;
pub mod memory;
pub mod postgres;
pub mod session;
mod stores;

pub use cloudcore_domain::constants::TOTAL_LIMIT;
pub use dao::Dao;
pub use entity::{Entity, ListFilter, Page, PageRequest};
pub use error::StoreError;
pub use journal::StatusJournal;
pub use lock::AdvisoryLocks;
pub use session::{InMemorySession, PostgresSession, Session, Tx};
pub use stores::Stores;
