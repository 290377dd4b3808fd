//! # SipDB
//!
//! A minimal drink inventory manager: one SQLite table, a terminal
//! interface, and a REST API that both drive the same store.
//!
//! ## Core Components
//!
//! - **Sip-Store**: the persistent drinks table with its CRUD operations
//! - **Drink Entity**: field validation and persistence helpers
//! - **Command Interface**: terminal verbs (`create_db`, `add`, `list`, ...)
//! - **Sip-API**: the `/drinks` resource powered by Axum

pub mod api;
pub mod cli;
pub mod db;
pub mod drink;
pub mod error;

pub use error::{SipError, SipResult};
