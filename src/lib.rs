//! Client-side state for a themes → projects → tasks organiser backed by a hosted table store.
//!
//! [`Repository`] mirrors the remote tables and owns every mutation; [`views`] derives the
//! dashboard and list views from a [`views::Snapshot`] of it.

pub mod error;
pub mod models;
pub mod remote;
pub mod repository;
pub mod utils;
pub mod views;

pub use error::{Error, Result};
pub use remote::{HttpStore, RemoteStore};
pub use repository::Repository;
