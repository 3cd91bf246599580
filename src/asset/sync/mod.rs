pub mod batch;
pub mod config;
pub mod content;
pub mod error;
pub mod io;
pub mod manager;
pub mod mapper;
pub mod model;
pub mod reconcile;
pub mod schema;

pub use error::{Reported, Result, SyncError, Warning};
