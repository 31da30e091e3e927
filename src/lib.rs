pub mod analytics;
pub mod config;
pub mod error;
pub mod export;
pub mod invoice;
pub mod model;
pub mod pdf;
pub mod state;
pub mod store;

pub use config::{Company, Config};
pub use error::{CrmError, Result};
pub use state::AppState;
pub use store::{open_store, Collection, DocumentStore};
