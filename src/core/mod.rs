pub mod config;
pub mod error;
pub mod types;

pub use config::{config, AssistConfig};
pub use error::{AssistError, CollaboratorFailure, Result};
pub use types::*;
