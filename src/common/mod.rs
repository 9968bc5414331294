pub mod api_client;
pub mod config;
pub mod error;
pub mod session;

pub use api_client::ApiClient;
pub use config::{get_runtime_config, RuntimeConfig};
pub use error::{ApiError, Rejection};
pub use session::{FileSession, MemorySession, SessionError, SessionStore};
