pub mod client;
pub mod error;
pub mod http;
pub mod memory;

pub use client::ApiClient;
pub use error::{classify_error, ApiError};
pub use http::HttpApi;
pub use memory::MemoryApi;
