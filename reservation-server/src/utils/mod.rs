//! Utilities: logging, time parsing, body extraction and input validation

pub mod extract;
pub mod logger;
pub mod time;
pub mod validation;

pub use extract::JsonBody;
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
