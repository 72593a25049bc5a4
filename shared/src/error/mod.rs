//! Error codes and the API envelope shared by server and clients
//!
//! | Range | Area |
//! |-------|------|
//! | 0xxx | general (validation, malformed request) |
//! | 4xxx | orders, lines, status |
//! | 6xxx | dishes |
//! | 7xxx | tables |
//! | 9xxx | system (database, timeouts, config) |
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::InvalidQuantity).with_detail("quantity", 0);
//! let body: ApiResponse<()> = err.into();
//! assert_eq!(body.code, 4010);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult, ErrorDetails};
