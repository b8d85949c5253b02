pub mod auth;
pub mod logging;
pub mod response;

pub use auth::{api_key_middleware, CallerLabel};
pub use logging::{init_tracing, request_logger};
pub use response::{ApiResponse, ApiResult};
