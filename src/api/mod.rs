pub mod extract;

pub use extract::{or_default, parse_id, parse_limit, ApiJson, ApiQuery};
