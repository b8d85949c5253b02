// handlers/public/mod.rs - Handlers reachable without an API key
//
// Route Prefix: none (e.g. /health)

pub mod health;

pub use health::health;
