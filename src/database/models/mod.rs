//! Row and request shapes for the dialer tables the API touches.
//!
//! The schema is owned by the dialer itself; these types only describe the
//! columns read or written here.

pub mod campaign;
pub mod lead;
pub mod list;
pub mod phone;
pub mod reporting;
pub mod sip;
pub mod system;
pub mod user;
