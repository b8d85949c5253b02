// handlers/protected/mod.rs - Handlers behind the shared-secret gate
//
// Route Prefix: /api/v1/*
// Middleware: api_key_middleware (route layer), request logging, CORS

pub mod advanced;  // Group aliases, log/CID/URL/preset edits, call lookups
pub mod campaigns; // Campaign reads and updates, hopper
pub mod dnc;       // Do-not-call and filter phone groups
pub mod kpi;       // Disposition aggregation
pub mod leads;
pub mod lists;
pub mod phones;    // Phones, phone aliases, inbound DIDs
pub mod reporting; // Recordings, call logs, exports, blind monitor
pub mod sip;
pub mod system;    // Audio, MOH, voicemail, inbound groups, containers
pub mod test_call;
pub mod users;     // Users, agents, remote agents
pub mod version;
