// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (X-API-Key / api_key shared secret)

pub mod public;    // Tier 1: /health
pub mod protected; // Tier 2: /api/v1/*
