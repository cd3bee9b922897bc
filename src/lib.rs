//! Switchboard - Context-Aware Intent Routing & Conversation Memory Engine
//!
//! Routes free-text utterances, turn by turn, to specialized request
//! handlers while keeping enough per-session state to resolve incomplete
//! requests ("set a reminder" → "6am") without the caller resending full
//! context.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
