//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into author registration and activation flows.
//! - Keep callers decoupled from storage details.

pub mod author_service;
