//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as RFC 3339 strings.
//! - Field names are camelCase.
//! - Secrets such as password hashes are never included.

pub mod admin;
pub mod auth;
pub mod candidate;
pub mod election;
pub mod id;
pub mod vote;
pub mod voter;

