//! Interakt webhook integration module
//!
//! Receives inbound chat events from Interakt, finds the user's text in
//! whatever payload shape was delivered, decides whether it deserves a reply
//! and answers with that reply in the HTTP response.
//!
//! ## Submodules
//!
//! - [`extractor`] - Ordered candidate paths where the message text may live
//! - [`routing`] - Marker / greeting / acknowledgment rules producing a [`routing::RoutingDecision`]
//! - [`composer`] - Canned or generated reply for a decision
//! - [`handler`] - The whole pipeline behind a panic boundary
//! - [`payload`] - Best-effort body reinterpretation (JSON, form, double-encoded)
//! - [`routes`] - HTTP endpoint (includes the optional HMAC check)
//! - [`schemas`] - Response envelope
//! - [`security`] - HMAC-SHA256 signature verification

pub mod composer;
pub mod errors;
pub mod extractor;
pub mod handler;
pub mod payload;
pub mod routes;
pub mod routing;
pub mod schemas;
pub mod security;

pub use routes::receive;
