//! # sceneguard-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small JSON API for operators and trigger sources
//!   (`/api/status`, `/api/statistics`, `/api/inventory/reload`,
//!   `/api/activations`)
//! - Map HTTP requests into validator control calls and activation notices
//!   (driving adapter)
//! - Map [`SceneGuardError`](sceneguard_domain::error::SceneGuardError) into
//!   status codes
//!
//! ## Dependency rule
//! Depends on `sceneguard-app` (for port traits) and `sceneguard-domain`
//! (for types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
