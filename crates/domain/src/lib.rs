//! # sceneguard-domain
//!
//! Pure domain model for the sceneguard scene validator.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Scenes** (per-entity target states) and **Observed state**
//! - Compare targets against observations within **Tolerances**
//! - The gate state machines: activation detector, scene filter,
//!   rate limiter, circuit breaker
//! - Validation **Outcomes** and running **Statistics**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod activation;
pub mod circuit_breaker;
pub mod comparator;
pub mod filter;
pub mod observed;
pub mod outcome;
pub mod rate_limit;
pub mod scene;
pub mod stats;
pub mod status;
