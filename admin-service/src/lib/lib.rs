//! Admin backend auth core.
//!
//! Orchestrates the token and password primitives from the `auth` crate
//! behind domain ports: login/refresh/change-password flows and the
//! consent-gating guard pipeline. Persistence and HTTP live behind the
//! ports in `domain::*::ports`.

pub mod config;
pub mod domain;
