// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply gating for the emcee agent.
//!
//! This crate provides:
//! - [`Router`]: the rule/classifier hybrid that decides whether to reply
//! - [`RateLimiter`]: per-server daily quota and per-channel cooldowns
//! - [`heuristics`]: zero-cost question detection
//!
//! The gate runs before any generation work: free rules short-circuit
//! obvious cases, and only ambient chatter that clears quota and cooldown
//! spends a cheap classification call.

pub mod heuristics;
pub mod limiter;
pub mod router;

pub use limiter::RateLimiter;
pub use router::{RouteDecision, RouteReason, Router};
