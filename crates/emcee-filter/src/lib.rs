// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply quality filtering for the emcee agent.
//!
//! A generated draft must not read like assistant boilerplate. The
//! [`QualityFilter`] rejects drafts that are too long, use stock assistant
//! phrases, shout in exclamation marks, or format themselves into bullet
//! lists, and asks a cheap classification call to judge the rest.

pub mod filter;

pub use filter::{QualityFilter, RejectReason};
