// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-server daily reply quota and per-channel cooldown tracking.
//!
//! All methods take `now` explicitly so tests never depend on the wall
//! clock. Day buckets use the UTC calendar date; the quota resets at
//! midnight UTC. Daily counters write through to `rate_state` and are
//! re-hydrated on startup; cooldown timestamps are in-memory only, so a
//! restart clears them.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use emcee_core::EmceeError;
use emcee_storage::Database;
use emcee_storage::queries::rate;
use tracing::debug;

/// Formats the UTC day bucket a timestamp falls into.
fn bucket_for(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Tracks how much the agent has spoken, per server and per channel.
pub struct RateLimiter {
    db: Database,
    /// server_id -> (day bucket, replies sent in that bucket).
    counts: HashMap<String, (String, u32)>,
    /// channel_id -> time of the agent's last reply there.
    cooldowns: HashMap<String, DateTime<Utc>>,
}

impl RateLimiter {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            counts: HashMap::new(),
            cooldowns: HashMap::new(),
        }
    }

    /// Re-hydrate today's counter for a server from storage.
    ///
    /// Called once per configured community at startup so the daily cap
    /// survives restarts.
    pub async fn hydrate(&mut self, server_id: &str, now: DateTime<Utc>) -> Result<(), EmceeError> {
        let bucket = bucket_for(now);
        let count = rate::count_for_bucket(&self.db, server_id, &bucket).await?;
        debug!(server_id, bucket = bucket.as_str(), count, "rate limiter hydrated");
        self.counts.insert(server_id.to_string(), (bucket, count));
        Ok(())
    }

    /// Whether the server still has daily quota left.
    ///
    /// Stale buckets reset lazily: the first check after midnight UTC sees a
    /// fresh counter, no timer needed.
    pub fn can_respond(&mut self, server_id: &str, limit: u32, now: DateTime<Utc>) -> bool {
        self.count_today(server_id, now) < limit
    }

    /// Whether the channel is still inside its cooldown window.
    pub fn in_cooldown(&self, channel_id: &str, cooldown: Duration, now: DateTime<Utc>) -> bool {
        match self.cooldowns.get(channel_id) {
            Some(last) => {
                let elapsed = now.signed_duration_since(*last);
                elapsed < chrono::Duration::from_std(cooldown).unwrap_or(chrono::Duration::MAX)
            }
            None => false,
        }
    }

    /// Record an actually sent reply.
    ///
    /// Must be called exactly once per send, after the quality filter
    /// accepted the draft; suppressed replies never charge the quota.
    pub async fn record_response(
        &mut self,
        server_id: &str,
        channel_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), EmceeError> {
        let count = self.count_today(server_id, now) + 1;
        let bucket = bucket_for(now);
        self.counts
            .insert(server_id.to_string(), (bucket.clone(), count));
        self.cooldowns.insert(channel_id.to_string(), now);
        rate::increment_bucket(&self.db, server_id, &bucket).await
    }

    /// Replies sent for a server today, rolling the bucket over if the UTC
    /// day has changed since the last check.
    fn count_today(&mut self, server_id: &str, now: DateTime<Utc>) -> u32 {
        let bucket = bucket_for(now);
        if let Some((cached_bucket, count)) = self.counts.get(server_id)
            && *cached_bucket == bucket
        {
            return *count;
        }
        self.counts.insert(server_id.to_string(), (bucket, 0));
        0
    }
}
