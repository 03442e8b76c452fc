//! Topic rotation scheduling
//!
//! This module selects the study topic for each run from a month-keyed pool
//! without repetition until the pool is exhausted, surviving process
//! restarts through a persisted state record.
//!
//! # Overview
//!
//! Each month has a pool of topics (months without one use the default
//! pool). At selection time the scheduler loads the persisted
//! `{ period, pending }` state; when the state is absent, belongs to another
//! month, or the pending list has run dry, a fresh copy of the month's pool
//! is shuffled into `pending`. The front label is popped and the shortened
//! state is written back atomically before the topic is returned.
//!
//! The shuffle is seeded from the calendar date (ChaCha8), so a reshuffle on
//! a given day is reproducible; the pop itself is deterministic. Once a pool
//! is exhausted the rotation intentionally starts a repeat pass rather than
//! idling.

pub mod error;
mod pools;
mod state;

use chrono::{Datelike, NaiveDate};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use error::{SchedulerError, SchedulerResult};
pub use pools::TopicPools;
pub use state::{RotationState, StateStore};

use crate::config::ScheduleConfig;

/// Rotation scheduler over month-keyed topic pools
pub struct TopicScheduler {
    pools: TopicPools,
    store: StateStore,
}

impl TopicScheduler {
    /// Create a scheduler from pools and a state store
    pub fn new(pools: TopicPools, store: StateStore) -> Self {
        Self { pools, store }
    }

    /// Create a scheduler from the schedule configuration section
    pub fn from_config(config: &ScheduleConfig) -> SchedulerResult<Self> {
        let pools = TopicPools::with_overrides(&config.pools)?;
        let store = StateStore::new(config.state_path.clone());
        Ok(Self::new(pools, store))
    }

    /// Select today's topic and persist the advanced rotation state
    pub fn select_topic(&self, today: NaiveDate) -> SchedulerResult<String> {
        let (topic, next_state) = self.plan(today)?;
        self.store.save(&next_state)?;

        tracing::info!(
            topic = %topic,
            period = next_state.period,
            remaining = next_state.pending.len(),
            "Topic selected"
        );
        Ok(topic)
    }

    /// Compute today's topic without mutating any state (dry-run path)
    pub fn preview_topic(&self, today: NaiveDate) -> SchedulerResult<String> {
        self.plan(today).map(|(topic, _)| topic)
    }

    /// Snapshot of the persisted rotation state, if any
    pub fn current_state(&self) -> Option<RotationState> {
        self.store.load()
    }

    /// The configured pools
    pub fn pools(&self) -> &TopicPools {
        &self.pools
    }

    fn plan(&self, today: NaiveDate) -> SchedulerResult<(String, RotationState)> {
        let period = today.month();
        let pool = self.pools.for_period(period);
        if pool.is_empty() {
            return Err(SchedulerError::EmptyPool { period });
        }

        let mut pending = match self.store.load() {
            Some(state) if state.period == period => {
                let mut pending = state.pending;
                // pending stays a subset of the active pool even if the pool
                // was reconfigured mid-month
                pending.retain(|label| pool.contains(label));
                pending
            }
            _ => self.shuffled(pool, today),
        };

        if pending.is_empty() {
            // Pool exhausted: begin a repeat pass
            pending = self.shuffled(pool, today);
            tracing::debug!(period, "Pool exhausted, reshuffling for repeat pass");
        }

        let topic = pending.remove(0);
        Ok((topic, RotationState::new(period, pending)))
    }

    /// Shuffle a fresh copy of the pool, seeded from the date
    fn shuffled(&self, pool: &[String], date: NaiveDate) -> Vec<String> {
        let seed = date.num_days_from_ce() as u64;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut order: Vec<String> = pool.to_vec();
        order.shuffle(&mut rng);
        order
    }
}
