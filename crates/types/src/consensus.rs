// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Provides the safety state, the only state the safety rules persist.

use serde::{Deserialize, Serialize};

use crate::{
    data::ViewNumber,
    traits::{
        metrics::{Counter, Gauge, Histogram, Metrics, NoMetrics},
        signature_key::SignatureKey,
    },
    vote::{HasViewNumber, Vote},
};

/// The state required to guarantee safety of the protocol across restarts.
///
/// Both views only ever increase over the lifetime of a validator, including across restarts,
/// since the value is persisted before the engine adopts it. Values are compared structurally.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(bound(deserialize = ""))]
pub struct SafetyState<KEY: SignatureKey> {
    /// Highest view this validator voted in
    last_voted_view: ViewNumber,
    /// Highest view this validator will not contradict
    locked_view: ViewNumber,
    /// The last vote cast, with its timeout signature if the view timed out
    last_vote: Option<Vote<KEY>>,
}

impl<KEY: SignatureKey> SafetyState<KEY> {
    /// Create a state with the given values
    #[must_use]
    pub fn new(
        last_voted_view: ViewNumber,
        locked_view: ViewNumber,
        last_vote: Option<Vote<KEY>>,
    ) -> Self {
        Self {
            last_voted_view,
            locked_view,
            last_vote,
        }
    }

    /// The state of a validator that never voted
    #[must_use]
    pub fn initial() -> Self {
        Self::new(ViewNumber::genesis(), ViewNumber::genesis(), None)
    }

    /// Start deriving the next state from this one
    #[must_use]
    pub fn to_builder(&self) -> SafetyStateBuilder<KEY> {
        SafetyStateBuilder {
            last_voted_view: self.last_voted_view,
            locked_view: self.locked_view,
            last_vote: self.last_vote.clone(),
        }
    }

    /// Highest view this validator voted in
    #[must_use]
    pub fn last_voted_view(&self) -> ViewNumber {
        self.last_voted_view
    }

    /// Highest view this validator will not contradict
    #[must_use]
    pub fn locked_view(&self) -> ViewNumber {
        self.locked_view
    }

    /// The last vote cast
    #[must_use]
    pub fn last_vote(&self) -> Option<&Vote<KEY>> {
        self.last_vote.as_ref()
    }
}

impl<KEY: SignatureKey> Default for SafetyState<KEY> {
    fn default() -> Self {
        Self::initial()
    }
}

/// Derives a new [`SafetyState`]. Views can only be advanced, never lowered.
#[derive(Clone, Debug)]
pub struct SafetyStateBuilder<KEY: SignatureKey> {
    /// Pending last voted view
    last_voted_view: ViewNumber,
    /// Pending locked view
    locked_view: ViewNumber,
    /// Pending last vote
    last_vote: Option<Vote<KEY>>,
}

impl<KEY: SignatureKey> SafetyStateBuilder<KEY> {
    /// Raise the locked view to `view`, if it is higher than the current one
    #[must_use]
    pub fn locked_view(mut self, view: ViewNumber) -> Self {
        self.locked_view = self.locked_view.max(view);
        self
    }

    /// Raise the last voted view to `view`, if it is higher than the current one
    #[must_use]
    pub fn last_voted_view(mut self, view: ViewNumber) -> Self {
        self.last_voted_view = self.last_voted_view.max(view);
        self
    }

    /// Replace the last vote. The views are carried forward unchanged.
    #[must_use]
    pub fn last_vote(mut self, vote: Vote<KEY>) -> Self {
        self.last_vote = Some(vote);
        self
    }

    /// Replace the last vote and raise the last voted view to the vote's view
    #[must_use]
    pub fn voted(self, vote: Vote<KEY>) -> Self {
        let view = vote.view_number();
        self.last_vote(vote).last_voted_view(view)
    }

    /// Finish the new state
    #[must_use]
    pub fn build(self) -> SafetyState<KEY> {
        SafetyState {
            last_voted_view: self.last_voted_view,
            locked_view: self.locked_view,
            last_vote: self.last_vote,
        }
    }
}

/// Contains the metrics the safety rules and their store report
#[derive(Clone, Debug)]
pub struct SafetyMetricsValue {
    /// Number of votes cast
    pub votes: Box<dyn Counter>,
    /// Number of votes, timeouts and proposals refused as unsafe
    pub refusals: Box<dyn Counter>,
    /// Number of views timed out
    pub timeouts: Box<dyn Counter>,
    /// Number of safety states persisted
    pub safety_store_saves: Box<dyn Counter>,
    /// Bytes of safety state written to disk
    pub safety_store_bytes_written: Box<dyn Counter>,
    /// Bytes of safety state read from disk
    pub safety_store_bytes_read: Box<dyn Counter>,
    /// Seconds spent persisting each safety state
    pub safety_store_time: Box<dyn Histogram>,
    /// The last voted view
    pub last_voted_view: Box<dyn Gauge>,
    /// The locked view
    pub locked_view: Box<dyn Gauge>,
}

impl SafetyMetricsValue {
    /// Create a new instance of this [`SafetyMetricsValue`] struct, setting all the counters and gauges
    #[must_use]
    pub fn new(metrics: &dyn Metrics) -> Self {
        Self {
            votes: metrics.create_counter(String::from("votes"), None),
            refusals: metrics.create_counter(String::from("refusals"), None),
            timeouts: metrics.create_counter(String::from("timeouts"), None),
            safety_store_saves: metrics.create_counter(String::from("safety_store_saves"), None),
            safety_store_bytes_written: metrics.create_counter(
                String::from("safety_store_bytes_written"),
                Some(String::from("bytes")),
            ),
            safety_store_bytes_read: metrics.create_counter(
                String::from("safety_store_bytes_read"),
                Some(String::from("bytes")),
            ),
            safety_store_time: metrics.create_histogram(
                String::from("safety_store_time"),
                Some(String::from("seconds")),
            ),
            last_voted_view: metrics.create_gauge(String::from("last_voted_view"), None),
            locked_view: metrics.create_gauge(String::from("locked_view"), None),
        }
    }

    /// Report the views of `state`
    pub fn update_views<KEY: SignatureKey>(&self, state: &SafetyState<KEY>) {
        self.last_voted_view
            .set(usize::try_from(state.last_voted_view().u64()).unwrap_or(usize::MAX));
        self.locked_view
            .set(usize::try_from(state.locked_view().u64()).unwrap_or(usize::MAX));
    }
}

impl Default for SafetyMetricsValue {
    fn default() -> Self {
        Self::new(&*NoMetrics::boxed())
    }
}
