// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! The safety rules: the one place deciding whether a vote is safe to cast.
//!
//! [`SafetyRules`] owns the validator's [`SafetyState`]. Every change to it is persisted through
//! the [`SafetyStateStore`] before it is adopted, and before any vote derived from it is
//! returned. A crash at any point therefore leaves a persisted state at least as restrictive as
//! every vote that left the process.

use std::{sync::Arc, time::Instant};

use bulwark_types::{
    consensus::{SafetyMetricsValue, SafetyState},
    data::{BftHeader, HighQc, QuorumCertificate, ViewNumber, VoteData},
    error::SafetyError,
    traits::{HashSigner, SafetyStateStore, SignatureKey, Vertex},
    vote::{HasViewNumber, Proposal, TimeoutData, Vote},
};
use committable::Committable;
use tracing::{debug, error, info, instrument, warn};

use crate::helpers::{commit_candidate, validate_chain, validate_vertex};

/// Manages safety of the protocol for a single validator.
pub struct SafetyRules<KEY, SIGNER, STORE>
where
    KEY: SignatureKey,
    SIGNER: HashSigner<KEY>,
    STORE: SafetyStateStore<KEY>,
{
    /// The validator these rules vote for
    public_key: KEY,
    /// Signs votes, timeouts and proposals
    signer: SIGNER,
    /// Durable copy of `state`
    storage: STORE,
    /// The current, persisted safety state
    state: SafetyState<KEY>,
    /// Votes, refusals and store activity
    metrics: Arc<SafetyMetricsValue>,
}

impl<KEY, SIGNER, STORE> SafetyRules<KEY, SIGNER, STORE>
where
    KEY: SignatureKey,
    SIGNER: HashSigner<KEY>,
    STORE: SafetyStateStore<KEY>,
{
    /// Create the rules from a known state. `initial_state` must be the state `storage` holds.
    pub fn new(
        public_key: KEY,
        initial_state: SafetyState<KEY>,
        storage: STORE,
        signer: SIGNER,
    ) -> Self {
        Self {
            public_key,
            signer,
            storage,
            state: initial_state,
            metrics: Arc::default(),
        }
    }

    /// Report to `metrics` instead of discarding measurements
    #[must_use]
    pub fn with_metrics(self, metrics: Arc<SafetyMetricsValue>) -> Self {
        metrics.update_views(&self.state);
        Self { metrics, ..self }
    }

    /// Create the rules from the state in `storage`, or from the genesis state if nothing was
    /// ever stored.
    ///
    /// # Errors
    /// If the stored state cannot be read. Starting from genesis in that case could repeat votes
    /// the validator already cast.
    pub fn load(public_key: KEY, storage: STORE, signer: SIGNER) -> Result<Self, SafetyError> {
        let state = match storage.load() {
            Ok(Some(state)) => {
                info!(
                    "Loaded safety state: last voted view {}, locked view {}",
                    state.last_voted_view(),
                    state.locked_view()
                );
                state
            }
            Ok(None) => {
                info!("No persisted safety state, starting from genesis");
                SafetyState::initial()
            }
            Err(e) => {
                error!("Failed to load persisted safety state: {e}");
                return Err(e.into());
            }
        };
        Ok(Self::new(public_key, state, storage, signer))
    }

    /// The current safety state
    pub fn state(&self) -> &SafetyState<KEY> {
        &self.state
    }

    /// The validator these rules vote for
    pub fn public_key(&self) -> &KEY {
        &self.public_key
    }

    /// Make sure the vertex does not violate an earlier vote
    fn check_last_voted<V: Vertex>(&self, vertex: &V) -> bool {
        if vertex.view() <= self.state.last_voted_view() {
            warn!(
                "Safety warning: vertex at view {} violates earlier vote at view {}",
                vertex.view(),
                self.state.last_voted_view()
            );
            return false;
        }
        true
    }

    /// Make sure the vertex extends a branch at or above the locked view
    fn check_locked<V: Vertex>(&self, vertex: &V) -> bool {
        if vertex.parent_header().view() < self.state.locked_view() {
            warn!(
                "Safety warning: vertex at view {} with parent at view {} does not respect locked view {}",
                vertex.view(),
                vertex.parent_header().view(),
                self.state.locked_view()
            );
            return false;
        }
        true
    }

    /// Persist `next`, then adopt it.
    fn commit_state(&mut self, next: SafetyState<KEY>) -> Result<(), SafetyError> {
        let start = Instant::now();
        let stored = self.storage.store(&next);
        self.metrics
            .safety_store_time
            .add_point(start.elapsed().as_secs_f64());
        if let Err(e) = stored {
            error!(
                "Failed to persist safety state for view {}, halting votes: {e}",
                next.last_voted_view()
            );
            return Err(e.into());
        }
        self.metrics.safety_store_saves.add(1);
        self.metrics.update_views(&next);
        self.state = next;
        Ok(())
    }

    /// Sign `hash`, turning a signer failure into a fatal error
    fn sign(
        &self,
        what: &'static str,
        view: ViewNumber,
        hash: &[u8],
    ) -> Result<KEY::Signature, SafetyError> {
        self.signer.sign(hash).map_err(|e| {
            error!("Failed to sign {what} for view {view}: {e:#}");
            SafetyError::Signing {
                what,
                view,
                reason: format!("{e:#}"),
            }
        })
    }

    /// Sign a vote for `vertex`, without any safety check or state change
    fn create_vote<V: Vertex>(
        &self,
        vertex: &V,
        proposed_header: BftHeader,
        timestamp: u64,
        high_qc: &HighQc,
    ) -> Result<Vote<KEY>, SafetyError> {
        let vote_data = VoteData::new(
            proposed_header,
            vertex.parent_header().clone(),
            commit_candidate(vertex),
        );
        let vote_hash = Vote::<KEY>::hash_of_data(&vote_data, timestamp);
        let signature = self.sign("vote", vertex.view(), vote_hash.as_ref())?;

        Ok(Vote::new(
            self.public_key.clone(),
            vote_data,
            timestamp,
            signature,
            high_qc.clone(),
            None,
        ))
    }

    /// Vote for a proposed vertex while ensuring that safety invariants are upheld.
    ///
    /// `proposed_header` is the result of executing the vertex, `timestamp` the vote time in
    /// milliseconds since the unix epoch, and `high_qc` our current sync state.
    ///
    /// Returns `Ok(None)` when voting would be unsafe: the vertex is not newer than our last
    /// vote, or its parent is below our locked view. Refusals are expected and not retried.
    ///
    /// # Errors
    /// If the vertex is malformed, or the vote cannot be signed or persisted. The safety state
    /// is unchanged in every error case and no vote is released.
    #[instrument(skip_all, fields(view = %vertex.view()))]
    pub fn vote_for<V: Vertex>(
        &mut self,
        vertex: &V,
        proposed_header: BftHeader,
        timestamp: u64,
        high_qc: &HighQc,
    ) -> Result<Option<Vote<KEY>>, SafetyError> {
        validate_vertex(vertex, &proposed_header)?;

        if !self.check_last_voted(vertex) || !self.check_locked(vertex) {
            self.metrics.refusals.add(1);
            return Ok(None);
        }

        let vote = self.create_vote(vertex, proposed_header, timestamp, high_qc)?;

        let next = self
            .state
            .to_builder()
            .locked_view(vertex.parent_header().view())
            .voted(vote.clone())
            .build();
        self.commit_state(next)?;
        self.metrics.votes.add(1);

        debug!(
            "Voted for view {} (locked view {}, commits {:?})",
            vote.view_number(),
            self.state.locked_view(),
            vote.vote_data().committed().map(BftHeader::view)
        );
        Ok(Some(vote))
    }

    /// Extend `vote` with a timeout signature, recording that we timed out in its view.
    ///
    /// Timing out never advances the last voted or locked view. Timing out a vote that already
    /// carries a timeout signature, or timing out the same vote twice, returns the same timeout
    /// vote without signing again. A vote by another validator, or from a view before our last
    /// vote, is returned unchanged.
    ///
    /// # Errors
    /// If the timeout cannot be signed or persisted. The safety state is unchanged in either
    /// case.
    #[instrument(skip_all, fields(view = %vote.view_number()))]
    pub fn timeout_vote(&mut self, vote: Vote<KEY>) -> Result<Vote<KEY>, SafetyError> {
        if vote.is_timeout() {
            return Ok(vote);
        }

        if vote.author() != &self.public_key {
            warn!("Refusing to time out a vote by another validator");
            self.metrics.refusals.add(1);
            return Ok(vote);
        }
        if vote.view_number() < self.state.last_voted_view() {
            warn!(
                "Refusing to time out view {}, already voted in view {}",
                vote.view_number(),
                self.state.last_voted_view()
            );
            self.metrics.refusals.add(1);
            return Ok(vote);
        }

        if let Some(last_vote) = self.state.last_vote() {
            if last_vote.is_timeout() && last_vote.without_timeout_signature() == vote {
                return Ok(last_vote.clone());
            }
        }

        let timeout_hash = TimeoutData::of(&vote).commit();
        let timeout_signature = self.sign("timeout", vote.view_number(), timeout_hash.as_ref())?;
        let timeout_vote = vote.with_timeout_signature(timeout_signature);

        let next = self.state.to_builder().last_vote(timeout_vote.clone()).build();
        self.commit_state(next)?;
        self.metrics.timeouts.add(1);

        debug!("Timed out in view {}", timeout_vote.view_number());
        Ok(timeout_vote)
    }

    /// Create a signed proposal from a vertex.
    ///
    /// Returns `Ok(None)` when the vertex's parent is below our locked view. Proposing does not
    /// change the safety state.
    ///
    /// # Errors
    /// If the vertex is malformed, or the proposal cannot be signed
    #[instrument(skip_all, fields(view = %vertex.view()))]
    pub fn sign_proposal<V: Vertex>(
        &self,
        vertex: &V,
        highest_committed_qc: &QuorumCertificate,
    ) -> Result<Option<Proposal<KEY>>, SafetyError> {
        validate_chain(vertex)?;

        if !self.check_locked(vertex) {
            self.metrics.refusals.add(1);
            return Ok(None);
        }

        let signature = self.sign("proposal", vertex.view(), vertex.id().as_ref())?;
        Ok(Some(Proposal {
            vertex_id: *vertex.id(),
            view_number: vertex.view(),
            highest_committed_qc: highest_committed_qc.clone(),
            signature,
        }))
    }

    /// The last vote, if it was cast in `view`
    pub fn last_vote(&self, view: ViewNumber) -> Option<&Vote<KEY>> {
        self.state
            .last_vote()
            .filter(|last_vote| last_vote.view_number() == view)
    }

    /// Close the underlying store
    ///
    /// # Errors
    /// If the store fails to close
    pub fn close(&mut self) -> Result<(), SafetyError> {
        Ok(self.storage.close()?)
    }
}
