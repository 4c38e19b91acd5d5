// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Vote and proposal types produced by the safety rules

use committable::{Commitment, Committable, RawCommitmentBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    data::{HighQc, QuorumCertificate, VertexId, ViewNumber, VoteData},
    traits::signature_key::SignatureKey,
};

/// Any type that is associated with a view
pub trait HasViewNumber {
    /// Returns the view number the type refers to.
    fn view_number(&self) -> ViewNumber;
}

/// The vote data together with the timestamp of the vote. This is what a vote signature covers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Hash, Eq)]
pub struct TimestampedVoteData {
    /// The data voted on
    pub vote_data: VoteData,
    /// Vote timestamp, in milliseconds since the unix epoch
    pub timestamp: u64,
}

impl Committable for TimestampedVoteData {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("Timestamped vote data")
            .field("vote data", self.vote_data.commit())
            .u64_field("timestamp", self.timestamp)
            .finalize()
    }
}

/// Data used for a timeout vote.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Hash, Eq)]
pub struct TimeoutData {
    /// Epoch the timeout is for
    pub epoch: u64,
    /// View the timeout is for
    pub view: ViewNumber,
}

impl TimeoutData {
    /// The timeout payload of `vote`
    #[must_use]
    pub fn of<KEY: SignatureKey>(vote: &Vote<KEY>) -> Self {
        Self {
            epoch: vote.epoch(),
            view: vote.view_number(),
        }
    }
}

impl Committable for TimeoutData {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("Timeout data")
            .u64(self.epoch)
            .u64(*self.view)
            .finalize()
    }
}

/// A signed vote for a vertex, optionally extended with a timeout signature.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Hash, Eq)]
#[serde(bound(deserialize = ""))]
pub struct Vote<KEY: SignatureKey> {
    /// The validator that cast the vote
    author: KEY,
    /// Epoch of the proposed vertex
    epoch: u64,
    /// The view this vote was cast for
    view_number: ViewNumber,
    /// The data being voted on
    vote_data: VoteData,
    /// Vote timestamp, in milliseconds since the unix epoch
    timestamp: u64,
    /// Signature over the commitment of the timestamped vote data
    signature: KEY::Signature,
    /// Signature over the timeout data, present once the author timed out in this view
    timeout_signature: Option<KEY::Signature>,
    /// The author's sync state when voting
    high_qc: HighQc,
}

impl<KEY: SignatureKey> Vote<KEY> {
    /// Assemble a vote from its already signed parts
    #[must_use]
    pub fn new(
        author: KEY,
        vote_data: VoteData,
        timestamp: u64,
        signature: KEY::Signature,
        high_qc: HighQc,
        timeout_signature: Option<KEY::Signature>,
    ) -> Self {
        Self {
            author,
            epoch: vote_data.epoch(),
            view_number: vote_data.view(),
            vote_data,
            timestamp,
            signature,
            timeout_signature,
            high_qc,
        }
    }

    /// The commitment a vote on `vote_data` at `timestamp` is signed over
    #[must_use]
    pub fn hash_of_data(vote_data: &VoteData, timestamp: u64) -> Commitment<TimestampedVoteData> {
        TimestampedVoteData {
            vote_data: vote_data.clone(),
            timestamp,
        }
        .commit()
    }

    /// The commitment this vote's signature covers
    #[must_use]
    pub fn hash(&self) -> Commitment<TimestampedVoteData> {
        Self::hash_of_data(&self.vote_data, self.timestamp)
    }

    /// A copy of this vote carrying `timeout_signature`
    #[must_use]
    pub fn with_timeout_signature(&self, timeout_signature: KEY::Signature) -> Self {
        Self {
            timeout_signature: Some(timeout_signature),
            ..self.clone()
        }
    }

    /// A copy of this vote with the timeout signature removed
    #[must_use]
    pub fn without_timeout_signature(&self) -> Self {
        Self {
            timeout_signature: None,
            ..self.clone()
        }
    }

    /// Whether the author timed out in this view
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.timeout_signature.is_some()
    }

    /// The validator that cast the vote
    #[must_use]
    pub fn author(&self) -> &KEY {
        &self.author
    }

    /// Epoch of the vote
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The data voted on
    #[must_use]
    pub fn vote_data(&self) -> &VoteData {
        &self.vote_data
    }

    /// Vote timestamp
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Signature over [`Vote::hash`]
    #[must_use]
    pub fn signature(&self) -> &KEY::Signature {
        &self.signature
    }

    /// Signature over the [`TimeoutData`] of this vote, if timed out
    #[must_use]
    pub fn timeout_signature(&self) -> Option<&KEY::Signature> {
        self.timeout_signature.as_ref()
    }

    /// The author's sync state when voting
    #[must_use]
    pub fn high_qc(&self) -> &HighQc {
        &self.high_qc
    }

    /// Check both signatures against the author's key
    #[must_use]
    pub fn is_signature_valid(&self) -> bool {
        if !self.author.validate(&self.signature, self.hash().as_ref()) {
            return false;
        }
        match &self.timeout_signature {
            Some(timeout_signature) => self
                .author
                .validate(timeout_signature, TimeoutData::of(self).commit().as_ref()),
            None => true,
        }
    }
}

impl<KEY: SignatureKey> HasViewNumber for Vote<KEY> {
    fn view_number(&self) -> ViewNumber {
        self.view_number
    }
}

/// A vertex signed by its leader.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Hash, Eq)]
#[serde(bound(deserialize = ""))]
pub struct Proposal<KEY: SignatureKey> {
    /// The proposed vertex
    pub vertex_id: VertexId,
    /// View the vertex is proposed at
    pub view_number: ViewNumber,
    /// Highest committed certificate known to the leader
    pub highest_committed_qc: QuorumCertificate,
    /// The leader's signature over the vertex id
    pub signature: KEY::Signature,
}

impl<KEY: SignatureKey> HasViewNumber for Proposal<KEY> {
    fn view_number(&self) -> ViewNumber {
        self.view_number
    }
}
