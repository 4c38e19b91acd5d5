// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Provides types useful for representing the consensus data structures the safety rules reason about
//!
//! This module provides the view number, the header of a candidate ledger state, the data a
//! vote is cast over, and the quorum certificates formed from those votes.

use std::fmt::{self, Debug, Display};

use committable::{Commitment, Committable, RawCommitmentBuilder};
use serde::{Deserialize, Serialize};

use crate::error::SafetyError;

/// Type-safe wrapper around `u64` so we know the thing we're talking about is a view number.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewNumber(u64);

impl ViewNumber {
    /// Create a genesis view number (0)
    #[must_use]
    pub const fn genesis() -> Self {
        Self(0)
    }

    /// Create a new `ViewNumber` with the given value.
    #[must_use]
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Return the u64 format
    #[must_use]
    pub const fn u64(&self) -> u64 {
        self.0
    }

    /// The view directly following this one
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether this is the genesis view
    #[must_use]
    pub const fn is_genesis(&self) -> bool {
        self.0 == 0
    }
}

impl Committable for ViewNumber {
    fn commit(&self) -> Commitment<Self> {
        let builder = RawCommitmentBuilder::new("View Number Commitment");
        builder.u64(self.0).finalize()
    }
}

impl std::ops::Add<u64> for ViewNumber {
    type Output = ViewNumber;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl std::ops::AddAssign<u64> for ViewNumber {
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

impl std::ops::Deref for ViewNumber {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::Sub<u64> for ViewNumber {
    type Output = ViewNumber;
    fn sub(self, rhs: u64) -> Self::Output {
        Self(self.0 - rhs)
    }
}

impl Display for ViewNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a vertex, as assigned by the vertex store.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub [u8; 32]);

impl VertexId {
    /// Derive an identifier by hashing arbitrary bytes
    #[must_use]
    pub fn hash_of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }
}

impl AsRef<[u8]> for VertexId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexId(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

/// Summary of the ledger state a vertex executes to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerHeader {
    /// Version of the state after execution
    pub state_version: u64,
    /// Accumulator over every command executed so far
    pub accumulator: [u8; 32],
    /// Proposer timestamp, in milliseconds since the unix epoch
    pub timestamp: u64,
    /// Whether this state ends the epoch
    pub end_of_epoch: bool,
}

impl Committable for LedgerHeader {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("Ledger header")
            .u64_field("state version", self.state_version)
            .fixed_size_field("accumulator", &self.accumulator)
            .u64_field("timestamp", self.timestamp)
            .u64_field("end of epoch", u64::from(self.end_of_epoch))
            .finalize()
    }
}

/// Identifies a candidate ledger state at a given view.
///
/// Immutable once constructed; all fields are read through accessors.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BftHeader {
    /// Epoch the vertex belongs to
    epoch: u64,
    /// View the vertex was proposed at
    view: ViewNumber,
    /// The vertex this header describes
    vertex_id: VertexId,
    /// Ledger state after executing the vertex
    ledger: LedgerHeader,
}

impl BftHeader {
    /// Create a header
    #[must_use]
    pub fn new(epoch: u64, view: ViewNumber, vertex_id: VertexId, ledger: LedgerHeader) -> Self {
        Self {
            epoch,
            view,
            vertex_id,
            ledger,
        }
    }

    /// The header of the genesis vertex of `epoch`
    #[must_use]
    pub fn genesis(epoch: u64, vertex_id: VertexId, ledger: LedgerHeader) -> Self {
        Self::new(epoch, ViewNumber::genesis(), vertex_id, ledger)
    }

    /// Epoch of the header
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// View of the header
    #[must_use]
    pub fn view(&self) -> ViewNumber {
        self.view
    }

    /// Id of the vertex this header describes
    #[must_use]
    pub fn vertex_id(&self) -> &VertexId {
        &self.vertex_id
    }

    /// Ledger summary
    #[must_use]
    pub fn ledger(&self) -> &LedgerHeader {
        &self.ledger
    }
}

impl Committable for BftHeader {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("BFT header")
            .u64_field("epoch", self.epoch)
            .field("view number", self.view.commit())
            .fixed_size_field("vertex id", &self.vertex_id.0)
            .field("ledger header", self.ledger.commit())
            .finalize()
    }
}

/// The data a vote is cast over.
///
/// `committed` is only ever `Some` when a quorum on this data completes a three-chain, in which
/// case it is the header that becomes committed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteData {
    /// Header of the vertex being voted for
    proposed: BftHeader,
    /// Header of its parent
    parent: BftHeader,
    /// Header committed by a quorum on this data, if any
    committed: Option<BftHeader>,
}

impl VoteData {
    /// Create vote data
    #[must_use]
    pub fn new(proposed: BftHeader, parent: BftHeader, committed: Option<BftHeader>) -> Self {
        Self {
            proposed,
            parent,
            committed,
        }
    }

    /// Header of the proposed vertex
    #[must_use]
    pub fn proposed(&self) -> &BftHeader {
        &self.proposed
    }

    /// Header of the proposed vertex's parent
    #[must_use]
    pub fn parent(&self) -> &BftHeader {
        &self.parent
    }

    /// Header this data commits, if any
    #[must_use]
    pub fn committed(&self) -> Option<&BftHeader> {
        self.committed.as_ref()
    }

    /// View of the proposed vertex
    #[must_use]
    pub fn view(&self) -> ViewNumber {
        self.proposed.view()
    }

    /// Epoch of the proposed vertex
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.proposed.epoch()
    }
}

impl Committable for VoteData {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("Vote data")
            .field("proposed", self.proposed.commit())
            .field("parent", self.parent.commit())
            .optional("committed", &self.committed)
            .finalize()
    }
}

/// An aggregated proof that a quorum of validators voted for some [`VoteData`].
///
/// The aggregate signature is opaque to the safety rules; certificates handed to them are
/// verified by the vertex store.
#[derive(Clone, custom_debug::Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuorumCertificate {
    /// The data the quorum voted for
    vote_data: VoteData,
    /// Epoch the quorum belongs to
    epoch: u64,
    /// assembled signature for certificate aggregation
    #[debug(skip)]
    aggregate_signature: Vec<u8>,
}

impl QuorumCertificate {
    /// Creates a new instance of `QuorumCertificate`
    #[must_use]
    pub fn new(vote_data: VoteData, epoch: u64, aggregate_signature: Vec<u8>) -> Self {
        Self {
            vote_data,
            epoch,
            aggregate_signature,
        }
    }

    /// The genesis certificate of an epoch: proposed, parent and committed are all the genesis
    /// header, and no signatures are required.
    #[must_use]
    pub fn genesis(genesis_header: &BftHeader) -> Self {
        let vote_data = VoteData::new(
            genesis_header.clone(),
            genesis_header.clone(),
            Some(genesis_header.clone()),
        );
        Self::new(vote_data, genesis_header.epoch(), Vec::new())
    }

    /// The certified data
    #[must_use]
    pub fn vote_data(&self) -> &VoteData {
        &self.vote_data
    }

    /// Header of the certified vertex
    #[must_use]
    pub fn proposed(&self) -> &BftHeader {
        self.vote_data.proposed()
    }

    /// Header of the certified vertex's parent
    #[must_use]
    pub fn parent(&self) -> &BftHeader {
        self.vote_data.parent()
    }

    /// Header committed by this certificate, if any
    #[must_use]
    pub fn committed(&self) -> Option<&BftHeader> {
        self.vote_data.committed()
    }

    /// View of the certified vertex
    #[must_use]
    pub fn view(&self) -> ViewNumber {
        self.vote_data.view()
    }

    /// Epoch of the certificate
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The aggregated signature bytes
    #[must_use]
    pub fn aggregate_signature(&self) -> &[u8] {
        &self.aggregate_signature
    }

    /// Whether this is a genesis certificate
    #[must_use]
    pub fn is_genesis(&self) -> bool {
        let proposed = self.vote_data.proposed();
        proposed.view().is_genesis()
            && self.vote_data.parent() == proposed
            && self.vote_data.committed() == Some(proposed)
    }
}

impl Committable for QuorumCertificate {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("Quorum certificate")
            .field("vote data", self.vote_data.commit())
            .u64_field("epoch", self.epoch)
            .var_size_field("signatures", &self.aggregate_signature)
            .finalize()
    }
}

/// The highest known quorum certificate together with the highest known committing one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "HighQcRecord")]
pub struct HighQc {
    /// Highest known certificate
    highest_qc: QuorumCertificate,
    /// Highest known certificate that commits a vertex
    highest_committed_qc: QuorumCertificate,
}

/// A [`HighQc`] as read back, before its views are checked
#[derive(Deserialize)]
struct HighQcRecord {
    /// Highest known certificate
    highest_qc: QuorumCertificate,
    /// Highest known certificate that commits a vertex
    highest_committed_qc: QuorumCertificate,
}

impl TryFrom<HighQcRecord> for HighQc {
    type Error = SafetyError;

    fn try_from(record: HighQcRecord) -> Result<Self, Self::Error> {
        Self::new(record.highest_qc, record.highest_committed_qc)
    }
}

impl HighQc {
    /// Bundle the two certificates.
    ///
    /// # Errors
    /// If the committed certificate is for a later view than the highest certificate.
    pub fn new(
        highest_qc: QuorumCertificate,
        highest_committed_qc: QuorumCertificate,
    ) -> Result<Self, SafetyError> {
        if highest_committed_qc.view() > highest_qc.view() {
            return Err(SafetyError::InvalidHighQc {
                highest_view: highest_qc.view(),
                committed_view: highest_committed_qc.view(),
            });
        }
        Ok(Self {
            highest_qc,
            highest_committed_qc,
        })
    }

    /// The sync state at the start of an epoch
    #[must_use]
    pub fn genesis(genesis_header: &BftHeader) -> Self {
        let qc = QuorumCertificate::genesis(genesis_header);
        Self {
            highest_qc: qc.clone(),
            highest_committed_qc: qc,
        }
    }

    /// Highest known certificate
    #[must_use]
    pub fn highest_qc(&self) -> &QuorumCertificate {
        &self.highest_qc
    }

    /// Highest known committing certificate
    #[must_use]
    pub fn highest_committed_qc(&self) -> &QuorumCertificate {
        &self.highest_committed_qc
    }
}
