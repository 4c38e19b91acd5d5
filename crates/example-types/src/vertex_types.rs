// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

use bulwark_types::{
    data::{BftHeader, HighQc, LedgerHeader, QuorumCertificate, VertexId, ViewNumber, VoteData},
    traits::Vertex,
};

/// Epoch every test header belongs to
pub const TEST_EPOCH: u64 = 1;

/// Ledger summary of a test vertex at `view`
fn ledger(view: u64) -> LedgerHeader {
    LedgerHeader {
        state_version: view,
        timestamp: view * 1_000,
        ..LedgerHeader::default()
    }
}

/// A deterministic header at `view`, standing in for a parent or grandparent
#[must_use]
pub fn header(view: u64) -> BftHeader {
    BftHeader::new(
        TEST_EPOCH,
        ViewNumber::new(view),
        VertexId::hash_of(&view.to_le_bytes()),
        ledger(view),
    )
}

/// The genesis header all test chains start from
#[must_use]
pub fn genesis_header() -> BftHeader {
    header(0)
}

/// The sync state of a validator that has only seen genesis
#[must_use]
pub fn genesis_high_qc() -> HighQc {
    HighQc::genesis(&genesis_header())
}

/// A vertex with explicitly chosen headers and chain flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestVertex {
    /// id of the vertex
    id: VertexId,
    /// view of the vertex
    view: ViewNumber,
    /// certified parent
    parent: BftHeader,
    /// certified grandparent
    grandparent: BftHeader,
    /// see [`Vertex::has_direct_parent`]
    has_direct_parent: bool,
    /// see [`Vertex::parent_has_direct_parent`]
    parent_has_direct_parent: bool,
    /// see [`Vertex::touches_genesis`]
    touches_genesis: bool,
}

impl TestVertex {
    /// Start building a vertex at `view`
    #[must_use]
    pub fn builder(view: u64) -> TestVertexBuilder {
        TestVertexBuilder {
            view,
            parent: header(view.saturating_sub(1)),
            grandparent: header(view.saturating_sub(2)),
            has_direct_parent: None,
            parent_has_direct_parent: None,
            touches_genesis: None,
        }
    }

    /// A well-formed vertex at `view` whose parent and grandparent are at the given views
    #[must_use]
    pub fn chain(view: u64, parent_view: u64, grandparent_view: u64) -> Self {
        Self::builder(view)
            .parent(header(parent_view))
            .grandparent(header(grandparent_view))
            .build()
    }

    /// A vertex at `view` extending genesis directly
    #[must_use]
    pub fn genesis_child(view: u64) -> Self {
        Self::builder(view)
            .parent(genesis_header())
            .grandparent(genesis_header())
            .touches_genesis(true)
            .build()
    }

    /// The header a validator executing this vertex would propose
    #[must_use]
    pub fn proposed_header(&self) -> BftHeader {
        BftHeader::new(
            TEST_EPOCH,
            self.view,
            self.id,
            ledger(self.view.u64()),
        )
    }

    /// A certificate over this vertex, as a quorum voting for it would form
    #[must_use]
    pub fn certificate(&self) -> QuorumCertificate {
        let committed = (!self.touches_genesis
            && self.has_direct_parent
            && self.parent_has_direct_parent)
            .then(|| self.grandparent.clone());
        QuorumCertificate::new(
            VoteData::new(self.proposed_header(), self.parent.clone(), committed),
            TEST_EPOCH,
            Vec::new(),
        )
    }
}

impl Vertex for TestVertex {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn view(&self) -> ViewNumber {
        self.view
    }

    fn parent_header(&self) -> &BftHeader {
        &self.parent
    }

    fn grandparent_header(&self) -> &BftHeader {
        &self.grandparent
    }

    fn has_direct_parent(&self) -> bool {
        self.has_direct_parent
    }

    fn parent_has_direct_parent(&self) -> bool {
        self.parent_has_direct_parent
    }

    fn touches_genesis(&self) -> bool {
        self.touches_genesis
    }
}

/// Builder for a [`TestVertex`]. Flags not set explicitly are derived from the header views.
#[derive(Clone, Debug)]
pub struct TestVertexBuilder {
    /// view of the vertex
    view: u64,
    /// certified parent
    parent: BftHeader,
    /// certified grandparent
    grandparent: BftHeader,
    /// explicit direct parent flag
    has_direct_parent: Option<bool>,
    /// explicit parent direct parent flag
    parent_has_direct_parent: Option<bool>,
    /// explicit genesis flag
    touches_genesis: Option<bool>,
}

impl TestVertexBuilder {
    /// Set the parent header
    #[must_use]
    pub fn parent(mut self, parent: BftHeader) -> Self {
        self.parent = parent;
        self
    }

    /// Set the grandparent header
    #[must_use]
    pub fn grandparent(mut self, grandparent: BftHeader) -> Self {
        self.grandparent = grandparent;
        self
    }

    /// Override the direct parent flag
    #[must_use]
    pub fn has_direct_parent(mut self, has_direct_parent: bool) -> Self {
        self.has_direct_parent = Some(has_direct_parent);
        self
    }

    /// Override the parent's direct parent flag
    #[must_use]
    pub fn parent_has_direct_parent(mut self, parent_has_direct_parent: bool) -> Self {
        self.parent_has_direct_parent = Some(parent_has_direct_parent);
        self
    }

    /// Override the genesis flag
    #[must_use]
    pub fn touches_genesis(mut self, touches_genesis: bool) -> Self {
        self.touches_genesis = Some(touches_genesis);
        self
    }

    /// Finish the vertex
    #[must_use]
    pub fn build(self) -> TestVertex {
        let view = ViewNumber::new(self.view);
        let parent_view = self.parent.view();
        let grandparent_view = self.grandparent.view();

        let mut preimage = Vec::with_capacity(48);
        preimage.extend_from_slice(b"vertex");
        preimage.extend_from_slice(&self.view.to_le_bytes());
        preimage.extend_from_slice(self.parent.vertex_id().as_ref());

        TestVertex {
            id: VertexId::hash_of(&preimage),
            view,
            has_direct_parent: self
                .has_direct_parent
                .unwrap_or(parent_view.next() == view),
            parent_has_direct_parent: self
                .parent_has_direct_parent
                .unwrap_or(grandparent_view.next() == parent_view),
            touches_genesis: self.touches_genesis.unwrap_or(
                view.is_genesis() || parent_view.is_genesis() || grandparent_view.is_genesis(),
            ),
            parent: self.parent,
            grandparent: self.grandparent,
        }
    }
}
