// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Read-only view of a verified vertex
//!
//! The vertex store owns vertices and verifies them before they reach the safety rules. The
//! rules only need the capabilities of [`Vertex`], so any vertex representation can be voted on.

use crate::data::{BftHeader, VertexId, ViewNumber};

/// A proposed block together with the quorum certificate for its parent.
pub trait Vertex {
    /// Id of the vertex
    fn id(&self) -> &VertexId;

    /// View the vertex is proposed at
    fn view(&self) -> ViewNumber;

    /// Header of the parent, as certified by the vertex's quorum certificate
    fn parent_header(&self) -> &BftHeader;

    /// Header of the grandparent, i.e. the parent certified by the parent's certificate
    fn grandparent_header(&self) -> &BftHeader;

    /// Whether the parent was proposed at the view directly preceding this vertex
    fn has_direct_parent(&self) -> bool;

    /// Whether the grandparent was proposed at the view directly preceding the parent
    fn parent_has_direct_parent(&self) -> bool;

    /// Whether the parent's certificate is the genesis certificate
    fn touches_genesis(&self) -> bool;
}
