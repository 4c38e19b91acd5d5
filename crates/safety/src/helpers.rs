// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Helper functions used by the safety rules

use bulwark_types::{data::BftHeader, error::SafetyError, traits::Vertex};

/// The header a quorum on `vertex` would commit, if any.
///
/// This is the chained HotStuff three-chain rule ([HotStuff](https://arxiv.org/pdf/1803.05069)
/// section 5): a vertex whose certificate refers to its direct parent forms a One-Chain, and if
/// the parent's certificate also refers to the parent's direct parent it forms a Two-Chain. A
/// quorum on such a vertex completes a Three-Chain and commits the grandparent.
///
/// A single skipped view anywhere in the chain suppresses the commit. A vertex touching genesis
/// never commits, since it has no real grandparent.
#[must_use]
pub fn commit_candidate<V: Vertex>(vertex: &V) -> Option<BftHeader> {
    match (
        vertex.touches_genesis(),
        vertex.has_direct_parent(),
        vertex.parent_has_direct_parent(),
    ) {
        (false, true, true) => Some(vertex.grandparent_header().clone()),
        (true, _, _) | (_, false, _) | (_, _, false) => None,
    }
}

/// Reject a vertex whose parent or grandparent header contradicts its own view.
///
/// The chain flags are taken as the vertex store reports them.
///
/// # Errors
/// [`SafetyError::MalformedVertex`] naming the first inconsistency found.
pub fn validate_chain<V: Vertex>(vertex: &V) -> Result<(), SafetyError> {
    let view = vertex.view();
    let parent_view = vertex.parent_header().view();
    let grandparent_view = vertex.grandparent_header().view();

    if parent_view >= view {
        return Err(SafetyError::MalformedVertex {
            view,
            reason: format!("parent view {parent_view} is not below the vertex view"),
        });
    }
    if grandparent_view > parent_view {
        return Err(SafetyError::MalformedVertex {
            view,
            reason: format!(
                "grandparent view {grandparent_view} is above parent view {parent_view}"
            ),
        });
    }
    Ok(())
}

/// [`validate_chain`], and reject a proposed header that does not describe the vertex.
///
/// # Errors
/// [`SafetyError::MalformedVertex`] naming the first inconsistency found.
pub fn validate_vertex<V: Vertex>(
    vertex: &V,
    proposed_header: &BftHeader,
) -> Result<(), SafetyError> {
    let view = vertex.view();
    if proposed_header.view() != view {
        return Err(SafetyError::MalformedVertex {
            view,
            reason: format!("proposed header is for view {}", proposed_header.view()),
        });
    }
    if proposed_header.vertex_id() != vertex.id() {
        return Err(SafetyError::MalformedVertex {
            view,
            reason: format!(
                "proposed header describes {:?}, not {:?}",
                proposed_header.vertex_id(),
                vertex.id()
            ),
        });
    }
    validate_chain(vertex)
}
