// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

use bulwark_example_types::vertex_types::{genesis_header, TestVertex};
use bulwark_types::{data::BftHeader, traits::Vertex};

/// Produces a chain of vertices, each certifying the previous one.
///
/// Views advance by one per vertex unless views are skipped with [`TestVertexGenerator::skip`],
/// which models a leader that failed to get its vertex certified.
#[derive(Clone, Debug)]
pub struct TestVertexGenerator {
    /// The last vertex generated
    pub current_vertex: Option<TestVertex>,
    /// View of the next vertex
    next_view: u64,
}

impl TestVertexGenerator {
    /// Start a chain on top of genesis
    #[must_use]
    pub fn generate() -> Self {
        Self {
            current_vertex: None,
            next_view: 1,
        }
    }

    /// Leave out the next `views` views
    pub fn skip(&mut self, views: u64) {
        self.next_view += views;
    }

    /// Header the next vertex will certify as its parent
    fn parent(&self) -> BftHeader {
        self.current_vertex
            .as_ref()
            .map_or_else(genesis_header, TestVertex::proposed_header)
    }

    /// Header the next vertex will certify as its grandparent
    fn grandparent(&self) -> BftHeader {
        self.current_vertex
            .as_ref()
            .map_or_else(genesis_header, |vertex| vertex.parent_header().clone())
    }
}

impl Iterator for TestVertexGenerator {
    type Item = TestVertex;

    fn next(&mut self) -> Option<Self::Item> {
        let vertex = TestVertex::builder(self.next_view)
            .parent(self.parent())
            .grandparent(self.grandparent())
            .build();
        self.next_view += 1;
        self.current_vertex = Some(vertex.clone());
        Some(vertex)
    }
}
