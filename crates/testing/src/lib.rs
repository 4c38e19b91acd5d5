// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Testing infrastructure for the Bulwark safety rules

/// Helpers for initializing safety rules in tests
pub mod helpers;

/// Generator of vertex chains
pub mod view_generator;
