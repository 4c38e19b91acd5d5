// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Types and Traits for the `Bulwark` consensus safety module
pub mod consensus;
pub mod data;
pub mod error;
pub mod logging;
pub mod signature_key;
pub mod traits;
pub mod utils;
pub mod validator_config;
pub mod vote;
