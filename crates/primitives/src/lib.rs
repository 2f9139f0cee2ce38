//! # irevm-primitives
//!
//! Core types and constants shared by every crate in the irevm workspace.
//! Most of the heavy lifting is re-exported from [`alloy_primitives`].

pub mod constants;
pub mod env;
pub mod hardfork;

pub use constants::*;
pub use env::{BlockEnv, CfgEnv, Env, TxEnv};
pub use hardfork::SpecId;

// Re-export the alloy foundation so downstream crates spell one dependency.
pub use alloy_primitives::{
    self, address, b256, bytes, fixed_bytes, hex, keccak256, uint, Address, Bytes, FixedBytes,
    Log, LogData, B256, U256,
};

/// Hash maps keyed by addresses and slots, as used across the workspace.
pub use alloy_primitives::map::{HashMap, HashSet};
