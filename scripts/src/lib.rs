//! Scripts for deploying and administering the TalentLayer smart contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod plan;
mod solidity;
pub mod subgraph;
pub mod transactor;
pub mod utils;
