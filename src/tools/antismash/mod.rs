//! antiSMASH and MIBiG tools.

pub mod cluster;
pub mod common;
pub mod json;
pub mod mibig;
pub mod regions;

pub use cluster::ClusterCmd;
pub use common::CommonCmd;
pub use mibig::{GenesCmd, SeqsCmd};
pub use regions::RegionsCmd;
