//! Phylogenetics helpers: codeml runs and their likelihood-ratio tests,
//! alignment concatenation and Mash distance conversion.

pub mod alignment;
pub mod codeml;
pub mod mash;
pub mod mlc;

pub use alignment::ConcatAlnCmd;
pub use codeml::CodemlCmd;
pub use mash::MashMegaCmd;
pub use mlc::BranchSiteLrtCmd;
