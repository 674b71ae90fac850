//! OrthoFinder result tools.
//!
//! Every tool reads an orthogroup table through
//! [`OrthogroupTable`](crate::io::orthogroups::OrthogroupTable), so both the
//! hierarchical `N0.tsv` and the flat `Orthogroups.tsv` layouts are accepted.

pub mod cds;
pub mod enrichment;
pub mod func;
pub mod genes;
pub mod group;
pub mod summary;

pub use cds::CdsCmd;
pub use enrichment::PfamEnrichmentCmd;
pub use func::{FuncCmd, GeneGmtCmd, GmtCmd};
pub use genes::{DupLengthCmd, RepeatDistanceCmd};
pub use group::GroupSpecificCmd;
pub use summary::{SelectCmd, SummaryCmd};
