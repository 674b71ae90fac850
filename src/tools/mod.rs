//! The toolbox subcommands, grouped by topic.

pub mod antismash;
pub mod fasta;
pub mod gff;
pub mod gsea;
pub mod misc;
pub mod orthofinder;
pub mod phylogeny;
pub mod reads;
pub mod tigmint;
pub mod time;
pub mod variants;
