//! Command-line interface: one subcommand per tool.

use crate::config::GlobalOpts;
use crate::tools::{
    antismash, fasta, gff, gsea, misc, orthofinder, phylogeny, reads, tigmint, time, variants,
};
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Converters and aggregators for genome annotation and sequencing files", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count antiSMASH cluster types per region
    AntismashRegions(antismash::RegionsCmd),
    /// Cluster types shared between antiSMASH runs
    AntismashCommon(antismash::CommonCmd),
    /// Protein sequences of the genes in one antiSMASH cluster
    AntismashCluster(antismash::ClusterCmd),
    /// Extract MIBiG cluster sequences from GenBank records
    MibigSeqs(antismash::SeqsCmd),
    /// Gene table of MIBiG clusters
    MibigGenes(antismash::GenesCmd),

    /// GC content of every FASTA record
    GcContent(fasta::GcContentCmd),
    /// K-mer coverage against GC content
    KmerCov(fasta::KmerCovCmd),
    /// Keep MAKER proteins under an eAED threshold
    FilterEaed(fasta::FilterEaedCmd),
    /// Keep complete protein-coding sequences
    CompleteCds(fasta::CompleteCdsCmd),

    /// Histogram of gene lengths from a GFF3 file
    GeneLengthHist(gff::GeneLengthHistCmd),
    /// GO terms, Pfam domains and notes per feature
    FunctionalInfo(gff::FunctionalInfoCmd),

    /// Orthogroup counts per category
    OgSummary(orthofinder::SummaryCmd),
    /// Orthogroups of one category
    OgSelect(orthofinder::SelectCmd),
    /// Functional annotation of orthogroups
    OgFunc(orthofinder::FuncCmd),
    /// GMT gene sets from a functional table
    OgGmt(orthofinder::GmtCmd),
    /// GMT gene sets of member mRNAs, one GFF per species
    OgGeneGmt(orthofinder::GeneGmtCmd),
    /// Coding sequences of orthogroup members
    OgCds(orthofinder::CdsCmd),
    /// Orthogroups specific to a group of species
    GroupSpecific(orthofinder::GroupSpecificCmd),
    /// Lengths of duplicated genes
    DupLength(orthofinder::DupLengthCmd),
    /// Distance from genes to the closest repeat
    RepeatDistance(orthofinder::RepeatDistanceCmd),
    /// Pfam domain over-representation test
    PfamEnrichment(orthofinder::PfamEnrichmentCmd),

    /// Score genes by the significance of their enriched GO terms
    ScoreEnriched(gsea::ScoreEnrichedCmd),
    /// Occurrences of Pfam domains
    PfamCounts(gsea::PfamCountsCmd),

    /// Likelihood-ratio tests of branch-site codeml runs
    BranchSiteLrt(phylogeny::BranchSiteLrtCmd),
    /// Run codeml on a set of alignments
    Codeml(phylogeny::CodemlCmd),
    /// Concatenate alignments into a supermatrix
    ConcatAln(phylogeny::ConcatAlnCmd),
    /// Convert a Mash distance table to MEGA format
    MashMega(phylogeny::MashMegaCmd),

    /// Filter, partition or subsample linked reads by barcode multiplicity
    FilterBx(reads::FilterBxCmd),
    /// Histogram of reads per barcode
    BxHist(reads::BxHistCmd),
    /// Read lengths or their histogram
    ReadLengths(reads::ReadLengthsCmd),
    /// Interleave paired reads
    Interleave(reads::InterleaveCmd),
    /// Sequencing coverage of a genome
    SeqCov(reads::SeqCovCmd),

    /// Tigmint molecule lengths or their histogram
    Molecules(tigmint::MoleculesCmd),
    /// Number of cuts made by Tigmint
    NumCuts(tigmint::NumCutsCmd),

    /// SNPs and indels in exons, introns and intergenic regions
    GenomicRegions(variants::GenomicRegionsCmd),
    /// Presence of variants across call sets
    VariantOverlaps(variants::VariantOverlapsCmd),
    /// Summaries of snpEff effects
    CountEffects(variants::CountEffectsCmd),
    /// Add MAKER gene names and AED scores to a snpEff genes table
    GeneInfo(variants::GeneInfoCmd),

    /// Convert a TSV table to Jira markup
    ToJira(misc::ToJiraCmd),
    /// Summarize GeneValidator results
    Genevalidator(misc::GeneValidatorCmd),
    /// Filter GAG output by ID
    FilterGag(misc::FilterGagCmd),

    /// Convert a time to seconds, minutes or hours
    TimeConvert(time::TimeConvertCmd),
    /// Time elapsed between two timestamps
    TimeElapsed(time::TimeElapsedCmd),
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::AntismashRegions(cmd) => cmd.run(),
            Commands::AntismashCommon(cmd) => cmd.run(),
            Commands::AntismashCluster(cmd) => cmd.run(),
            Commands::MibigSeqs(cmd) => cmd.run(),
            Commands::MibigGenes(cmd) => cmd.run(),
            Commands::GcContent(cmd) => cmd.run(),
            Commands::KmerCov(cmd) => cmd.run(),
            Commands::FilterEaed(cmd) => cmd.run(),
            Commands::CompleteCds(cmd) => cmd.run(),
            Commands::GeneLengthHist(cmd) => cmd.run(),
            Commands::FunctionalInfo(cmd) => cmd.run(),
            Commands::OgSummary(cmd) => cmd.run(),
            Commands::OgSelect(cmd) => cmd.run(),
            Commands::OgFunc(cmd) => cmd.run(),
            Commands::OgGmt(cmd) => cmd.run(),
            Commands::OgGeneGmt(cmd) => cmd.run(),
            Commands::OgCds(cmd) => cmd.run(),
            Commands::GroupSpecific(cmd) => cmd.run(),
            Commands::DupLength(cmd) => cmd.run(),
            Commands::RepeatDistance(cmd) => cmd.run(),
            Commands::PfamEnrichment(cmd) => cmd.run(),
            Commands::ScoreEnriched(cmd) => cmd.run(),
            Commands::PfamCounts(cmd) => cmd.run(),
            Commands::BranchSiteLrt(cmd) => cmd.run(),
            Commands::Codeml(cmd) => cmd.run(self.global.thread_count()),
            Commands::ConcatAln(cmd) => cmd.run(),
            Commands::MashMega(cmd) => cmd.run(),
            Commands::FilterBx(cmd) => cmd.run(),
            Commands::BxHist(cmd) => cmd.run(),
            Commands::ReadLengths(cmd) => cmd.run(),
            Commands::Interleave(cmd) => cmd.run(),
            Commands::SeqCov(cmd) => cmd.run(),
            Commands::Molecules(cmd) => cmd.run(),
            Commands::NumCuts(cmd) => cmd.run(),
            Commands::GenomicRegions(cmd) => cmd.run(),
            Commands::VariantOverlaps(cmd) => cmd.run(),
            Commands::CountEffects(cmd) => cmd.run(),
            Commands::GeneInfo(cmd) => cmd.run(),
            Commands::ToJira(cmd) => cmd.run(),
            Commands::Genevalidator(cmd) => cmd.run(),
            Commands::FilterGag(cmd) => cmd.run(),
            Commands::TimeConvert(cmd) => cmd.run(),
            Commands::TimeElapsed(cmd) => cmd.run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["genome-toolbox", "num-cuts", "cuts.bed", "-vv", "--threads", "2"])
            .unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.threads, Some(2));
        assert!(matches!(cli.command, Commands::NumCuts(_)));
    }

    #[test]
    fn test_codeml_model_names() {
        let cli = Cli::try_parse_from([
            "genome-toolbox",
            "codeml",
            "alignments.txt",
            "tree.nwk",
            "branch_site_M2a",
        ]);
        assert!(cli.is_ok(), "{:?}", cli.err());
    }

    #[test]
    fn test_time_elapsed_and_gene_gmt_arguments() {
        let cli = Cli::try_parse_from([
            "genome-toolbox",
            "time-elapsed",
            "-s",
            "2019-03-01 10:00:00",
            "-e",
            "2019-03-01 11:00:00",
            "h",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::TimeElapsed(_)));

        let cli = Cli::try_parse_from(["genome-toolbox", "og-gene-gmt", "N0.tsv", "map.tsv"]).unwrap();
        assert!(matches!(cli.command, Commands::OgGeneGmt(_)));
    }
}
