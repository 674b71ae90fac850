//! `genomic-regions`: counts SNPs and indels in exons, introns and
//! intergenic sequence.

use crate::bio::interval::{merge_ranges, Interval};
use crate::bio::IntervalIndex;
use crate::error::ToolResult;
use crate::io::gff::GffReader;
use crate::io::vcf::read_vcf;
use crate::io::{create_output, tsv_writer};
use anyhow::{Context, Result};
use clap::Args;
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Exon,
    Intron,
    Intergenic,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Exon, Region::Intron, Region::Intergenic];

    fn index(self) -> usize {
        match self {
            Region::Exon => 0,
            Region::Intron => 1,
            Region::Intergenic => 2,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Exon => "exon",
            Region::Intron => "intron",
            Region::Intergenic => "intergenic",
        };
        write!(f, "{}", name)
    }
}

/// Exon and intron intervals of one gene: the merged exons and the gaps
/// between consecutive merged exons.
pub fn gene_regions(exons: Vec<(u64, u64)>) -> Vec<(u64, u64, Region)> {
    let merged = merge_ranges(exons);
    let mut regions = Vec::with_capacity(merged.len() * 2);
    for (i, &(start, end)) in merged.iter().enumerate() {
        regions.push((start, end, Region::Exon));
        if let Some(&(next_start, _)) = merged.get(i + 1) {
            regions.push((end + 1, next_start - 1, Region::Intron));
        }
    }
    regions
}

type GeneExons = (String, Vec<(u64, u64)>);

fn flush(gene: Option<GeneExons>, entries: &mut Vec<(String, Interval<Region>)>) {
    if let Some((contig, exons)) = gene {
        for (start, end, label) in gene_regions(exons) {
            entries.push((contig.clone(), Interval { start, end, label }));
        }
    }
}

/// Exon/intron index of a genome annotation.
pub struct GenicRegions {
    index: IntervalIndex<Region>,
}

impl GenicRegions {
    /// Reads `gene` and `exon` features. Exons belong to the closest
    /// preceding gene on the same contig.
    pub fn from_gff(path: &Path) -> ToolResult<Self> {
        let mut entries = Vec::new();
        let mut current: Option<GeneExons> = None;
        let mut genes = 0usize;

        for record in GffReader::from_path(path)? {
            let record = record?;
            let same_contig = current
                .as_ref()
                .map_or(false, |(contig, _)| *contig == record.seqid);
            match record.feature_type.as_str() {
                "gene" => {
                    flush(current.take(), &mut entries);
                    current = Some((record.seqid, Vec::new()));
                    genes += 1;
                }
                "exon" => {
                    if !same_contig {
                        flush(current.take(), &mut entries);
                        current = Some((record.seqid.clone(), Vec::new()));
                    }
                    if let Some((_, exons)) = current.as_mut() {
                        exons.push((record.start, record.end));
                    }
                }
                _ => {}
            }
        }
        flush(current.take(), &mut entries);
        debug!("{} genes, {} genic intervals", genes, entries.len());

        Ok(GenicRegions {
            index: IntervalIndex::new(entries),
        })
    }

    /// Exon wins over intron; positions outside every gene (including on
    /// contigs without genes) are intergenic.
    pub fn classify(&self, contig: &str, pos: u64) -> Region {
        let labels = self.index.covering(contig, pos);
        if labels.iter().any(|&&r| r == Region::Exon) {
            Region::Exon
        } else if labels.iter().any(|&&r| r == Region::Intron) {
            Region::Intron
        } else {
            Region::Intergenic
        }
    }
}

/// `[snp, indel]` counts per region.
pub type RegionCounts = [[u64; 2]; 3];

pub fn count_variant_regions(vcf: &Path, regions: &GenicRegions) -> ToolResult<RegionCounts> {
    let mut counts = [[0u64; 2]; 3];
    for variant in read_vcf(vcf)? {
        let region = regions.classify(&variant.chrom, variant.pos);
        counts[region.index()][usize::from(variant.is_indel())] += 1;
    }
    Ok(counts)
}

#[derive(Args, Debug)]
pub struct GenomicRegionsCmd {
    /// Variant calls
    pub vcf: PathBuf,

    /// Genome annotation with gene and exon features
    pub gff: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GenomicRegionsCmd {
    pub fn run(&self) -> Result<()> {
        let regions = GenicRegions::from_gff(&self.gff)
            .with_context(|| format!("Failed to read annotation {}", self.gff.display()))?;
        let counts = count_variant_regions(&self.vcf, &regions)
            .with_context(|| format!("Failed to read variants {}", self.vcf.display()))?;

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record(["location", "snp", "indel"])?;
        for region in Region::ALL {
            let [snp, indel] = counts[region.index()];
            writer.write_record([region.to_string(), snp.to_string(), indel.to_string()])?;
        }
        writer.flush()?;
        info!(
            "Classified {} variants",
            counts.iter().flatten().sum::<u64>()
        );
        Ok(())
    }
}
