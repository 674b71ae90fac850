//! Linked-read barcode tools: `filter-bx` and `bx-hist`.
//!
//! Barcoded reads are the interleaved output of `longranger basic`, sorted
//! by barcode, where the barcode is the second word of each header
//! (`@read BX:Z:ACGT-1`). The raw paired files are the `mkfastq` outputs
//! the barcoded reads came from.

use super::parse_genome_size;
use crate::error::{ToolError, ToolResult};
use crate::io::fastx::{barcode, for_each_record, read_name, OwnedRecord};
use crate::io::{create_output, STDIO};
use crate::stats::Histogram;
use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indexmap::{IndexMap, IndexSet};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

lazy_static! {
    static ref READ_FILE_RE: Regex =
        Regex::new(r"^(.+)(_S\d+_L00\d+_R[12]_001\.fastq\.gz)$").expect("valid read file regex");
}

/// Accepted reads-per-barcode range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    All,
    Range { min: u64, max: u64 },
}

impl Multiplicity {
    pub fn contains(&self, reads: u64) -> bool {
        match *self {
            Multiplicity::All => true,
            Multiplicity::Range { min, max } => (min..=max).contains(&reads),
        }
    }
}

/// Written into output file names.
impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::All => write!(f, "_all"),
            Multiplicity::Range { min, max } => write!(f, "{}-{}", min, max),
        }
    }
}

impl FromStr for Multiplicity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Multiplicity::All);
        }
        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| "barcode multiplicity range must be given as min-max".to_string())?;
        let min: u64 = min
            .parse()
            .map_err(|_| format!("invalid minimum multiplicity '{}'", min))?;
        let max: u64 = max
            .parse()
            .map_err(|_| format!("invalid maximum multiplicity '{}'", max))?;
        if min >= max {
            return Err(format!(
                "max of multiplicity range ({}) is not larger than the min ({})",
                max, min
            ));
        }
        Ok(Multiplicity::Range { min, max })
    }
}

/// Shared prefix and per-mate suffixes of an R1/R2 file pair, e.g.
/// `lib_S1_L001_R1_001.fastq.gz` → `lib`, `_S1_L001_R1_001.fastq.gz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedFiles {
    pub prefix: String,
    pub r1_suffix: String,
    pub r2_suffix: String,
}

impl PairedFiles {
    pub fn new(r1: &Path, r2: &Path) -> ToolResult<Self> {
        let split = |path: &Path| -> ToolResult<(String, String)> {
            let name = path.to_string_lossy();
            let caps = READ_FILE_RE.captures(&name).ok_or_else(|| {
                ToolError::InvalidArgument(format!(
                    "read file {} does not match <prefix>_S<n>_L00<n>_R[12]_001.fastq.gz",
                    name
                ))
            })?;
            Ok((caps[1].to_string(), caps[2].to_string()))
        };
        let (prefix, r1_suffix) = split(r1)?;
        let (r2_prefix, r2_suffix) = split(r2)?;
        if prefix != r2_prefix {
            return Err(ToolError::InvalidArgument(format!(
                "read files have different prefixes: {} and {}",
                prefix, r2_prefix
            )));
        }
        Ok(PairedFiles {
            prefix,
            r1_suffix,
            r2_suffix,
        })
    }

    /// `<prefix>_filterbx<multiplicity><part><suffix>` for both mates.
    pub fn output_names(&self, multiplicity: Multiplicity, part: &str) -> (PathBuf, PathBuf) {
        let name = |suffix: &str| {
            PathBuf::from(format!(
                "{}_filterbx{}{}{}",
                self.prefix, multiplicity, part, suffix
            ))
        };
        (name(&self.r1_suffix), name(&self.r2_suffix))
    }
}

/// Read names of every barcode with an accepted multiplicity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidBarcodes {
    /// Barcode → distinct read names, both in first-seen order.
    pub barcodes: IndexMap<String, IndexSet<String>>,
}

impl ValidBarcodes {
    /// Scans barcode-sorted reads. Reads are counted per run of consecutive
    /// records sharing a barcode; mates share a name, so a barcode holds
    /// one name per pair. Reads without a barcode are ignored.
    pub fn scan(path: &Path, multiplicity: Multiplicity) -> ToolResult<Self> {
        let mut barcodes = IndexMap::new();
        let mut current: Option<(String, u64, IndexSet<String>)> = None;

        let mut close = |run: Option<(String, u64, IndexSet<String>)>| {
            if let Some((bx, reads, names)) = run {
                if multiplicity.contains(reads) {
                    barcodes.insert(bx, names);
                }
            }
        };

        for_each_record(path, |record| {
            let header = record.id();
            let Some(bx) = barcode(header) else {
                return Ok(());
            };
            let name = String::from_utf8_lossy(read_name(header)).into_owned();
            match current.as_mut() {
                Some((cur_bx, reads, names)) if cur_bx.as_bytes() == bx => {
                    *reads += 1;
                    names.insert(name);
                }
                _ => {
                    let mut names = IndexSet::new();
                    names.insert(name);
                    let bx = String::from_utf8_lossy(bx).into_owned();
                    close(current.replace((bx, 1, names)));
                }
            }
            Ok(())
        })?;
        close(current.take());

        Ok(ValidBarcodes { barcodes })
    }

    /// Number of read pairs kept.
    pub fn pairs(&self) -> usize {
        self.barcodes.values().map(IndexSet::len).sum()
    }

    pub fn names(&self) -> HashSet<&str> {
        self.barcodes
            .values()
            .flat_map(|names| names.iter().map(String::as_str))
            .collect()
    }
}

/// Copies the records of `input` whose name is in `names` to `output`.
fn filter_file(input: &Path, output: &Path, names: &HashSet<&str>) -> ToolResult<usize> {
    let mut out = create_output(Some(output))?;
    let mut kept = 0;
    for_each_record(input, |record| {
        let name = String::from_utf8_lossy(read_name(record.id()));
        if names.contains(name.as_ref()) {
            OwnedRecord::from_record(record).write(&mut *out)?;
            kept += 1;
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(kept)
}

/// Loads the records of `input` whose name is in `names`.
fn load_records(input: &Path, names: &HashSet<&str>) -> ToolResult<HashMap<String, OwnedRecord>> {
    let mut records = HashMap::with_capacity(names.len());
    for_each_record(input, |record| {
        let name = String::from_utf8_lossy(read_name(record.id()));
        if names.contains(name.as_ref()) {
            records.insert(name.into_owned(), OwnedRecord::from_record(record));
        }
        Ok(())
    })?;
    Ok(records)
}

/// Writes whole barcodes into `files` pair by pair. A new file is started
/// at a barcode boundary once the current one holds `pairs_per_file`
/// pairs; writing stops when the files run out.
///
/// # Returns
///
/// * `ToolResult<Vec<usize>>` - Pairs written to each file.
pub fn partition_pairs(
    valid: &ValidBarcodes,
    r1: &HashMap<String, OwnedRecord>,
    r2: &HashMap<String, OwnedRecord>,
    files: &[(PathBuf, PathBuf)],
    pairs_per_file: usize,
) -> ToolResult<Vec<usize>> {
    let mut written = Vec::with_capacity(files.len());
    let mut outputs = files.iter();
    let Some((path1, path2)) = outputs.next() else {
        return Ok(written);
    };
    let mut out1 = create_output(Some(path1.as_path()))?;
    let mut out2 = create_output(Some(path2.as_path()))?;
    let mut current = 0usize;

    for names in valid.barcodes.values() {
        if current >= pairs_per_file {
            out1.flush()?;
            out2.flush()?;
            written.push(current);
            current = 0;
            match outputs.next() {
                Some((path1, path2)) => {
                    out1 = create_output(Some(path1.as_path()))?;
                    out2 = create_output(Some(path2.as_path()))?;
                }
                None => return Ok(written),
            }
        }
        for name in names {
            let mate1 = r1.get(name).ok_or_else(|| ToolError::not_found(name, "read 1 file"))?;
            let mate2 = r2.get(name).ok_or_else(|| ToolError::not_found(name, "read 2 file"))?;
            mate1.write(&mut *out1)?;
            mate2.write(&mut *out2)?;
            current += 1;
        }
    }
    out1.flush()?;
    out2.flush()?;
    written.push(current);
    Ok(written)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BxMode {
    /// Keep every read with a valid barcode
    Filter,
    /// Split valid reads into files of a given size
    Partition,
    /// Write a single file of a given size
    Subsample,
}

#[derive(Args, Debug)]
pub struct FilterBxCmd {
    #[arg(value_enum)]
    pub mode: BxMode,

    /// Gzipped read 1 file (`<prefix>_S<n>_L00<n>_R1_001.fastq.gz`)
    pub r1: PathBuf,

    /// Gzipped read 2 file
    pub r2: PathBuf,

    /// Reads-per-barcode range to keep (e.g. 10-150), or `all`
    #[arg(short, long)]
    pub multiplicity: Multiplicity,

    /// Read coverage of each partition
    #[arg(short, long, conflicts_with = "num_reads")]
    pub coverage: Option<u64>,

    /// Haploid genome size (e.g. 3e9), needed with --coverage
    #[arg(short, long)]
    pub genome: Option<String>,

    /// Read length
    #[arg(short = 'l', long, default_value_t = 150)]
    pub read_length: u64,

    /// Number of reads in each partition (integer or scientific notation)
    #[arg(short, long)]
    pub num_reads: Option<String>,

    /// Barcode-sorted, barcoded reads [stdin]
    #[arg(short, long = "barcoded-reads", default_value = STDIO)]
    pub barcoded: PathBuf,
}

impl FilterBxCmd {
    /// Read pairs per output file from coverage or read count.
    pub fn pairs_per_file(&self) -> Result<usize> {
        let pairs = match (self.coverage, &self.num_reads) {
            (Some(_), Some(_)) => bail!("coverage and number of reads are mutually exclusive"),
            (Some(coverage), None) => {
                let genome = self
                    .genome
                    .as_deref()
                    .context("a haploid genome size (-g) is required to partition by coverage")?;
                let genome = parse_genome_size(genome)?;
                (coverage * genome / self.read_length) / 2
            }
            (None, Some(reads)) => parse_genome_size(reads)? / 2,
            (None, None) => bail!("{:?} mode needs --coverage or --num-reads", self.mode),
        };
        if pairs == 0 {
            bail!("each output file would hold no read pairs");
        }
        Ok(pairs as usize)
    }

    pub fn run(&self) -> Result<()> {
        let files = PairedFiles::new(&self.r1, &self.r2)?;
        let pairs_per_file = match self.mode {
            BxMode::Filter => None,
            BxMode::Partition | BxMode::Subsample => Some(self.pairs_per_file()?),
        };

        info!("Finding valid barcodes...");
        let valid = ValidBarcodes::scan(&self.barcoded, self.multiplicity)
            .with_context(|| format!("Failed to read barcoded reads {}", self.barcoded.display()))?;
        let names = valid.names();
        info!(
            "{} barcodes with {} read pairs in range {}",
            valid.barcodes.len(),
            valid.pairs(),
            self.multiplicity
        );

        let Some(pairs_per_file) = pairs_per_file else {
            let (new_r1, new_r2) = files.output_names(self.multiplicity, "");
            for (input, output) in [(&self.r1, &new_r1), (&self.r2, &new_r2)] {
                let kept = filter_file(input, output, &names)
                    .with_context(|| format!("Failed to filter {}", input.display()))?;
                debug!("{} reads written to {}", kept, output.display());
            }
            info!(
                "Reads filtered into {} and {}",
                new_r1.display(),
                new_r2.display()
            );
            return Ok(());
        };

        let num_files = match self.mode {
            BxMode::Subsample => 1,
            _ => valid.pairs().div_ceil(pairs_per_file).max(1),
        };
        let outputs: Vec<(PathBuf, PathBuf)> = (1..=num_files)
            .map(|i| files.output_names(self.multiplicity, &format!("_partition{}", i)))
            .collect();
        info!(
            "Writing {} file(s) per mate with about {} read pairs each",
            num_files, pairs_per_file
        );

        let r1 = load_records(&self.r1, &names)
            .with_context(|| format!("Failed to read {}", self.r1.display()))?;
        let r2 = load_records(&self.r2, &names)
            .with_context(|| format!("Failed to read {}", self.r2.display()))?;
        let written = partition_pairs(&valid, &r1, &r2, &outputs, pairs_per_file)?;
        if self.mode == BxMode::Subsample && written.first().copied().unwrap_or(0) < pairs_per_file {
            warn!(
                "Only {} of {} requested read pairs available",
                written.first().copied().unwrap_or(0),
                pairs_per_file
            );
        }
        for ((path1, _), pairs) in outputs.iter().zip(&written) {
            debug!("{}: {} pairs", path1.display(), pairs);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct BxHistCmd {
    /// Interleaved linked reads [stdin]
    #[arg(short, long, default_value = STDIO)]
    pub reads: PathBuf,

    /// Histogram bin width
    #[arg(short = 'w', long, default_value_t = 1000)]
    pub bin_width: u64,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Reads per barcode.
pub fn barcode_multiplicity(path: &Path) -> ToolResult<HashMap<Vec<u8>, i64>> {
    let mut counts = HashMap::new();
    for_each_record(path, |record| {
        if let Some(bx) = barcode(record.id()) {
            *counts.entry(bx.to_vec()).or_insert(0) += 1;
        }
        Ok(())
    })?;
    Ok(counts)
}

impl BxHistCmd {
    pub fn run(&self) -> Result<()> {
        let counts = barcode_multiplicity(&self.reads)
            .with_context(|| format!("Failed to read {}", self.reads.display()))?;
        info!("{} barcodes", counts.len());
        let values: Vec<i64> = counts.into_values().collect();
        let hist = Histogram::from_values(&values, self.bin_width)?;
        let mut out = create_output(self.output.as_deref())?;
        hist.write_tsv(&mut *out)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fastq(records: &[(&str, &str)]) -> String {
        records
            .iter()
            .map(|(header, seq)| format!("@{}\n{}\n+\n{}\n", header, seq, "I".repeat(seq.len())))
            .collect()
    }

    fn barcoded_reads() -> String {
        // interleaved mates: BX1 has 4 reads, BX2 has 2, BX3 has 6
        fastq(&[
            ("r1 BX:Z:AAAA-1", "ACGT"),
            ("r1 BX:Z:AAAA-1", "TTTT"),
            ("r2 BX:Z:AAAA-1", "ACGA"),
            ("r2 BX:Z:AAAA-1", "TTTA"),
            ("r3 BX:Z:CCCC-1", "ACGC"),
            ("r3 BX:Z:CCCC-1", "TTTC"),
            ("u1", "GGGG"),
            ("r4 BX:Z:GGGG-1", "CCCA"),
            ("r4 BX:Z:GGGG-1", "CCCC"),
            ("r5 BX:Z:GGGG-1", "CCCG"),
            ("r5 BX:Z:GGGG-1", "CCCT"),
            ("r6 BX:Z:GGGG-1", "CCAA"),
            ("r6 BX:Z:GGGG-1", "CCAC"),
        ])
    }

    fn raw_mates(mate: &str) -> String {
        let reads: Vec<(String, &str)> = ["r1", "r2", "r3", "r4", "r5", "r6", "u1"]
            .iter()
            .map(|name| (format!("{} {}:N:0:ACGT", name, mate), "ACGTACGT"))
            .collect();
        let refs: Vec<(&str, &str)> = reads.iter().map(|(h, s)| (h.as_str(), *s)).collect();
        fastq(&refs)
    }

    fn write_gz(path: &Path, content: &str) {
        let mut out = create_output(Some(path)).unwrap();
        out.write_all(content.as_bytes()).unwrap();
        out.flush().unwrap();
    }

    fn read_names(path: &Path) -> Vec<String> {
        let mut names = Vec::new();
        for_each_record(path, |r| {
            names.push(String::from_utf8_lossy(read_name(r.id())).into_owned());
            Ok(())
        })
        .unwrap();
        names
    }

    #[test]
    fn test_multiplicity_parsing() {
        assert_eq!("all".parse::<Multiplicity>().unwrap(), Multiplicity::All);
        let range: Multiplicity = "10-150".parse().unwrap();
        assert_eq!(range, Multiplicity::Range { min: 10, max: 150 });
        assert_eq!(range.to_string(), "10-150");
        assert!(range.contains(10) && range.contains(150) && !range.contains(151));
        assert!("150-10".parse::<Multiplicity>().is_err());
        assert!("10".parse::<Multiplicity>().is_err());
        assert_eq!(Multiplicity::All.to_string(), "_all");
    }

    #[test]
    fn test_paired_file_names() {
        let files = PairedFiles::new(
            Path::new("data/lib_S1_L001_R1_001.fastq.gz"),
            Path::new("data/lib_S1_L001_R2_001.fastq.gz"),
        )
        .unwrap();
        assert_eq!(files.prefix, "data/lib");
        let (r1, r2) = files.output_names(Multiplicity::Range { min: 2, max: 4 }, "_partition1");
        assert_eq!(r1, PathBuf::from("data/lib_filterbx2-4_partition1_S1_L001_R1_001.fastq.gz"));
        assert_eq!(r2, PathBuf::from("data/lib_filterbx2-4_partition1_S1_L001_R2_001.fastq.gz"));

        assert!(PairedFiles::new(
            Path::new("a_S1_L001_R1_001.fastq.gz"),
            Path::new("b_S1_L001_R2_001.fastq.gz")
        )
        .is_err());
        assert!(PairedFiles::new(Path::new("a_R1.fq.gz"), Path::new("a_R2.fq.gz")).is_err());
    }

    #[test]
    fn test_scan_valid_barcodes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("barcoded.fq");
        fs::write(&path, barcoded_reads()).unwrap();

        let valid = ValidBarcodes::scan(&path, Multiplicity::Range { min: 3, max: 5 }).unwrap();
        assert_eq!(valid.barcodes.keys().collect::<Vec<_>>(), vec!["BX:Z:AAAA-1"]);
        assert_eq!(valid.pairs(), 2);

        let all = ValidBarcodes::scan(&path, Multiplicity::All).unwrap();
        assert_eq!(all.barcodes.len(), 3);
        assert_eq!(all.pairs(), 6);
        assert_eq!(
            all.barcodes["BX:Z:GGGG-1"].iter().collect::<Vec<_>>(),
            vec!["r4", "r5", "r6"]
        );
    }

    #[test]
    fn test_filter_mode_writes_valid_reads() {
        let dir = tempdir().unwrap();
        let barcoded = dir.path().join("barcoded.fq");
        fs::write(&barcoded, barcoded_reads()).unwrap();
        let r1 = dir.path().join("lib_S1_L001_R1_001.fastq.gz");
        let r2 = dir.path().join("lib_S1_L001_R2_001.fastq.gz");
        write_gz(&r1, &raw_mates("1"));
        write_gz(&r2, &raw_mates("2"));

        FilterBxCmd {
            mode: BxMode::Filter,
            r1,
            r2,
            multiplicity: "1-5".parse().unwrap(),
            coverage: None,
            genome: None,
            read_length: 150,
            num_reads: None,
            barcoded,
        }
        .run()
        .unwrap();

        let out1 = dir.path().join("lib_filterbx1-5_S1_L001_R1_001.fastq.gz");
        let out2 = dir.path().join("lib_filterbx1-5_S1_L001_R2_001.fastq.gz");
        assert_eq!(read_names(&out1), vec!["r1", "r2", "r3"]);
        assert_eq!(read_names(&out2), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn test_partition_keeps_barcodes_whole() {
        let dir = tempdir().unwrap();
        let barcoded = dir.path().join("barcoded.fq");
        fs::write(&barcoded, barcoded_reads()).unwrap();
        let r1 = dir.path().join("lib_S1_L001_R1_001.fastq.gz");
        let r2 = dir.path().join("lib_S1_L001_R2_001.fastq.gz");
        write_gz(&r1, &raw_mates("1"));
        write_gz(&r2, &raw_mates("2"));

        let cmd = FilterBxCmd {
            mode: BxMode::Partition,
            r1,
            r2,
            multiplicity: Multiplicity::All,
            coverage: None,
            genome: None,
            read_length: 150,
            num_reads: Some("4".to_string()),
            barcoded,
        };
        assert_eq!(cmd.pairs_per_file().unwrap(), 2);
        cmd.run().unwrap();

        // 6 pairs at 2 per file -> 3 files; BX1 fills file 1 and BX2 + BX3 go
        // to file 2, so file 3 is never needed
        let part = |i: usize| {
            dir.path()
                .join(format!("lib_filterbx_all_partition{}_S1_L001_R1_001.fastq.gz", i))
        };
        assert_eq!(read_names(&part(1)), vec!["r1", "r2"]);
        assert_eq!(read_names(&part(2)), vec!["r3", "r4", "r5", "r6"]);
        assert!(!part(3).exists());
    }

    #[test]
    fn test_subsample_writes_one_file_ending_on_a_barcode() {
        let dir = tempdir().unwrap();
        let barcoded = dir.path().join("barcoded.fq");
        fs::write(&barcoded, barcoded_reads()).unwrap();
        let r1 = dir.path().join("lib_S1_L001_R1_001.fastq.gz");
        let r2 = dir.path().join("lib_S1_L001_R2_001.fastq.gz");
        write_gz(&r1, &raw_mates("1"));
        write_gz(&r2, &raw_mates("2"));

        // 3 pairs requested: BX1 (2 pairs) and BX2 (1 pair) fill the file and
        // BX3 is left out entirely
        FilterBxCmd {
            mode: BxMode::Subsample,
            r1,
            r2,
            multiplicity: Multiplicity::All,
            coverage: None,
            genome: None,
            read_length: 150,
            num_reads: Some("6".to_string()),
            barcoded,
        }
        .run()
        .unwrap();

        let partitions: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains("_partition"))
            .collect();
        assert_eq!(partitions.len(), 2, "{:?}", partitions);
        assert!(partitions.iter().all(|name| name.contains("_partition1_")));

        let out1 = dir.path().join("lib_filterbx_all_partition1_S1_L001_R1_001.fastq.gz");
        let out2 = dir.path().join("lib_filterbx_all_partition1_S1_L001_R2_001.fastq.gz");
        assert_eq!(read_names(&out1), vec!["r1", "r2", "r3"]);
        assert_eq!(read_names(&out2), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn test_pairs_per_file_from_coverage() {
        let mut cmd = FilterBxCmd {
            mode: BxMode::Subsample,
            r1: PathBuf::from("a"),
            r2: PathBuf::from("b"),
            multiplicity: Multiplicity::All,
            coverage: Some(30),
            genome: Some("1e6".to_string()),
            read_length: 150,
            num_reads: None,
            barcoded: PathBuf::from(STDIO),
        };
        assert_eq!(cmd.pairs_per_file().unwrap(), 100_000);
        cmd.genome = None;
        assert!(cmd.pairs_per_file().is_err());
        cmd.coverage = None;
        assert!(cmd.pairs_per_file().is_err());
    }

    #[test]
    fn test_barcode_histogram() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("barcoded.fq");
        fs::write(&path, barcoded_reads()).unwrap();
        let out = dir.path().join("hist.tsv");
        BxHistCmd {
            reads: path,
            bin_width: 4,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        // multiplicities 4, 2, 6 -> bins [0,4) [4,8)
        assert_eq!(fs::read_to_string(&out).unwrap(), "4\t1\n8\t2\n");
    }
}
