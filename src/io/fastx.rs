//! Functions for reading and writing FASTA/FASTQ records.
//!
//! Leverages the `needletail` crate for efficient parsing
//! of FASTQ and FASTA formats, handling compressed files automatically.

use crate::error::{ToolError, ToolResult};
use indexmap::IndexMap;
use log::debug;
use needletail::errors::ParseErrorKind;
use needletail::parser::{write_fasta, write_fastq, LineEnding, SequenceRecord};
use needletail::{parse_fastx_file, parse_fastx_stdin, FastxReader};
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Opens a FASTA or FASTQ file (optionally compressed). `-` reads stdin,
/// which must not be an interactive terminal.
pub fn open_fastx(path: &Path) -> ToolResult<Box<dyn FastxReader>> {
    let reader = if path.as_os_str() == super::STDIO {
        if io::stdin().is_terminal() {
            return Err(ToolError::InvalidArgument(
                "reads must be piped from stdin or passed as an argument".to_string(),
            ));
        }
        parse_fastx_stdin()?
    } else {
        parse_fastx_file(path)?
    };
    Ok(reader)
}

/// Calls `f` for every record in `path`. An empty input yields no records.
///
/// # Arguments
///
/// * `path` - FASTA/FASTQ path or `-`.
/// * `f` - Callback receiving each borrowed record.
///
/// # Returns
///
/// * `ToolResult<usize>` - The number of records visited.
pub fn for_each_record<F>(path: &Path, mut f: F) -> ToolResult<usize>
where
    F: FnMut(&SequenceRecord) -> ToolResult<()>,
{
    let mut reader = match open_fastx(path) {
        Ok(reader) => reader,
        Err(ToolError::Sequence(e)) if matches!(e.kind, ParseErrorKind::EmptyFile) => {
            debug!("{} is empty", path.display());
            return Ok(0);
        }
        Err(e) => return Err(e),
    };
    let mut count = 0;
    while let Some(record) = reader.next() {
        let record = record?;
        f(&record)?;
        count += 1;
    }
    debug!("Read {} records from {}", count, path.display());
    Ok(count)
}

/// Splits a raw header into its identifier (first word) and the rest.
pub fn split_header(header: &[u8]) -> (String, Option<String>) {
    let header = String::from_utf8_lossy(header);
    let header = header.trim();
    match header.split_once(char::is_whitespace) {
        Some((id, desc)) => {
            let desc = desc.trim();
            let desc = if desc.is_empty() {
                None
            } else {
                Some(desc.to_string())
            };
            (id.to_string(), desc)
        }
        None => (header.to_string(), None),
    }
}

/// Identifier of a record: its header up to the first whitespace.
pub fn record_id(record: &SequenceRecord) -> String {
    split_header(record.id()).0
}

/// Linked-read barcode: the second whitespace-delimited header token.
pub fn barcode(header: &[u8]) -> Option<&[u8]> {
    header
        .split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .nth(1)
}

/// Read name: the first whitespace-delimited header token.
pub fn read_name(header: &[u8]) -> &[u8] {
    header
        .split(|b| b.is_ascii_whitespace())
        .next()
        .unwrap_or(header)
}

/// An owned sequence record, for tools that need to hold reads in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRecord {
    /// Full header line without the leading `>`/`@`.
    pub header: Vec<u8>,
    pub seq: Vec<u8>,
    pub qual: Option<Vec<u8>>,
}

impl OwnedRecord {
    pub fn from_record(record: &SequenceRecord) -> Self {
        OwnedRecord {
            header: record.id().to_vec(),
            seq: record.seq().into_owned(),
            qual: record.qual().map(|q| q.to_vec()),
        }
    }

    /// Writes the record as FASTQ (qualities default to `I` when absent).
    pub fn write_fastq(&self, writer: &mut dyn Write) -> ToolResult<()> {
        let default_qual;
        let qual = match &self.qual {
            Some(q) => q.as_slice(),
            None => {
                default_qual = vec![b'I'; self.seq.len()];
                default_qual.as_slice()
            }
        };
        write_fastq(&self.header, &self.seq, Some(qual), writer, LineEnding::Unix)?;
        Ok(())
    }

    /// Writes the record in its own format: FASTQ with qualities, FASTA
    /// without.
    pub fn write(&self, writer: &mut dyn Write) -> ToolResult<()> {
        match &self.qual {
            Some(_) => self.write_fastq(writer),
            None => {
                write_fasta(&self.header, &self.seq, writer, LineEnding::Unix)?;
                Ok(())
            }
        }
    }
}

/// Loads every record of a FASTA/FASTQ file into an id → sequence map.
pub fn read_sequence_map(path: &Path) -> ToolResult<IndexMap<String, Vec<u8>>> {
    let mut seqs = IndexMap::new();
    for_each_record(path, |record| {
        seqs.insert(record_id(record), record.seq().into_owned());
        Ok(())
    })?;
    Ok(seqs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use tempfile::tempdir;

    // Helper function to create a dummy FASTQ file
    fn create_dummy_fastq(path: &Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    // Helper function to create a dummy compressed FASTQ file
    fn create_dummy_fastq_gz(path: &Path, content: &str) {
        let file = fs::File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_read_single_fastq() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.fq");
        create_dummy_fastq(&file_path, "@seq1 BX:Z:AAAA-1\nACGT\n+\n!!!!\n@seq2\nTGCA\n+\n####\n");

        let mut ids = Vec::new();
        let n = for_each_record(&file_path, |r| {
            ids.push(record_id(r));
            Ok(())
        })
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(ids, vec!["seq1", "seq2"]);
    }

    #[test]
    fn test_read_single_fastq_gz() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.fq.gz");
        create_dummy_fastq_gz(&file_path, "@seq1\nACGT\n+\n!!!!\n@seq2\nTGCA\n+\n####\n");

        let mut records = Vec::new();
        for_each_record(&file_path, |r| {
            records.push(OwnedRecord::from_record(r));
            Ok(())
        })
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].seq, b"ACGT");
        assert_eq!(records[1].qual.as_deref(), Some(&b"####"[..]));
    }

    #[test]
    fn test_multiline_fasta_sequence_map() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("genes.fa");
        create_dummy_fastq(&file_path, ">g1 some gene\nACGT\nAC\n>g2\nTT\n");

        let seqs = read_sequence_map(&file_path).unwrap();
        assert_eq!(seqs.get("g1").unwrap(), b"ACGTAC");
        assert_eq!(seqs.get("g2").unwrap(), b"TT");
    }

    #[test]
    fn test_empty_file_has_no_records() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.fa");
        create_dummy_fastq(&file_path, "");
        assert_eq!(for_each_record(&file_path, |_| Ok(())).unwrap(), 0);
    }

    #[test]
    fn test_read_invalid_fastq() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.fq");
        create_dummy_fastq(&file_path, "@seq1\nACGT\n+\n!!!");
        assert!(for_each_record(&file_path, |_| Ok(())).is_err());
    }

    #[test]
    fn test_header_helpers() {
        assert_eq!(
            split_header(b"gene-1 protein AED:0.1"),
            ("gene-1".to_string(), Some("protein AED:0.1".to_string()))
        );
        assert_eq!(split_header(b"gene-1"), ("gene-1".to_string(), None));
        assert_eq!(barcode(b"read/1 BX:Z:ACGT-1"), Some(&b"BX:Z:ACGT-1"[..]));
        assert_eq!(barcode(b"read/1"), None);
        assert_eq!(read_name(b"read/1 BX:Z:ACGT-1"), b"read/1");
    }

    #[test]
    fn test_owned_record_writes_fastq() {
        let record = OwnedRecord {
            header: b"r1 BX:Z:AC-1".to_vec(),
            seq: b"ACGT".to_vec(),
            qual: Some(b"IIII".to_vec()),
        };
        let mut out = Vec::new();
        record.write_fastq(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "@r1 BX:Z:AC-1\nACGT\n+\nIIII\n");
    }
}
