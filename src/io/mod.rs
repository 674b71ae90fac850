//! Input/Output operations module.
//!
//! Handles opening inputs (files, gzip files or standard input), creating
//! outputs, and the tab-separated reader/writer configuration shared by
//! every flat-file format in the toolbox.

pub mod fastx;
pub mod genbank;
pub mod gff;
pub mod orthogroups;
pub mod vcf;

use crate::error::{ToolError, ToolResult};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::path::Path;

/// The conventional name for standard input/output.
pub const STDIO: &str = "-";

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

/// Opens a path for buffered reading. `-` reads standard input and
/// `.gz` files are decompressed on the fly.
pub fn open_input(path: &Path) -> ToolResult<Box<dyn BufRead>> {
    if is_stdio(path) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|e| {
        ToolError::Io(io::Error::new(
            e.kind(),
            format!("cannot open {}: {}", path.display(), e),
        ))
    })?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Like [`open_input`], but refuses to block on an interactive terminal.
///
/// Tools that default to standard input use this so that running them
/// without piped data fails instead of waiting for keyboard input.
pub fn open_piped_input(path: &Path, what: &str) -> ToolResult<Box<dyn BufRead>> {
    if is_stdio(path) && io::stdin().is_terminal() {
        return Err(ToolError::InvalidArgument(format!(
            "{} must be piped from stdin or passed as an argument",
            what
        )));
    }
    open_input(path)
}

/// Creates an output sink. `None` and `-` write to standard output;
/// `.gz` paths are gzip-compressed.
pub fn create_output(path: Option<&Path>) -> ToolResult<Box<dyn Write>> {
    match path {
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
        Some(p) if is_stdio(p) => Ok(Box::new(BufWriter::new(io::stdout()))),
        Some(p) => {
            let file = File::create(p).map_err(|e| {
                ToolError::Io(io::Error::new(
                    e.kind(),
                    format!("cannot create {}: {}", p.display(), e),
                ))
            })?;
            if is_gzip(p) {
                Ok(Box::new(BufWriter::new(GzEncoder::new(
                    file,
                    Compression::default(),
                ))))
            } else {
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

/// Reader configuration for the tab-separated formats (TSV, GFF, VCF, BED).
///
/// Rows may have any width, quotes are literal characters and `#` lines are
/// skipped when `skip_comments` is set.
pub fn tsv_reader_builder(has_headers: bool, skip_comments: bool) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .has_headers(has_headers)
        .flexible(true)
        .quoting(false);
    if skip_comments {
        builder.comment(Some(b'#'));
    }
    builder
}

/// Opens a tab-separated file (or stdin) with [`tsv_reader_builder`].
pub fn tsv_reader(
    path: &Path,
    has_headers: bool,
    skip_comments: bool,
) -> ToolResult<csv::Reader<Box<dyn BufRead>>> {
    let input = open_input(path)?;
    Ok(tsv_reader_builder(has_headers, skip_comments).from_reader(input))
}

/// Wraps a sink in a tab-separated writer that never quotes fields.
pub fn tsv_writer<W: Write>(sink: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(sink)
}

/// Reads a line-separated list, trimming whitespace and dropping blank
/// lines. Repeated entries are kept.
pub fn read_list(path: &Path) -> ToolResult<Vec<String>> {
    let reader = open_piped_input(path, "identifiers")?;
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let item = line.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }
    }
    Ok(items)
}

/// Like [`read_list`], but deduplicated in order of first appearance.
pub fn read_id_list(path: &Path) -> ToolResult<IndexSet<String>> {
    Ok(read_list(path)?.into_iter().collect())
}

/// Returns the final path component as a string, or the whole path when it
/// has none.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_gzip_output_round_trips_through_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt.gz");
        {
            let mut out = create_output(Some(&path)).unwrap();
            out.write_all(b"line one\nline two\n").unwrap();
            out.flush().unwrap();
        }
        let mut content = String::new();
        open_input(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "line one\nline two\n");
    }

    #[test]
    fn test_open_missing_file_names_path() {
        let err = match open_input(Path::new("/nonexistent/file.tsv")) {
            Err(e) => e.to_string(),
            Ok(_) => panic!("expected an error"),
        };
        assert!(err.contains("/nonexistent/file.tsv"));
    }

    #[test]
    fn test_tsv_reader_skips_comments_and_keeps_quotes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.tsv");
        fs::write(&path, "# comment\na\t\"b\"\tc\nd\te\n").unwrap();
        let mut reader = tsv_reader(&path, false, true).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "\"b\"");
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn test_tsv_writer_never_quotes() {
        let mut writer = tsv_writer(Vec::new());
        writer.write_record(["a b", "say \"hi\""]).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a b\tsay \"hi\"\n");
    }

    #[test]
    fn test_read_id_list_dedups_and_trims() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        fs::write(&path, "g1\n g2 \n\ng1\n").unwrap();
        let ids = read_id_list(&path).unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["g1", "g2"]);
    }

    #[test]
    fn test_read_list_keeps_repeats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pfam.txt");
        fs::write(&path, "PF00001\nPF00002\nPF00001\n").unwrap();
        assert_eq!(read_list(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename(Path::new("/data/run/sample.json")), "sample.json");
    }
}
