//! GFF3 reading.
//!
//! Feature lines are parsed with `noodles-gff`. The nine raw columns are kept
//! next to the parsed feature so records can be written back unchanged.
//! Parsing stops at a `##FASTA` directive or at the first line that looks like
//! a FASTA header, as MAKER and GAG append sequences to their GFF output.

use crate::error::{ToolError, ToolResult};
use indexmap::IndexSet;
use lazy_static::lazy_static;
use noodles_gff as gff;
use noodles_gff::feature::RecordBuf;
use regex::Regex;
use std::io::BufRead;
use std::path::Path;

lazy_static! {
    static ref GO_RE: Regex = Regex::new(r"GO:\d{7}").expect("valid GO regex");
    static ref PFAM_RE: Regex = Regex::new(r"PF\d{5}").expect("valid Pfam regex");
}

/// One GFF3 feature line. Coordinates are 1-based and inclusive.
#[derive(Debug, Clone)]
pub struct GffRecord {
    pub seqid: String,
    pub source: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub score: String,
    pub strand: String,
    pub phase: String,
    pub attributes: String,
    feature: RecordBuf,
}

fn utf8<T: AsRef<[u8]> + ?Sized>(value: &T) -> Option<&str> {
    std::str::from_utf8(value.as_ref()).ok()
}

impl GffRecord {
    fn parse(line: &str, line_no: u64) -> ToolResult<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 9 {
            return Err(ToolError::malformed(
                "GFF",
                line_no,
                format!("expected 9 columns, found {}", fields.len()),
            ));
        }
        let attributes = fields[8].trim_end();

        // RepeatMasker writes GFF2 attributes (`Target "Motif:..." 1 40`);
        // those stay as raw text and only the first eight columns are parsed.
        let gff3_line = if attributes.contains('=') {
            fields[..9].join("\t")
        } else {
            format!("{}\t.", fields[..8].join("\t"))
        };
        let feature = gff::io::Reader::new(gff3_line.as_bytes())
            .record_bufs()
            .next()
            .ok_or_else(|| ToolError::malformed("GFF", line_no, "empty feature line"))?
            .map_err(|e| ToolError::malformed("GFF", line_no, e.to_string()))?;

        Ok(GffRecord {
            seqid: feature.reference_sequence_name().to_string(),
            source: feature.source().to_string(),
            feature_type: feature.ty().to_string(),
            start: feature.start().get() as u64,
            end: feature.end().get() as u64,
            score: fields[5].to_string(),
            strand: fields[6].to_string(),
            phase: fields[7].to_string(),
            attributes: attributes.to_string(),
            feature,
        })
    }

    /// Length as `end - start`, the convention used by the gene length tools.
    pub fn span(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Decoded value of a single-valued attribute, e.g. `ID` or `Note`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.feature
            .attributes()
            .get(key.as_bytes())
            .and_then(|value| value.as_string())
            .and_then(utf8)
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("ID")
    }

    pub fn parent(&self) -> Option<&str> {
        self.attribute("Parent")
    }

    pub fn note(&self) -> Option<&str> {
        self.attribute("Note")
    }

    /// Every GO term in the attribute column, deduplicated in order.
    pub fn go_terms(&self) -> Vec<String> {
        find_unique(&GO_RE, &self.attributes)
    }

    /// Every Pfam accession in the attribute column, deduplicated in order.
    pub fn pfam_domains(&self) -> Vec<String> {
        find_unique(&PFAM_RE, &self.attributes)
    }

    /// Renders the record back into its nine tab-separated columns.
    pub fn to_fields(&self) -> [String; 9] {
        [
            self.seqid.clone(),
            self.source.clone(),
            self.feature_type.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.score.clone(),
            self.strand.clone(),
            self.phase.clone(),
            self.attributes.clone(),
        ]
    }
}

fn find_unique(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Iterator over the features of a GFF3 stream.
pub struct GffReader<R: BufRead> {
    inner: R,
    line: String,
    line_no: u64,
    done: bool,
}

impl<R: BufRead> GffReader<R> {
    pub fn new(reader: R) -> Self {
        GffReader {
            inner: reader,
            line: String::new(),
            line_no: 0,
            done: false,
        }
    }
}

impl GffReader<Box<dyn BufRead>> {
    pub fn from_path(path: &Path) -> ToolResult<Self> {
        Ok(GffReader::new(super::open_input(path)?))
    }
}

impl<R: BufRead> Iterator for GffReader<R> {
    type Item = ToolResult<GffRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line.clear();
            match self.inner.read_line(&mut self.line) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.line.trim_end_matches(['\r', '\n']);
                    if line.starts_with("##FASTA") || line.starts_with('>') {
                        self.done = true;
                        break;
                    }
                    if line.starts_with('#') || line.trim().is_empty() {
                        continue;
                    }
                    return Some(GffRecord::parse(line, self.line_no));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MAKER_GFF: &str = "##gff-version 3\n\
scaf1\tmaker\tgene\t100\t500\t.\t+\t.\tID=gene1;Name=gene1\n\
scaf1\tmaker\tmRNA\t100\t500\t.\t+\t.\tID=gene1-mRNA-1;Parent=gene1;Note=Similar to abc: Protein X;Dbxref=Pfam:PF00001,Pfam:PF00002,Pfam:PF00001;Ontology_term=GO:0005524,GO:0016020\n\
scaf1\tmaker\texon\t100\t200\t.\t+\t.\tID=gene1-mRNA-1:exon:1;Parent=gene1-mRNA-1\n\
##FASTA\n\
>scaf1\n\
ACGT\n";

    fn records() -> Vec<GffRecord> {
        GffReader::new(Cursor::new(MAKER_GFF))
            .collect::<ToolResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_reads_features_until_fasta_section() {
        let records = records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].feature_type, "gene");
        assert_eq!(records[0].start, 100);
        assert_eq!(records[0].span(), 400);
    }

    #[test]
    fn test_attributes() {
        let mrna = &records()[1];
        assert_eq!(mrna.id(), Some("gene1-mRNA-1"));
        assert_eq!(mrna.parent(), Some("gene1"));
        assert_eq!(mrna.note(), Some("Similar to abc: Protein X"));
        assert_eq!(mrna.attribute("Missing"), None);
    }

    #[test]
    fn test_functional_annotations_are_unique_and_ordered() {
        let mrna = &records()[1];
        assert_eq!(mrna.pfam_domains(), vec!["PF00001", "PF00002"]);
        assert_eq!(mrna.go_terms(), vec!["GO:0005524", "GO:0016020"]);
    }

    #[test]
    fn test_bad_coordinate_is_an_error() {
        let gff = "scaf1\tsrc\tgene\tten\t20\t.\t+\t.\tID=g\n";
        let result: ToolResult<Vec<_>> = GffReader::new(Cursor::new(gff)).collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_percent_encoded_values_are_decoded() {
        let gff = "scaf1\tmaker\tmRNA\t1\t90\t.\t+\t.\tID=m1;Note=lipase%3B putative\n";
        let records: Vec<GffRecord> = GffReader::new(Cursor::new(gff))
            .collect::<ToolResult<_>>()
            .unwrap();
        assert_eq!(records[0].note(), Some("lipase; putative"));
        assert_eq!(records[0].attributes, "ID=m1;Note=lipase%3B putative");
    }

    #[test]
    fn test_gff2_attributes_are_kept_verbatim() {
        let gff = "scaf1\tRepeatMasker\tsimilarity\t10\t90\t20\t+\t.\tTarget \"Motif:L1\" 1 80\n";
        let records: Vec<GffRecord> = GffReader::new(Cursor::new(gff))
            .collect::<ToolResult<_>>()
            .unwrap();
        assert_eq!(records[0].start, 10);
        assert_eq!(records[0].id(), None);
        assert_eq!(records[0].attributes, "Target \"Motif:L1\" 1 80");
        assert_eq!(records[0].to_fields()[5], "20");
    }

    #[test]
    fn test_short_line_is_an_error() {
        let gff = "scaf1\tsrc\tgene\n";
        let result: ToolResult<Vec<_>> = GffReader::new(Cursor::new(gff)).collect();
        assert!(result.is_err());
    }
}
