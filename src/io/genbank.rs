//! GenBank records from antiSMASH and MIBiG, read with `gb-io`.
//!
//! Files may hold several records separated by `//`. Sequences are
//! upper-cased on reading so extracted CDS sequences are upper-case too.

use crate::error::{ToolError, ToolResult};
use gb_io::reader::SeqReader;
use gb_io::seq::{Feature, Seq};
use std::path::Path;

/// Value of the first `key` qualifier. Flag qualifiers such as `/pseudo`
/// have an empty value.
pub fn qualifier<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    qualifier_values(feature, key).into_iter().next()
}

/// Every value of a (possibly repeated) qualifier, in file order.
pub fn qualifier_values<'a>(feature: &'a Feature, key: &str) -> Vec<&'a str> {
    feature
        .qualifiers
        .iter()
        .filter(|(k, _)| &**k == key)
        .map(|(_, value)| value.as_deref().unwrap_or(""))
        .collect()
}

/// Leftmost and rightmost base of a feature, 1-based and inclusive.
pub fn bounds(feature: &Feature) -> ToolResult<(u64, u64)> {
    let (from, to) = feature.location.find_bounds().map_err(|e| {
        ToolError::GenBank(format!("unresolvable {} location: {:?}", &*feature.kind, e))
    })?;
    if from < 0 || to < from {
        return Err(ToolError::GenBank(format!(
            "{} location outside the record: {}..{}",
            &*feature.kind, from, to
        )));
    }
    Ok((from as u64 + 1, to as u64))
}

/// One GenBank record.
#[derive(Debug, Clone)]
pub struct GenBankRecord {
    /// Name from the LOCUS line.
    pub name: String,
    pub seq: Seq,
}

impl GenBankRecord {
    fn from_seq(mut seq: Seq) -> Self {
        seq.seq.make_ascii_uppercase();
        let name = seq.name.clone().unwrap_or_default();
        GenBankRecord { name, seq }
    }

    pub fn features_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Feature> {
        self.seq.features.iter().filter(move |f| &*f.kind == kind)
    }

    /// Sequence covered by a feature, reverse complemented on the minus strand.
    pub fn extract(&self, feature: &Feature) -> ToolResult<Vec<u8>> {
        self.seq.extract_location(&feature.location).map_err(|e| {
            ToolError::GenBank(format!(
                "cannot extract {} from record {}: {:?}",
                &*feature.kind, self.name, e
            ))
        })
    }
}

fn read_records(path: &Path) -> ToolResult<impl Iterator<Item = ToolResult<GenBankRecord>>> {
    let reader = SeqReader::new(super::open_input(path)?);
    Ok(reader.map(|result| {
        result
            .map(GenBankRecord::from_seq)
            .map_err(|e| ToolError::GenBank(e.to_string()))
    }))
}

/// Reads every record in a GenBank file.
pub fn read_genbank(path: &Path) -> ToolResult<Vec<GenBankRecord>> {
    read_records(path)?.collect()
}

/// Finds the record whose LOCUS name is `name`.
pub fn find_record(path: &Path, name: &str) -> ToolResult<GenBankRecord> {
    for record in read_records(path)? {
        let record = record?;
        if record.name == name {
            return Ok(record);
        }
    }
    Err(ToolError::not_found(name, path.display().to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    pub(crate) const MIBIG_GBK: &str = "\
LOCUS       BGC0000001                60 bp    DNA     linear   BCT 01-JAN-1980
DEFINITION  Test biosynthetic gene cluster.
ACCESSION   BGC0000001
FEATURES             Location/Qualifiers
     source          1..60
                     /organism=\"Streptomyces test\"
     CDS             1..9
                     /locus_tag=\"ABC_0001\"
                     /protein_id=\"AAA00001.1\"
                     /product=\"polyketide synthase\"
                     /gene_kind=\"biosynthetic\"
                     /gene_functions=\"biosynthetic (rule-based-clusters) T1PKS\"
                     /gene_functions=\"biosynthetic-additional\"
                     /translation=\"MKV\"
     CDS             complement(join(11..13,20..22))
                     /locus_tag=\"ABC_0002\"
                     /pseudo
ORIGIN
        1 atgaaagtgt aaccgtaaat gcccgggttt aaacccgggt ttaaacccgg gtttaaaccc
//
LOCUS       BGC0000002                12 bp    DNA     linear   BCT 01-JAN-1980
DEFINITION  Second record.
FEATURES             Location/Qualifiers
     CDS             <1..>12
                     /gene=\"xyz\"
ORIGIN
        1 atggggccct aa
//
";

    /// Records of [`MIBIG_GBK`].
    pub(crate) fn mibig_records() -> Vec<GenBankRecord> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mibig.gbk");
        fs::write(&path, MIBIG_GBK).unwrap();
        read_genbank(&path).unwrap()
    }

    #[test]
    fn test_reads_multiple_records() {
        let records = mibig_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "BGC0000001");
        assert_eq!(records[0].seq.seq.len(), 60);
        assert_eq!(records[1].name, "BGC0000002");
        assert_eq!(records[1].seq.seq, b"ATGGGGCCCTAA");
    }

    #[test]
    fn test_qualifiers() {
        let records = mibig_records();
        let cds: Vec<&Feature> = records[0].features_of_kind("CDS").collect();
        assert_eq!(cds.len(), 2);
        assert_eq!(qualifier(cds[0], "product"), Some("polyketide synthase"));
        assert_eq!(
            qualifier_values(cds[0], "gene_functions"),
            vec!["biosynthetic (rule-based-clusters) T1PKS", "biosynthetic-additional"]
        );
        assert_eq!(qualifier(cds[0], "missing"), None);
        assert_eq!(qualifier(cds[1], "pseudo"), Some(""));
    }

    #[test]
    fn test_bounds_and_extraction() {
        let records = mibig_records();
        let cds: Vec<&Feature> = records[0].features_of_kind("CDS").collect();
        assert_eq!(bounds(cds[0]).unwrap(), (1, 9));
        assert_eq!(records[0].extract(cds[0]).unwrap(), b"ATGAAAGTG");
        // AAC + TGC reverse complemented
        assert_eq!(bounds(cds[1]).unwrap(), (11, 22));
        assert_eq!(records[0].extract(cds[1]).unwrap(), b"GCAGTT");

        let partial = records[1].features_of_kind("CDS").next().unwrap();
        assert_eq!(bounds(partial).unwrap(), (1, 12));
    }

    #[test]
    fn test_find_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mibig.gbk");
        fs::write(&path, MIBIG_GBK).unwrap();
        assert_eq!(find_record(&path, "BGC0000002").unwrap().name, "BGC0000002");
        let err = find_record(&path, "BGC0000404").unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_genbank(&dir.path().join("absent.gbk")).is_err());
    }
}
