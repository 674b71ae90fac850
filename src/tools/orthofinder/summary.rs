//! `og-summary` and `og-select`: orthogroup categories by species presence.

use crate::io::orthogroups::{Category, OrthogroupTable};
use crate::io::{create_output, tsv_writer};
use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

/// Orthogroup counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub core: usize,
    pub core_single_copy: usize,
    pub accessory: usize,
    pub singleton: usize,
}

impl CategoryCounts {
    pub fn from_table(table: &OrthogroupTable) -> Self {
        let count = |category| table.rows_in(category).count();
        CategoryCounts {
            core: count(Category::CoreAll),
            core_single_copy: count(Category::CoreSingle),
            accessory: count(Category::Accessory),
            singleton: count(Category::Singleton),
        }
    }

    fn rows(&self) -> [(&'static str, &'static str, usize); 4] {
        [
            ("core", "all", self.core),
            ("core", "single_copy", self.core_single_copy),
            ("accessory", "all", self.accessory),
            ("singleton", "all", self.singleton),
        ]
    }
}

#[derive(Args, Debug)]
pub struct SummaryCmd {
    /// N0.tsv or Orthogroups.tsv
    pub tsv: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SummaryCmd {
    pub fn run(&self) -> Result<()> {
        let table = OrthogroupTable::read(&self.tsv)
            .with_context(|| format!("Failed to read {}", self.tsv.display()))?;
        let counts = CategoryCounts::from_table(&table);

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record(["type", "category", "count"])?;
        for (kind, category, count) in counts.rows() {
            writer.write_record([kind, category, count.to_string().as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SelectCmd {
    /// N0.tsv or Orthogroups.tsv
    pub tsv: PathBuf,

    /// Category of orthogroups to print
    #[arg(short = 't', long = "type", value_enum, default_value_t = Category::CoreSingle)]
    pub category: Category,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SelectCmd {
    pub fn run(&self) -> Result<()> {
        let table = OrthogroupTable::read(&self.tsv)
            .with_context(|| format!("Failed to read {}", self.tsv.display()))?;

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        let mut header = table.key_columns();
        header.extend(table.species.iter().map(String::as_str));
        writer.write_record(&header)?;

        let mut selected = 0usize;
        for row in table.rows_in(self.category) {
            let mut fields = table.key_values(row);
            fields.extend(table.cells[row].iter().map(String::as_str));
            writer.write_record(&fields)?;
            selected += 1;
        }
        writer.flush()?;
        info!("Selected {} of {} orthogroups", selected, table.len());
        Ok(())
    }
}
