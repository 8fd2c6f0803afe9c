use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pairs::PairRow;
use crate::table::EnzymeRow;
use crate::uniprot::SequenceEntry;

/// One row of `enzyme_master.tsv`. `sequence` is non-empty by construction;
/// rows that would carry no sequence are dropped during the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRow {
    #[serde(rename = "EC_number")]
    pub ec_number: String,
    #[serde(rename = "UniProt_ID")]
    pub uniprot_id: String,
    #[serde(rename = "Enzyme_name", default)]
    pub name: Option<String>,
    #[serde(rename = "Alt_names", default)]
    pub alt_names: Option<String>,
    #[serde(rename = "Reaction", default)]
    pub reaction: Option<String>,
    #[serde(rename = "Prosite_refs", default)]
    pub prosite_refs: Option<String>,
    #[serde(rename = "Sequence")]
    pub sequence: String,
    #[serde(rename = "Length", default)]
    pub length: Option<u64>,
    #[serde(rename = "Organism", default)]
    pub organism: Option<String>,
    #[serde(rename = "Protein_name", default)]
    pub protein_name: Option<String>,
    #[serde(rename = "Gene_name", default)]
    pub gene_name: Option<String>,
}

impl MasterRow {
    pub const COLUMNS: &'static [&'static str] = &[
        "EC_number",
        "UniProt_ID",
        "Enzyme_name",
        "Alt_names",
        "Reaction",
        "Prosite_refs",
        "Sequence",
        "Length",
        "Organism",
        "Protein_name",
        "Gene_name",
    ];
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub rows: Vec<MasterRow>,
    pub dropped: usize,
}

/// Join EC metadata and sequence metadata onto the pair table.
///
/// Both joins are left joins keyed on the pair: a pair with no matching EC
/// record keeps null metadata, and a pair with no matching sequence entry is
/// dropped along with any pair whose sequence is the empty string. The drop
/// count is returned and logged for operational visibility. Duplicate EC
/// numbers or accessions on the right-hand sides keep the first occurrence.
pub fn merge_master(
    records: &[EnzymeRow],
    pairs: &[PairRow],
    sequences: &[SequenceEntry],
) -> MergeOutcome {
    let mut meta: HashMap<&str, &EnzymeRow> = HashMap::new();
    for record in records {
        meta.entry(record.ec_number.as_str()).or_insert(record);
    }
    let mut by_accession: HashMap<&str, &SequenceEntry> = HashMap::new();
    for entry in sequences {
        by_accession.entry(entry.uniprot_id.as_str()).or_insert(entry);
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for pair in pairs {
        let Some(entry) = by_accession.get(pair.uniprot_id.as_str()) else {
            dropped += 1;
            continue;
        };
        let Some(sequence) = entry.sequence.as_deref().filter(|s| !s.is_empty()) else {
            dropped += 1;
            continue;
        };
        let record = meta.get(pair.ec_number.as_str());
        rows.push(MasterRow {
            ec_number: pair.ec_number.clone(),
            uniprot_id: pair.uniprot_id.clone(),
            name: record.and_then(|r| r.name.clone()),
            alt_names: record.and_then(|r| r.alt_names.clone()),
            reaction: record.and_then(|r| r.reaction.clone()),
            prosite_refs: record.and_then(|r| r.prosite_refs.clone()),
            sequence: sequence.to_string(),
            length: entry.length,
            organism: entry.organism.clone(),
            protein_name: entry.protein_name.clone(),
            gene_name: entry.gene_name.clone(),
        });
    }

    info!(
        kept = rows.len(),
        dropped, "merged master table, dropped rows without sequences"
    );
    MergeOutcome { rows, dropped }
}
