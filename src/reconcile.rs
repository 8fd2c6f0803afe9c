use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One row of `uniprot_missing_ids.tsv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRow {
    #[serde(rename = "UniProt_ID")]
    pub uniprot_id: String,
}

impl MissingRow {
    pub const COLUMNS: &'static [&'static str] = &["UniProt_ID"];
}

/// Accessions that were requested but never retrieved, sorted.
///
/// Drives a deliberate second `download` pass over only the gap. Extra
/// retrieved accessions that were never requested are simply ignored.
pub fn missing_accessions(
    requested: &BTreeSet<String>,
    retrieved: &BTreeSet<String>,
) -> Vec<String> {
    requested.difference(retrieved).cloned().collect()
}
