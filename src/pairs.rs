use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::table::EnzymeRow;

/// One row of `enzyme_uniprot_pairs.tsv`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairRow {
    #[serde(rename = "EC_number")]
    pub ec_number: String,
    #[serde(rename = "UniProt_ID")]
    pub uniprot_id: String,
}

impl PairRow {
    pub const COLUMNS: &'static [&'static str] = &["EC_number", "UniProt_ID"];
}

/// Expand each record's comma-joined accession list into one row per
/// `(EC number, accession)` pair, deduplicated across the whole input.
///
/// Pure function. Empty tokens are dropped, which guards against trailing
/// commas and records with no accessions at all. First-occurrence order is
/// kept so repeated runs produce byte-identical tables.
pub fn expand_pairs(rows: &[EnzymeRow]) -> Vec<PairRow> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for row in rows {
        let Some(ids) = row.uniprot_ids.as_deref() else {
            continue;
        };
        for token in ids.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let pair = PairRow {
                ec_number: row.ec_number.clone(),
                uniprot_id: token.to_string(),
            };
            if seen.insert(pair.clone()) {
                pairs.push(pair);
            }
        }
    }

    pairs
}
