use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::Accession;
use crate::error::LinkError;
use crate::flatfile;
use crate::merge::{MasterRow, merge_master};
use crate::pairs::{PairRow, expand_pairs};
use crate::reconcile::{MissingRow, missing_accessions};
use crate::table::{self, EnzymeRow};
use crate::uniprot::{SequenceEntry, UniprotSearchClient, fetch_batches};

#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub records: usize,
    pub output: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplodeResult {
    pub pairs: usize,
    pub output: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub requested: usize,
    pub retrieved: usize,
    pub chunks: usize,
    pub failed_chunks: usize,
    pub empty_chunks: usize,
    /// `None` when no chunk yielded any data and no file was written.
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingResult {
    pub requested: usize,
    pub retrieved: usize,
    pub missing: usize,
    pub output: String,
}

/// Accession-only view of an input table. `download` and `missing` need
/// nothing but the `UniProt_ID` column, so they accept the pair table and
/// the missing-ids table interchangeably; that is what makes a second
/// download pass over `uniprot_missing_ids.tsv` work.
#[derive(Debug, Deserialize)]
struct AccessionRow {
    #[serde(rename = "UniProt_ID")]
    uniprot_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    pub rows: usize,
    pub dropped: usize,
    pub output: String,
}

/// Pipeline driver. Each method is one stage of the ENZYME/UniProt link:
/// flat file -> raw table -> pair table -> sequence table -> master table,
/// with `missing` computing the gap for a resumable second download pass.
pub struct App<U: UniprotSearchClient> {
    uniprot: U,
}

impl<U: UniprotSearchClient> App<U> {
    pub fn new(uniprot: U) -> Self {
        Self { uniprot }
    }

    /// Parse the ENZYME flat file into `enzyme_raw.tsv`. Entries with no
    /// accessions still emit a row; their `UniProt_IDs` field is empty.
    pub fn parse(&self, input: &Utf8Path, output: &Utf8Path) -> Result<ParseResult, LinkError> {
        info!(%input, "parsing ENZYME flat file");
        let records = flatfile::parse_file(input)?;
        let rows: Vec<EnzymeRow> = records.into_iter().map(EnzymeRow::from).collect();
        table::write_rows(output, EnzymeRow::COLUMNS, &rows)?;
        info!(records = rows.len(), %output, "wrote raw enzyme table");
        Ok(ParseResult {
            records: rows.len(),
            output: output.to_string(),
        })
    }

    /// Explode the comma-joined accession column into one row per pair.
    pub fn explode(&self, input: &Utf8Path, output: &Utf8Path) -> Result<ExplodeResult, LinkError> {
        let rows: Vec<EnzymeRow> = table::read_rows(input, &["EC_number", "UniProt_IDs"])?;
        let pairs = expand_pairs(&rows);
        table::write_rows(output, PairRow::COLUMNS, &pairs)?;
        info!(pairs = pairs.len(), %output, "wrote EC/UniProt pair table");
        Ok(ExplodeResult {
            pairs: pairs.len(),
            output: output.to_string(),
        })
    }

    /// Batch-fetch sequence metadata for every accession in the input
    /// table. Any table with a `UniProt_ID` column works, so the same stage
    /// serves the first pass over the pair table and a second pass over the
    /// missing-ids table.
    ///
    /// When not a single chunk yields data, no output file is written.
    pub fn download(
        &self,
        input: &Utf8Path,
        output: &Utf8Path,
        chunk_size: usize,
        sleep: Duration,
    ) -> Result<DownloadResult, LinkError> {
        let rows: Vec<AccessionRow> = table::read_rows(input, &["UniProt_ID"])?;

        let mut accessions = Vec::new();
        for row in &rows {
            match Accession::from_str(&row.uniprot_id) {
                Ok(acc) => accessions.push(acc),
                Err(err) => warn!(id = %row.uniprot_id, error = %err, "skipping malformed accession"),
            }
        }

        let outcome = fetch_batches(&self.uniprot, &accessions, chunk_size, sleep)?;
        if outcome.entries.is_empty() {
            warn!(
                chunks = outcome.chunks,
                failed = outcome.failed_chunks,
                "no data fetched across all chunks, not writing output file"
            );
            return Ok(DownloadResult {
                requested: outcome.requested,
                retrieved: 0,
                chunks: outcome.chunks,
                failed_chunks: outcome.failed_chunks,
                empty_chunks: outcome.empty_chunks,
                output: None,
            });
        }

        table::write_rows(output, SequenceEntry::COLUMNS, &outcome.entries)?;
        info!(entries = outcome.entries.len(), %output, "wrote sequence table");
        Ok(DownloadResult {
            requested: outcome.requested,
            retrieved: outcome.entries.len(),
            chunks: outcome.chunks,
            failed_chunks: outcome.failed_chunks,
            empty_chunks: outcome.empty_chunks,
            output: Some(output.to_string()),
        })
    }

    /// Write the accessions present in the pair table but absent from the
    /// sequence table, sorted, one per row.
    pub fn missing(
        &self,
        pairs_path: &Utf8Path,
        sequences_path: &Utf8Path,
        output: &Utf8Path,
    ) -> Result<MissingResult, LinkError> {
        let pairs: Vec<AccessionRow> = table::read_rows(pairs_path, &["UniProt_ID"])?;
        let sequences: Vec<AccessionRow> = table::read_rows(sequences_path, &["UniProt_ID"])?;

        let requested: BTreeSet<String> =
            pairs.into_iter().map(|row| row.uniprot_id).collect();
        let retrieved: BTreeSet<String> =
            sequences.into_iter().map(|row| row.uniprot_id).collect();
        let missing = missing_accessions(&requested, &retrieved);

        let rows: Vec<MissingRow> = missing
            .iter()
            .map(|id| MissingRow {
                uniprot_id: id.clone(),
            })
            .collect();
        table::write_rows(output, MissingRow::COLUMNS, &rows)?;
        info!(
            requested = requested.len(),
            retrieved = retrieved.len(),
            missing = missing.len(),
            %output,
            "wrote missing-accession table"
        );
        Ok(MissingResult {
            requested: requested.len(),
            retrieved: retrieved.len(),
            missing: missing.len(),
            output: output.to_string(),
        })
    }

    /// Join raw metadata and fetched sequences onto the pair table and write
    /// the master table, dropping pairs without a usable sequence.
    pub fn merge(
        &self,
        raw_path: &Utf8Path,
        pairs_path: &Utf8Path,
        sequences_path: &Utf8Path,
        output: &Utf8Path,
    ) -> Result<MergeResult, LinkError> {
        let records: Vec<EnzymeRow> = table::read_rows(raw_path, &["EC_number"])?;
        let pairs: Vec<PairRow> = table::read_rows(pairs_path, &["EC_number", "UniProt_ID"])?;
        let sequences: Vec<SequenceEntry> = table::read_rows(sequences_path, &["UniProt_ID"])?;

        let outcome = merge_master(&records, &pairs, &sequences);
        table::write_rows(output, MasterRow::COLUMNS, &outcome.rows)?;
        info!(rows = outcome.rows.len(), %output, "wrote master table");
        Ok(MergeResult {
            rows: outcome.rows.len(),
            dropped: outcome.dropped,
            output: output.to_string(),
        })
    }
}
