use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::Accession;
use crate::error::LinkError;

const SEARCH_URL: &str = "https://rest.uniprot.org/uniprotkb/search";
const REQUEST_FIELDS: &str = "accession,organism_name,protein_name,gene_primary,sequence,length";

/// UniProt's own cap on results per search request.
pub const MAX_CHUNK_SIZE: usize = 500;
const PAGE_SIZE: &str = "499";

/// One row of `uniprot_sequences.tsv`: the canonical shape every search
/// response is normalized into, regardless of which header spellings the
/// service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceEntry {
    #[serde(rename = "UniProt_ID")]
    pub uniprot_id: String,
    #[serde(rename = "Sequence", default)]
    pub sequence: Option<String>,
    #[serde(rename = "Length", default)]
    pub length: Option<u64>,
    #[serde(rename = "Organism", default)]
    pub organism: Option<String>,
    #[serde(rename = "Protein_name", default)]
    pub protein_name: Option<String>,
    #[serde(rename = "Gene_name", default)]
    pub gene_name: Option<String>,
}

impl SequenceEntry {
    pub const COLUMNS: &'static [&'static str] = &[
        "UniProt_ID",
        "Sequence",
        "Length",
        "Organism",
        "Protein_name",
        "Gene_name",
    ];
}

/// Header spellings UniProt has used for each canonical column. The service
/// renames these between releases, so the open set is mapped onto a fixed
/// schema here.
const ACCESSION_HEADERS: &[&str] = &["Entry", "Accession"];
const SEQUENCE_HEADERS: &[&str] = &["Sequence"];
const LENGTH_HEADERS: &[&str] = &["Length"];
const ORGANISM_HEADERS: &[&str] = &[
    "Organism",
    "Organism (scientific name)",
    "Organism [Organism]",
];
const PROTEIN_NAME_HEADERS: &[&str] = &["Protein names", "Protein name"];
const GENE_NAME_HEADERS: &[&str] = &[
    "Gene Names",
    "Gene Names (primary)",
    "Gene Names (primary name)",
];

/// Seam for the search endpoint. `search` returns the raw TSV body; an empty
/// body is the service's way of saying "no matches" on an otherwise
/// successful response.
pub trait UniprotSearchClient: Send + Sync {
    fn search(&self, accessions: &[Accession]) -> Result<String, LinkError>;
}

#[derive(Clone)]
pub struct UniprotHttpClient {
    client: Client,
    base_url: String,
}

impl UniprotHttpClient {
    pub fn new() -> Result<Self, LinkError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("enzyme-link/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| LinkError::UniprotHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| LinkError::UniprotHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: SEARCH_URL.to_string(),
        })
    }

    pub fn with_base_url(base_url: String) -> Result<Self, LinkError> {
        let mut client = Self::new()?;
        client.base_url = base_url;
        Ok(client)
    }
}

impl UniprotSearchClient for UniprotHttpClient {
    fn search(&self, accessions: &[Accession]) -> Result<String, LinkError> {
        let query = build_accession_query(accessions);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("query", query.as_str()),
                ("format", "tsv"),
                ("fields", REQUEST_FIELDS),
                ("size", PAGE_SIZE),
            ])
            .send()
            .map_err(|err| LinkError::UniprotHttp(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "UniProt request failed".to_string());
            return Err(LinkError::UniprotStatus { status, message });
        }
        response
            .text()
            .map_err(|err| LinkError::UniprotHttp(err.to_string()))
    }
}

/// Boolean-OR query over accessions: `accession:P00330 OR accession:P00331`.
pub fn build_accession_query(accessions: &[Accession]) -> String {
    accessions
        .iter()
        .map(|acc| format!("accession:{acc}"))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub entries: Vec<SequenceEntry>,
    pub requested: usize,
    pub chunks: usize,
    pub failed_chunks: usize,
    pub empty_chunks: usize,
}

/// Fetch sequence metadata for a set of accessions in bounded chunks.
///
/// The accession list is sorted and deduplicated for deterministic chunking,
/// then one search is issued per chunk with an unconditional `sleep` between
/// requests. A chunk that fails (transport, status, or unparsable body)
/// contributes zero entries and never aborts the run; the gap is recovered by
/// a later `missing` + `download` pass. Duplicate accessions across chunks
/// keep the first-seen entry.
pub fn fetch_batches(
    client: &dyn UniprotSearchClient,
    accessions: &[Accession],
    chunk_size: usize,
    sleep: Duration,
) -> Result<FetchOutcome, LinkError> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(LinkError::InvalidChunkSize {
            got: chunk_size,
            max: MAX_CHUNK_SIZE,
        });
    }

    let mut unique = accessions.to_vec();
    unique.sort();
    unique.dedup();

    let total_chunks = unique.len().div_ceil(chunk_size);
    info!(
        accessions = unique.len(),
        chunks = total_chunks,
        chunk_size,
        "starting batched UniProt fetch"
    );

    let mut entries: Vec<SequenceEntry> = Vec::new();
    let mut failed_chunks = 0usize;
    let mut empty_chunks = 0usize;

    for (index, chunk) in unique.chunks(chunk_size).enumerate() {
        if index > 0 && !sleep.is_zero() {
            thread::sleep(sleep);
        }
        let chunk_no = index + 1;
        match client.search(chunk) {
            Ok(body) => {
                if body.trim().is_empty() {
                    // Valid zero-results outcome, not a failure.
                    info!(chunk = chunk_no, total_chunks, ids = chunk.len(), "no matches for chunk");
                    empty_chunks += 1;
                    continue;
                }
                match parse_search_body(&body) {
                    Ok(rows) => {
                        info!(chunk = chunk_no, total_chunks, rows = rows.len(), "retrieved chunk");
                        entries.extend(rows);
                    }
                    Err(err) => {
                        warn!(chunk = chunk_no, total_chunks, error = %err, "unparsable chunk response, skipping");
                        failed_chunks += 1;
                    }
                }
            }
            Err(err) => {
                warn!(chunk = chunk_no, total_chunks, ids = chunk.len(), error = %err, "chunk fetch failed, skipping");
                failed_chunks += 1;
            }
        }
    }

    // First-seen wins for accessions that show up in more than one chunk.
    let mut seen = HashSet::new();
    entries.retain(|entry| seen.insert(entry.uniprot_id.clone()));

    Ok(FetchOutcome {
        requested: unique.len(),
        chunks: total_chunks,
        failed_chunks,
        empty_chunks,
        entries,
    })
}

/// Normalize one TSV response body onto the canonical schema.
///
/// Any canonical column absent from the response is synthesized as null for
/// every row. Rows without an accession cannot be keyed and are dropped.
pub fn parse_search_body(body: &str) -> Result<Vec<SequenceEntry>, LinkError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|err| LinkError::UniprotHttp(format!("malformed TSV response: {err}")))?
        .clone();

    let accession_col = column_index(&headers, ACCESSION_HEADERS);
    let sequence_col = column_index(&headers, SEQUENCE_HEADERS);
    let length_col = column_index(&headers, LENGTH_HEADERS);
    let organism_col = column_index(&headers, ORGANISM_HEADERS);
    let protein_name_col = column_index(&headers, PROTEIN_NAME_HEADERS);
    let gene_name_col = column_index(&headers, GENE_NAME_HEADERS);

    let mut entries = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|err| LinkError::UniprotHttp(format!("malformed TSV row: {err}")))?;
        let Some(uniprot_id) = field(&record, accession_col) else {
            continue;
        };
        entries.push(SequenceEntry {
            uniprot_id,
            sequence: field(&record, sequence_col),
            length: field(&record, length_col).and_then(|v| v.parse().ok()),
            organism: field(&record, organism_col),
            protein_name: field(&record, protein_name_col),
            gene_name: field(&record, gene_name_col),
        });
    }
    Ok(entries)
}

fn column_index(headers: &csv::StringRecord, synonyms: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| synonyms.contains(&header.trim()))
}

fn field(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    let value = record.get(index?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
