use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use assert_matches::assert_matches;

use enzyme_link::domain::Accession;
use enzyme_link::error::LinkError;
use enzyme_link::uniprot::{MAX_CHUNK_SIZE, UniprotSearchClient, fetch_batches};

fn acc(value: &str) -> Accession {
    value.parse().unwrap()
}

const HEADER: &str = "Entry\tOrganism\tProtein names\tGene Names\tSequence\tLength\n";

fn row(accession: &Accession, sequence: &str) -> String {
    format!(
        "{accession}\tSaccharomyces cerevisiae\tProtein {accession}\tGEN1\t{sequence}\t{}\n",
        sequence.len()
    )
}

/// Records every chunk it is asked for and answers with one row per accession.
#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<Vec<String>>>,
}

impl UniprotSearchClient for RecordingClient {
    fn search(&self, accessions: &[Accession]) -> Result<String, LinkError> {
        self.calls.lock().unwrap().push(
            accessions
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
        );
        let mut body = HEADER.to_string();
        for accession in accessions {
            body.push_str(&row(accession, "MSIPET"));
        }
        Ok(body)
    }
}

/// Fails any chunk containing the given accession.
struct FailingClient {
    fail_on: Accession,
}

impl UniprotSearchClient for FailingClient {
    fn search(&self, accessions: &[Accession]) -> Result<String, LinkError> {
        if accessions.contains(&self.fail_on) {
            return Err(LinkError::UniprotHttp("connection reset".to_string()));
        }
        let mut body = HEADER.to_string();
        for accession in accessions {
            body.push_str(&row(accession, "MSIPET"));
        }
        Ok(body)
    }
}

#[test]
fn chunks_are_sorted_deduplicated_and_bounded() {
    let client = RecordingClient::default();
    let accessions = vec![acc("C0C003"), acc("A0A001"), acc("B0B002"), acc("A0A001")];

    let outcome = fetch_batches(&client, &accessions, 2, Duration::ZERO).unwrap();

    let calls = client.calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            vec!["A0A001".to_string(), "B0B002".to_string()],
            vec!["C0C003".to_string()],
        ]
    );
    assert_eq!(outcome.requested, 3);
    assert_eq!(outcome.chunks, 2);
    assert_eq!(outcome.entries.len(), 3);
    assert_eq!(outcome.failed_chunks, 0);
}

#[test]
fn failed_chunk_is_skipped_and_reconcilable() {
    let client = FailingClient {
        fail_on: acc("C0C003"),
    };
    let accessions = vec![acc("A0A001"), acc("B0B002"), acc("C0C003")];

    let outcome = fetch_batches(&client, &accessions, 2, Duration::ZERO).unwrap();
    assert_eq!(outcome.failed_chunks, 1);
    assert_eq!(outcome.entries.len(), 2);

    let requested: BTreeSet<String> = accessions
        .iter()
        .map(|a| a.as_str().to_string())
        .collect();
    let retrieved: BTreeSet<String> = outcome
        .entries
        .iter()
        .map(|e| e.uniprot_id.clone())
        .collect();
    let missing = enzyme_link::reconcile::missing_accessions(&requested, &retrieved);
    assert_eq!(missing, vec!["C0C003"]);
}

#[test]
fn empty_body_is_a_valid_zero_result() {
    struct EmptyClient;
    impl UniprotSearchClient for EmptyClient {
        fn search(&self, _accessions: &[Accession]) -> Result<String, LinkError> {
            Ok("\n".to_string())
        }
    }

    let outcome = fetch_batches(
        &EmptyClient,
        &[acc("A0A001"), acc("B0B002")],
        1,
        Duration::ZERO,
    )
    .unwrap();
    assert!(outcome.entries.is_empty());
    assert_eq!(outcome.empty_chunks, 2);
    assert_eq!(outcome.failed_chunks, 0);
}

#[test]
fn duplicate_entries_across_chunks_keep_first_seen() {
    // Every chunk also returns one unrequested accession, with a body that
    // differs per call, imitating an index update between requests.
    struct OverlappingClient {
        calls: Mutex<usize>,
    }
    impl UniprotSearchClient for OverlappingClient {
        fn search(&self, accessions: &[Accession]) -> Result<String, LinkError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            let mut body = HEADER.to_string();
            for accession in accessions {
                body.push_str(&row(accession, "MSIPET"));
            }
            body.push_str(&format!(
                "X0X999\tHomo sapiens\tExtra\tGEN2\tCALL{calls}\t5\n"
            ));
            Ok(body)
        }
    }

    let client = OverlappingClient {
        calls: Mutex::new(0),
    };
    let outcome = fetch_batches(
        &client,
        &[acc("A0A001"), acc("B0B002")],
        1,
        Duration::ZERO,
    )
    .unwrap();

    let extra = outcome
        .entries
        .iter()
        .find(|e| e.uniprot_id == "X0X999")
        .unwrap();
    assert_eq!(extra.sequence.as_deref(), Some("CALL1"));
    assert_eq!(outcome.entries.len(), 3);
}

#[test]
fn chunk_size_bounds_are_enforced() {
    let client = RecordingClient::default();

    let err = fetch_batches(&client, &[acc("A0A001")], 0, Duration::ZERO).unwrap_err();
    assert_matches!(err, LinkError::InvalidChunkSize { got: 0, .. });

    let err = fetch_batches(
        &client,
        &[acc("A0A001")],
        MAX_CHUNK_SIZE + 1,
        Duration::ZERO,
    )
    .unwrap_err();
    assert_matches!(err, LinkError::InvalidChunkSize { .. });
}
