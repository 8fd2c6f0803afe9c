use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use camino::Utf8Path;
use flate2::read::GzDecoder;
use regex::Regex;

use crate::error::LinkError;

/// One parsed entry from the ENZYME flat file (`enzyme.dat`).
///
/// Multi-line fields arrive as one line per continuation and are joined at
/// flush time: `DE`/`AN`/`CA` with single spaces, `PR` with `"; "`.
/// `accessions` keeps the `DR`-line extraction order, duplicates included.
#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeRecord {
    pub ec_number: String,
    pub name: Option<String>,
    pub alt_names: Option<String>,
    pub reaction: Option<String>,
    pub prosite_refs: Option<String>,
    pub accessions: Vec<String>,
}

impl EnzymeRecord {
    /// Comma-joined accession list as stored in the `UniProt_IDs` column,
    /// `None` when the entry carried no accessions.
    pub fn uniprot_ids_field(&self) -> Option<String> {
        if self.accessions.is_empty() {
            None
        } else {
            Some(self.accessions.join(","))
        }
    }
}

/// Running accumulator for the entry currently being read.
#[derive(Debug, Default)]
struct EntryAccumulator {
    ec_number: Option<String>,
    name: Vec<String>,
    alt_names: Vec<String>,
    reaction: Vec<String>,
    prosite_refs: Vec<String>,
    accessions: Vec<String>,
}

impl EntryAccumulator {
    /// Finalize the accumulator into a record and reset it.
    ///
    /// An entry that never saw an `ID` line yields `None` and is discarded.
    fn flush(&mut self) -> Option<EnzymeRecord> {
        let taken = std::mem::take(self);
        let ec_number = taken.ec_number?;
        Some(EnzymeRecord {
            ec_number,
            name: join_nonempty(&taken.name, " "),
            alt_names: join_nonempty(&taken.alt_names, " "),
            reaction: join_nonempty(&taken.reaction, " "),
            prosite_refs: join_nonempty(&taken.prosite_refs, "; "),
            accessions: taken.accessions,
        })
    }
}

fn join_nonempty(parts: &[String], sep: &str) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(sep))
    }
}

/// Data content starts after the two-character tag and three-space separator.
const CONTENT_OFFSET: usize = 5;

/// Parse an ENZYME flat file from disk. Paths ending in `.gz` are
/// decompressed on the fly (the ENZYME FTP distribution ships gzipped).
pub fn parse_file(path: &Utf8Path) -> Result<Vec<EnzymeRecord>, LinkError> {
    let file = File::open(path.as_std_path())
        .map_err(|err| LinkError::Filesystem(format!("open {path}: {err}")))?;
    if path.extension() == Some("gz") {
        parse_reader(BufReader::new(GzDecoder::new(file)))
    } else {
        parse_reader(BufReader::new(file))
    }
}

/// Parse ENZYME flat-file text from any buffered reader.
///
/// A single accumulator is folded over the lines; `ID` and `//` both flush
/// it, and a final flush after the loop covers files without a trailing
/// terminator. Unknown tags are skipped so new ENZYME field types do not
/// break parsing.
pub fn parse_reader<R: Read>(reader: BufReader<R>) -> Result<Vec<EnzymeRecord>, LinkError> {
    let accession_token = Regex::new(r"\b[A-Z0-9]{6}\b").unwrap();

    let mut records = Vec::new();
    let mut current = EntryAccumulator::default();

    for line in reader.lines() {
        let line = line.map_err(|err| LinkError::Filesystem(err.to_string()))?;
        if line.is_empty() {
            continue;
        }
        let Some(code) = line.get(..2) else {
            continue;
        };
        let content = line.get(CONTENT_OFFSET..).unwrap_or("").trim();

        match code {
            "ID" => {
                if current.ec_number.is_some() {
                    records.extend(current.flush());
                }
                current.ec_number = content.split_whitespace().next().map(|s| s.to_string());
            }
            "DE" => current.name.push(content.to_string()),
            "AN" => current.alt_names.push(content.to_string()),
            "CA" => current.reaction.push(content.to_string()),
            "PR" => current.prosite_refs.push(content.to_string()),
            "DR" => {
                for token in accession_token.find_iter(content) {
                    // PSxxxxx tokens are PROSITE pattern ids, not accessions.
                    if !token.as_str().starts_with("PS") {
                        current.accessions.push(token.as_str().to_string());
                    }
                }
            }
            "//" => records.extend(current.flush()),
            _ => {}
        }
    }

    // Files that do not end with '//' still flush the last entry.
    records.extend(current.flush());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> Vec<EnzymeRecord> {
        parse_reader(BufReader::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn parse_single_entry() {
        let text = "ID   1.1.1.1\n\
                    DE   alcohol dehydrogenase.\n\
                    DR   P00330, ADH1_YEAST ;\n\
                    //\n";
        let records = parse_str(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ec_number, "1.1.1.1");
        assert_eq!(records[0].name.as_deref(), Some("alcohol dehydrogenase."));
        assert_eq!(records[0].accessions, vec!["P00330"]);
    }

    #[test]
    fn continuation_lines_join_with_spaces() {
        let text = "ID   2.7.11.1\n\
                    DE   non-specific serine/threonine\n\
                    DE   protein kinase.\n\
                    CA   ATP + a protein =\n\
                    CA   ADP + a phosphoprotein.\n\
                    //\n";
        let records = parse_str(text);
        assert_eq!(
            records[0].name.as_deref(),
            Some("non-specific serine/threonine protein kinase.")
        );
        assert_eq!(
            records[0].reaction.as_deref(),
            Some("ATP + a protein = ADP + a phosphoprotein.")
        );
    }

    #[test]
    fn prosite_refs_join_with_semicolons() {
        let text = "ID   1.1.1.1\n\
                    PR   PROSITE; PS00059;\n\
                    PR   PROSITE; PS00060;\n\
                    //\n";
        let records = parse_str(text);
        // Each PR line already ends with ';', so the join doubles it.
        assert_eq!(
            records[0].prosite_refs.as_deref(),
            Some("PROSITE; PS00059;; PROSITE; PS00060;")
        );
    }

    #[test]
    fn dr_line_excludes_prosite_tokens() {
        let text = "ID   1.1.1.1\n\
                    DR   P00330, ADH1_YEAST ;  PS1234, FAKE_REF ;\n\
                    //\n";
        let records = parse_str(text);
        assert_eq!(records[0].accessions, vec!["P00330"]);
    }

    #[test]
    fn dr_line_with_only_prosite_tokens_yields_no_accessions() {
        let text = "ID   1.1.1.1\n\
                    DR   PS1234, PS00001 ;\n\
                    //\n";
        let records = parse_str(text);
        assert!(records[0].accessions.is_empty());
        assert_eq!(records[0].uniprot_ids_field(), None);
    }

    #[test]
    fn missing_terminator_still_flushes_last_entry() {
        let text = "ID   1.1.1.1\n\
                    DE   alcohol dehydrogenase.\n\
                    //\n\
                    ID   1.1.1.2\n\
                    DE   alcohol dehydrogenase (NADP(+)).\n";
        let records = parse_str(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].ec_number, "1.1.1.2");
    }

    #[test]
    fn new_id_flushes_open_entry() {
        let text = "ID   1.1.1.1\n\
                    ID   1.1.1.2\n\
                    //\n";
        let records = parse_str(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ec_number, "1.1.1.1");
        assert_eq!(records[1].ec_number, "1.1.1.2");
    }

    #[test]
    fn entry_without_id_is_discarded() {
        let text = "DE   orphaned description.\n\
                    //\n";
        let records = parse_str(text);
        assert!(records.is_empty());
    }

    #[test]
    fn blank_lines_and_unknown_tags_are_skipped() {
        let text = "CC   comment header\n\
                    \n\
                    ID   1.1.1.1\n\
                    XX   unknown tag\n\
                    \n\
                    //\n";
        let records = parse_str(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ec_number, "1.1.1.1");
    }

    #[test]
    fn duplicate_accessions_within_record_are_kept() {
        let text = "ID   1.1.1.1\n\
                    DR   P00330, ADH1_YEAST ;\n\
                    DR   P00330, ADH1_YEAST ;\n\
                    //\n";
        let records = parse_str(text);
        assert_eq!(records[0].accessions, vec!["P00330", "P00330"]);
        assert_eq!(
            records[0].uniprot_ids_field().as_deref(),
            Some("P00330,P00330")
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = "ID   1.1.1.1\n\
                    DE   alcohol dehydrogenase.\n\
                    DR   P00330, ADH1_YEAST ;  P00331, ADH2_YEAST ;\n\
                    //\n";
        assert_eq!(parse_str(text), parse_str(text));
    }
}
