use std::fs;

use camino::Utf8Path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::LinkError;
use crate::flatfile::EnzymeRecord;

/// One row of `enzyme_raw.tsv`, column names matching the published table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeRow {
    #[serde(rename = "EC_number")]
    pub ec_number: String,
    #[serde(rename = "Enzyme_name", default)]
    pub name: Option<String>,
    #[serde(rename = "Alt_names", default)]
    pub alt_names: Option<String>,
    #[serde(rename = "Reaction", default)]
    pub reaction: Option<String>,
    #[serde(rename = "Prosite_refs", default)]
    pub prosite_refs: Option<String>,
    #[serde(rename = "UniProt_IDs", default)]
    pub uniprot_ids: Option<String>,
}

impl EnzymeRow {
    pub const COLUMNS: &'static [&'static str] = &[
        "EC_number",
        "Enzyme_name",
        "Alt_names",
        "Reaction",
        "Prosite_refs",
        "UniProt_IDs",
    ];
}

impl From<EnzymeRecord> for EnzymeRow {
    fn from(record: EnzymeRecord) -> Self {
        let uniprot_ids = record.uniprot_ids_field();
        Self {
            ec_number: record.ec_number,
            name: record.name,
            alt_names: record.alt_names,
            reaction: record.reaction,
            prosite_refs: record.prosite_refs,
            uniprot_ids,
        }
    }
}

/// Read a tab-separated table into typed rows.
///
/// Columns listed in `required` must be present in the header; a missing one
/// is a precondition violation and fails the whole read. Extra columns are
/// ignored and empty fields deserialize to `None`.
pub fn read_rows<T: DeserializeOwned>(
    path: &Utf8Path,
    required: &[&str],
) -> Result<Vec<T>, LinkError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path.as_std_path())
        .map_err(|err| LinkError::TableRead {
            path: path.to_owned(),
            message: err.to_string(),
        })?;

    let headers = reader
        .headers()
        .map_err(|err| LinkError::TableRead {
            path: path.to_owned(),
            message: err.to_string(),
        })?
        .clone();
    for column in required {
        if !headers.iter().any(|header| header == *column) {
            return Err(LinkError::MissingColumn {
                column: column.to_string(),
                path: path.to_owned(),
            });
        }
    }

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.map_err(|err| LinkError::TableRead {
            path: path.to_owned(),
            message: err.to_string(),
        })?);
    }
    Ok(rows)
}

/// Write rows as a tab-separated table, atomically.
///
/// The header comes from the explicit `columns` list rather than the first
/// serialized row, so a zero-row table still carries its schema and stays
/// readable by a later stage. The table is written to a temp file in the
/// destination directory and renamed into place, so readers never observe a
/// half-written table.
pub fn write_rows<T: Serialize>(
    path: &Utf8Path,
    columns: &[&str],
    rows: &[T],
) -> Result<(), LinkError> {
    let parent = path.parent().unwrap_or(Utf8Path::new("."));
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| LinkError::Filesystem(format!("create {parent}: {err}")))?;

    let temp = NamedTempFile::new_in(parent.as_std_path())
        .map_err(|err| LinkError::Filesystem(err.to_string()))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(temp.as_file());
        writer
            .write_record(columns)
            .map_err(|err| LinkError::TableWrite {
                path: path.to_owned(),
                message: err.to_string(),
            })?;
        for row in rows {
            writer.serialize(row).map_err(|err| LinkError::TableWrite {
                path: path.to_owned(),
                message: err.to_string(),
            })?;
        }
        writer.flush().map_err(|err| LinkError::TableWrite {
            path: path.to_owned(),
            message: err.to_string(),
        })?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| LinkError::Filesystem(err.to_string()))?;
    Ok(())
}
