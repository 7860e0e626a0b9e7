//! JSON datasets: a list of publication records and a list of target labels.
//!
//! Records are kept as raw JSON objects so they are written back with every field and in the
//! key order they were read with. Only the fields named by [`FieldKeys`] are interpreted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("{kind} file {} does not exist", .path.display())]
    NotFound { kind: &'static str, path: PathBuf },
    #[error(
        "the file {} exists, which would be used for the annotated dataset; move it in order to create a new annotation",
        .path.display()
    )]
    AlreadyExists { path: PathBuf },
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("publication field {field:?} is missing or is not {expected}")]
    MissingField {
        field: String,
        expected: &'static str,
    },
}

/// Names of the record fields the annotator reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKeys {
    /// Text to annotate.
    pub document: String,
    /// Written with the annotated targets.
    pub annotation: String,
    /// Ground-truth targets, when the dataset has them.
    pub evaluation_data: Option<String>,
}

/// One record of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Publication(pub Map<String, Value>);

impl Publication {
    pub fn document(&self, keys: &FieldKeys) -> Result<&str, DatasetError> {
        self.0
            .get(&keys.document)
            .and_then(Value::as_str)
            .ok_or_else(|| DatasetError::MissingField {
                field: keys.document.clone(),
                expected: "a string",
            })
    }

    pub fn annotation(&self, keys: &FieldKeys) -> Result<Vec<String>, DatasetError> {
        self.string_list(&keys.annotation)
    }

    /// Replaces the annotation field. The field keeps its position if it already existed.
    pub fn set_annotation(&mut self, keys: &FieldKeys, targets: &[String]) {
        let value = Value::Array(targets.iter().cloned().map(Value::String).collect());
        self.0.insert(keys.annotation.clone(), value);
    }

    /// `None` when the dataset has no evaluation data configured.
    pub fn ground_truth(&self, keys: &FieldKeys) -> Result<Option<Vec<String>>, DatasetError> {
        keys.evaluation_data
            .as_deref()
            .map(|field| self.string_list(field))
            .transpose()
    }

    fn string_list(&self, field: &str) -> Result<Vec<String>, DatasetError> {
        let missing = || DatasetError::MissingField {
            field: field.to_owned(),
            expected: "a list of strings",
        };
        self.0
            .get(field)
            .and_then(Value::as_array)
            .ok_or_else(missing)?
            .iter()
            .map(|value| value.as_str().map(str::to_owned).ok_or_else(missing))
            .collect()
    }
}

fn read_json<T, P>(path: P, kind: &'static str) -> Result<T, DatasetError>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DatasetError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_publications<P: AsRef<Path>>(path: P) -> Result<Vec<Publication>, DatasetError> {
    let publications: Vec<Publication> = read_json(path, "Metadata")?;
    crate::debug!("Loaded {} publications", publications.len());
    Ok(publications)
}

pub fn load_targets<P: AsRef<Path>>(path: P) -> Result<Vec<String>, DatasetError> {
    let targets: Vec<String> = read_json(path, "Targets")?;
    crate::debug!("Loaded {} targets", targets.len());
    Ok(targets)
}

pub fn load_annotated<P: AsRef<Path>>(path: P) -> Result<Vec<Publication>, DatasetError> {
    read_json(path, "Annotated metadata")
}

/// Fails if `path` exists. Checked before annotating so no LLM time is spent on a run whose
/// result could not be saved.
pub fn ensure_absent<P: AsRef<Path>>(path: P) -> Result<(), DatasetError> {
    let path = path.as_ref();
    if path.exists() {
        return Err(DatasetError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Writes `publications` as JSON with two-space indentation. Never overwrites a file.
pub fn save_publications<P: AsRef<Path>>(
    path: P,
    publications: &[Publication],
) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let io_error = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                DatasetError::AlreadyExists {
                    path: path.to_path_buf(),
                }
            } else {
                io_error(source)
            }
        })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, publications).map_err(|source| {
        DatasetError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(io_error)?;
    crate::debug!("Saved {} publications to {}", publications.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(evaluation_data: Option<&str>) -> FieldKeys {
        FieldKeys {
            document: "abstract".to_owned(),
            annotation: "annotated".to_owned(),
            evaluation_data: evaluation_data.map(str::to_owned),
        }
    }

    fn publication(value: Value) -> Publication {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn reads_configured_fields() {
        let record = publication(json!({
            "D3 ID": 7,
            "abstract": "A paper about firewalls.",
            "subjects": ["computer security"]
        }));
        let keys = keys(Some("subjects"));
        assert_eq!(record.document(&keys).unwrap(), "A paper about firewalls.");
        assert_eq!(
            record.ground_truth(&keys).unwrap(),
            Some(vec!["computer security".to_owned()])
        );
        assert_eq!(record.ground_truth(&super::tests::keys(None)).unwrap(), None);
    }

    #[test]
    fn missing_or_mistyped_fields_are_errors() {
        let record = publication(json!({"abstract": 3, "subjects": ["a", 1]}));
        let keys = keys(Some("subjects"));
        assert!(matches!(
            record.document(&keys),
            Err(DatasetError::MissingField { expected: "a string", .. })
        ));
        assert!(record.ground_truth(&keys).is_err());
        assert!(record.annotation(&keys).is_err());
    }

    #[test]
    fn set_annotation_appends_and_replaces() {
        let mut record = publication(json!({"title": "t", "abstract": "a"}));
        let keys = keys(None);
        record.set_annotation(&keys, &["Robotics".to_owned()]);
        record.set_annotation(&keys, &["Internet".to_owned(), "Software".to_owned()]);
        assert_eq!(record.annotation(&keys).unwrap(), vec!["Internet", "Software"]);
        let field_order: Vec<&String> = record.0.keys().collect();
        assert_eq!(field_order, vec!["title", "abstract", "annotated"]);
    }

    #[test]
    fn save_keeps_shape_and_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.json");
        let mut record = publication(json!({"title": "t", "abstract": "a"}));
        record.set_annotation(&keys(None), &["Robotics".to_owned()]);

        ensure_absent(&path).unwrap();
        save_publications(&path, &[record.clone()]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {\n    \"title\": \"t\","));
        assert_eq!(load_annotated(&path).unwrap(), vec![record.clone()]);

        assert!(matches!(
            ensure_absent(&path),
            Err(DatasetError::AlreadyExists { .. })
        ));
        assert!(matches!(
            save_publications(&path, &[record]),
            Err(DatasetError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_targets(dir.path().join("targets.json")),
            Err(DatasetError::NotFound { kind: "Targets", .. })
        ));
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_publications(&path),
            Err(DatasetError::Json { .. })
        ));
    }
}
