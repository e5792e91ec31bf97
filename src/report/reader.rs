// Report reader - loads persisted index and suite documents

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{INDEX_FILE, ReportPaths};
use crate::error::ReportError;
use crate::report::model::{DataReportIndex, Report, TestSuite, TestSuiteNameToFile};

/// Difference between what the index claims and what is on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Consistency {
    /// Indexed files that do not exist
    pub missing: Vec<String>,
    /// `TEST-*.json` files the index does not mention
    pub orphaned: Vec<String>,
}

impl Consistency {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.orphaned.is_empty()
    }
}

/// Resolves suite names through the index and loads the linked files
#[derive(Debug, Clone)]
pub struct ReportReader {
    data_dir: PathBuf,
}

impl ReportReader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn from_paths(paths: &ReportPaths) -> Self {
        Self::new(paths.data.clone())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(INDEX_FILE)
    }

    /// Load index.json; `NotFound` when it has never been written
    pub fn read_index(&self) -> Result<DataReportIndex, ReportError> {
        let path = self.index_path();
        match fs::read_to_string(&path) {
            Ok(content) => parse(&path, &content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ReportError::not_found(
                format!("report index {}", path.display()),
            )),
            Err(e) => Err(ReportError::read(path, e)),
        }
    }

    /// Load the suite registered under `name` in the index.
    ///
    /// A name the index does not know is `NotFound`; an indexed file that is
    /// missing or corrupt is a `Read` error.
    pub fn read_suite(&self, name: &str) -> Result<TestSuite, ReportError> {
        let index = self.read_index()?;
        self.read_indexed_suite(&index, name)
    }

    fn read_indexed_suite(
        &self,
        index: &DataReportIndex,
        name: &str,
    ) -> Result<TestSuite, ReportError> {
        let file = index
            .links
            .file_for(name)
            .ok_or_else(|| ReportError::not_found(format!("test suite {}", name)))?;
        let path = self.data_dir.join(file);
        if !is_plain_file_name(file) {
            return Err(ReportError::read(
                path,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("index links suite {} outside the data directory", name),
                ),
            ));
        }
        debug!("resolved suite {} to {}", name, path.display());

        let content = fs::read_to_string(&path).map_err(|e| ReportError::read(&path, e))?;
        parse(&path, &content)
    }

    /// Load a suite by data file name, `.json` optional
    pub fn read_suite_file(&self, file_name: &str) -> Result<TestSuite, ReportError> {
        let file_name = if file_name.ends_with(".json") {
            file_name.to_string()
        } else {
            format!("{}.json", file_name)
        };
        if !is_plain_file_name(&file_name) {
            return Err(ReportError::not_found(format!("test suite file {}", file_name)));
        }

        let path = self.data_dir.join(&file_name);
        match fs::read_to_string(&path) {
            Ok(content) => parse(&path, &content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ReportError::not_found(
                format!("test suite file {}", path.display()),
            )),
            Err(e) => Err(ReportError::read(path, e)),
        }
    }

    pub fn suites(&self) -> Result<Vec<TestSuiteNameToFile>, ReportError> {
        Ok(self.read_index()?.links.test_suites)
    }

    pub fn class_names(&self) -> Result<Vec<String>, ReportError> {
        Ok(self.suites()?.into_iter().map(|link| link.name).collect())
    }

    pub fn file_names(&self) -> Result<Vec<String>, ReportError> {
        Ok(self.suites()?.into_iter().map(|link| link.file).collect())
    }

    /// Rebuild the full report from the index and every linked suite
    pub fn read_report(&self) -> Result<Report, ReportError> {
        let index = self.read_index()?;
        let test_suites = index
            .links
            .test_suites
            .iter()
            .map(|link| self.read_indexed_suite(&index, &link.name))
            .collect::<Result<Vec<_>, _>>()?;
        let test_cases = test_suites
            .iter()
            .flat_map(|suite| suite.test_cases.iter().cloned())
            .collect();

        Ok(Report {
            time_stamp: index.time_stamp.clone(),
            index,
            test_suites,
            test_cases,
        })
    }

    /// Compare index links with the suite files present on disk
    pub fn verify(&self) -> Result<Consistency, ReportError> {
        let index = self.read_index()?;
        let indexed: BTreeSet<&str> = index
            .links
            .test_suites
            .iter()
            .map(|link| link.file.as_str())
            .collect();

        let mut consistency = Consistency::default();
        for file in &indexed {
            if !self.data_dir.join(file).is_file() {
                consistency.missing.push(file.to_string());
            }
        }

        let on_disk = WalkDir::new(&self.data_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .flatten()
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("TEST-") && name.ends_with(".json"));
        for name in on_disk {
            if !indexed.contains(name.as_str()) {
                consistency.orphaned.push(name);
            }
        }
        consistency.orphaned.sort();

        Ok(consistency)
    }
}

/// A bare file name that stays inside the data directory
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with("..")
}

fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ReportError> {
    serde_json::from_str(content).map_err(|e| ReportError::read(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_index_is_not_found() {
        let temp = TempDir::new().expect("temp dir");
        let err = ReportReader::new(temp.path()).read_index().unwrap_err();
        assert!(matches!(err, ReportError::NotFound { .. }));
    }

    #[test]
    fn test_corrupt_index_is_read_error() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("index.json"), "{ not json").expect("write");
        let err = ReportReader::new(temp.path()).read_index().unwrap_err();
        assert!(matches!(err, ReportError::Read { .. }));
    }

    #[test]
    fn test_suite_file_rejects_paths() {
        let temp = TempDir::new().expect("temp dir");
        let reader = ReportReader::new(temp.path());
        for name in ["../index", "nested/TEST-x", "..\\TEST-x"] {
            let err = reader.read_suite_file(name).unwrap_err();
            assert!(matches!(err, ReportError::NotFound { .. }), "{}", name);
        }
    }

    #[test]
    fn test_index_link_outside_data_dir_is_read_error() {
        let temp = TempDir::new().expect("temp dir");
        let data = temp.path().join("data");
        fs::create_dir_all(&data).expect("data dir");
        fs::write(
            temp.path().join("TEST-Dev.json"),
            r#"{"title":"Dev","name":"Dev","className":"Dev","packageName":"",
                "testCases":[],"notes":null,
                "summary":{"tests":0,"passed":0,"failed":0,"aborted":0,"skipped":0}}"#,
        )
        .expect("write suite outside data dir");
        fs::write(
            data.join("index.json"),
            r#"{"timeStamp":"2024-03-01T09:30:00Z",
                "summary":{"tests":0,"passed":0,"failed":0,"aborted":0,"skipped":0},
                "links":{"testSuites":[{"name":"Dev","file":"../TEST-Dev.json"}]}}"#,
        )
        .expect("write index");

        let reader = ReportReader::new(&data);
        let err = reader.read_suite("Dev").unwrap_err();
        assert!(matches!(err, ReportError::Read { .. }));
        assert!(matches!(reader.read_report(), Err(ReportError::Read { .. })));
    }
}
