// Data report writer - persists index.json and one TEST-<fqcn>.json per suite

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{INDEX_FILE, ReportPaths};
use crate::error::ReportError;
use crate::report::model::{Report, data_file_name};

// One writer at a time per destination directory, across all listeners in the process.
static DESTINATION_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn destination_lock(dir: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
    let mut locks = DESTINATION_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}

/// Writes the JSON data files of a report
#[derive(Debug, Clone)]
pub struct DataReportWriter {
    data_dir: PathBuf,
}

impl DataReportWriter {
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

    /// Persist every suite, then the index.
    ///
    /// Each file is written to a temporary sibling and renamed into place, so
    /// readers see either the previous or the new contents. The index goes
    /// last and therefore never links to a file that was not written.
    pub fn write(&self, report: &Report) -> Result<(), ReportError> {
        let lock = destination_lock(&self.data_dir);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        fs::create_dir_all(&self.data_dir)
            .map_err(|e| ReportError::write(&self.data_dir, e))?;

        for suite in &report.test_suites {
            let file = report
                .index
                .links
                .file_for(&suite.name)
                .map(str::to_owned)
                .unwrap_or_else(|| data_file_name(&suite.name));
            write_json(&self.data_dir.join(file), suite)?;
        }

        let index_path = self.data_dir.join(INDEX_FILE);
        write_json(&index_path, &report.index)?;

        info!(
            "Wrote report for {} suite(s) to {}",
            report.test_suites.len(),
            self.data_dir.display()
        );
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ReportError::write(path, e))?;

    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|file| file.write_all(json.as_bytes()))
        .map_err(|error| {
            let error = match error {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
            };
            ReportError::write(path, error)
        })?;

    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::assembler::ReportAssembler;
    use crate::report::model::{Clazz, VersionInfo};
    use crate::state::{RunContext, TestCaseResult};
    use tempfile::TempDir;

    fn report() -> Report {
        let ctx = RunContext::new();
        let clazz = Clazz::from_fully_qualified("com.example.Dev");
        ctx.accumulator(&clazz)
            .record(TestCaseResult::passed(clazz, "drinks coffee"));
        ReportAssembler::from_context(
            &ctx,
            &VersionInfo {
                time_stamp: "2024-01-01T00:00:00Z".into(),
                version: None,
            },
        )
    }

    #[test]
    fn test_write_creates_directories_and_files() {
        let temp = TempDir::new().expect("temp dir");
        let data = temp.path().join("nested").join("data");
        let writer = DataReportWriter::new(&data);

        writer.write(&report()).expect("write succeeds");

        assert!(data.join("index.json").is_file());
        assert!(data.join("TEST-com.example.Dev.json").is_file());
    }

    #[test]
    fn test_write_overwrites_previous_run() {
        let temp = TempDir::new().expect("temp dir");
        let writer = DataReportWriter::new(temp.path());

        writer.write(&report()).expect("first write");
        writer.write(&report()).expect("second write");

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .expect("list dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| !name.ends_with(".json"))
            .collect();
        assert!(leftovers.is_empty(), "temporary files left: {:?}", leftovers);
    }

    #[test]
    fn test_write_into_a_file_fails_with_write_error() {
        let temp = TempDir::new().expect("temp dir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("create file");

        let err = DataReportWriter::new(blocker.join("data"))
            .write(&report())
            .unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }
}
