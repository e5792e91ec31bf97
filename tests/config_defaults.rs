use std::ffi::OsString;
use std::path::PathBuf;

use flowbdd_report::config::{BaseDirSource, Config, ENV_FLOWBDD_BASE_DIR, PathsConfig, ReportPaths};

#[test]
fn test_default_config_values() {
    let config = Config::default();

    assert_eq!(config.paths.base_dir, None);
    assert_eq!(config.paths.data_dir, "data");
    assert_eq!(config.paths.report_dir, "report");
    assert!(config.report.formats.is_empty());
    assert!(config.report.console);
}

#[test]
fn test_paths_at_base_use_default_subdirectories() {
    let paths = ReportPaths::at("/srv/flowbdd");

    assert_eq!(paths.source, BaseDirSource::Override);
    assert_eq!(paths.data, PathBuf::from("/srv/flowbdd/data"));
    assert_eq!(paths.report, PathBuf::from("/srv/flowbdd/report"));
    assert_eq!(paths.index_file(), PathBuf::from("/srv/flowbdd/data/index.json"));
}

#[test]
fn test_empty_environment_value_is_ignored() {
    let resolved = ReportPaths::resolve_with(None, &PathsConfig::default(), |key| {
        (key == ENV_FLOWBDD_BASE_DIR).then(OsString::new)
    });
    assert_eq!(resolved.source, BaseDirSource::TempDir);
}

#[test]
fn test_partial_config_file_keeps_defaults() {
    let config = Config::parse("[report]\nformats = [\"junit\"]\n").expect("parses");

    assert_eq!(config.paths.data_dir, "data");
    assert_eq!(config.report.formats, vec!["junit"]);
    assert!(config.report.console);
}
