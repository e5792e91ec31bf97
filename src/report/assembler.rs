// Report assembler - turns finished accumulators into a Report

use tracing::debug;

use crate::report::model::{
    DataReportIndex, Links, Report, Summary, TestCase, TestSuite, TestSuiteNameToFile,
    VersionInfo, data_file_name,
};
use crate::state::{RunContext, SuiteSnapshot};

pub struct ReportAssembler;

impl ReportAssembler {
    /// Assemble every suite of a run context
    pub fn from_context(context: &RunContext, version: &VersionInfo) -> Report {
        Self::assemble(context.snapshots(), version)
    }

    /// Assemble suites in the order given (first-seen order for a run).
    ///
    /// Suite summaries come straight from the accumulator totals; the index
    /// summary is their field-wise sum. Suites without cases still get an
    /// index link.
    pub fn assemble(
        snapshots: impl IntoIterator<Item = SuiteSnapshot>,
        version: &VersionInfo,
    ) -> Report {
        let mut test_suites = Vec::new();
        let mut test_cases = Vec::new();
        let mut links = Links::default();
        let mut summary = Summary::default();

        for snapshot in snapshots {
            let suite = Self::test_suite(snapshot);
            summary = summary.merge(&suite.summary);
            links.test_suites.push(TestSuiteNameToFile {
                name: suite.name.clone(),
                file: data_file_name(&suite.name),
            });
            test_cases.extend(suite.test_cases.iter().cloned());
            test_suites.push(suite);
        }

        debug!(
            suites = test_suites.len(),
            cases = test_cases.len(),
            tests = summary.tests,
            "assembled report"
        );

        Report {
            index: DataReportIndex {
                time_stamp: version.time_stamp.clone(),
                version: version.version.clone(),
                summary,
                links,
            },
            test_suites,
            test_cases,
            time_stamp: version.time_stamp.clone(),
        }
    }

    fn test_suite(snapshot: SuiteSnapshot) -> TestSuite {
        let SuiteSnapshot {
            clazz,
            title,
            cases,
            notes,
            totals,
        } = snapshot;

        let test_cases: Vec<TestCase> = cases
            .into_iter()
            .map(|result| result.into_test_case())
            .collect();

        TestSuite {
            title: title.unwrap_or_else(|| clazz.class_name.clone()),
            name: clazz.fully_qualified_name,
            class_name: clazz.class_name,
            package_name: clazz.package_name,
            test_cases,
            summary: totals.to_summary(),
            notes: notes.to_report(),
        }
    }
}
