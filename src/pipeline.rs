//! Job ingestion: run log → design → hourly series → statistics.
//!
//! Failures are logged and collected in the report. Losing the run log is
//! fatal for the iteration loop: with no iteration count, no per-iteration
//! series are loaded, though design scalars and statistics still are.
//!
//! The bare series names (`LoadP`, ...) are overwritten by each iteration in
//! turn, so after ingestion they hold the last iteration loaded. The
//! provenance names (`Gs<job>Iter<i>LoadP`) are the stable way to address a
//! particular iteration.

use serde_json::json;

use crate::config::ReaderConfig;
use crate::design::parse_design_bytes;
use crate::error::IngestError;
use crate::fetch::{ArtifactFetcher, ArtifactRef, DESIGN, RUN_LOG};
use crate::logging::{log, log_failure, obj, ProfileScope, Domain, Level};
use crate::run_log::{parse_run_log, RunLogColumns};
use crate::series::{hourly_artifact, load_series};
use crate::stats::StatsReport;
use crate::whiteboard::Whiteboard;

#[derive(Debug, Default)]
pub struct IngestReport {
    pub job: u64,
    /// Iterations found in the run log.
    pub iterations: usize,
    /// Iterations whose hourly series were loaded.
    pub series_loaded: usize,
    pub design_entries: usize,
    pub statistics: StatsReport,
    pub failures: Vec<IngestError>,
}

impl IngestReport {
    /// The failure that stopped the iteration loop, if any.
    pub fn fatal(&self) -> Option<&IngestError> {
        self.failures.iter().find(|e| e.is_fatal())
    }
}

pub struct Ingestor {
    fetcher: ArtifactFetcher,
    columns: RunLogColumns,
}

impl Ingestor {
    pub fn new(fetcher: ArtifactFetcher, columns: RunLogColumns) -> Self {
        Self { fetcher, columns }
    }

    pub fn from_config(cfg: &ReaderConfig) -> anyhow::Result<Self> {
        Ok(Self::new(ArtifactFetcher::from_config(cfg)?, RunLogColumns::from_config(cfg)))
    }

    /// Ingest every iteration of `job`. `hint`, when given, caps how many
    /// iterations are loaded; the run log decides how many exist.
    pub async fn ingest(
        &self,
        job: u64,
        hint: Option<usize>,
        wb: &mut Whiteboard,
    ) -> IngestReport {
        let _scope = ProfileScope::with_context("ingest", &[("job", json!(job))]);
        let mut report = IngestReport {
            job,
            ..Default::default()
        };

        report.iterations = match self.read_run_log(job, wb).await {
            Ok(n) => n,
            Err(cause) => {
                self.record(Domain::RunLog, IngestError::fatal(job, cause), &mut report);
                0
            }
        };
        let to_load = hint.map_or(report.iterations, |h| h.min(report.iterations));
        log(
            Level::Info,
            Domain::RunLog,
            "iterations",
            obj(&[
                ("job", json!(job)),
                ("found", json!(report.iterations)),
                ("loading", json!(to_load)),
            ]),
        );

        self.read_design(job, wb, &mut report).await;
        for i in 0..to_load {
            self.read_series(job, Some(i), wb, &mut report).await;
        }
        self.finish(wb, &mut report);
        report
    }

    /// Ingest the aggregate hourly series of `job` (`Gs<job><name>`); no run
    /// log is involved.
    pub async fn ingest_aggregate(&self, job: u64, wb: &mut Whiteboard) -> IngestReport {
        let _scope = ProfileScope::with_context("ingest_aggregate", &[("job", json!(job))]);
        let mut report = IngestReport {
            job,
            ..Default::default()
        };
        self.read_design(job, wb, &mut report).await;
        self.read_series(job, None, wb, &mut report).await;
        self.finish(wb, &mut report);
        report
    }

    async fn read_run_log(&self, job: u64, wb: &mut Whiteboard) -> Result<usize, IngestError> {
        let raw = self.fetcher.fetch_required(&ArtifactRef::new(job, RUN_LOG)).await?;
        parse_run_log(job, &raw, &self.columns, wb)
    }

    async fn read_design(&self, job: u64, wb: &mut Whiteboard, report: &mut IngestReport) {
        let parsed = match self.fetcher.fetch_required(&ArtifactRef::new(job, DESIGN)).await {
            Ok(raw) => parse_design_bytes(&raw),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(design) => {
                report.design_entries = design.entries.len();
                for (name, value) in design.entries {
                    wb.set(name, value);
                }
                for e in design.failures {
                    self.record(Domain::Design, e, report);
                }
            }
            Err(e) => self.record(Domain::Design, e, report),
        }
    }

    async fn read_series(
        &self,
        job: u64,
        iteration: Option<usize>,
        wb: &mut Whiteboard,
        report: &mut IngestReport,
    ) {
        let artifact = ArtifactRef::new(job, hourly_artifact(iteration));
        let loaded = match self.fetcher.fetch_required(&artifact).await {
            Ok(raw) => load_series(job, iteration, &raw, wb),
            Err(e) => Err(e),
        };
        match loaded {
            Ok(columns) => {
                report.series_loaded += 1;
                log(
                    Level::Debug,
                    Domain::Series,
                    "loaded",
                    obj(&[("artifact", json!(artifact.name)), ("columns", json!(columns))]),
                );
            }
            Err(e) => self.record(Domain::Series, e, report),
        }
    }

    fn finish(&self, wb: &mut Whiteboard, report: &mut IngestReport) {
        report.statistics = wb.compute_statistics();
        log(
            Level::Info,
            Domain::Stats,
            "summary",
            obj(&[
                ("job", json!(report.job)),
                ("summarized", json!(report.statistics.summarized)),
                ("skipped", json!(report.statistics.skipped)),
                ("failures", json!(report.failures.len())),
                ("names", json!(wb.len())),
            ]),
        );
    }

    fn record(&self, domain: Domain, err: IngestError, report: &mut IngestReport) {
        log_failure(domain, &err);
        report.failures.push(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ArtifactSource;
    use crate::whiteboard::Value;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct InMemory(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl ArtifactSource for InMemory {
        fn location(&self, artifact: &ArtifactRef) -> String {
            format!("memory:{}", artifact.name)
        }

        async fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>> {
            self.0
                .get(&artifact.name)
                .cloned()
                .ok_or_else(|| anyhow!("no such artifact"))
        }
    }

    fn ingestor(files: &[(&str, &str)]) -> Ingestor {
        let map = files
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect();
        Ingestor::new(
            ArtifactFetcher::new(vec![Box::new(InMemory(map))]),
            RunLogColumns::default(),
        )
    }

    #[tokio::test]
    async fn test_missing_run_log_skips_iterations_only() {
        let ing = ingestor(&[
            ("design.json", "{\"capex\": 1}"),
            ("results/annual_hourly_ops_iteration_0.csv", "Total Load [kW]\n1\n"),
        ]);
        let mut wb = Whiteboard::new();
        let report = ing.ingest(3, Some(2), &mut wb).await;
        assert_eq!(report.iterations, 0);
        assert_eq!(report.series_loaded, 0);
        assert!(report.fatal().is_some());
        assert_eq!(wb.get("Capex"), Some(&Value::Number(1.0)));
        assert_eq!(wb.get("Capex_max").and_then(Value::as_number), Some(1.0));
        assert!(wb.get("LoadP").is_none());
    }

    #[tokio::test]
    async fn test_hint_caps_iterations() {
        let ing = ingestor(&[
            ("bayes_log.csv", "p_irr\n0.1\n0.2\n0.3\n"),
            ("results/annual_hourly_ops_iteration_0.csv", "Total Load [kW]\n1\n"),
            ("results/annual_hourly_ops_iteration_1.csv", "Total Load [kW]\n2\n"),
            ("results/annual_hourly_ops_iteration_2.csv", "Total Load [kW]\n3\n"),
        ]);
        let mut wb = Whiteboard::new();
        let report = ing.ingest(3, Some(2), &mut wb).await;
        assert_eq!(report.iterations, 3);
        assert_eq!(report.series_loaded, 2);
        assert!(wb.get("Gs3Iter2LoadP").is_none());
        assert_eq!(wb.get("LoadP").and_then(Value::as_series), Some(&[2.0][..]));
        // design.json is missing: one transport failure, not fatal
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_mode() {
        let ing = ingestor(&[
            ("design.json", "{\"capex\": 1}"),
            ("results/annual_hourly_ops.csv", "Total Grid [kW]\n4\n6\n"),
        ]);
        let mut wb = Whiteboard::new();
        let report = ing.ingest_aggregate(12, &mut wb).await;
        assert_eq!(report.series_loaded, 1);
        assert!(wb.get("Gs12GridP").is_some());
        assert_eq!(wb.get("GridP_mean").and_then(Value::as_number), Some(5.0));
        assert_eq!(wb.get("Capex"), Some(&Value::Number(1.0)));
    }
}
