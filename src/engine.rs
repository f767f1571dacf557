//! Polars-backed engine session. Reads CSV against an explicit schema and
//! writes single-file CSV through a sibling temp file.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Settings used when starting an engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Name used in log lines.
    pub app_name: String,
    /// Query worker threads; `0` keeps the polars default. The binary applies
    /// this through `POLARS_MAX_THREADS` before any query runs.
    pub threads: usize,
    /// Rows per parsed chunk when reading CSV.
    pub batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "Task1_Binge_Watching_Patterns".into(),
            threads: 0,
            batch_size: 8192,
        }
    }
}

pub struct LocalEngine {
    config: EngineConfig,
}

impl LocalEngine {
    /// Validate the settings and hand back a session that owns the engine.
    pub fn start(config: EngineConfig) -> Result<EngineSession> {
        if config.batch_size == 0 {
            return Err(PipelineError::EngineInitialization(
                "batch_size must be greater than zero".into(),
            ));
        }
        if config.app_name.trim().is_empty() {
            return Err(PipelineError::EngineInitialization(
                "app_name must not be empty".into(),
            ));
        }

        info!(
            app = %config.app_name,
            threads = config.threads,
            batch_size = config.batch_size,
            "engine started"
        );
        Ok(EngineSession {
            engine: LocalEngine { config },
            started: Instant::now(),
        })
    }

    /// Read a headed CSV file with every field cast to `schema`. Empty fields
    /// load as null; a field that does not parse as its column type aborts the read.
    pub fn read_csv(&self, path: &Path, schema: SchemaRef) -> Result<DataFrame> {
        let file = File::open(path).map_err(|source| PipelineError::InputRead {
            path: path.to_path_buf(),
            source,
        })?;

        let opts = CsvReadOptions::default()
            .with_has_header(true)
            .with_schema(Some(schema))
            .with_chunk_size(self.config.batch_size)
            .map_parse_options(|parse| {
                parse.with_null_values(Some(NullValues::AllColumnsSingle(PlSmallStr::EMPTY)))
            });
        let df = CsvReader::new(file)
            .with_options(opts)
            .finish()
            .map_err(|e| PipelineError::schema_mismatch(path, e.to_string()))?;
        debug!(rows = df.height(), columns = df.width(), "csv parsed");
        Ok(df)
    }

    /// Write `df` as one headed CSV file at `path`, replacing what is there.
    /// Floats are rendered with `float_precision` decimals when given.
    ///
    /// The data lands in a uniquely named temp file next to `path` and is then
    /// persisted over it, so a failed write leaves the old file in place.
    pub fn write_csv(
        &self,
        df: &mut DataFrame,
        path: &Path,
        float_precision: Option<usize>,
    ) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| PipelineError::io_write(path, e))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PipelineError::io_write(path, e))?;
        CsvWriter::new(&mut tmp)
            .include_header(true)
            .with_float_precision(float_precision)
            .finish(df)?;
        tmp.persist(path)
            .map_err(|e| PipelineError::io_write(path, e.error))?;

        debug!(rows = df.height(), path = %path.display(), "csv written");
        Ok(())
    }
}

/// Scoped ownership of a running [`LocalEngine`]. Dropping it stops the engine,
/// whichever way the run ends.
pub struct EngineSession {
    engine: LocalEngine,
    started: Instant,
}

impl EngineSession {
    pub fn engine(&self) -> &LocalEngine {
        &self.engine
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        info!(
            app = %self.engine.config.app_name,
            elapsed = ?self.started.elapsed(),
            "engine stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn session() -> EngineSession {
        LocalEngine::start(EngineConfig {
            batch_size: 2,
            ..Default::default()
        })
        .unwrap()
    }

    fn two_column_schema() -> SchemaRef {
        Arc::new(Schema::from_iter([
            (PlSmallStr::from_static("AgeGroup"), DataType::String),
            (PlSmallStr::from_static("Score"), DataType::Float64),
        ]))
    }

    #[test]
    fn start_rejects_zero_batch_size() {
        let err = LocalEngine::start(EngineConfig {
            batch_size: 0,
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, PipelineError::EngineInitialization(_)), "{err}");
    }

    #[test]
    fn read_csv_casts_and_nulls_empty_fields() {
        let session = session();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "AgeGroup,Score\nTeen,1.5\n,2\nAdult,\n").unwrap();

        let df = session
            .engine()
            .read_csv(file.path(), two_column_schema())
            .unwrap();
        assert_eq!(df.height(), 3);
        let groups = df.column("AgeGroup").unwrap().str().unwrap();
        assert_eq!(groups.get(0), Some("Teen"));
        assert_eq!(groups.get(1), None);
        let scores = df.column("Score").unwrap().f64().unwrap();
        assert_eq!(scores.get(1), Some(2.0));
        assert_eq!(scores.get(2), None);
    }

    #[test]
    fn read_csv_rejects_unparsable_field() {
        let session = session();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "AgeGroup,Score\nTeen,lots\n").unwrap();

        let err = session
            .engine()
            .read_csv(file.path(), two_column_schema())
            .unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }), "{err}");
    }

    #[test]
    fn write_csv_writes_header_for_empty_frame() {
        let session = session();
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("empty.csv");
        let mut df = DataFrame::empty_with_schema(&two_column_schema());

        session.engine().write_csv(&mut df, &out, Some(2)).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "AgeGroup,Score\n");
    }

    #[test]
    fn write_csv_leaves_sibling_tmp_file_alone() {
        let session = session();
        let dir = tempdir().unwrap();
        let out = dir.path().join("report.csv");
        let sibling = dir.path().join("report.tmp");
        fs::write(&sibling, "keep me\n").unwrap();
        fs::write(&out, "stale\n").unwrap();

        let mut df = df!("AgeGroup" => ["Teen"], "Score" => [75.0]).unwrap();
        session.engine().write_csv(&mut df, &out, Some(2)).unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "AgeGroup,Score\nTeen,75.00\n");
        assert_eq!(fs::read_to_string(&sibling).unwrap(), "keep me\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn write_csv_can_target_a_tmp_extension() {
        let session = session();
        let dir = tempdir().unwrap();
        let out = dir.path().join("result.tmp");
        fs::write(&out, "stale\n").unwrap();

        let mut df = df!("AgeGroup" => ["Adult"], "Score" => [66.67]).unwrap();
        session.engine().write_csv(&mut df, &out, Some(2)).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "AgeGroup,Score\nAdult,66.67\n");
    }
}
