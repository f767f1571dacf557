// src/load.rs

use csv::ReaderBuilder;
use polars::prelude::{DataFrame, SchemaRef};
use std::{fs::File, path::Path};
use tracing::{debug, info};

use crate::engine::LocalEngine;
use crate::error::{PipelineError, Result};
use crate::schema::movie_ratings_schema;

/// Load the movie ratings CSV at `path` against the fixed ratings schema.
pub fn load_ratings<P: AsRef<Path>>(engine: &LocalEngine, path: P) -> Result<DataFrame> {
    load_data(engine, path, movie_ratings_schema())
}

/// Validate the header and row widths of `path` against `schema`, then read
/// every row with each field cast to its declared type.
///
/// Any non-conforming header or row aborts the load with
/// [`PipelineError::SchemaMismatch`]; nothing is skipped or repaired.
#[tracing::instrument(level = "info", skip(engine, path, schema), fields(path = %path.as_ref().display()))]
pub fn load_data<P: AsRef<Path>>(
    engine: &LocalEngine,
    path: P,
    schema: SchemaRef,
) -> Result<DataFrame> {
    let path = path.as_ref();
    validate_layout(path, &schema)?;
    let df = engine.read_csv(path, schema)?;
    info!(rows = df.height(), "loaded");
    Ok(df)
}

fn validate_layout(path: &Path, schema: &SchemaRef) -> Result<()> {
    let file = File::open(path).map_err(|source| PipelineError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    let mut records = rdr.records();

    let header = match records.next() {
        Some(record) => record.map_err(|e| {
            PipelineError::schema_mismatch(path, format!("unreadable header: {}", e))
        })?,
        None => {
            return Err(PipelineError::schema_mismatch(
                path,
                "file is empty, expected a header row",
            ))
        }
    };

    let found: Vec<&str> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            // a UTF-8 BOM can precede the first column name
            let name = if i == 0 { name.trim_start_matches('\u{feff}') } else { name };
            name.trim()
        })
        .collect();
    let expected: Vec<&str> = schema.iter_names().map(|n| n.as_str()).collect();

    if found != expected {
        return Err(PipelineError::schema_mismatch(
            path,
            format!(
                "header {:?} does not match expected columns {:?}",
                found, expected
            ),
        ));
    }

    let mut rows = 0usize;
    for record in records {
        let record = record.map_err(|e| {
            PipelineError::schema_mismatch(path, format!("unreadable row: {}", e))
        })?;
        rows += 1;
        if record.len() != expected.len() {
            let line = record.position().map_or(rows + 1, |p| p.line() as usize);
            return Err(PipelineError::schema_mismatch(
                path,
                format!(
                    "line {}: expected {} fields, found {}",
                    line,
                    expected.len(),
                    record.len()
                ),
            ));
        }
    }
    debug!(columns = expected.len(), rows, "layout ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, LocalEngine};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "UserID,MovieID,MovieTitle,Genre,Rating,ReviewCount,WatchedYear,UserLocation,AgeGroup,StreamingPlatform,WatchTime,IsBingeWatched,SubscriptionStatus";

    fn csv_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_typed_rows() {
        let session = LocalEngine::start(EngineConfig::default()).unwrap();
        let file = csv_file(&format!(
            "{HEADER}\n1,10,Inception,Sci-Fi,4.5,12,2020,US,Adult,Netflix,148,True,Premium\n2,11,Up,Animation,3.0,3,2019,UK,Teen,Hulu,96,False,Free\n"
        ));
        let table = load_ratings(session.engine(), file.path()).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.width(), 13);
    }

    #[test]
    fn accepts_bom_before_header() {
        let session = LocalEngine::start(EngineConfig::default()).unwrap();
        let file = csv_file(&format!(
            "\u{feff}{HEADER}\n1,10,Inception,Sci-Fi,4.5,12,2020,US,Adult,Netflix,148,true,Premium\n"
        ));
        assert_eq!(load_ratings(session.engine(), file.path()).unwrap().height(), 1);
    }

    #[test]
    fn rejects_wrong_header() {
        let session = LocalEngine::start(EngineConfig::default()).unwrap();
        let file = csv_file("UserID,AgeGroup,IsBingeWatched\n1,Teen,true\n");
        let err = load_ratings(session.engine(), file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }), "{err}");
    }

    #[test]
    fn rejects_empty_file() {
        let session = LocalEngine::start(EngineConfig::default()).unwrap();
        let file = csv_file("");
        let err = load_ratings(session.engine(), file.path()).unwrap_err();
        assert!(err.to_string().contains("expected a header"), "{err}");
    }

    #[test]
    fn rejects_row_with_wrong_type() {
        let session = LocalEngine::start(EngineConfig::default()).unwrap();
        let file = csv_file(&format!(
            "{HEADER}\n1,10,Inception,Sci-Fi,great,12,2020,US,Adult,Netflix,148,true,Premium\n"
        ));
        let err = load_ratings(session.engine(), file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }), "{err}");
    }

    #[test]
    fn rejects_row_with_missing_fields() {
        let session = LocalEngine::start(EngineConfig::default()).unwrap();
        let file = csv_file(&format!("{HEADER}\n1,10,Inception,Sci-Fi,4.5,12\n"));
        let err = load_ratings(session.engine(), file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }), "{err}");
    }
}
