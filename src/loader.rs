use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};
use polars::prelude::*;
use thiserror::Error;

use crate::records::CancerRecord;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open dataset {path:?}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("dataset is missing expected column {column:?}")]
    MissingColumn { column: String },
    #[error("Year value {value:?} is not a calendar year")]
    InvalidYear { value: Option<i64> },
    #[error(transparent)]
    Header(#[from] csv::Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Reads the patients CSV into a frame ready for analysis: identifier dropped,
/// `Year` parsed to a date. Fatal on a missing file, missing column or a year
/// that is not a calendar year; everything downstream is infallible by design.
pub async fn load_dataset<P: AsRef<Path>>(path: P) -> Result<DataFrame, LoadError> {
    let path = path.as_ref();
    check_headers(path)?;

    let file = File::open(path).map_err(|e| LoadError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let df = CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Option::from(Arc::new(CancerRecord::raw_schema())))
        .finish()?;

    debug!("read {} rows from {:?}", df.height(), path);
    let df = prepare(df)?;
    info!("dataset ready: {} patients, {} columns", df.height(), df.width());

    Ok(df)
}

fn check_headers(path: &Path) -> Result<(), LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        if matches!(e.kind(), csv::ErrorKind::Io(_)) {
            LoadError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            }
        } else {
            LoadError::Header(e)
        }
    })?;
    let headers = reader.headers()?.clone();

    for column in CancerRecord::expected_columns() {
        if !headers.iter().any(|header| header == column) {
            return Err(LoadError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/* Patient_ID carries nothing the charts use. Year arrives as a bare number and
becomes a date pinned to January 1st, so range filters compare real dates. */
pub(crate) fn prepare(df: DataFrame) -> Result<DataFrame, LoadError> {
    let mut df = df.drop("Patient_ID")?;

    let years = df.column("Year")?.i64()?;
    let mut dates = Vec::with_capacity(years.len());
    for year in years.into_iter() {
        match year.and_then(|y| NaiveDate::from_ymd_opt(y as i32, 1, 1)) {
            Some(date) => dates.push(date),
            None => return Err(LoadError::InvalidYear { value: year }),
        }
    }

    df.with_column(DateChunked::from_naive_date("Year", dates).into_series())?;
    Ok(df)
}
