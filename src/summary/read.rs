use std::fs::File;
use std::io;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{MeanSummary, RateSummary};
use crate::error::ValidationError;
use crate::validate;

/// Failure while loading group summaries from CSV.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A record did not parse.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    /// Only a header, or nothing at all.
    #[error("CSV input contains no data records")]
    Empty,
    /// Record `record` (0-based, header excluded) failed validation.
    #[error("record {record}: {source}")]
    Invalid {
        /// Index of the failing record.
        record: usize,
        /// The violated rule.
        #[source]
        source: ValidationError,
    },
}

// Sizes are read signed so that a negative count is reported as a
// validation failure naming the field rather than a parse error.
#[derive(Debug, Deserialize)]
struct MeanRecord {
    mean: f64,
    std_dev: f64,
    size: i64,
}

#[derive(Debug, Deserialize)]
struct RateRecord {
    successes: i64,
    total: i64,
}

fn non_negative(field: &str, value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value).map_err(|_| ValidationError::new(field, format_args!("must not be negative, got {value}")))
}

impl TryFrom<MeanRecord> for MeanSummary {
    type Error = ValidationError;

    fn try_from(r: MeanRecord) -> Result<Self, Self::Error> {
        let summary = MeanSummary::new(r.mean, r.std_dev, non_negative("size", r.size)?);
        validate::mean_summary("", &summary)?;
        Ok(summary)
    }
}

impl TryFrom<RateRecord> for RateSummary {
    type Error = ValidationError;

    fn try_from(r: RateRecord) -> Result<Self, Self::Error> {
        let summary = RateSummary::new(
            non_negative("successes", r.successes)?,
            non_negative("total", r.total)?,
        );
        validate::rate_summary("", &summary)?;
        Ok(summary)
    }
}

fn read_records<R, Raw, T>(reader: R) -> Result<Vec<T>, ReadError>
where
    R: io::Read,
    Raw: DeserializeOwned,
    T: TryFrom<Raw, Error = ValidationError>,
{
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (record, row) in rdr.deserialize::<Raw>().enumerate() {
        let summary = T::try_from(row?).map_err(|source| ReadError::Invalid { record, source })?;
        out.push(summary);
    }

    if out.is_empty() {
        return Err(ReadError::Empty);
    }
    Ok(out)
}

/// Read `mean,std_dev,size` records from CSV with a header row.
///
/// Every record is validated; the first invalid one aborts the read.
pub fn read_mean_summaries<R: io::Read>(reader: R) -> Result<Vec<MeanSummary>, ReadError> {
    read_records::<R, MeanRecord, MeanSummary>(reader)
}

/// Read `successes,total` records from CSV with a header row.
pub fn read_rate_summaries<R: io::Read>(reader: R) -> Result<Vec<RateSummary>, ReadError> {
    read_records::<R, RateRecord, RateSummary>(reader)
}

impl MeanSummary {
    /// Load validated summaries from a CSV file.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, ReadError> {
        read_mean_summaries(File::open(path)?)
    }
}

impl RateSummary {
    /// Load validated summaries from a CSV file.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, ReadError> {
        read_rate_summaries(File::open(path)?)
    }
}
