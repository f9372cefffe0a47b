//! Ingestion and output adapters over Polars CSV tables

use std::fs::File;
use std::sync::Arc;

use anyhow::Context;
use polars::prelude::*;

use crate::model::{Metric, ScoredRecord};
use crate::InvalidInputError;

/// Column carrying the customer identifier. Read as an opaque string so that
/// leading zeros and non-numeric IDs survive.
pub const CUSTOMER_ID_COLUMN: &str = "customer_id";

/// Passthrough column copied verbatim from input to output.
pub const MARKET_TYPE_COLUMN: &str = "trip_market_type";

/// Fixed location of the diagnostic dump, relative to the working directory.
pub const DIAGNOSTIC_PATH: &str = "log.csv";

const CLASS_CODE_COLUMN: &str = "rfm_class_code";
const CLASS_COLUMN: &str = "rfm_class";

/// One input row as seen by the scoring core.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub recency: f64,
    pub frequency: f64,
    pub monetary_value: f64,
}

/// The loaded dataset: the full input frame (every original column, original
/// row order) plus the extracted records, row-aligned with the frame.
#[derive(Debug)]
pub struct RfmTable {
    pub frame: DataFrame,
    pub records: Vec<CustomerRecord>,
}

/// Load a comma-delimited customer table with a header row.
///
/// Required columns: `customer_id` plus the three numeric RFM metrics. Any
/// further columns are kept on the frame for passthrough and diagnostics.
pub fn load_table(path: &str) -> crate::Result<RfmTable> {
    let mut overrides = Schema::new();
    overrides.with_column(CUSTOMER_ID_COLUMN.into(), DataType::Utf8);

    let frame = CsvReader::from_path(path)
        .with_context(|| format!("failed to open input file {path}"))?
        .has_header(true)
        .with_dtypes(Some(Arc::new(overrides)))
        .finish()
        .with_context(|| format!("failed to read input file {path}"))?;

    let records = extract_records(&frame)?;
    Ok(RfmTable { frame, records })
}

fn extract_records(frame: &DataFrame) -> crate::Result<Vec<CustomerRecord>> {
    let names = frame.get_column_names();
    let required = [
        CUSTOMER_ID_COLUMN,
        Metric::Recency.column(),
        Metric::Frequency.column(),
        Metric::MonetaryValue.column(),
    ];
    for column in required {
        if !names.iter().any(|name| *name == column) {
            return Err(
                InvalidInputError(format!("missing required column `{column}`")).into(),
            );
        }
    }

    // A header-only file has the columns but no rows; the pipeline rejects the
    // empty record set.
    if frame.height() == 0 {
        return Ok(Vec::new());
    }

    let customer_ids = id_column(frame)?;
    let recency = metric_column(frame, Metric::Recency)?;
    let frequency = metric_column(frame, Metric::Frequency)?;
    let monetary_value = metric_column(frame, Metric::MonetaryValue)?;

    Ok(customer_ids
        .into_iter()
        .zip(recency)
        .zip(frequency)
        .zip(monetary_value)
        .map(
            |(((customer_id, recency), frequency), monetary_value)| CustomerRecord {
                customer_id,
                recency,
                frequency,
                monetary_value,
            },
        )
        .collect())
}

fn id_column(frame: &DataFrame) -> crate::Result<Vec<String>> {
    let series = frame.column(CUSTOMER_ID_COLUMN)?;
    if series.null_count() > 0 {
        return Err(InvalidInputError(format!(
            "column `{CUSTOMER_ID_COLUMN}` has missing values"
        ))
        .into());
    }
    Ok(series
        .utf8()?
        .into_no_null_iter()
        .map(str::to_string)
        .collect())
}

fn metric_column(frame: &DataFrame, metric: Metric) -> crate::Result<Vec<f64>> {
    let name = metric.column();
    let series = frame.column(name)?;

    // A single bad token makes the reader infer the whole column as Utf8.
    // Rejecting the dtype instead of casting keeps bad tokens from turning
    // into nulls.
    if !series.dtype().is_numeric() {
        return Err(InvalidInputError(format!(
            "column `{name}` must be numeric, found {}",
            series.dtype()
        ))
        .into());
    }
    if series.null_count() > 0 {
        return Err(InvalidInputError(format!("column `{name}` has missing values")).into());
    }

    let values = series.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_no_null_iter().collect())
}

/// Write the segment table: `customer_id`, the market-type passthrough and the
/// segment label, in that order, header included, no index column.
pub fn write_segments(table: &RfmTable, scored: &[ScoredRecord], path: &str) -> crate::Result<()> {
    let names = table.frame.get_column_names();
    if !names.iter().any(|name| *name == MARKET_TYPE_COLUMN) {
        return Err(InvalidInputError(format!(
            "missing required column `{MARKET_TYPE_COLUMN}`"
        ))
        .into());
    }

    let labels: Vec<&str> = scored.iter().map(|s| s.segment.as_str()).collect();
    let mut out = DataFrame::new(vec![
        table.frame.column(CUSTOMER_ID_COLUMN)?.clone(),
        table.frame.column(MARKET_TYPE_COLUMN)?.clone(),
        Series::new(CLASS_COLUMN, labels),
    ])?;

    write_csv(&mut out, path)
}

/// Dump the full enriched table: every original column plus the three scores,
/// the class code and the segment label.
pub fn write_diagnostic(
    table: &RfmTable,
    scored: &[ScoredRecord],
    path: &str,
) -> crate::Result<()> {
    let recency: Vec<u32> = scored.iter().map(|s| u32::from(s.code.recency)).collect();
    let frequency: Vec<u32> = scored.iter().map(|s| u32::from(s.code.frequency)).collect();
    let monetary: Vec<u32> = scored.iter().map(|s| u32::from(s.code.monetary)).collect();
    let codes: Vec<String> = scored.iter().map(|s| s.code.to_string()).collect();
    let labels: Vec<&str> = scored.iter().map(|s| s.segment.as_str()).collect();

    let mut enriched = table.frame.clone();
    enriched.with_column(Series::new("recency_quartile", recency))?;
    enriched.with_column(Series::new("frequency_quartile", frequency))?;
    enriched.with_column(Series::new("monetary_value_quartile", monetary))?;
    enriched.with_column(Series::new(CLASS_CODE_COLUMN, codes))?;
    enriched.with_column(Series::new(CLASS_COLUMN, labels))?;

    write_csv(&mut enriched, path)
}

fn write_csv(frame: &mut DataFrame, path: &str) -> crate::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create output file {path}"))?;
    CsvWriter::new(&mut file)
        .finish(frame)
        .with_context(|| format!("failed to write output file {path}"))?;
    Ok(())
}
