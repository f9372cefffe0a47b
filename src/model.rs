//! Quartile estimation and per-customer RFM scoring

use crate::data::CustomerRecord;
use crate::segment::{ClassCode, Segment};
use crate::InvalidInputError;

/// One of the three RFM dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Recency,
    Frequency,
    MonetaryValue,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Recency, Metric::Frequency, Metric::MonetaryValue];

    /// Name of the input column carrying this metric.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Recency => "recency",
            Metric::Frequency => "frequency",
            Metric::MonetaryValue => "monetary_value",
        }
    }

    /// Whether smaller raw values rank better. True only for recency: a
    /// customer seen yesterday beats one seen a year ago.
    pub fn reverse(self) -> bool {
        matches!(self, Metric::Recency)
    }

    fn value(self, record: &CustomerRecord) -> f64 {
        match self {
            Metric::Recency => record.recency,
            Metric::Frequency => record.frequency,
            Metric::MonetaryValue => record.monetary_value,
        }
    }
}

/// Quartile cut points for one metric. Invariant: p25 <= p50 <= p75.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPoints {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

/// Per-metric cut points, estimated once over the whole dataset and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct QuartileTable {
    recency: CutPoints,
    frequency: CutPoints,
    monetary_value: CutPoints,
}

impl QuartileTable {
    /// Estimate the cut points for all three metrics.
    ///
    /// Fails with [`InvalidInputError`] on an empty record set or a non-finite
    /// metric value. Duplicate customer rows are kept: every row contributes
    /// to the quartiles.
    pub fn estimate(records: &[CustomerRecord]) -> crate::Result<Self> {
        if records.is_empty() {
            return Err(InvalidInputError(
                "cannot estimate quartiles over an empty customer table".to_string(),
            )
            .into());
        }

        Ok(QuartileTable {
            recency: estimate_cuts(records, Metric::Recency)?,
            frequency: estimate_cuts(records, Metric::Frequency)?,
            monetary_value: estimate_cuts(records, Metric::MonetaryValue)?,
        })
    }

    pub fn cuts(&self, metric: Metric) -> &CutPoints {
        match metric {
            Metric::Recency => &self.recency,
            Metric::Frequency => &self.frequency,
            Metric::MonetaryValue => &self.monetary_value,
        }
    }
}

fn estimate_cuts(records: &[CustomerRecord], metric: Metric) -> crate::Result<CutPoints> {
    let mut values = Vec::with_capacity(records.len());
    for record in records {
        let value = metric.value(record);
        if !value.is_finite() {
            return Err(InvalidInputError(format!(
                "column `{}` has a non-numeric value for customer {}",
                metric.column(),
                record.customer_id
            ))
            .into());
        }
        values.push(value);
    }
    values.sort_unstable_by(f64::total_cmp);

    Ok(CutPoints {
        p25: interpolate(&values, 0.25),
        p50: interpolate(&values, 0.50),
        p75: interpolate(&values, 0.75),
    })
}

/// Quantile over ascending values by linear interpolation between order
/// statistics: index q*(n-1), interpolated between its floor and ceil
/// neighbors. Cut points sit on classification boundaries, so the method must
/// be reproducible exactly.
fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    let lower = sorted[lo];
    if lo == hi {
        return lower;
    }
    lower + (sorted[hi] - lower) * (position - lo as f64)
}

/// Map a raw metric value onto the 1-4 scale against the metric's cut points.
///
/// Thresholds are inclusive and checked in order p25, p50, p75. With `reverse`
/// the scale flips so that 1 is always the best quartile: small values win for
/// recency, large values win for frequency and monetary.
pub fn score_value(value: f64, cuts: &CutPoints, reverse: bool) -> u8 {
    if value <= cuts.p25 {
        if reverse {
            1
        } else {
            4
        }
    } else if value <= cuts.p50 {
        if reverse {
            2
        } else {
            3
        }
    } else if value <= cuts.p75 {
        if reverse {
            3
        } else {
            2
        }
    } else if reverse {
        4
    } else {
        1
    }
}

/// A customer record with its derived scores, class code and segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: CustomerRecord,
    pub code: ClassCode,
    pub segment: Segment,
}

impl ScoredRecord {
    fn score(record: &CustomerRecord, quartiles: &QuartileTable) -> ScoredRecord {
        let code = ClassCode::new(
            dimension_score(record, quartiles, Metric::Recency),
            dimension_score(record, quartiles, Metric::Frequency),
            dimension_score(record, quartiles, Metric::MonetaryValue),
        );
        let segment = Segment::classify(&code);
        ScoredRecord {
            record: record.clone(),
            code,
            segment,
        }
    }
}

fn dimension_score(record: &CustomerRecord, quartiles: &QuartileTable, metric: Metric) -> u8 {
    score_value(metric.value(record), quartiles.cuts(metric), metric.reverse())
}

/// Score every customer against quartiles estimated over the whole dataset.
///
/// Output order matches input order; the whole batch succeeds or fails as one
/// ([`InvalidInputError`] from estimation propagates unchanged).
pub fn score_customers(records: &[CustomerRecord]) -> crate::Result<Vec<ScoredRecord>> {
    let quartiles = QuartileTable::estimate(records)?;
    Ok(records
        .iter()
        .map(|record| ScoredRecord::score(record, &quartiles))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, recency: f64, frequency: f64, monetary_value: f64) -> CustomerRecord {
        CustomerRecord {
            customer_id: id.to_string(),
            recency,
            frequency,
            monetary_value,
        }
    }

    /// The reference dataset: recency [1,10,20,40], frequency [40,20,10,1],
    /// monetary [400,300,200,100].
    fn sample_records() -> Vec<CustomerRecord> {
        vec![
            record("1", 1.0, 40.0, 400.0),
            record("2", 10.0, 20.0, 300.0),
            record("3", 20.0, 10.0, 200.0),
            record("4", 40.0, 1.0, 100.0),
        ]
    }

    #[test]
    fn test_quartiles_linear_interpolation() {
        let quartiles = QuartileTable::estimate(&sample_records()).unwrap();

        let recency = quartiles.cuts(Metric::Recency);
        assert_eq!(recency.p25, 7.75);
        assert_eq!(recency.p50, 15.0);
        assert_eq!(recency.p75, 25.0);

        let frequency = quartiles.cuts(Metric::Frequency);
        assert_eq!(frequency.p25, 7.75);
        assert_eq!(frequency.p50, 15.0);
        assert_eq!(frequency.p75, 25.0);

        let monetary = quartiles.cuts(Metric::MonetaryValue);
        assert_eq!(monetary.p25, 175.0);
        assert_eq!(monetary.p50, 250.0);
        assert_eq!(monetary.p75, 325.0);
    }

    #[test]
    fn test_quartile_monotonicity() {
        let records = vec![
            record("1", 3.0, 7.0, 12.5),
            record("2", 3.0, 1.0, 980.0),
            record("3", 55.0, 2.0, 44.0),
            record("4", 8.0, 7.0, 12.5),
            record("5", 21.0, 30.0, 610.0),
        ];
        let quartiles = QuartileTable::estimate(&records).unwrap();
        for metric in Metric::ALL {
            let cuts = quartiles.cuts(metric);
            assert!(cuts.p25 <= cuts.p50, "{metric:?}");
            assert!(cuts.p50 <= cuts.p75, "{metric:?}");
        }
    }

    #[test]
    fn test_quartiles_from_single_record() {
        let records = vec![record("1", 12.0, 3.0, 250.0)];
        let quartiles = QuartileTable::estimate(&records).unwrap();
        let cuts = quartiles.cuts(Metric::Recency);
        assert_eq!(cuts.p25, 12.0);
        assert_eq!(cuts.p50, 12.0);
        assert_eq!(cuts.p75, 12.0);
    }

    #[test]
    fn test_quartiles_from_two_records() {
        // index = q*(n-1) over [10, 20]: p25 at 0.25, p50 at 0.5, p75 at 0.75
        let records = vec![record("1", 10.0, 1.0, 1.0), record("2", 20.0, 1.0, 1.0)];
        let quartiles = QuartileTable::estimate(&records).unwrap();
        let cuts = quartiles.cuts(Metric::Recency);
        assert_eq!(cuts.p25, 12.5);
        assert_eq!(cuts.p50, 15.0);
        assert_eq!(cuts.p75, 17.5);
    }

    #[test]
    fn test_empty_dataset_is_invalid_input() {
        let err = QuartileTable::estimate(&[]).unwrap_err();
        assert!(err.downcast_ref::<InvalidInputError>().is_some());
    }

    #[test]
    fn test_non_finite_value_is_invalid_input() {
        let records = vec![record("1", f64::NAN, 1.0, 1.0), record("2", 2.0, 2.0, 2.0)];
        let err = QuartileTable::estimate(&records).unwrap_err();
        assert!(err.downcast_ref::<InvalidInputError>().is_some());
    }

    #[test]
    fn test_score_value_thresholds() {
        let cuts = CutPoints {
            p25: 10.0,
            p50: 20.0,
            p75: 30.0,
        };
        // Standard direction: large values score best.
        assert_eq!(score_value(5.0, &cuts, false), 4);
        assert_eq!(score_value(10.0, &cuts, false), 4);
        assert_eq!(score_value(15.0, &cuts, false), 3);
        assert_eq!(score_value(20.0, &cuts, false), 3);
        assert_eq!(score_value(30.0, &cuts, false), 2);
        assert_eq!(score_value(31.0, &cuts, false), 1);
    }

    #[test]
    fn test_score_value_reversed() {
        let cuts = CutPoints {
            p25: 10.0,
            p50: 20.0,
            p75: 30.0,
        };
        assert_eq!(score_value(5.0, &cuts, true), 1);
        assert_eq!(score_value(10.0, &cuts, true), 1);
        assert_eq!(score_value(15.0, &cuts, true), 2);
        assert_eq!(score_value(25.0, &cuts, true), 3);
        assert_eq!(score_value(31.0, &cuts, true), 4);
    }

    #[test]
    fn test_score_customers_reference_dataset() {
        let scored = score_customers(&sample_records()).unwrap();
        assert_eq!(scored.len(), 4);

        assert_eq!(scored[0].code.to_string(), "111");
        assert_eq!(scored[0].segment, Segment::BestCustomer);

        assert_eq!(scored[1].code.to_string(), "222");
        assert_eq!(scored[1].segment, Segment::NoClassification);

        assert_eq!(scored[2].code.to_string(), "333");
        assert_eq!(scored[2].segment, Segment::NoClassification);

        assert_eq!(scored[3].code.to_string(), "444");
        assert_eq!(scored[3].segment, Segment::LostCheapCustomer);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let records = vec![
            record("1", 0.0, 0.0, 0.0),
            record("2", 1.0, 9.0, 100.0),
            record("3", 2.0, 9.0, 100.0),
            record("4", 3.0, 12.0, 250.0),
            record("5", 100.0, 80.0, 9000.0),
        ];
        for scored in score_customers(&records).unwrap() {
            for digit in scored.code.digits() {
                assert!((1..=4).contains(&digit));
            }
            assert_eq!(scored.code.to_string().len(), 3);
        }
    }

    #[test]
    fn test_single_record_scores_best_on_every_dimension() {
        let records = vec![record("only", 90.0, 1.0, 5.0)];
        let scored = score_customers(&records).unwrap();
        assert_eq!(scored[0].code.to_string(), "111");
        assert_eq!(scored[0].segment, Segment::BestCustomer);
    }

    #[test]
    fn test_order_preserved_and_idempotent() {
        let records = sample_records();
        let first = score_customers(&records).unwrap();
        let second = score_customers(&records).unwrap();
        assert_eq!(first, second);
        for (scored, input) in first.iter().zip(&records) {
            assert_eq!(scored.record.customer_id, input.customer_id);
        }
    }

    #[test]
    fn test_duplicate_customers_all_contribute() {
        // Two identical rows for customer "1"; both are scored and both feed
        // the quartiles.
        let records = vec![
            record("1", 5.0, 10.0, 100.0),
            record("1", 5.0, 10.0, 100.0),
            record("2", 50.0, 1.0, 10.0),
        ];
        let scored = score_customers(&records).unwrap();
        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].code, scored[1].code);
    }
}
