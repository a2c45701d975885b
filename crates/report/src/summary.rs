use std::fmt;

use billetscan_core::Table;
use billetscan_protocol::{Label, PredictionResponse, ServiceStats};

/// Derived counts over a classification response.
///
/// Counts are recomputed from the prediction labels rather than taken
/// from the service-supplied stats: a misbehaving service must not be
/// able to report ratios that contradict its own verdicts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub n_true: usize,
    pub n_false: usize,
    /// `n_false / total * 100`, defined as `0.0` for an empty response.
    pub false_percentage: f64,
}

impl Summary {
    pub fn from_response(response: &PredictionResponse) -> Self {
        let total = response.predictions.len();
        let n_false = response
            .predictions
            .iter()
            .filter(|p| p.label == Label::Faux)
            .count();
        let n_true = total - n_false;

        let false_percentage = if total == 0 {
            0.0
        } else {
            n_false as f64 / total as f64 * 100.0
        };

        Summary { total, n_true, n_false, false_percentage }
    }

    /// Whether the service's own stats agree with the recount.
    pub fn agrees_with(&self, stats: &ServiceStats) -> bool {
        stats.total == self.total as u64
            && stats.n_true == self.n_true as u64
            && stats.n_false == self.n_false as u64
    }
}

/// Input rows and returned labels cannot be joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// The response has a different row count than the input; index
    /// alignment is the whole contract, so nothing can be salvaged.
    RowCountMismatch { rows: usize, predictions: usize },
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCountMismatch { rows, predictions } => write!(
                f,
                "input has {rows} row(s) but the service returned {predictions} prediction(s)"
            ),
        }
    }
}

impl std::error::Error for JoinError {}

/// The uploaded table joined with its predicted labels, keyed by row
/// position: label `i` belongs to `table.row(i)`.
#[derive(Debug)]
pub struct LabeledTable<'a> {
    table: &'a Table,
    labels: Vec<Label>,
}

impl<'a> LabeledTable<'a> {
    /// Positional 1:1 join. A length mismatch is the only detectable
    /// form of misalignment and is rejected outright.
    pub fn join(table: &'a Table, response: &PredictionResponse) -> Result<Self, JoinError> {
        if table.n_rows() != response.predictions.len() {
            return Err(JoinError::RowCountMismatch {
                rows: table.n_rows(),
                predictions: response.predictions.len(),
            });
        }
        Ok(LabeledTable {
            table,
            labels: response.predictions.iter().map(|p| p.label).collect(),
        })
    }

    pub fn table(&self) -> &Table {
        self.table
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn label(&self, row: usize) -> Option<Label> {
        self.labels.get(row).copied()
    }

    /// Numeric values of one feature column, split by predicted label.
    /// Computed on demand for distribution analysis; `None` when the
    /// column doesn't exist. Non-numeric cells are skipped.
    pub fn partition(&self, feature: &str) -> Option<FeaturePartition> {
        let column = self.table.column(feature)?;

        let mut vrai = Vec::new();
        let mut faux = Vec::new();
        for (cell, label) in column.iter().zip(&self.labels) {
            if let Some(v) = cell.as_f64() {
                match label {
                    Label::Vrai => vrai.push(v),
                    Label::Faux => faux.push(v),
                }
            }
        }

        Some(FeaturePartition { feature: feature.to_string(), vrai, faux })
    }
}

/// One feature column's values, partitioned by predicted label.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePartition {
    pub feature: String,
    pub vrai: Vec<f64>,
    pub faux: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use billetscan_core::Cell;
    use billetscan_protocol::PredictionRecord;

    fn record(label: Label) -> PredictionRecord {
        PredictionRecord { features: vec![], label }
    }

    fn response(labels: &[Label]) -> PredictionResponse {
        let n_false = labels.iter().filter(|l| **l == Label::Faux).count() as u64;
        PredictionResponse {
            predictions: labels.iter().map(|l| record(*l)).collect(),
            stats: ServiceStats {
                total: labels.len() as u64,
                n_true: labels.len() as u64 - n_false,
                n_false,
            },
        }
    }

    #[test]
    fn summary_recounts_labels() {
        let resp = response(&[Label::Vrai, Label::Faux, Label::Vrai]);
        let summary = Summary::from_response(&resp);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.n_true, 2);
        assert_eq!(summary.n_false, 1);
        assert!((summary.false_percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_response_has_zero_percentage() {
        let summary = Summary::from_response(&response(&[]));
        assert_eq!(summary.total, 0);
        assert_eq!(summary.false_percentage, 0.0);
    }

    #[test]
    fn summary_ignores_lying_service_stats() {
        let mut resp = response(&[Label::Faux, Label::Faux]);
        resp.stats = ServiceStats { total: 2, n_true: 2, n_false: 0 };

        let summary = Summary::from_response(&resp);
        assert_eq!(summary.n_false, 2);
        assert_eq!(summary.false_percentage, 100.0);
        assert!(!summary.agrees_with(&resp.stats));
    }

    #[test]
    fn join_requires_matching_row_counts() {
        let table = Table::from_rows(
            vec!["diagonal".into()],
            vec![vec![Cell::Number(1.0)], vec![Cell::Number(2.0)]],
        )
        .unwrap();

        let err = LabeledTable::join(&table, &response(&[Label::Vrai])).unwrap_err();
        assert_eq!(err, JoinError::RowCountMismatch { rows: 2, predictions: 1 });
    }

    #[test]
    fn join_aligns_labels_by_position() {
        let table = Table::from_rows(
            vec!["diagonal".into()],
            vec![vec![Cell::Number(1.0)], vec![Cell::Number(2.0)]],
        )
        .unwrap();

        let joined = LabeledTable::join(&table, &response(&[Label::Faux, Label::Vrai])).unwrap();
        assert_eq!(joined.label(0), Some(Label::Faux));
        assert_eq!(joined.label(1), Some(Label::Vrai));
        assert_eq!(joined.label(2), None);
    }

    #[test]
    fn partition_splits_feature_values_by_label() {
        let table = Table::from_rows(
            vec!["diagonal".into(), "note".into()],
            vec![
                vec![Cell::Number(171.8), Cell::Text("a".into())],
                vec![Cell::Number(171.4), Cell::Text("b".into())],
                vec![Cell::Number(172.0), Cell::Text("c".into())],
            ],
        )
        .unwrap();

        let joined =
            LabeledTable::join(&table, &response(&[Label::Vrai, Label::Faux, Label::Vrai]))
                .unwrap();

        let part = joined.partition("diagonal").unwrap();
        assert_eq!(part.vrai, vec![171.8, 172.0]);
        assert_eq!(part.faux, vec![171.4]);

        // Text column partitions to empty numeric slices
        let note = joined.partition("note").unwrap();
        assert!(note.vrai.is_empty() && note.faux.is_empty());

        assert!(joined.partition("nope").is_none());
    }
}
