use billetscan_core::Table;

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    /// Number of numeric cells (missing/text cells excluded).
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `0.0` when fewer than two values.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-column statistics over every column that holds at least one
/// numeric cell. Column order follows the table.
pub fn describe(table: &Table) -> Vec<ColumnStats> {
    table
        .column_names()
        .iter()
        .filter_map(|name| {
            let values: Vec<f64> = table
                .column(name)?
                .iter()
                .filter_map(|c| c.as_f64())
                .collect();
            column_stats(name, &values)
        })
        .collect()
}

fn column_stats(name: &str, values: &[f64]) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(ColumnStats { name: name.to_string(), count, mean, std, min, max })
}
