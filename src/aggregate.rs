use polars::prelude::*;

/// Mean of `value_col` per distinct combination of `group_cols`. Rows with a
/// null key are excluded up front, so no null group is ever emitted and every
/// output group existed in the input.
pub fn group_mean(
    df: &DataFrame,
    group_cols: &[&str],
    value_col: &str,
) -> PolarsResult<DataFrame> {
    grouped(df, group_cols, vec![col(value_col).mean().alias(value_col)])
}

/// Sum of `value_col` per group, same key handling as [`group_mean`].
pub fn group_sum(df: &DataFrame, group_cols: &[&str], value_col: &str) -> PolarsResult<DataFrame> {
    grouped(df, group_cols, vec![col(value_col).sum().alias(value_col)])
}

/// Mean of `value_col` plus the group size, for analyses that report a sample
/// size alongside the average.
pub fn group_mean_count(
    df: &DataFrame,
    group_cols: &[&str],
    value_col: &str,
) -> PolarsResult<DataFrame> {
    grouped(
        df,
        group_cols,
        vec![
            col(value_col).mean().alias(value_col),
            col(value_col).count().alias("Count"),
        ],
    )
}

/// Group sizes alone, the shape behind frequency bars and pie slices.
pub fn group_count(df: &DataFrame, group_cols: &[&str]) -> PolarsResult<DataFrame> {
    grouped(
        df,
        group_cols,
        vec![col(group_cols[0]).count().alias("Count")],
    )
}

/* Grouped results are sorted ascending by their keys so repeated runs over the
same data produce identical tables. */
fn grouped(df: &DataFrame, group_cols: &[&str], aggs: Vec<Expr>) -> PolarsResult<DataFrame> {
    let keys: Vec<Expr> = group_cols.iter().map(|column| col(column)).collect();
    let descending = vec![false; group_cols.len()];

    drop_null_keys(df, group_cols)?
        .lazy()
        .groupby(keys.clone())
        .agg(aggs)
        .sort_by_exprs(keys, descending, false)
        .collect()
}

fn drop_null_keys(df: &DataFrame, group_cols: &[&str]) -> PolarsResult<DataFrame> {
    let mut mask = df.column(group_cols[0])?.is_not_null();
    for column in &group_cols[1..] {
        mask = mask & df.column(column)?.is_not_null();
    }
    df.filter(&mask)
}

/// Pairwise Pearson correlation over every numeric column, as a frame with an
/// `Aspect` label column followed by one column per variable. The matrix is
/// symmetric with a diagonal of 1.0; a zero-variance column has no defined
/// correlation, so its cells hold NaN.
pub fn correlation_matrix(df: &DataFrame) -> PolarsResult<DataFrame> {
    let numeric: Vec<&Series> = df
        .get_columns()
        .iter()
        .filter(|series| series.dtype().is_numeric())
        .collect();

    let names: Vec<&str> = numeric.iter().map(|series| series.name()).collect();
    let columns = numeric
        .iter()
        .map(|series| Ok(series.cast(&DataType::Float64)?.f64()?.into_iter().collect()))
        .collect::<PolarsResult<Vec<Vec<Option<f64>>>>>()?;

    let mut out = vec![Series::new("Aspect", &names)];
    for (j, name) in names.iter().enumerate() {
        let cells: Vec<f64> = columns
            .iter()
            .enumerate()
            .map(|(i, other)| {
                if i == j {
                    // exact 1.0 on the diagonal unless the column is constant
                    if variance(other) > 0.0 { 1.0 } else { f64::NAN }
                } else {
                    pearson(other, &columns[j])
                }
            })
            .collect();
        out.push(Series::new(*name, cells));
    }

    DataFrame::new(out)
}

fn variance(values: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return 0.0;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    present.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / present.len() as f64
}

/* Pairwise-complete observations, matching what the dataframe libraries do
when a value is missing on either side. */
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.is_empty() {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x) * (x - mean_x);
        var_y += (y - mean_y) * (y - mean_y);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x * var_y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn costs() -> DataFrame {
        df!(
            "Cancer_Type" => &["Lung", "Lung", "Breast"],
            "Cancer_Stage" => &["Stage I", "Stage II", "Stage I"],
            "Treatment_Cost_USD" => &[100.0, 300.0, 50.0],
        )
        .unwrap()
    }

    fn f64_at(df: &DataFrame, column: &str, idx: usize) -> f64 {
        df.column(column).unwrap().f64().unwrap().get(idx).unwrap()
    }

    #[test]
    fn mean_over_one_key() {
        let out = group_mean(&costs(), &["Cancer_Type"], "Treatment_Cost_USD").unwrap();
        assert_eq!(out.height(), 2);
        // sorted ascending by key: Breast, Lung
        assert_eq!(f64_at(&out, "Treatment_Cost_USD", 0), 50.0);
        assert_eq!(f64_at(&out, "Treatment_Cost_USD", 1), 200.0);
    }

    #[test]
    fn sum_over_two_keys() {
        let out = group_sum(
            &costs(),
            &["Cancer_Type", "Cancer_Stage"],
            "Treatment_Cost_USD",
        )
        .unwrap();
        assert_eq!(out.height(), 3);
        let lung_i = out
            .column("Cancer_Type")
            .unwrap()
            .utf8()
            .unwrap()
            .into_iter()
            .position(|t| t == Some("Lung"))
            .unwrap();
        assert_eq!(f64_at(&out, "Treatment_Cost_USD", lung_i), 100.0);
    }

    #[test]
    fn counts_add_up_to_the_input_rows() {
        let out = group_mean_count(&costs(), &["Cancer_Type"], "Treatment_Cost_USD").unwrap();
        let total: u32 = out.column("Count").unwrap().u32().unwrap().sum().unwrap();
        assert_eq!(total as usize, costs().height());
    }

    #[test]
    fn null_keys_are_dropped_not_grouped() {
        let df = df!(
            "Bin" => &[Some("Low"), None, Some("Low")],
            "Score" => &[1.0, 100.0, 3.0],
        )
        .unwrap();
        let out = group_mean(&df, &["Bin"], "Score").unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(f64_at(&out, "Score", 0), 2.0);
    }

    #[test]
    fn empty_input_yields_empty_groups() {
        let df = df!(
            "Cancer_Type" => &Vec::<String>::new(),
            "Treatment_Cost_USD" => &Vec::<f64>::new(),
        )
        .unwrap();
        let out = group_mean(&df, &["Cancer_Type"], "Treatment_Cost_USD").unwrap();
        assert_eq!(out.height(), 0);
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0, 4.0],
            "b" => &[2.0, 4.0, 6.0, 8.0],
            "c" => &[4.0, 3.0, 2.0, 1.0],
            "label" => &["w", "x", "y", "z"],
        )
        .unwrap();
        let out = correlation_matrix(&df).unwrap();

        // the label column is not part of the matrix
        assert_eq!(out.width(), 4);
        assert_eq!(out.height(), 3);

        for i in 0..3 {
            let name = out.column("Aspect").unwrap().utf8().unwrap().get(i).unwrap().to_string();
            assert_eq!(f64_at(&out, &name, i), 1.0);
        }
        assert_eq!(f64_at(&out, "b", 0), 1.0); // a and b are perfectly linear
        assert_eq!(f64_at(&out, "c", 0), -1.0);
        assert_eq!(f64_at(&out, "a", 2), f64_at(&out, "c", 0));
    }

    #[test]
    fn constant_column_reports_nan() {
        let df = df!(
            "flat" => &[5.0, 5.0, 5.0],
            "rising" => &[1.0, 2.0, 3.0],
        )
        .unwrap();
        let out = correlation_matrix(&df).unwrap();
        assert!(f64_at(&out, "flat", 0).is_nan());
        assert!(f64_at(&out, "rising", 0).is_nan());
        assert_eq!(f64_at(&out, "rising", 1), 1.0);
    }
}
