use num::NumCast;
use polars::prelude::*;

static AGE_EDGES: [f64; 3] = [30.0, 50.0, 70.0];
static AGE_LABELS: [&str; 4] = ["<30", "30-50", "50-70", "70+"];

static RISK_EDGES: [f64; 2] = [0.3, 0.7];
static RISK_LABELS: [&str; 3] = ["Low", "Medium", "High"];

/// Attaches the two categorical columns the dashboard groups on: `Age_Group`
/// and `Genetic_Risk_Bin`. Done once right after loading; the frame is treated
/// as read-only from then on.
pub fn attach_derived_columns(df: DataFrame) -> PolarsResult<DataFrame> {
    let mut df = df.lazy();

    df = df.with_column(
        col("Age")
            .apply(age_group, GetOutput::from_type(DataType::Utf8))
            .alias("Age_Group"),
    );
    df = df.with_column(
        col("Genetic_Risk")
            .apply(genetic_risk_bin, GetOutput::from_type(DataType::Utf8))
            .alias("Genetic_Risk_Bin"),
    );

    df.collect()
}

/* Bands are left-inclusive with an open top band, so every non-negative age
gets a label and an age sitting on an edge lands in the band above it. */
fn age_group(column: Series) -> Result<Option<Series>, PolarsError> {
    let ages = column.i64()?;
    let labels: Vec<Option<&str>> = ages
        .into_iter()
        .map(|age| {
            age.filter(|a| *a >= 0)
                .and_then(|a| band(a, &AGE_EDGES, &AGE_LABELS, false))
        })
        .collect();
    Ok(Option::from(Series::new(column.name(), labels)))
}

/* Right-closed bands over (0, 1]. A risk of exactly 0 or anything outside the
unit interval gets no bin; analyses keyed on the bin drop those rows. */
fn genetic_risk_bin(column: Series) -> Result<Option<Series>, PolarsError> {
    let risks = column.f64()?;
    let labels: Vec<Option<&str>> = risks
        .into_iter()
        .map(|risk| {
            risk.filter(|r| *r > 0.0 && *r <= 1.0)
                .and_then(|r| band(r, &RISK_EDGES, &RISK_LABELS, true))
        })
        .collect();
    Ok(Option::from(Series::new(column.name(), labels)))
}

fn band<T: NumCast + Copy>(
    value: T,
    edges: &[f64],
    labels: &'static [&'static str],
    right_closed: bool,
) -> Option<&'static str> {
    let value: f64 = num::cast(value)?;
    let index = if right_closed {
        edges.iter().filter(|edge| value > **edge).count()
    } else {
        edges.iter().filter(|edge| value >= **edge).count()
    };
    Some(labels[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn derived(ages: &[i64], risks: &[f64]) -> DataFrame {
        let df = df!("Age" => ages, "Genetic_Risk" => risks).unwrap();
        attach_derived_columns(df).unwrap()
    }

    fn utf8_at(df: &DataFrame, column: &str, idx: usize) -> Option<String> {
        df.column(column)
            .unwrap()
            .utf8()
            .unwrap()
            .get(idx)
            .map(|s| s.to_string())
    }

    #[test]
    fn age_edges_belong_to_the_higher_band() {
        let df = derived(&[0, 29, 30, 49, 50, 69, 70, 101], &[0.5; 8]);
        let groups: Vec<Option<String>> =
            (0..8).map(|i| utf8_at(&df, "Age_Group", i)).collect();
        let expected = ["<30", "<30", "30-50", "30-50", "50-70", "50-70", "70+", "70+"];
        for (group, expected) in groups.iter().zip(expected) {
            assert_eq!(group.as_deref(), Some(expected));
        }
    }

    #[test]
    fn negative_age_gets_no_group() {
        let df = derived(&[-1], &[0.5]);
        assert_eq!(utf8_at(&df, "Age_Group", 0), None);
    }

    #[test]
    fn risk_edges_belong_to_the_lower_band() {
        let df = derived(&[40; 6], &[0.1, 0.3, 0.5, 0.7, 0.71, 1.0]);
        let expected = ["Low", "Low", "Medium", "Medium", "High", "High"];
        for (idx, expected) in expected.iter().enumerate() {
            assert_eq!(utf8_at(&df, "Genetic_Risk_Bin", idx).as_deref(), Some(*expected));
        }
    }

    #[test]
    fn risk_outside_unit_interval_gets_no_bin() {
        let df = derived(&[40; 3], &[0.0, -0.2, 1.2]);
        for idx in 0..3 {
            assert_eq!(utf8_at(&df, "Genetic_Risk_Bin", idx), None);
        }
    }
}
