use chrono::NaiveDate;
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::filter::{self, FilterSpec};

/// Categorical columns the percentage pie can slice by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Gender,
    CountryRegion,
    Year,
    CancerType,
    CancerStage,
}

impl Category {
    pub fn column(&self) -> &'static str {
        match self {
            Category::Gender => "Gender",
            Category::CountryRegion => "Country_Region",
            Category::Year => "Year",
            Category::CancerType => "Cancer_Type",
            Category::CancerStage => "Cancer_Stage",
        }
    }
}

/// Which version of the table an analysis reads. The caller decides; nothing
/// is implied by widget state elsewhere on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableScope {
    Full,
    Filtered(FilterSpec),
}

/// One request per chart on the dashboard. Parameters that used to live in
/// sidebar widgets are explicit fields here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisRequest {
    PercentageBy { category: Category },
    RegionBoxplot,
    AgeGroupHistogram,
    AirPollutionHistogram { start: NaiveDate, end: NaiveDate },
    CorrelationHeatmap { scope: TableScope },
    CostByCancerTypeAtAge { age: i64 },
    SeverityBySmokingAndRisk,
    CostByCancerTypeAndStage,
    SurvivalByStageAndRegion,
}

/// The single entry point the presentation layer calls. Owns the prepared
/// table for the life of the process; every answer is computed fresh from it.
pub struct QueryFacade {
    table: DataFrame,
}

impl QueryFacade {
    pub fn new(table: DataFrame) -> Self {
        QueryFacade { table }
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    /// Runs one analysis and returns a chart-ready frame: category plus value
    /// columns for the bar/pie/scatter shapes, raw value columns for the
    /// distribution shapes, a labelled matrix for the heatmap.
    pub fn run(&self, request: &AnalysisRequest) -> PolarsResult<DataFrame> {
        debug!(
            "running analysis {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        match request {
            AnalysisRequest::PercentageBy { category } => self.percentage_by(category.column()),
            AnalysisRequest::RegionBoxplot => self.table.select(vec!["Country_Region"]),
            AnalysisRequest::AgeGroupHistogram => {
                aggregate::group_count(&self.table, &["Age_Group"])
            }
            AnalysisRequest::AirPollutionHistogram { start, end } => {
                filter::date_range(&self.table, *start, *end)?.select(vec!["Air_Pollution"])
            }
            AnalysisRequest::CorrelationHeatmap { scope } => {
                aggregate::correlation_matrix(&self.scoped(scope)?)
            }
            AnalysisRequest::CostByCancerTypeAtAge { age } => {
                let at_age = filter::exact_value(&self.table, "Age", *age)?;
                aggregate::group_mean(&at_age, &["Cancer_Type"], "Treatment_Cost_USD")
            }
            AnalysisRequest::SeverityBySmokingAndRisk => {
                let mut out = aggregate::group_mean_count(
                    &self.table,
                    &["Smoking", "Genetic_Risk_Bin"],
                    "Target_Severity_Score",
                )?;
                out.rename("Target_Severity_Score", "Avg_Severity")?;
                Ok(out)
            }
            AnalysisRequest::CostByCancerTypeAndStage => aggregate::group_sum(
                &self.table,
                &["Cancer_Type", "Cancer_Stage"],
                "Treatment_Cost_USD",
            ),
            AnalysisRequest::SurvivalByStageAndRegion => aggregate::group_sum(
                &self.table,
                &["Cancer_Stage", "Country_Region"],
                "Survival_Years",
            ),
        }
    }

    fn scoped(&self, scope: &TableScope) -> PolarsResult<DataFrame> {
        match scope {
            TableScope::Full => Ok(self.table.clone()),
            TableScope::Filtered(spec) => spec.apply(&self.table),
        }
    }

    /* Category frequencies with their share of the whole, which is all a pie
    renderer needs. An empty table yields an empty result, not an error. */
    fn percentage_by(&self, column: &str) -> PolarsResult<DataFrame> {
        let mut counts = aggregate::group_count(&self.table, &[column])?;
        let total = counts
            .column("Count")?
            .u32()?
            .sum()
            .unwrap_or(0) as f64;
        let shares: Vec<f64> = counts
            .column("Count")?
            .u32()?
            .into_iter()
            .map(|count| match count {
                Some(count) if total > 0.0 => count as f64 * 100.0 / total,
                _ => 0.0,
            })
            .collect();
        counts.with_column(Series::new("Percentage", shares))?;
        Ok(counts)
    }
}
