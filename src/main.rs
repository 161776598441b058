extern crate serde;

mod aggregate;
mod derive;
mod filter;
mod loader;
mod query;
mod records;

use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Parser;
use env_logger::{Builder, Env};
use log::{debug, info, LevelFilter};
use sysinfo::{ProcessExt, System, SystemExt};

use filter::FilterSpec;
use query::{AnalysisRequest, Category, QueryFacade, TableScope};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct CancerAppArgs {
    #[clap(
        short,
        long,
        parse(from_os_str),
        default_value = "data/global_cancer_patients_2015_2024.csv",
        help = "Path to the patients dataset"
    )]
    data: PathBuf,
    #[clap(short, long, parse(from_occurrences), help = "Verbose level")]
    verbose: usize,
}

fn resident_memory_mb() -> u64 {
    let mut system = System::new();
    match sysinfo::get_current_pid() {
        Ok(pid) => {
            system.refresh_process(pid);
            system.process(pid).map(|p| p.memory() / 1024 / 1024).unwrap_or(0)
        }
        Err(_) => 0,
    }
}

fn full_range() -> (NaiveDate, NaiveDate) {
    // the dataset spans 2015 through 2024
    (
        NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MAX),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CancerAppArgs::parse();

    let log_level = match cli.verbose {
        1 => LevelFilter::Debug,
        2 => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    let env = Env::new().filter("CANCER_LOG");
    Builder::new()
        .filter(Some("cancer_analytics"), log_level)
        .parse_env(env)
        .init();

    debug!("Arguments {:#?}", cli);

    let start_time = Instant::now();

    let table = loader::load_dataset(&cli.data).await?;
    let table = derive::attach_derived_columns(table)?;
    let facade = QueryFacade::new(table);

    info!(
        "pipeline ready in {:?}, resident memory {} MB",
        start_time.elapsed(),
        resident_memory_mb()
    );

    let (start, end) = full_range();
    let analyses = vec![
        (
            "Share of each gender across the database",
            AnalysisRequest::PercentageBy { category: Category::Gender },
        ),
        (
            "Reported cases by country or region",
            AnalysisRequest::RegionBoxplot,
        ),
        (
            "Age group frequencies from 2015 to 2024",
            AnalysisRequest::AgeGroupHistogram,
        ),
        (
            "Air pollution distribution in the chosen date range",
            AnalysisRequest::AirPollutionHistogram { start, end },
        ),
        (
            "Correlation between the numeric aspects",
            AnalysisRequest::CorrelationHeatmap { scope: TableScope::Full },
        ),
        (
            "Correlation over the first half of the decade",
            AnalysisRequest::CorrelationHeatmap {
                scope: TableScope::Filtered(FilterSpec {
                    start_date: start,
                    end_date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or(end),
                    age: None,
                }),
            },
        ),
        (
            "Average treatment cost by cancer type at age 50",
            AnalysisRequest::CostByCancerTypeAtAge { age: 50 },
        ),
        (
            "Severity by smoking and genetic risk band",
            AnalysisRequest::SeverityBySmokingAndRisk,
        ),
        (
            "Treatment cost by cancer type and stage",
            AnalysisRequest::CostByCancerTypeAndStage,
        ),
        (
            "Survival years by stage and region",
            AnalysisRequest::SurvivalByStageAndRegion,
        ),
    ];

    for (title, request) in analyses {
        let result = facade.run(&request)?;
        println!("\n{}", title);
        println!("{}", result.head(Some(5)));
    }

    info!(
        "all analyses done in {:?}, resident memory {} MB",
        start_time.elapsed(),
        resident_memory_mb()
    );

    Ok(())
}
