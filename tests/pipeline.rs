use covid_eda::charts::{Chart, ChartCollector};
use covid_eda::data::columns::{DATE, LOCATION, NEW_CASES, TOTAL_CASES, TOTAL_DEATHS};
use covid_eda::data::LoaderError;
use covid_eda::{AnalysisConfig, Pipeline, PipelineError, StepOutcome};
use polars::prelude::*;
use std::io::Write;
use std::path::Path;

const OWID_SAMPLE: &str = "\
iso_code,continent,location,date,total_cases,new_cases,total_deaths,new_deaths,total_vaccinations,people_vaccinated_per_hundred
BRA,South America,Brazil,2021-01-01,7700000,56000,195000,1000,,
KEN,Africa,Kenya,2021-01-05,97000,400,1690,,1000,0.5
KEN,Africa,Kenya,2021-01-01,96600,,1670,5,,
IND,Asia,India,2021-01-02,10300000,20000,149000,220,,
KEN,Africa,Kenya,2021-01-03,,300,1680,3,,
IND,Asia,India,2021-01-01,10280000,,148900,,500,
IND,Asia,India,2021-01-04,10340000,16000,149400,,1500,0.1
BRA,South America,Brazil,2021-01-02,7750000,50000,196000,1100,,
";

fn write_csv(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("owid-covid-data.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

fn config_for(path: &Path, countries: &[&str]) -> AnalysisConfig {
    AnalysisConfig {
        data_file: path.to_path_buf(),
        countries: countries.iter().map(|s| s.to_string()).collect(),
        ..AnalysisConfig::default()
    }
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

#[test]
fn full_run_cleans_filters_and_charts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), OWID_SAMPLE);
    let pipeline = Pipeline::new(config_for(&path, &["Kenya", "India"]));
    let mut sink = ChartCollector::new();

    let report = pipeline.run(&mut sink).unwrap();

    assert_eq!(report.raw.rows, 8);
    // Kenya 01-03 has no total_cases, Brazil is not a target
    let df = &report.cleaned;
    assert_eq!(df.height(), 5);
    for name in [DATE, LOCATION, TOTAL_CASES, TOTAL_DEATHS] {
        assert_eq!(df.column(name).unwrap().null_count(), 0);
    }

    let locations: Vec<Option<&str>> = df.column(LOCATION).unwrap().str().unwrap().into_iter().collect();
    assert_eq!(
        locations,
        vec![Some("India"), Some("India"), Some("India"), Some("Kenya"), Some("Kenya")]
    );

    // India new_cases: 01-01 leading gap, 01-02 = 20000, 01-04 = 16000
    // Kenya new_cases: 01-01 leading gap, 01-05 = 400
    assert_eq!(
        floats(df, NEW_CASES),
        vec![None, Some(20000.0), Some(16000.0), None, Some(400.0)]
    );
    // India total_vaccinations: 500 on 01-01, 1500 on 01-04 -> 833.33.. on 01-02
    let vacc = floats(df, "total_vaccinations");
    assert!((vacc[1].unwrap() - (500.0 + 1000.0 / 3.0)).abs() < 1e-9);

    assert_eq!(report.eda, StepOutcome::Completed(5));
    assert_eq!(report.vaccinations, StepOutcome::Completed(2));
    assert_eq!(report.choropleth, StepOutcome::Completed(2));

    let charts = sink.charts();
    assert_eq!(charts.len(), 9);
    let maps = charts
        .iter()
        .filter(|c| matches!(c, Chart::Choropleth(_)))
        .count();
    assert_eq!(maps, 2);
}

#[test]
fn missing_iso_and_vaccination_columns_degrade_gracefully() {
    let body = "\
location,date,total_cases,total_deaths,new_cases
Kenya,2021-01-01,10,1,1
Kenya,2021-01-02,12,1,
Kenya,2021-01-04,20,2,4
";
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), body);
    let pipeline = Pipeline::new(config_for(&path, &["Kenya"]));
    let mut sink = ChartCollector::new();

    let report = pipeline.run(&mut sink).unwrap();

    assert_eq!(report.vaccinations, StepOutcome::Skipped);
    assert_eq!(report.choropleth, StepOutcome::Skipped);
    assert_eq!(sink.charts().len(), 5);
    // 01-02 is a third of the way from 01-01 to 01-04
    assert_eq!(
        floats(&report.cleaned, NEW_CASES),
        vec![Some(1.0), Some(2.0), Some(4.0)]
    );
}

#[test]
fn bad_date_aborts_the_run() {
    let body = "\
location,date,total_cases,total_deaths
Kenya,2021-01-01,10,1
Kenya,yesterday,12,1
";
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), body);
    let pipeline = Pipeline::new(config_for(&path, &["Kenya"]));
    let mut sink = ChartCollector::new();

    let err = pipeline.run(&mut sink).unwrap_err();
    assert!(matches!(err, PipelineError::Cleaner(_)));
    assert!(err.to_string().contains("yesterday"));
    assert!(sink.charts().is_empty());
}

#[test]
fn missing_data_file_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config_for(&dir.path().join("absent.csv"), &["Kenya"]));
    let mut sink = ChartCollector::new();

    let err = pipeline.run(&mut sink).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Loader(LoaderError::FileNotFound(_))
    ));
}
