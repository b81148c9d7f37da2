use std::fs;

use fluxnirv_core::config::PipelineConfig;
use fluxnirv_core::error::PipelineError;
use fluxnirv_core::pipeline;

fn site_line(start: &str, end: &str, fields: [&str; 4]) -> String {
    let mut cells = vec!["0"; 44];
    cells[0] = start;
    cells[1] = end;
    cells[17] = fields[0];
    cells[18] = fields[1];
    cells[34] = fields[2];
    cells[43] = fields[3];
    cells.join(",")
}

fn write_fixtures(dir: &std::path::Path) -> PipelineConfig {
    let header = site_line(
        "TIMESTAMP_START",
        "TIMESTAMP_END",
        ["TA", "VPD_PI", "PPFD_IN", "GPP_PI_F"],
    );
    let site_raw = format!(
        "# Site: US-Var\n# Half-hourly tower measurements\n{header}\n{}\n{}\n",
        site_line("201506010000", "201506010030", ["21.5", "1.13", "1650.2", "8.25"]),
        site_line("201506010030", "201506010100", ["-9999", "1.20", "1655.0", "8.40"]),
    );
    let epic_raw = "\
year,month,day,hour,minute,sza,vza,band7,band8
2015,6,1,8,15,41.2,12.9,2.0,8.0
2015,6,1,18,30,40.8,NaN,2.1,8.2
";

    let mut config = PipelineConfig::default();
    config.paths.site_raw = dir.join("site_raw.csv");
    config.paths.epic_raw = dir.join("epic_raw.csv");
    config.paths.clean_site = dir.join("Clean_Site_Data.csv");
    config.paths.clean_epic = dir.join("Clean_EPIC_Data.csv");
    config.paths.dataset = dir.join("dataset.csv");

    fs::write(&config.paths.site_raw, site_raw).expect("write site fixture");
    fs::write(&config.paths.epic_raw, epic_raw).expect("write epic fixture");
    config
}

#[test]
fn end_to_end_produces_one_merged_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixtures(dir.path());

    let summary = pipeline::run(&config).expect("pipeline failed");

    assert_eq!(summary.site.rows_kept, 1);
    assert_eq!(summary.site.dropped_sentinel, 1);
    assert_eq!(summary.epic.rows_kept, 1);
    assert_eq!(summary.epic.dropped_missing, 1);
    assert_eq!(summary.merge.merged_rows, 1);

    let dataset = fs::read_to_string(&config.paths.dataset).expect("read dataset");
    assert_eq!(
        dataset,
        "\
# Site: US-Var
# Half-hourly tower measurements
TIMESTAMP_START,TIMESTAMP_END,TA,VPD_PI,PPFD_IN,NIRV,GPP_PI_F
201506010800,201506010830,21.5,1.13,1650.2,4.8,8.25
"
    );
}

#[test]
fn rerunning_on_unchanged_inputs_is_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixtures(dir.path());

    pipeline::run(&config).expect("first run failed");
    let first = (
        fs::read(&config.paths.clean_site).expect("read clean site"),
        fs::read(&config.paths.clean_epic).expect("read clean epic"),
        fs::read(&config.paths.dataset).expect("read dataset"),
    );

    pipeline::run(&config).expect("second run failed");
    let second = (
        fs::read(&config.paths.clean_site).expect("read clean site"),
        fs::read(&config.paths.clean_epic).expect("read clean epic"),
        fs::read(&config.paths.dataset).expect("read dataset"),
    );

    assert_eq!(first, second);
}

#[test]
fn missing_input_file_aborts_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = write_fixtures(dir.path());
    config.paths.site_raw = dir.path().join("does_not_exist.csv");

    let result = pipeline::run(&config);
    assert!(matches!(result, Err(PipelineError::Io(_))));
}
