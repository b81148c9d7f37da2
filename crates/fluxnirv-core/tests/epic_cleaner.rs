use fluxnirv_core::config::EpicCleanerConfig;
use fluxnirv_core::epic_cleaner::clean_epic;

#[test]
fn replaces_header_and_computes_index() {
    let input = "\
year,month,day,hour,minute,sza,vza,band7,band8
2015,6,1,8,5,41.2,12.9,2.0,8.0
";
    let mut output = Vec::new();

    let summary = clean_epic(input.as_bytes(), &mut output, &EpicCleanerConfig::default())
        .expect("cleaning failed");

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "TIMESTAMP,NIRV\n201506010805,4.8\n"
    );
    assert_eq!(summary.header_rows, 1);
    assert_eq!(summary.rows_kept, 1);
}

#[test]
fn missing_marker_anywhere_discards_the_row() {
    let input = "\
2015,6,1,8,5,41.2,12.9,NaN,8.0
2015,6,1,18,30,NaN,12.9,2.0,8.0
2015,6,2,8,5,40.8,13.1,2.0,8.0
";
    let mut output = Vec::new();

    let summary = clean_epic(input.as_bytes(), &mut output, &EpicCleanerConfig::default())
        .expect("cleaning failed");

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "201506020805,4.8\n"
    );
    assert_eq!(summary.dropped_missing, 2);
    assert_eq!(summary.rows_kept, 1);
}

#[test]
fn zero_band_sum_rows_are_dropped() {
    let input = "2015,6,1,8,5,41.2,12.9,-1.5,1.5\n";
    let mut output = Vec::new();

    let summary = clean_epic(input.as_bytes(), &mut output, &EpicCleanerConfig::default())
        .expect("cleaning failed");

    assert!(output.is_empty());
    assert_eq!(summary.dropped_degenerate, 1);
}
