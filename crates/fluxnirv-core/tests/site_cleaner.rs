use fluxnirv_core::config::SiteCleanerConfig;
use fluxnirv_core::site_cleaner::clean_site;

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

#[test]
fn keeps_valid_rows_and_shifts_timestamps() {
    let input = site_line(
        "201506030000",
        "201506030030",
        ["21.5", "1.13", "1650.2", "8.25"],
    );
    let mut output = Vec::new();

    let summary = clean_site(input.as_bytes(), &mut output, &SiteCleanerConfig::default())
        .expect("cleaning failed");

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "201506030800,201506030830,21.5,1.13,1650.2,8.25\n"
    );
    assert_eq!(summary.rows_read, 1);
    assert_eq!(summary.rows_kept, 1);
}

#[test]
fn drops_sentinel_and_pre_cutoff_rows() {
    let input = [
        site_line("201506030000", "201506030030", ["21.5", "-9999", "1650.2", "8.25"]),
        site_line("201412312330", "201501010000", ["21.5", "1.13", "1650.2", "8.25"]),
        site_line("201506030100", "201506030130", ["20.9", "1.05", "1432.8", "7.90"]),
    ]
    .join("\n");
    let mut output = Vec::new();

    let summary = clean_site(input.as_bytes(), &mut output, &SiteCleanerConfig::default())
        .expect("cleaning failed");

    // field cells are carried through verbatim, trailing zero included
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "201506030900,201506030930,20.9,1.05,1432.8,7.90\n"
    );
    assert_eq!(summary.dropped_sentinel, 1);
    assert_eq!(summary.dropped_before_cutoff, 1);
    assert_eq!(summary.rows_kept, 1);
}

#[test]
fn header_rows_are_projected_and_comments_pass_through() {
    let header = site_line(
        "TIMESTAMP_START",
        "TIMESTAMP_END",
        ["TA", "VPD_PI", "PPFD_IN", "GPP_PI_F"],
    );
    let input = format!("# Site: US-Var\n{header}\n");
    let mut output = Vec::new();

    let summary = clean_site(input.as_bytes(), &mut output, &SiteCleanerConfig::default())
        .expect("cleaning failed");

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "# Site: US-Var\nTIMESTAMP_START,TIMESTAMP_END,TA,VPD_PI,PPFD_IN,GPP_PI_F\n"
    );
    assert_eq!(summary.passthrough_rows, 2);
    assert_eq!(summary.rows_kept, 0);
}

#[test]
fn corrupt_rows_are_counted_not_emitted() {
    let input = [
        site_line("201506030000", "201506030030", ["21.5", "not-a-number", "1650.2", "8.25"]),
        site_line("201513010000", "201513010030", ["21.5", "1.13", "1650.2", "8.25"]),
    ]
    .join("\n");
    let mut output = Vec::new();

    let summary = clean_site(input.as_bytes(), &mut output, &SiteCleanerConfig::default())
        .expect("cleaning failed");

    assert!(output.is_empty());
    assert_eq!(summary.dropped_invalid, 2);
}

#[test]
fn custom_schema_moves_the_tracked_columns() {
    let config = SiteCleanerConfig {
        schema: fluxnirv_parser::SiteSchema {
            start_col: 0,
            end_col: 1,
            field_cols: [2, 3, 4, 5],
        },
        ..SiteCleanerConfig::default()
    };
    let input = "201506030000,201506030030,1.0,2.0,3.0,4.0\n";
    let mut output = Vec::new();

    let summary = clean_site(input.as_bytes(), &mut output, &config).expect("cleaning failed");

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "201506030800,201506030830,1.0,2.0,3.0,4.0\n"
    );
    assert_eq!(summary.rows_kept, 1);
}
