use arena_config::{Config, load_toml};
use rstest::rstest;

fn parse(s: &str) -> Config {
    load_toml(s).expect("toml parses")
}

#[rstest]
fn full_config_round_trip() {
    let cfg = parse(
        r#"
        [dial]
        ticks_per_revolution = 96
        center_tolerance = 5
        history_len = 7
        line_a = 3
        line_b = 4

        [duel]
        grace_ms = 5000
        line_vibration = 2

        [match]
        runtime_ms = 243000
        poll_ms = 5
        wait_for_start = false

        [logging]
        level = "debug"
        rotation = "daily"
        "#,
    );
    assert!(cfg.validate().is_ok());
    assert!(!cfg.match_cfg.wait_for_start);
    assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
}

#[rstest]
fn match_section_uses_reserved_name() {
    let cfg = parse("[match]\nruntime_ms = 60000\n");
    assert_eq!(cfg.match_cfg.runtime_ms, 60_000);
}

#[rstest]
fn duration_alias_is_accepted() {
    let cfg = parse("[match]\nduration_ms = 90000\n");
    assert_eq!(cfg.match_cfg.runtime_ms, 90_000);
}

#[rstest]
fn pattern_override_parses_and_validates() {
    let cfg = parse(
        "[duel]\npatterns = [\
         [2,5,7,6,0],[4,3,5,8,0],[2,4,7,7,0],[7,1,7,5,0],[5,5,5,5,0],\
         [4,6,7,3,0],[3,7,9,1,0],[1,3,7,9,0],[6,2,4,8,0],[6,8,2,4,0]]\n",
    );
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.duel.patterns.unwrap()[4], [5, 5, 5, 5, 0]);
}

#[rstest]
#[case("[2,5,7,6,1]", "missing its zero sentinel")]
#[case("[0,5,7,6,0]", "non-zero duration")]
#[case("[2,0,7,6,0]", "after the zero sentinel")]
#[case("[2,5,7,7,0]", "must sum to 20")]
fn bad_pattern_rows_are_rejected(#[case] row: &str, #[case] msg: &str) {
    let toml = format!(
        "[duel]\npatterns = [\
         {row},[4,3,5,8,0],[2,4,7,7,0],[7,1,7,5,0],[5,5,5,5,0],\
         [4,6,7,3,0],[3,7,9,1,0],[1,3,7,9,0],[6,2,4,8,0],[6,8,2,4,0]]\n"
    );
    let err = parse(&toml).validate().unwrap_err();
    assert!(err.to_string().contains(msg), "got: {err}");
}

#[rstest]
#[case("[dial]\nticks_per_revolution = 0\n", "ticks_per_revolution")]
#[case("[dial]\ncenter_tolerance = 48\n", "center_tolerance")]
#[case("[dial]\nhistory_len = 0\n", "history_len")]
#[case("[dial]\nhistory_len = 16\n", "history_len")]
#[case("[dial]\nhistory_len = 17\n", "history_len")]
#[case("[dial]\nline_a = 4\n", "must differ")]
#[case("[dial]\nline_a = 99\n", "<= 23")]
#[case("[duel]\nline_vibration = 3\n", "collides")]
#[case("[match]\npoll_ms = 0\n", "poll_ms")]
#[case("[match]\nruntime_ms = 1000\n", "must exceed")]
#[case("[logging]\nlevel = \"loud\"\n", "logging.level")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
fn invalid_configs_are_rejected(#[case] toml: &str, #[case] msg: &str) {
    let err = parse(toml).validate().unwrap_err();
    assert!(err.to_string().contains(msg), "got: {err}");
}

#[rstest]
fn load_file_reports_missing_and_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = arena_config::load_file(&missing).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[dial\n").unwrap();
    assert!(arena_config::load_file(&bad).is_err());

    let good = dir.path().join("good.toml");
    std::fs::write(&good, "[match]\nruntime_ms = 60000\n").unwrap();
    let cfg = arena_config::load_file(&good).unwrap();
    assert_eq!(cfg.match_cfg.runtime_ms, 60_000);
}

#[rstest]
fn unknown_fields_are_tolerated() {
    // Forward compatibility: extra keys parse but are ignored.
    let cfg = load_toml("[dial]\nfuture_knob = 1\n");
    assert!(cfg.is_ok());
}
