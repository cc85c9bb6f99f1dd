//! CLI integration tests for input loading

use std::io::Write;

use tempfile::NamedTempFile;

use crate::cli::InputArgs;
use crate::commands::load_inputs;

fn write_temp(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

fn args(ledger: &NamedTempFile) -> InputArgs {
    InputArgs {
        ledger: ledger.path().to_path_buf(),
        budgets: None,
        goals: None,
        subscriptions: None,
        config: None,
        date: Some("2025-06-15".parse().unwrap()),
    }
}

#[test]
fn test_load_csv_ledger() {
    let ledger = write_temp(
        "date,description,amount,type,category\n\
         2025-06-01,NETFLIX.COM,15.99,expense,Entertainment\n\
         2025-06-02,PAYROLL,2500.00,income,Salary\n",
        ".csv",
    );

    let (ctx, _engine) = load_inputs(&args(&ledger)).unwrap();
    assert_eq!(ctx.transactions.len(), 2);
    assert_eq!(ctx.today, "2025-06-15".parse().unwrap());
}

#[test]
fn test_load_json_ledger_with_subscriptions() {
    let ledger = write_temp(
        r#"[{"id": "a", "date": "2025-06-01", "amount": 9.99,
             "kind": "expense", "category": "Music", "description": "SPOTIFY"}]"#,
        ".json",
    );
    let subs = write_temp(
        r#"[{"name": "Spotify", "price": 9.99, "cycle": "monthly",
             "is_trial": false, "is_active": true}]"#,
        ".json",
    );

    let mut input = args(&ledger);
    input.subscriptions = Some(subs.path().to_path_buf());

    let (ctx, _engine) = load_inputs(&input).unwrap();
    assert_eq!(ctx.transactions.len(), 1);
    assert_eq!(ctx.subscriptions.len(), 1);
}

#[test]
fn test_config_override_applies() {
    let ledger = write_temp("date,description,amount\n2025-06-01,X,-5.0\n", ".csv");
    let config = write_temp("confidence_cutoff = 75.0\n", ".toml");

    let mut input = args(&ledger);
    input.config = Some(config.path().to_path_buf());

    let (_ctx, engine) = load_inputs(&input).unwrap();
    assert_eq!(engine.config().confidence_cutoff, 75.0);
}

#[test]
fn test_missing_ledger_is_an_error() {
    let input = InputArgs {
        ledger: "/nonexistent/ledger.csv".into(),
        budgets: None,
        goals: None,
        subscriptions: None,
        config: None,
        date: None,
    };
    assert!(load_inputs(&input).is_err());
}

#[test]
fn test_invalid_config_rejected() {
    let ledger = write_temp("date,description,amount\n2025-06-01,X,-5.0\n", ".csv");
    let config = write_temp("min_occurrences = 1\n", ".toml");

    let mut input = args(&ledger);
    input.config = Some(config.path().to_path_buf());

    assert!(load_inputs(&input).is_err());
}

#[test]
fn test_analysis_runs_end_to_end_from_files() {
    let ledger = write_temp(
        "date,description,amount,type,category\n\
         2025-03-01,NETFLIX.COM,15.99,expense,Entertainment\n\
         2025-04-01,NETFLIX.COM,15.99,expense,Entertainment\n\
         2025-05-01,NETFLIX.COM,15.99,expense,Entertainment\n\
         2025-06-01,NETFLIX.COM,15.99,expense,Entertainment\n",
        ".csv",
    );

    let (ctx, engine) = load_inputs(&args(&ledger)).unwrap();
    let report = engine.analyze(&ctx);

    assert_eq!(report.recurring.len(), 1);
    assert_eq!(
        report.recurring[0].next_date,
        "2025-07-01".parse::<chrono::NaiveDate>().unwrap()
    );
}
