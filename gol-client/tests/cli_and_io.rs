use clap::Parser;
use gol_client::cli::Cli;

fn base_args(extra: &[&str]) -> Vec<String> {
    let mut args = vec![
        "gol-client".to_string(),
        "--workers".to_string(),
        "2".to_string(),
        "--worker-addresses".to_string(),
        "127.0.0.1:4000,127.0.0.1:4001".to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    args
}

#[test]
fn validate_accepts_matching_worker_count() {
    let cli = Cli::parse_from(base_args(&[]));
    assert!(cli.validate().is_ok());
}

#[test]
fn validate_rejects_worker_count_mismatch() {
    let cli = Cli::parse_from(vec![
        "gol-client".to_string(),
        "--workers".to_string(),
        "3".to_string(),
        "--worker-addresses".to_string(),
        "127.0.0.1:4000,127.0.0.1:4001".to_string(),
    ]);
    assert!(cli.validate().is_err());
}

#[test]
fn defaults_match_spec_values() {
    let cli = Cli::parse_from(base_args(&[]));
    assert_eq!(cli.width, 512);
    assert_eq!(cli.height, 512);
    assert_eq!(cli.count_interval_ms, 2000);
}
