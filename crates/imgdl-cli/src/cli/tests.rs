use super::*;
use std::path::Path;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_download_defaults() {
    match parse(&["imgdl", "download", "urls.txt"]) {
        CliCommand::Download(args) => {
            assert_eq!(args.urls_file, Path::new("urls.txt"));
            assert_eq!(args.output_dir, Path::new("output"));
            assert!(!args.rewrite);
            assert_eq!(args.threads, None);
            assert!(!args.sha256);
            assert!(!args.json);
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_all_flags() {
    match parse(&[
        "imgdl", "download", "urls.txt", "-o", "imgs", "--rewrite", "-j", "3", "--sha256",
        "--json",
    ]) {
        CliCommand::Download(args) => {
            assert_eq!(args.output_dir, Path::new("imgs"));
            assert!(args.rewrite);
            assert_eq!(args.threads, Some(3));
            assert!(args.sha256);
            assert!(args.json);
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_long_options() {
    match parse(&[
        "imgdl",
        "download",
        "list",
        "--output-dir",
        "/tmp/out",
        "--threads",
        "16",
    ]) {
        CliCommand::Download(args) => {
            assert_eq!(args.output_dir, Path::new("/tmp/out"));
            assert_eq!(args.threads, Some(16));
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_requires_file() {
    assert!(Cli::try_parse_from(["imgdl", "download"]).is_err());
}

#[test]
fn cli_parse_download_rejects_non_numeric_threads() {
    assert!(Cli::try_parse_from(["imgdl", "download", "urls.txt", "-j", "many"]).is_err());
}

#[test]
fn cli_parse_check() {
    match parse(&["imgdl", "check", "urls.txt"]) {
        CliCommand::Check { urls_file } => assert_eq!(urls_file, Path::new("urls.txt")),
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_config() {
    assert!(matches!(parse(&["imgdl", "config"]), CliCommand::Config));
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["imgdl", "pause", "1"]).is_err());
}
