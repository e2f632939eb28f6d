//! CLI parse tests.

use super::{Cli, UrlSource};
use clap::{CommandFactory, Parser};

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}


#[test]
fn command_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn urls_select_args_source() {
    let cli = parse(&["vdl", "--urls", "https://a", "https://b"]);
    assert_eq!(
        cli.source(),
        UrlSource::Args(vec!["https://a".into(), "https://b".into()])
    );
}

#[test]
fn file_selects_text_source() {
    let cli = parse(&["vdl", "--file", "links.txt"]);
    assert_eq!(cli.source(), UrlSource::TextFile("links.txt".into()));
}

#[test]
fn csv_selects_csv_source() {
    let cli = parse(&["vdl", "--csv", "links.csv"]);
    assert_eq!(cli.source(), UrlSource::CsvFile("links.csv".into()));
}
