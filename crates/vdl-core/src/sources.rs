//! URL sources: command-line list, plain text file, or first CSV column.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: unterminated quote", .path.display())]
    UnterminatedQuote { path: PathBuf, line: usize },
}

fn read(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// URLs given directly; surrounding whitespace trimmed, empty entries dropped.
pub fn from_args(urls: &[String]) -> Vec<String> {
    urls.iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// One URL per line; blank lines and lines starting with `#` are skipped.
pub fn parse_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn from_text_file(path: &Path) -> Result<Vec<String>, SourceError> {
    Ok(parse_text(&read(path)?))
}

/// First field of one CSV record. Quoted fields may contain commas and `""` escapes.
/// Returns `None` for an unterminated quote.
fn first_field(line: &str) -> Option<String> {
    let s = line.trim_start();
    let Some(rest) = s.strip_prefix('"') else {
        let end = s.find(',').unwrap_or(s.len());
        return Some(s[..end].trim().to_string());
    };
    let mut out = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                out.push('"');
            } else {
                return Some(out.trim().to_string());
            }
        } else {
            out.push(c);
        }
    }
    None
}

/// First column of each row; rows whose first cell is empty are skipped.
/// Records spanning several lines are not supported.
pub fn parse_csv(path: &Path, text: &str) -> Result<Vec<String>, SourceError> {
    let mut urls = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let field = first_field(line).ok_or_else(|| SourceError::UnterminatedQuote {
            path: path.to_path_buf(),
            line: i + 1,
        })?;
        if !field.is_empty() {
            urls.push(field);
        }
    }
    Ok(urls)
}

pub fn from_csv_file(path: &Path) -> Result<Vec<String>, SourceError> {
    let text = read(path)?;
    parse_csv(path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn args_are_trimmed() {
        let urls = from_args(&[" https://a ".into(), "".into(), "https://b".into()]);
        assert_eq!(urls, vec!["https://a", "https://b"]);
    }

    #[test]
    fn text_skips_blanks_and_comments() {
        let text = "# my list\nhttps://a\n\n   \n  https://b  \n#https://c\n";
        assert_eq!(parse_text(text), vec!["https://a", "https://b"]);
    }

    #[test]
    fn csv_first_column() {
        let text = "https://a,First title\n\"https://b?x=1,2\",\"Second, with comma\"\n,orphan\n\nhttps://c\r\n";
        let urls = parse_csv(Path::new("l.csv"), text).unwrap();
        assert_eq!(urls, vec!["https://a", "https://b?x=1,2", "https://c"]);
    }

    #[test]
    fn csv_escaped_quotes_and_bad_rows() {
        assert_eq!(first_field(r#""say ""hi""",x"#).as_deref(), Some(r#"say "hi""#));
        let err = parse_csv(Path::new("l.csv"), "https://a\n\"broken,row\n").unwrap_err();
        assert!(matches!(err, SourceError::UnterminatedQuote { line: 2, .. }));
    }

    #[test]
    fn files_are_read() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("links.txt");
        std::fs::write(&txt, "https://a\n# skip\nhttps://b\n").unwrap();
        assert_eq!(from_text_file(&txt).unwrap().len(), 2);
        let csv = dir.path().join("links.csv");
        std::fs::write(&csv, "https://a,t\n").unwrap();
        assert_eq!(from_csv_file(&csv).unwrap(), vec!["https://a"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = from_text_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }
}
