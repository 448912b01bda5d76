//! Utility functions for string handling, artifact naming and file system checks.
//!
//! - String truncation for logging
//! - Whitespace normalization for text pulled out of feeds
//! - Deterministic artifact file names derived from the subject's name
//! - File system validation for the output directory

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and a byte
/// count indicator appended. Cuts always land on a character boundary, which
/// matters for accented Portuguese text.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Collapse runs of whitespace (including non-breaking spaces) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// File name for a subject's word cloud.
///
/// The subject is lowercased and spaces become underscores, so the same
/// subject always maps to the same file.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(cloud_file_name("Arthur Lira"), "nuvem_arthur_lira.png");
/// ```
pub fn cloud_file_name(subject: &str) -> String {
    format!("nuvem_{}.png", subject_slug(subject))
}

/// Lowercased subject safe to use as a file name.
///
/// Alphanumerics (accented letters included), `-` and `_` are kept; spaces,
/// path separators, dots and anything else become `_`, with runs collapsed
/// and trimmed. A subject with nothing usable maps to `sem_nome`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(subject_slug("Arthur Lira"), "arthur_lira");
/// assert_eq!(subject_slug("PT/SP Fulano"), "pt_sp_fulano");
/// assert_eq!(subject_slug("../x"), "x");
/// ```
pub fn subject_slug(subject: &str) -> String {
    let mapped: String = subject
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let slug = mapped
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if slug.is_empty() {
        "sem_nome".to_string()
    } else {
        slug
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let check_path = path.join("..__write_check__");
    match stdfs::File::create(&check_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&check_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let result = truncate_for_log("ação ação", 3);
        assert!(result.starts_with("açã"));
        assert!(result.contains("…(+"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b\u{a0}\u{a0}c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_cloud_file_name() {
        assert_eq!(cloud_file_name("Arthur Lira"), "nuvem_arthur_lira.png");
        assert_eq!(cloud_file_name("João Silva"), "nuvem_joão_silva.png");
        assert_eq!(cloud_file_name("Tabata Amaral"), cloud_file_name("Tabata Amaral"));
    }

    #[test]
    fn test_subject_slug_stays_a_single_file_name() {
        assert_eq!(subject_slug("../x"), "x");
        assert_eq!(subject_slug("PT/SP Fulano"), "pt_sp_fulano");
        assert_eq!(subject_slug("..\\..\\win"), "win");
        assert_eq!(subject_slug("Zé  da Silva."), "zé_da_silva");
        assert_eq!(subject_slug("  ../.. "), "sem_nome");

        let out = Path::new("/tmp/out");
        for subject in ["../../etc/cron.d/x", "PT/SP Fulano", "..", "/abs/path"] {
            let path = out.join(cloud_file_name(subject));
            assert_eq!(path.parent(), Some(out), "{subject} escaped to {}", path.display());
            assert!(!cloud_file_name(subject).contains(".."), "{subject}");
        }
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__write_check__").exists());
    }
}
