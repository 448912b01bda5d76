//! Legislator roster loading and record selection.
//!
//! A roster is any table with a column naming the legislators. The column is
//! located by header, preferring `"Nome Parlamentar"` over `"Nome"`
//! (case-insensitive). Everything else in the row is carried along untouched.
//!
//! Supported inputs:
//!
//! | Extension | Reader |
//! |-----------|--------|
//! | `.csv` | `csv`, delimiter sniffed (`,` or `;`), UTF-8 or Latin-1 |
//! | `.xls`, `.xlsx`, `.ods` | `calamine`, first worksheet |
//!
//! Selection is a case-insensitive substring match over the name column; it
//! never guesses between several matches.

use crate::cache::Memo;
use crate::error::{BoxedSource, RosterError};
use calamine::{open_workbook_auto, Data, Reader};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Header labels accepted for the name column, in priority order.
pub const NAME_COLUMN_LABELS: [&str; 2] = ["nome parlamentar", "nome"];

/// Maximum number of candidates shown when a query is ambiguous.
pub const CANDIDATE_LIMIT: usize = 10;

static ROSTERS: Lazy<Memo<PathBuf, Roster>> = Lazy::new(|| Memo::new("roster"));

/// One roster line: the legislator's name plus the row's other cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub name: String,
    pub cells: Vec<String>,
}

/// A parsed roster. Read-only once built.
#[derive(Debug, Clone)]
pub struct Roster {
    headers: Vec<String>,
    name_column: usize,
    rows: Vec<RosterRow>,
}

/// Outcome of looking a query up in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    NotFound,
    /// Exactly one row matched; holds its name value unchanged.
    Unique(String),
    /// Several rows matched. `candidates` holds at most [`CANDIDATE_LIMIT`]
    /// names in roster order; `total` is the full match count.
    Ambiguous { candidates: Vec<String>, total: usize },
}

/// Pick the name column from a header row.
///
/// The first header equal (case-insensitively, ignoring surrounding spaces) to
/// the highest-priority label wins; lower-priority labels are only consulted
/// when no header matches a higher one.
pub fn resolve_name_column(headers: &[String]) -> Result<usize, RosterError> {
    NAME_COLUMN_LABELS
        .iter()
        .find_map(|label| {
            headers
                .iter()
                .position(|h| h.trim().to_lowercase() == *label)
        })
        .ok_or_else(|| RosterError::NoNameColumn {
            available: headers.to_vec(),
        })
}

impl Roster {
    /// Build a roster from a header row and data rows.
    ///
    /// Rows whose name cell is blank are dropped.
    pub fn from_table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, RosterError> {
        let name_column = resolve_name_column(&headers)?;
        let rows = rows
            .into_iter()
            .filter_map(|cells| {
                let name = cells.get(name_column)?.trim().to_string();
                (!name.is_empty()).then_some(RosterRow { name, cells })
            })
            .collect();

        Ok(Self {
            headers,
            name_column,
            rows,
        })
    }

    /// Parse a roster file, dispatching on its extension.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let (headers, rows) = match extension.as_str() {
            "csv" => read_csv(path)?,
            "xls" | "xlsx" | "xlsm" | "ods" => read_workbook(path)?,
            _ => {
                return Err(RosterError::UnsupportedFileType {
                    path: path.to_path_buf(),
                });
            }
        };

        let roster = Self::from_table(headers, rows)?;
        info!(
            rows = roster.len(),
            column = %roster.name_column(),
            "Roster loaded"
        );
        Ok(roster)
    }

    /// Like [`Roster::load`], but parses each path at most once per process.
    pub fn load_cached(path: &Path) -> Result<Arc<Self>, RosterError> {
        ROSTERS.get_or_try_init(&path.to_path_buf(), || Self::load(path))
    }

    /// Forget every cached roster parse.
    pub fn reset_cache() {
        ROSTERS.reset();
    }

    /// Header of the column used for names, as written in the file.
    pub fn name_column(&self) -> &str {
        &self.headers[self.name_column]
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RosterRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look `query` up as a case-insensitive substring of the name column.
    ///
    /// # Errors
    ///
    /// [`RosterError::EmptyQuery`] when the query is blank.
    pub fn select(&self, query: &str) -> Result<Selection, RosterError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(RosterError::EmptyQuery);
        }

        let matches: Vec<&RosterRow> = self
            .rows
            .iter()
            .filter(|row| row.name.to_lowercase().contains(&needle))
            .collect();
        debug!(query = %needle, matches = matches.len(), "Roster lookup");

        Ok(match matches.as_slice() {
            [] => Selection::NotFound,
            [only] => Selection::Unique(only.name.clone()),
            many => Selection::Ambiguous {
                candidates: many
                    .iter()
                    .take(CANDIDATE_LIMIT)
                    .map(|row| row.name.clone())
                    .collect(),
                total: many.len(),
            },
        })
    }
}

fn read_error(path: &Path, e: impl Into<BoxedSource>) -> RosterError {
    RosterError::Read {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

/// Decode file bytes as UTF-8, falling back to Latin-1 (common in Brazilian
/// government exports).
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// `;` when the header line has more semicolons than commas, `,` otherwise.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), RosterError> {
    let bytes = std::fs::read(path).map_err(|e| read_error(path, e))?;
    let text = decode_text(bytes);
    let delimiter = sniff_delimiter(&text);
    debug!(delimiter = %(delimiter as char), "Reading CSV roster");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| read_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(RosterError::NoHeader {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| read_error(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn read_workbook(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), RosterError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| read_error(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RosterError::NoHeader {
            path: path.to_path_buf(),
        })?
        .map_err(|e| read_error(path, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| RosterError::NoHeader {
            path: path.to_path_buf(),
        })?
        .iter()
        .map(cell_text)
        .collect();

    let rows = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok((headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn roster(names: &[&str]) -> Roster {
        let rows = names
            .iter()
            .map(|n| vec![n.to_string(), "PP".to_string()])
            .collect();
        Roster::from_table(headers(&["Nome", "Partido"]), rows).unwrap()
    }

    #[test]
    fn test_resolve_any_casing() {
        for label in ["Nome", "NOME", "nome", "Nome Parlamentar", "NOME PARLAMENTAR"] {
            let h = headers(&["Partido", label, "UF"]);
            assert_eq!(resolve_name_column(&h).unwrap(), 1, "label {label}");
        }
    }

    #[test]
    fn test_resolve_prefers_nome_parlamentar() {
        let h = headers(&["Nome", "Partido", "Nome Parlamentar"]);
        assert_eq!(resolve_name_column(&h).unwrap(), 2);
    }

    #[test]
    fn test_resolve_ignores_partial_labels() {
        let h = headers(&["Nome Civil", "Nome do Partido"]);
        match resolve_name_column(&h) {
            Err(RosterError::NoNameColumn { available }) => {
                assert_eq!(available, h);
            }
            other => panic!("expected NoNameColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_select_unique_returns_name_unchanged() {
        let r = roster(&["Arthur Lira", "Tabata Amaral", "Kim Kataguiri"]);
        assert_eq!(
            r.select("LIRA").unwrap(),
            Selection::Unique("Arthur Lira".to_string())
        );
        assert_eq!(
            r.select("  tabata ").unwrap(),
            Selection::Unique("Tabata Amaral".to_string())
        );
    }

    #[test]
    fn test_select_not_found_leaves_roster_alone() {
        let r = roster(&["Arthur Lira", "Tabata Amaral"]);
        let before = r.rows().to_vec();
        assert_eq!(r.select("Zé Ninguém").unwrap(), Selection::NotFound);
        assert_eq!(r.rows(), before.as_slice());
    }

    #[test]
    fn test_select_ambiguous_is_capped() {
        let names: Vec<String> = (0..15).map(|i| format!("Maria Deputada {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let r = roster(&refs);

        match r.select("maria").unwrap() {
            Selection::Ambiguous { candidates, total } => {
                assert_eq!(candidates.len(), CANDIDATE_LIMIT);
                assert_eq!(total, 15);
                assert_eq!(candidates[0], "Maria Deputada 0");
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_select_ambiguous_small_set() {
        let r = roster(&["José Silva", "Joselito Souza", "Ana Paula"]);
        assert_eq!(
            r.select("jos").unwrap(),
            Selection::Ambiguous {
                candidates: vec!["José Silva".to_string(), "Joselito Souza".to_string()],
                total: 2,
            }
        );
    }

    #[test]
    fn test_select_empty_query() {
        let r = roster(&["Arthur Lira"]);
        assert!(matches!(r.select("   "), Err(RosterError::EmptyQuery)));
    }

    #[test]
    fn test_blank_names_are_dropped() {
        let r = roster(&["Arthur Lira", "  ", ""]);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_load_csv_semicolon_delimited() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Nome Parlamentar;Partido;UF").unwrap();
        writeln!(file, "Arthur Lira;PP;AL").unwrap();
        writeln!(file, "Tabata Amaral;PSB;SP").unwrap();
        file.flush().unwrap();

        let r = Roster::load(file.path()).unwrap();
        assert_eq!(r.name_column(), "Nome Parlamentar");
        assert_eq!(r.len(), 2);
        assert_eq!(r.rows()[1].cells, vec!["Tabata Amaral", "PSB", "SP"]);
    }

    #[test]
    fn test_load_csv_latin1() {
        let mut file = tempfile::Builder::new().suffix(".CSV").tempfile().unwrap();
        // "Nome,UF\nJoão,SP\n" in Latin-1
        file.write_all(b"Nome,UF\nJo\xe3o,SP\n").unwrap();
        file.flush().unwrap();

        let r = Roster::load(file.path()).unwrap();
        assert_eq!(r.select("joão").unwrap(), Selection::Unique("João".to_string()));
    }

    #[test]
    fn test_load_csv_without_name_column() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Deputado,UF").unwrap();
        writeln!(file, "Arthur Lira,AL").unwrap();
        file.flush().unwrap();

        let err = Roster::load(file.path()).unwrap_err();
        assert!(matches!(err, RosterError::NoNameColumn { .. }));
        assert!(err.to_string().contains("Deputado"));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            Roster::load(file.path()),
            Err(RosterError::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn test_load_cached_parses_once() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Nome").unwrap();
        writeln!(file, "Arthur Lira").unwrap();
        file.flush().unwrap();

        let a = Roster::load_cached(file.path()).unwrap();
        let b = Roster::load_cached(file.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        Roster::reset_cache();
        let c = Roster::load_cached(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.len(), 1);
    }

    fn write_xlsx(path: &Path) {
        use rust_xlsxwriter::Workbook;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, label) in ["Nome", "Nome Parlamentar", "Identificador", "UF"].iter().enumerate() {
            sheet.write_string(0, col as u16, *label).unwrap();
        }
        let rows = [
            ("ARTHUR LIRA", "Arthur Lira", 160541.0, "AL"),
            ("TABATA AMARAL", "Tabata Amaral", 204554.0, "SP"),
            ("", "", 1.0, "DF"),
        ];
        for (i, (civil, parlamentar, id, uf)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, *civil).unwrap();
            sheet.write_string(row, 1, *parlamentar).unwrap();
            sheet.write_number(row, 2, *id).unwrap();
            sheet.write_string(row, 3, *uf).unwrap();
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_load_xlsx_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deputado.xlsx");
        write_xlsx(&path);

        let r = Roster::load(&path).unwrap();
        assert_eq!(r.headers(), ["Nome", "Nome Parlamentar", "Identificador", "UF"]);
        assert_eq!(r.name_column(), "Nome Parlamentar");
        assert_eq!(r.len(), 2);
        assert_eq!(r.rows()[1].name, "Tabata Amaral");
        assert_eq!(r.rows()[1].cells[2], "204554");
        assert_eq!(
            r.select("tabata").unwrap(),
            Selection::Unique("Tabata Amaral".to_string())
        );
    }

    #[test]
    fn test_load_xlsx_uppercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DEPUTADOS.XLSX");
        write_xlsx(&path);
        assert_eq!(Roster::load(&path).unwrap().name_column(), "Nome Parlamentar");
    }

    #[test]
    fn test_corrupt_workbook_is_read_error() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"not a zip archive").unwrap();
        file.flush().unwrap();
        assert!(matches!(Roster::load(file.path()), Err(RosterError::Read { .. })));
    }

    #[test]
    fn test_cell_text_integral_float() {
        assert_eq!(cell_text(&Data::Float(204554.0)), "204554");
        assert_eq!(cell_text(&Data::String("Lira".into())), "Lira");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
