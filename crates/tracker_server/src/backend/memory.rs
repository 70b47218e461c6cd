//! In-process spreadsheet store for development and tests.

use super::range::A1Range;
use crate::error::ProxyError;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemorySpreadsheet {
    title: String,
    sheets: BTreeMap<String, Vec<Vec<String>>>,
    writers: Vec<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    spreadsheets: BTreeMap<String, MemorySpreadsheet>,
    next_id: u64,
}

/// Spreadsheets held in memory.
///
/// Spreadsheets and sheets spring into existence on first write; reading an
/// unknown sheet yields no rows. Values follow the Sheets API shape: trailing
/// empty cells and trailing empty rows are not returned.
#[derive(Debug, Default)]
pub struct MemorySheets {
    state: Mutex<MemoryState>,
}

fn write_cells(row: &mut Vec<String>, start_col: usize, cells: Vec<String>) {
    let needed = start_col + cells.len();
    if row.len() < needed {
        row.resize(needed, String::new());
    }
    for (offset, cell) in cells.into_iter().enumerate() {
        row[start_col + offset] = cell;
    }
}

fn select(rows: &[Vec<String>], range: &A1Range) -> Vec<Vec<String>> {
    let first = range.first_row() - 1;
    let last = range.end_row.unwrap_or(rows.len()).min(rows.len());
    if first >= last {
        return Vec::new();
    }

    let mut selected: Vec<Vec<String>> = rows[first..last]
        .iter()
        .map(|row| {
            let end = range
                .end_col
                .map(|end| end + 1)
                .unwrap_or(row.len())
                .min(row.len());
            let mut cells: Vec<String> = row
                .get(range.start_col..end)
                .map(<[String]>::to_vec)
                .unwrap_or_default();
            while cells.last().is_some_and(String::is_empty) {
                cells.pop();
            }
            cells
        })
        .collect();
    while selected.last().is_some_and(Vec::is_empty) {
        selected.pop();
    }
    selected
}

fn a1_column(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn updated_range(sheet: &str, start_col: usize, first_row: usize, rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
    let last_row = first_row + rows.len().max(1) - 1;
    format!(
        "{}!{}{}:{}{}",
        sheet,
        a1_column(start_col),
        first_row,
        a1_column(start_col + width - 1),
        last_row
    )
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, ProxyError> {
        self.state
            .lock()
            .map_err(|_| ProxyError::Backend("memory backend lock poisoned".to_string()))
    }

    pub fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, ProxyError> {
        let range = A1Range::parse(range)?;
        let state = self.lock()?;
        Ok(state
            .spreadsheets
            .get(spreadsheet_id)
            .and_then(|spreadsheet| spreadsheet.sheets.get(&range.sheet))
            .map(|rows| select(rows, &range))
            .unwrap_or_default())
    }

    /// Append `rows` after the last row of the sheet.
    pub fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<Value, ProxyError> {
        let range = A1Range::parse(range)?;
        let mut state = self.lock()?;
        let sheet = state
            .spreadsheets
            .entry(spreadsheet_id.to_string())
            .or_default()
            .sheets
            .entry(range.sheet.clone())
            .or_default();

        let first_row = sheet.len() + 1;
        let updated = updated_range(&range.sheet, range.start_col, first_row, &rows);
        let count = rows.len();
        for cells in rows {
            let mut row = Vec::new();
            write_cells(&mut row, range.start_col, cells);
            sheet.push(row);
        }
        Ok(json!({
            "spreadsheetId": spreadsheet_id,
            "updates": {
                "updatedRange": updated,
                "updatedRows": count,
            }
        }))
    }

    /// Overwrite cells starting at the range's top-left corner.
    pub fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<Value, ProxyError> {
        let range = A1Range::parse(range)?;
        let mut state = self.lock()?;
        let sheet = state
            .spreadsheets
            .entry(spreadsheet_id.to_string())
            .or_default()
            .sheets
            .entry(range.sheet.clone())
            .or_default();

        let first_row = range.first_row();
        let updated = updated_range(&range.sheet, range.start_col, first_row, &rows);
        let count = rows.len();
        let cell_count: usize = rows.iter().map(Vec::len).sum();
        let needed = first_row - 1 + count;
        if sheet.len() < needed {
            sheet.resize(needed, Vec::new());
        }
        for (offset, cells) in rows.into_iter().enumerate() {
            write_cells(&mut sheet[first_row - 1 + offset], range.start_col, cells);
        }
        Ok(json!({
            "spreadsheetId": spreadsheet_id,
            "updatedRange": updated,
            "updatedRows": count,
            "updatedCells": cell_count,
        }))
    }

    /// Create an empty spreadsheet with one sheet; returns its id.
    pub fn create_spreadsheet(&self, title: &str, sheet_name: &str) -> Result<String, ProxyError> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let id = format!("mem-{:06}", state.next_id);
        state.spreadsheets.insert(
            id.clone(),
            MemorySpreadsheet {
                title: title.to_string(),
                sheets: BTreeMap::from([(sheet_name.to_string(), Vec::new())]),
                writers: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn share_with(&self, spreadsheet_id: &str, emails: &[String]) -> Result<(), ProxyError> {
        if let Some(bad) = emails.iter().find(|email| !email.contains('@')) {
            return Err(ProxyError::Upstream {
                status: 400,
                message: format!("Invalid email address '{}'", bad),
            });
        }
        let mut state = self.lock()?;
        let spreadsheet = state
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| ProxyError::Upstream {
                status: 404,
                message: format!("File not found: {}", spreadsheet_id),
            })?;
        for email in emails {
            if !spreadsheet.writers.contains(email) {
                spreadsheet.writers.push(email.clone());
            }
        }
        Ok(())
    }

    /// Snapshot of every stored row of a sheet.
    pub fn rows(&self, spreadsheet_id: &str, sheet_name: &str) -> Vec<Vec<String>> {
        self.lock()
            .ok()
            .and_then(|state| {
                state
                    .spreadsheets
                    .get(spreadsheet_id)
                    .and_then(|spreadsheet| spreadsheet.sheets.get(sheet_name))
                    .cloned()
            })
            .unwrap_or_default()
    }

    pub fn title(&self, spreadsheet_id: &str) -> Option<String> {
        let state = self.lock().ok()?;
        state
            .spreadsheets
            .get(spreadsheet_id)
            .map(|spreadsheet| spreadsheet.title.clone())
    }

    pub fn writers(&self, spreadsheet_id: &str) -> Vec<String> {
        self.lock()
            .ok()
            .and_then(|state| {
                state
                    .spreadsheets
                    .get(spreadsheet_id)
                    .map(|spreadsheet| spreadsheet.writers.clone())
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::MemorySheets;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn reads_of_unknown_sheets_are_empty() {
        let sheets = MemorySheets::new();
        assert!(sheets.get_values("nope", "Creative_Tracker!A:K").expect("read").is_empty());
    }

    #[test]
    fn append_creates_sheet_and_reports_range() {
        let sheets = MemorySheets::new();
        let data = sheets
            .append_values("s1", "Tab!A:K", vec![row(&["a", "b"]), row(&["c"])])
            .expect("append");
        assert_eq!(data["updates"]["updatedRange"], "Tab!A1:B2");
        assert_eq!(data["updates"]["updatedRows"], 2);

        sheets
            .append_values("s1", "Tab!A:K", vec![row(&["d"])])
            .expect("append");
        assert_eq!(sheets.rows("s1", "Tab").len(), 3);
    }

    #[test]
    fn update_overwrites_in_place_and_pads_gaps() {
        let sheets = MemorySheets::new();
        sheets
            .update_values("s1", "Tab!A3:K3", vec![row(&["x", "y"])])
            .expect("update");
        let rows = sheets.rows("s1", "Tab");
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_empty());
        assert_eq!(rows[2], row(&["x", "y"]));

        sheets
            .update_values("s1", "Tab!B3", vec![row(&["z"])])
            .expect("update");
        assert_eq!(sheets.rows("s1", "Tab")[2], row(&["x", "z"]));
    }

    #[test]
    fn column_and_row_windows_trim_trailing_blanks() {
        let sheets = MemorySheets::new();
        sheets
            .append_values(
                "s1",
                "Tab!A:K",
                vec![row(&["ID", "Persona"]), row(&["P3-TOFU-001", "P3"]), row(&["", ""])],
            )
            .expect("append");

        let ids = sheets.get_values("s1", "Tab!A:A").expect("read");
        assert_eq!(ids, vec![row(&["ID"]), row(&["P3-TOFU-001"])]);

        let body = sheets.get_values("s1", "Tab!A2:K").expect("read");
        assert_eq!(body, vec![row(&["P3-TOFU-001", "P3"])]);

        let personas = sheets.get_values("s1", "Tab!B1:B1").expect("read");
        assert_eq!(personas, vec![row(&["Persona"])]);
    }

    #[test]
    fn created_spreadsheets_get_sequential_ids() {
        let sheets = MemorySheets::new();
        let first = sheets.create_spreadsheet("Uno", "Creative_Tracker").expect("create");
        let second = sheets.create_spreadsheet("Dos", "Creative_Tracker").expect("create");
        assert_eq!(first, "mem-000001");
        assert_eq!(second, "mem-000002");
        assert_eq!(sheets.title(&first).as_deref(), Some("Uno"));
    }

    #[test]
    fn share_validates_addresses_and_target() {
        let sheets = MemorySheets::new();
        let id = sheets.create_spreadsheet("Uno", "Creative_Tracker").expect("create");

        let emails = vec!["ana@example.com".to_string(), "ana@example.com".to_string()];
        sheets.share_with(&id, &emails).expect("share");
        assert_eq!(sheets.writers(&id), vec!["ana@example.com".to_string()]);

        assert!(sheets.share_with(&id, &["nope".to_string()]).is_err());
        assert!(sheets.share_with("missing", &emails).is_err());
    }
}
