//! Minimal A1 notation parser.
//!
//! Supports `Sheet`, `Sheet!A:K`, `Sheet!A2:K5`, `Sheet!A3:K`, single cells
//! (`Sheet!B4`) and quoted sheet names (`'My Sheet'!A:K`). Rows are 1-based,
//! columns 0-based.

use crate::error::ProxyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start_col: usize,
    /// Inclusive; `None` is unbounded.
    pub end_col: Option<usize>,
    pub start_row: Option<usize>,
    /// Inclusive; `None` is unbounded.
    pub end_row: Option<usize>,
}

fn invalid(input: &str) -> ProxyError {
    ProxyError::InvalidPayload(format!("Invalid range '{}'", input))
}

/// `A` -> 0, `K` -> 10, `AA` -> 26.
fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters
        .chars()
        .try_fold(0usize, |acc, c| {
            let c = c.to_ascii_uppercase();
            if !c.is_ascii_uppercase() {
                return None;
            }
            acc.checked_mul(26)?
                .checked_add(c as usize - 'A' as usize + 1)
        })
        .map(|n| n - 1)
}

type Cell = (Option<usize>, Option<usize>);

fn parse_cell(cell: &str) -> Option<Cell> {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    let col = if letters.is_empty() {
        None
    } else {
        Some(column_index(letters)?)
    };
    let row = if digits.is_empty() {
        None
    } else {
        match digits.parse::<usize>().ok()? {
            0 => return None,
            n => Some(n),
        }
    };
    if col.is_none() && row.is_none() {
        return None;
    }
    Some((col, row))
}

fn split_sheet(input: &str) -> Option<(String, Option<&str>)> {
    let Some(quoted) = input.strip_prefix('\'') else {
        return Some(match input.split_once('!') {
            Some((sheet, cells)) => (sheet.to_string(), Some(cells)),
            None => (input.to_string(), None),
        });
    };

    let mut sheet = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '\'' {
            sheet.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, '\''))) {
            sheet.push('\'');
            chars.next();
            continue;
        }
        let rest = &quoted[idx + 1..];
        return match rest.strip_prefix('!') {
            Some(cells) => Some((sheet, Some(cells))),
            None if rest.is_empty() => Some((sheet, None)),
            None => None,
        };
    }
    None
}

impl A1Range {
    pub fn parse(input: &str) -> Result<Self, ProxyError> {
        let trimmed = input.trim();
        let (sheet, cells) = split_sheet(trimmed).ok_or_else(|| invalid(input))?;
        if sheet.is_empty() {
            return Err(invalid(input));
        }

        let Some(cells) = cells else {
            return Ok(Self {
                sheet,
                start_col: 0,
                end_col: None,
                start_row: None,
                end_row: None,
            });
        };

        let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
        let (start_col, start_row) = parse_cell(start).ok_or_else(|| invalid(input))?;
        let (end_col, end_row) = parse_cell(end).ok_or_else(|| invalid(input))?;

        let range = Self {
            sheet,
            start_col: start_col.unwrap_or(0),
            end_col,
            start_row,
            end_row,
        };
        if range.end_col.is_some_and(|end| end < range.start_col)
            || matches!((range.start_row, range.end_row), (Some(s), Some(e)) if e < s)
        {
            return Err(invalid(input));
        }
        Ok(range)
    }

    /// First row touched by a write (1-based).
    pub fn first_row(&self) -> usize {
        self.start_row.unwrap_or(1)
    }
}
