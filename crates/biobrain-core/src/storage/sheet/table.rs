use crate::storage::row::RawRow;

/// A worksheet as read in full: a header row and string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn with_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// No data rows. A header alone still counts as empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Index of `name`, adding the column (blank in existing rows) if missing.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Appends a row from `(column, value)` pairs; unknown columns are added.
    pub fn push_row<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut cells = Vec::new();
        for (column, value) in values {
            let idx = self.ensure_column(column);
            if cells.len() <= idx {
                cells.resize(idx + 1, String::new());
            }
            cells[idx] = value;
        }
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    /// Row `index` keyed by header. Blank cells are treated as absent.
    pub fn raw_row(&self, index: usize) -> RawRow {
        let mut raw = RawRow::new();
        if let Some(cells) = self.rows.get(index) {
            for (header, cell) in self.headers.iter().zip(cells) {
                if !cell.trim().is_empty() {
                    raw.set(header.trim(), cell.clone());
                }
            }
        }
        raw
    }
}
