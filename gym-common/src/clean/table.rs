//! Loosely-typed tabular batch used by the cleaning rules

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Text(String),
    Int(i64),
    Decimal(Decimal),
    Date(NaiveDate),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            Value::Int(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Missing values are `None`, never a sentinel string
pub type Cell = Option<Value>;

/// Header-named rows; every row has exactly `headers.len()` cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of `row` in column `name`; `None` when the column is absent
    pub fn get<'a>(&self, row: &'a [Cell], name: &str) -> Option<&'a Value> {
        self.column_index(name).and_then(|idx| row.get(idx)).and_then(|c| c.as_ref())
    }

    /// All non-null values of a column
    pub fn column_values(&self, name: &str) -> Vec<Value> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().filter_map(|r| r[idx].clone()).collect(),
            None => Vec::new(),
        }
    }

    /// Apply `f` to every cell of a column (no-op when the column is absent)
    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(Cell) -> Cell,
    {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                let cell = row[idx].take();
                row[idx] = f(cell);
            }
        }
    }

    /// Render the first `n` rows as aligned text for console previews
    pub fn preview(&self, n: usize) -> String {
        let shown: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(n)
            .map(|row| {
                row.iter()
                    .map(|c| c.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "NULL".into()))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &shown {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        let format_line = |cells: &[String]| {
            cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:width$}", c, width = widths[i]))
                .collect::<Vec<_>>()
                .join("  ")
        };

        let mut out = format_line(&self.headers);
        for row in &shown {
            out.push('\n');
            out.push_str(&format_line(row));
        }
        out
    }
}
