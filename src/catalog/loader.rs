//! Delimited-text catalog loader.
//!
//! Header names are trimmed and lower-cased before they are matched
//! against a [`ColumnMap`], so `" Product ID "` and `"product id"` are the
//! same column. Columns not named by the map are ignored.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use super::types::{Dataset, Item, ItemId};
use crate::error::AssortError;

#[derive(Debug)]
pub enum LoadError {
    /// An I/O error occurred while reading the input stream.
    Io(std::io::Error),
    /// The input has no header line.
    EmptyInput,
    /// A required column is absent from the header.
    MissingColumn(String),
    /// A field could not be parsed as a number.
    Parse {
        /// 1-based line number.
        line: usize,
        /// Header name of the offending column.
        column: String,
        /// The raw field text.
        token: String,
    },
    /// A row has fewer fields than the header requires.
    ShortRow {
        /// 1-based line number.
        line: usize,
    },
    /// The parsed rows do not form a valid dataset.
    Dataset(AssortError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::EmptyInput => write!(f, "input has no header line"),
            Self::MissingColumn(c) => write!(f, "missing required column '{c}'"),
            Self::Parse {
                line,
                column,
                token,
            } => write!(
                f,
                "line {line}: could not parse '{token}' in column '{column}' as a number"
            ),
            Self::ShortRow { line } => write!(f, "line {line}: row has too few fields"),
            Self::Dataset(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AssortError> for LoadError {
    fn from(e: AssortError) -> Self {
        Self::Dataset(e)
    }
}

/// Maps the semantic roles of an item to source column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub id: String,
    pub category: String,
    pub cogs: String,
    pub profit: String,
    pub rating: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            id: "product id".into(),
            category: "category".into(),
            cogs: "cogs".into(),
            profit: "profit".into(),
            rating: "rating".into(),
        }
    }
}

impl ColumnMap {
    pub fn with_id(mut self, name: impl Into<String>) -> Self {
        self.id = name.into();
        self
    }

    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.category = name.into();
        self
    }

    pub fn with_cogs(mut self, name: impl Into<String>) -> Self {
        self.cogs = name.into();
        self
    }

    pub fn with_profit(mut self, name: impl Into<String>) -> Self {
        self.profit = name.into();
        self
    }

    pub fn with_rating(mut self, name: impl Into<String>) -> Self {
        self.rating = name.into();
        self
    }
}

/// Column positions resolved from a header line.
struct Layout {
    id: usize,
    category: usize,
    cogs: usize,
    profit: usize,
    rating: usize,
    width: usize,
}

/// Reads a [`Dataset`] from delimited text.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    columns: ColumnMap,
    delimiter: char,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self {
            columns: ColumnMap::default(),
            delimiter: ',',
        }
    }
}

impl CatalogLoader {
    /// Creates a loader for comma-separated input with default column names.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column mapping.
    #[inline]
    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the field delimiter.
    #[inline]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Loads a dataset from a file.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Dataset, LoadError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a dataset from an in-memory string.
    pub fn from_str(&self, text: &str) -> Result<Dataset, LoadError> {
        self.from_bufread(text.as_bytes())
    }

    /// Loads a dataset from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<Dataset, LoadError> {
        let mut lines = rdr.lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err(LoadError::EmptyInput),
            }
        };
        let names: Vec<String> = split_fields(&header, self.delimiter)
            .into_iter()
            .map(|h| normalize(&h))
            .collect();
        let layout = self.resolve(&names)?;

        let mut items = Vec::new();
        for (idx, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let fields = split_fields(&line, self.delimiter);
            if fields.len() < layout.width {
                return Err(LoadError::ShortRow { line: line_no });
            }

            let number = |pos: usize, column: &str| -> Result<f64, LoadError> {
                let token = fields[pos].trim();
                token.parse::<f64>().map_err(|_| LoadError::Parse {
                    line: line_no,
                    column: column.to_string(),
                    token: token.to_string(),
                })
            };

            items.push(Item {
                id: ItemId::from(fields[layout.id].trim()),
                category: fields[layout.category].trim().to_string(),
                cogs: number(layout.cogs, &self.columns.cogs)?,
                profit: number(layout.profit, &self.columns.profit)?,
                rating: number(layout.rating, &self.columns.rating)?,
            });
        }

        tracing::debug!(rows = items.len(), "catalog parsed");
        Ok(Dataset::new(items)?)
    }

    fn resolve(&self, names: &[String]) -> Result<Layout, LoadError> {
        let find = |wanted: &str| -> Result<usize, LoadError> {
            let wanted = normalize(wanted);
            names
                .iter()
                .position(|n| *n == wanted)
                .ok_or(LoadError::MissingColumn(wanted))
        };
        let id = find(&self.columns.id)?;
        let category = find(&self.columns.category)?;
        let cogs = find(&self.columns.cogs)?;
        let profit = find(&self.columns.profit)?;
        let rating = find(&self.columns.rating)?;
        let width = [id, category, cogs, profit, rating]
            .into_iter()
            .max()
            .map_or(0, |m| m + 1);
        Ok(Layout {
            id,
            category,
            cogs,
            profit,
            rating,
            width,
        })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Splits one line into fields, honoring double quotes (`""` escapes a quote).
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' {
            quoted = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}
