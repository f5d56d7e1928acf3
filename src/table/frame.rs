use crate::*;

/// Frame is an ordered set of named columns over rows of [`Value`]s.
///
/// It is both the batch handed to [`Table::ingest`] and the result of
/// [`Table::query`]. Every row holds exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a frame from loosely shaped records.
    ///
    /// Columns are the union of every record's keys in first-seen order;
    /// cells a record does not mention are NULL.
    pub fn from_records<R, S>(records: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut frame = Self::default();
        for record in records {
            let mut row = vec![Value::Null; frame.columns.len()];
            for (column, value) in record {
                let column = column.into();
                match frame.columns.iter().position(|c| *c == column) {
                    Some(i) => row[i] = value,
                    None => {
                        frame.columns.push(column);
                        frame.rows.iter_mut().for_each(|r| r.push(Value::Null));
                        row.push(value);
                    }
                }
            }
            frame.rows.push(row);
        }
        frame
    }

    /// Appends a row; it must match the column count.
    pub fn push(&mut self, row: Vec<Value>) -> Result<()> {
        match row.len() == self.columns.len() {
            true => Ok(self.rows.push(row)),
            false => Err(Error::Validation(format!(
                "row has {} values for {} columns",
                row.len(),
                self.columns.len()
            ))),
        }
    }

    /// Builder form of [`Frame::push`].
    pub fn with(mut self, row: impl IntoIterator<Item = Value>) -> Result<Self> {
        self.push(row.into_iter().collect())?;
        Ok(self)
    }

    /// Sets `column` to `value` on every row, adding the column if absent.
    pub fn assign(&mut self, column: &str, value: Value) {
        match self.position(column) {
            Some(i) => self.rows.iter_mut().for_each(|r| r[i] = value.clone()),
            None => {
                self.columns.push(column.to_owned());
                self.rows.iter_mut().for_each(|r| r.push(value.clone()));
            }
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.position(column)
            .and_then(|i| self.rows.get(row).map(|r| &r[i]))
    }

    /// Rows as JSON objects keyed by column name.
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| serde_json::to_value(v).unwrap_or_default()))
                    .collect()
            })
            .collect()
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells = self
            .rows
            .iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let widths = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect::<Vec<_>>();
        let rule = |l: &str, m: &str, r: &str| {
            let bars = widths.iter().map(|w| "─".repeat(w + 2)).collect::<Vec<_>>();
            format!("{}{}{}", l, bars.join(m), r)
        };
        let line = |row: &[String]| {
            let padded = row
                .iter()
                .zip(widths.iter())
                .map(|(s, w)| format!(" {}{} ", s, " ".repeat(w - s.chars().count())))
                .collect::<Vec<_>>();
            format!("│{}│", padded.join("│"))
        };
        writeln!(f, "{}", rule("┌", "┬", "┐"))?;
        writeln!(f, "{}", line(&self.columns))?;
        writeln!(f, "{}", rule("├", "┼", "┤"))?;
        for row in cells.iter() {
            writeln!(f, "{}", line(row))?;
        }
        write!(f, "{}", rule("└", "┴", "┘"))
    }
}
