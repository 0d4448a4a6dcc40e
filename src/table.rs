use std::ops;
use std::slice;
use std::vec;

/// A single row of decoded fields.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Row(Vec<String>);

impl Row {
    /// Create a new empty `Row`.
    pub fn new() -> Row {
        Row(vec![])
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.0.get(i).map(|field| field.as_str())
    }

    /// Returns true if and only if this row has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields in this row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over all fields in this row.
    pub fn iter(&self) -> RowIter {
        RowIter(self.0.iter())
    }

    /// The fields of this row.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Convert this row into its fields.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for Row {
    fn from(fields: Vec<String>) -> Row {
        Row(fields)
    }
}

impl ops::Index<usize> for Row {
    type Output = str;
    fn index(&self, i: usize) -> &str {
        &self.0[i]
    }
}

impl<'a> PartialEq<[&'a str]> for Row {
    fn eq(&self, other: &[&'a str]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == *b)
    }
}

impl<'a, 'b> PartialEq<[&'a str]> for &'b Row {
    fn eq(&self, other: &[&'a str]) -> bool {
        **self == *other
    }
}

impl<'a> IntoIterator for &'a Row {
    type IntoIter = RowIter<'a>;
    type Item = &'a str;
    fn into_iter(self) -> RowIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields in a row.
pub struct RowIter<'a>(slice::Iter<'a, String>);

impl<'a> Iterator for RowIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.0.next().map(|field| field.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> DoubleEndedIterator for RowIter<'a> {
    fn next_back(&mut self) -> Option<&'a str> {
        self.0.next_back().map(|field| field.as_str())
    }
}

impl<'a> ExactSizeIterator for RowIter<'a> {}

/// The rows decoded from one input.
///
/// A table returned from a successful parse is rectangular: every row has
/// exactly `column_count()` fields.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Table {
        Table { rows: vec![] }
    }

    /// Add a row to the end of this table.
    ///
    /// No shape check is done here; the parser enforces the column count.
    pub(crate) fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if and only if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The number of fields in the first row, or `0` for an empty table.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    /// Return the row at index `i`.
    pub fn row(&self, i: usize) -> Option<&Row> {
        self.rows.get(i)
    }

    /// Return the field at column `col` of row `row`.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.row(row).and_then(|r| r.get(col))
    }

    /// All rows, in input order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns an iterator over all rows.
    pub fn iter(&self) -> slice::Iter<Row> {
        self.rows.iter()
    }

    /// Convert this table into its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl ops::Index<usize> for Table {
    type Output = Row;
    fn index(&self, i: usize) -> &Row {
        &self.rows[i]
    }
}

impl<'a> IntoIterator for &'a Table {
    type IntoIter = slice::Iter<'a, Row>;
    type Item = &'a Row;
    fn into_iter(self) -> slice::Iter<'a, Row> {
        self.iter()
    }
}

impl IntoIterator for Table {
    type IntoIter = vec::IntoIter<Row>;
    type Item = Row;
    fn into_iter(self) -> vec::IntoIter<Row> {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Row, Table};

    fn row(fields: &[&str]) -> Row {
        Row::from(fields.iter().map(|f| f.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn empty_table() {
        let t = Table::new();
        assert!(t.is_empty());
        assert_eq!(0, t.len());
        assert_eq!(0, t.column_count());
        assert!(t.row(0).is_none());
        assert!(t.get(0, 0).is_none());
    }

    #[test]
    fn access() {
        let mut t = Table::new();
        t.push(row(&["a", "b", "c"]));
        t.push(row(&["1", "2", "3"]));

        assert_eq!(2, t.len());
        assert_eq!(3, t.column_count());
        assert_eq!(Some("b"), t.get(0, 1));
        assert_eq!(Some("3"), t.get(1, 2));
        assert_eq!(None, t.get(1, 3));
        assert_eq!(None, t.get(2, 0));
        assert_eq!("2", &t[1][1]);

        let firsts: Vec<&str> = t.iter().map(|r| &r[0]).collect();
        assert_eq!(vec!["a", "1"], firsts);
    }

    #[test]
    fn row_iter() {
        let r = row(&["x", "", "z"]);
        assert_eq!(3, r.iter().len());
        assert_eq!(vec!["z", "", "x"], r.iter().rev().collect::<Vec<_>>());
        assert!(r == ["x", "", "z"][..]);
        assert!(r != ["x", ""][..]);
        assert!(Row::new().is_empty());
    }

    #[test]
    fn into_rows() {
        let mut t = Table::new();
        t.push(row(&["a"]));
        let rows: Vec<Row> = t.clone().into_iter().collect();
        assert_eq!(rows, t.into_rows());
    }
}
