//! Ordered row lists for the education/experience steps.
//!
//! Rows and their validation errors live in parallel vectors; removal
//! re-indexes both so error entries stay aligned with their rows.

#![allow(dead_code)]

use crate::wizard::validate::FieldErrors;

#[derive(Debug, Clone)]
pub struct RowList<T> {
    rows: Vec<T>,
    errors: Vec<FieldErrors>,
}

impl<T: Default> RowList<T> {
    /// A fresh list mounts with one blank row.
    pub fn new() -> Self {
        Self {
            rows: vec![T::default()],
            errors: vec![FieldErrors::new()],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut T> {
        self.rows.get_mut(index)
    }

    pub fn errors(&self) -> &[FieldErrors] {
        &self.errors
    }

    pub fn add_row(&mut self) {
        self.rows.push(T::default());
        self.errors.push(FieldErrors::new());
    }

    /// Removes the row and its error entry; remaining rows keep their
    /// relative order. Out-of-range indexes are ignored.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
            self.errors.remove(index);
        }
    }

    /// Validates every row with `check`, recording per-row errors.
    /// Returns the converted records when all rows pass.
    pub fn validate_all<R>(
        &mut self,
        check: impl Fn(&T) -> Result<R, FieldErrors>,
    ) -> Result<Vec<R>, usize> {
        let mut records = Vec::with_capacity(self.rows.len());
        let mut failed = 0usize;
        for (i, row) in self.rows.iter().enumerate() {
            match check(row) {
                Ok(record) => {
                    self.errors[i] = FieldErrors::new();
                    records.push(record);
                }
                Err(errors) => {
                    self.errors[i] = errors;
                    failed += 1;
                }
            }
        }
        if failed > 0 {
            Err(failed)
        } else {
            Ok(records)
        }
    }
}

impl<T: Default> Default for RowList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Row(String);

    fn list_of(names: &[&str]) -> RowList<Row> {
        let mut list: RowList<Row> = RowList::new();
        list.row_mut(0).unwrap().0 = names[0].to_string();
        for name in &names[1..] {
            list.add_row();
            let last = list.len() - 1;
            list.row_mut(last).unwrap().0 = name.to_string();
        }
        list
    }

    fn check(row: &Row) -> Result<String, FieldErrors> {
        if row.0.is_empty() {
            let mut e = FieldErrors::new();
            e.insert("name".into(), "This field is required".into());
            Err(e)
        } else {
            Ok(row.0.clone())
        }
    }

    #[test]
    fn test_starts_with_one_blank_row() {
        let list: RowList<Row> = RowList::new();
        assert_eq!(list.len(), 1);
        assert_eq!(list.errors().len(), 1);
    }

    #[test]
    fn test_remove_preserves_order_and_error_alignment() {
        let mut list = list_of(&["a", "", "c", "d"]);
        assert!(list.validate_all(check).is_err());
        assert!(!list.errors()[1].is_empty());

        list.remove_row(1);
        assert_eq!(list.len(), 3);
        let names: Vec<_> = list.rows().iter().map(|r| r.0.as_str()).collect();
        assert_eq!(names, ["a", "c", "d"]);
        // the failing row's error entry went with it
        assert!(list.errors().iter().all(|e| e.is_empty()));
    }

    #[test]
    fn test_remove_out_of_range_is_ignored() {
        let mut list = list_of(&["a"]);
        list.remove_row(5);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_validate_all_collects_records_in_order() {
        let mut list = list_of(&["a", "b"]);
        let records = list.validate_all(check).unwrap();
        assert_eq!(records, ["a", "b"]);
    }

    #[test]
    fn test_validate_all_counts_failures() {
        let mut list = list_of(&["", "b", ""]);
        assert_eq!(list.validate_all(check).unwrap_err(), 2);
        assert!(!list.errors()[0].is_empty());
        assert!(list.errors()[1].is_empty());
        assert!(!list.errors()[2].is_empty());
    }
}
