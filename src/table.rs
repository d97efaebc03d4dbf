//! Column-to-row transposition for tabular output.
//!
//! Scalar fields contribute one cell and histogram fields hundreds, so columns are
//! ragged. [`Transpose`] yields rows until every column is exhausted, filling the
//! cells of finished columns with an empty string.

/// Lazy row iterator over ragged columns. Consumes its columns.
#[derive(Debug)]
pub struct Transpose<I> {
    columns: Vec<std::iter::Fuse<I>>,
}

/// Transpose columns (in header order) into rows.
pub fn transpose<C, I>(columns: C) -> Transpose<I::IntoIter>
where
    C: IntoIterator<Item = I>,
    I: IntoIterator<Item = String>,
{
    Transpose {
        columns: columns.into_iter().map(|c| c.into_iter().fuse()).collect(),
    }
}

impl<I> Iterator for Transpose<I>
where
    I: Iterator<Item = String>,
{
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        let mut any = false;
        let row: Vec<String> = self
            .columns
            .iter_mut()
            .map(|c| match c.next() {
                Some(cell) => {
                    any = true;
                    cell
                }
                None => String::new(),
            })
            .collect();
        any.then_some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ragged_columns_pad_with_empty() {
        let rows: Vec<_> = transpose(vec![col(&["a"]), col(&["1", "2", "3"]), col(&["x", "y"])]).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], col(&["a", "1", "x"]));
        assert_eq!(rows[1], col(&["", "2", "y"]));
        assert_eq!(rows[2], col(&["", "3", ""]));
    }

    #[test]
    fn scalar_next_to_histogram() {
        let hist: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let rows: Vec<_> = transpose(vec![col(&["12.0 5"]), hist]).collect();
        assert_eq!(rows.len(), 256);
        assert_eq!(rows[0][0], "12.0 5");
        assert!(rows[1..].iter().all(|r| r[0].is_empty()));
        assert_eq!(rows[255][1], "255");
    }

    #[test]
    fn no_columns_or_all_empty_yields_nothing() {
        assert_eq!(transpose(Vec::<Vec<String>>::new()).count(), 0);
        assert_eq!(transpose(vec![Vec::<String>::new(), Vec::new()]).count(), 0);
    }

    #[test]
    fn empty_column_in_the_middle_stays_blank() {
        let rows: Vec<_> = transpose(vec![col(&["a"]), Vec::new(), col(&["b"])]).collect();
        assert_eq!(rows, vec![col(&["a", "", "b"])]);
    }
}
