//! File table filter.

/// Case-insensitive name and category predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    search: String,
    category: String,
}

/// Display decision for a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVisibility {
    /// Both predicates match.
    Shown,
    /// At least one predicate fails.
    Hidden,
    /// Row has fewer than two cells (empty-state row) and is left alone.
    Untouched,
}

impl FilterQuery {
    /// Query from the search box and the category select. An empty
    /// category matches every row.
    #[must_use]
    pub fn new(search: &str, category: &str) -> Self {
        Self {
            search: search.to_lowercase(),
            category: category.to_lowercase(),
        }
    }

    /// Whether a row with this name and category is visible.
    #[must_use]
    pub fn matches(&self, name: &str, category: &str) -> bool {
        let name_ok = name.to_lowercase().contains(&self.search);
        let category_ok =
            self.category.is_empty() || category.to_lowercase().contains(&self.category);
        name_ok && category_ok
    }
}

/// Decide visibility for each row; cell 0 is the name and cell 1 the
/// category.
#[must_use]
pub fn filter_rows<S: AsRef<str>>(rows: &[Vec<S>], query: &FilterQuery) -> Vec<RowVisibility> {
    rows.iter()
        .map(|cells| match cells.as_slice() {
            [name, category, ..] => {
                if query.matches(name.as_ref(), category.as_ref()) {
                    RowVisibility::Shown
                } else {
                    RowVisibility::Hidden
                }
            }
            _ => RowVisibility::Untouched,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Report.PDF", "Document", "2 MB"],
            vec!["holiday.jpg", "Image", "4 MB"],
            vec!["notes.txt", "document", "1 KB"],
            vec!["No files uploaded yet"],
        ]
    }

    #[test]
    fn both_predicates_apply() {
        let query = FilterQuery::new("RE", "doc");
        assert_eq!(
            filter_rows(&rows(), &query),
            vec![
                RowVisibility::Shown,
                RowVisibility::Hidden,
                RowVisibility::Hidden,
                RowVisibility::Untouched,
            ]
        );
    }

    #[test]
    fn empty_query_shows_everything() {
        let visibility = filter_rows(&rows(), &FilterQuery::default());
        assert_eq!(&visibility[..3], &[RowVisibility::Shown; 3]);
        assert_eq!(visibility[3], RowVisibility::Untouched);
    }

    #[test]
    fn filtering_is_idempotent() {
        let query = FilterQuery::new("o", "image");
        let once = filter_rows(&rows(), &query);
        let twice = filter_rows(&rows(), &query);
        assert_eq!(once, twice);
        assert_eq!(once[1], RowVisibility::Shown);
    }
}
