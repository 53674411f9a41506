//! Turning store rows into a [`ListingResult`]

use super::{ListingError, ListingResult, PageSpec};
use crate::models::Article;
use crate::store::Rows;

/// Column the count statement projects
pub const TOTAL_COUNT_COLUMN: &str = "total_count";

/// Read the full matching-set size from the count statement's rows
pub fn total_count(rows: &Rows) -> Result<i64, ListingError> {
    let total = rows.scalar_i64(TOTAL_COUNT_COLUMN)?;
    if total == 0 {
        return Err(ListingError::RecordsNotFound);
    }
    Ok(total)
}

/// Decode one page of articles and pair it with the matching-set size
///
/// A page past the end of a non-empty set is an empty success.
pub fn paginate(
    rows: Rows,
    total_count: i64,
    page: PageSpec,
) -> Result<ListingResult, ListingError> {
    if total_count == 0 {
        return Err(ListingError::RecordsNotFound);
    }

    let mut articles: Vec<Article> = rows.decode()?;
    // never more than `limit` per page
    articles.truncate(usize::try_from(page.limit()).unwrap_or(usize::MAX));

    Ok(ListingResult {
        articles,
        total_count,
    })
}
