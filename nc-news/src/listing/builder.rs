//! Parameterized statement construction for article listings
//!
//! Typed specs ([`ListingFilter`], [`SortSpec`], [`PageSpec`]) are parsed out of
//! the raw query first. [`ArticleQueryBuilder`] then accumulates clause
//! fragments and renders them in a fixed order:
//!
//! 1. projection and join
//! 2. `WHERE` predicates (bound values)
//! 3. `GROUP BY` (page statement only)
//! 4. `ORDER BY` (allow-listed identifiers, interpolated)
//! 5. `LIMIT` / `OFFSET` (bound values)
//!
//! ```rust
//! use nc_news::listing::{ArticleQueryBuilder, ListingFilter, PageSpec, SortSpec};
//!
//! let filter = ListingFilter { topic: Some("mitch".into()), author: None };
//! let statement = ArticleQueryBuilder::listing(&filter, SortSpec::default(), PageSpec::default());
//! assert!(statement.sql().contains("WHERE LOWER(a.topic) = $1"));
//! assert!(statement.sql().ends_with("LIMIT $2 OFFSET $3;"));
//! ```

use super::rules::{SortColumn, SortDirection};
use super::{ListingError, ListingQuery};
use crate::store::{BindValue, Statement};

/// Default page number
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size
pub const DEFAULT_LIMIT: i64 = 10;

pub(crate) const ARTICLE_PROJECTION: &str = "SELECT a.article_id, a.title, a.topic, a.author, a.body, \
a.created_at, a.votes, a.article_img_url, COUNT(c.comment_id)::INT8 AS comment_count \
FROM articles AS a LEFT JOIN comments AS c ON a.article_id = c.article_id";

const COUNT_PROJECTION: &str = "SELECT COUNT(*)::INT8 AS total_count FROM articles AS a";

/// Validated equality filters; values are lower-cased
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub topic: Option<String>,
    pub author: Option<String>,
}

impl ListingFilter {
    /// Read `topic` and `author` from the raw query
    pub fn from_query(query: &ListingQuery) -> Self {
        Self {
            topic: query.get("topic").map(str::to_lowercase),
            author: query.get("author").map(str::to_lowercase),
        }
    }

    /// Check if any filter is present
    pub fn is_filtered(&self) -> bool {
        self.topic.is_some() || self.author.is_some()
    }
}

/// Column and direction to order by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse `sort_by` and `order_by`, defaulting to `created_at desc`
    pub fn parse(sort_by: Option<&str>, order_by: Option<&str>) -> Result<Self, ListingError> {
        let column = match sort_by {
            Some(name) => name
                .parse()
                .map_err(|e| ListingError::invalid_input(format!("sort_by: {}", e)))?,
            None => SortColumn::default(),
        };
        let direction = match order_by {
            Some(name) => name
                .parse()
                .map_err(|e| ListingError::invalid_input(format!("order_by: {}", e)))?,
            None => SortDirection::default(),
        };
        Ok(Self { column, direction })
    }
}

/// Page number and size, both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page: i64,
    limit: i64,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageSpec {
    /// Build from already-typed values
    pub fn new(page: i64, limit: i64) -> Result<Self, ListingError> {
        if page < 1 {
            return Err(ListingError::invalid_input("page must be at least 1"));
        }
        if limit < 1 {
            return Err(ListingError::invalid_input("limit must be at least 1"));
        }
        if limit.checked_mul(page - 1).is_none() {
            return Err(ListingError::invalid_input("page window is out of range"));
        }
        Ok(Self { page, limit })
    }

    /// Parse `page` and `limit` strings, defaulting to page 1 of 10
    ///
    /// Non-numeric input is rejected rather than replaced by the default.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, ListingError> {
        let page = match page {
            Some(raw) => parse_positive("page", raw)?,
            None => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(raw) => parse_positive("limit", raw)?,
            None => DEFAULT_LIMIT,
        };
        Self::new(page, limit)
    }

    /// 1-indexed page number
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Page size
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows to skip: `limit * (page - 1)`
    pub fn offset(&self) -> i64 {
        // checked in `new`
        self.limit * (self.page - 1)
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<i64, ListingError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ListingError::invalid_input(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        )));
    }
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ListingError::invalid_input(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

/// Column an equality predicate can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterColumn {
    Topic,
    Author,
}

impl FilterColumn {
    const fn as_sql(&self) -> &'static str {
        match self {
            Self::Topic => "a.topic",
            Self::Author => "a.author",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate {
    column: FilterColumn,
    value: String,
}

/// Accumulates listing clauses and renders them into a [`Statement`]
#[derive(Debug, Clone, Default)]
pub struct ArticleQueryBuilder {
    predicates: Vec<Predicate>,
    grouped: bool,
    order: Option<SortSpec>,
    window: Option<PageSpec>,
}

impl ArticleQueryBuilder {
    /// The page statement: projection, filters, grouping, order, window
    pub fn listing(filter: &ListingFilter, sort: SortSpec, page: PageSpec) -> Statement {
        Self::default()
            .filter(filter)
            .group_by_article()
            .order_by(sort)
            .window(page)
            .render(ARTICLE_PROJECTION)
    }

    /// The count statement: same filters, no grouping, order or window
    pub fn count(filter: &ListingFilter) -> Statement {
        Self::default().filter(filter).render(COUNT_PROJECTION)
    }

    /// Add equality predicates for every present filter field
    #[must_use]
    pub fn filter(mut self, filter: &ListingFilter) -> Self {
        if let Some(topic) = &filter.topic {
            self.predicates.push(Predicate {
                column: FilterColumn::Topic,
                value: topic.to_lowercase(),
            });
        }
        if let Some(author) = &filter.author {
            self.predicates.push(Predicate {
                column: FilterColumn::Author,
                value: author.to_lowercase(),
            });
        }
        self
    }

    /// Group by article, required whenever the comment aggregate is selected
    #[must_use]
    pub fn group_by_article(mut self) -> Self {
        self.grouped = true;
        self
    }

    /// Order by an allow-listed column
    #[must_use]
    pub fn order_by(mut self, sort: SortSpec) -> Self {
        self.order = Some(sort);
        self
    }

    /// Restrict to one page window
    #[must_use]
    pub fn window(mut self, page: PageSpec) -> Self {
        self.window = Some(page);
        self
    }

    fn render(&self, projection: &str) -> Statement {
        let mut statement = Statement::new(projection);

        for (i, predicate) in self.predicates.iter().enumerate() {
            statement.push(if i == 0 { " WHERE " } else { " AND " });
            statement
                .push("LOWER(")
                .push(predicate.column.as_sql())
                .push(") = ")
                .push_bind(BindValue::Text(predicate.value.clone()));
        }

        if self.grouped {
            statement.push(" GROUP BY a.article_id");
        }

        if let Some(sort) = self.order {
            // Identifiers come from closed enums, never from client text.
            // article_id breaks ties so repeated calls page identically.
            statement
                .push(" ORDER BY ")
                .push(sort.column.as_sql())
                .push(" ")
                .push(sort.direction.as_sql())
                .push(", a.article_id ASC");
        }

        if let Some(page) = self.window {
            statement
                .push(" LIMIT ")
                .push_bind(page.limit())
                .push(" OFFSET ")
                .push_bind(page.offset());
        }

        statement.push(";");
        statement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingErrorKind;

    fn filter(topic: Option<&str>, author: Option<&str>) -> ListingFilter {
        ListingFilter {
            topic: topic.map(String::from),
            author: author.map(String::from),
        }
    }

    #[test]
    fn test_default_listing_statement() {
        let statement = ArticleQueryBuilder::listing(
            &ListingFilter::default(),
            SortSpec::default(),
            PageSpec::default(),
        );
        assert_eq!(
            statement.sql(),
            format!(
                "{} GROUP BY a.article_id ORDER BY a.created_at DESC, a.article_id ASC LIMIT $1 OFFSET $2;",
                ARTICLE_PROJECTION
            )
        );
        assert_eq!(
            statement.binds(),
            &[BindValue::Integer(10), BindValue::Integer(0)]
        );
    }

    #[test]
    fn test_filters_are_bound_and_lower_cased() {
        let statement = ArticleQueryBuilder::listing(
            &filter(Some("MiTcH"), Some("Butter_Bridge")),
            SortSpec::default(),
            PageSpec::default(),
        );
        assert!(statement
            .sql()
            .contains(" WHERE LOWER(a.topic) = $1 AND LOWER(a.author) = $2 GROUP BY"));
        assert!(!statement.sql().contains("mitch"));
        assert_eq!(
            statement.binds(),
            &[
                BindValue::Text("mitch".into()),
                BindValue::Text("butter_bridge".into()),
                BindValue::Integer(10),
                BindValue::Integer(0),
            ]
        );
    }

    #[test]
    fn test_author_only_filter_uses_first_placeholder() {
        let statement = ArticleQueryBuilder::listing(
            &filter(None, Some("icellusedkars")),
            SortSpec::default(),
            PageSpec::default(),
        );
        assert!(statement.sql().contains(" WHERE LOWER(a.author) = $1 "));
        assert!(statement.sql().ends_with("LIMIT $2 OFFSET $3;"));
    }

    #[test]
    fn test_sort_and_window_rendering() {
        let sort = SortSpec::parse(Some("comment_count"), Some("asc")).unwrap();
        let page = PageSpec::parse(Some("3"), Some("5")).unwrap();
        let statement = ArticleQueryBuilder::listing(&ListingFilter::default(), sort, page);
        assert!(statement
            .sql()
            .contains("ORDER BY comment_count ASC, a.article_id ASC LIMIT $1 OFFSET $2;"));
        assert_eq!(
            statement.binds(),
            &[BindValue::Integer(5), BindValue::Integer(10)]
        );
    }

    #[test]
    fn test_count_statement_shares_filters_only() {
        let statement = ArticleQueryBuilder::count(&filter(Some("cats"), None));
        assert_eq!(
            statement.sql(),
            format!("{} WHERE LOWER(a.topic) = $1;", COUNT_PROJECTION)
        );
        assert_eq!(statement.binds(), &[BindValue::Text("cats".into())]);
    }

    #[test]
    fn test_injection_attempt_stays_a_bound_value() {
        let statement =
            ArticleQueryBuilder::count(&filter(Some("x'; DROP TABLE articles; --"), None));
        assert!(!statement.sql().contains("DROP"));
        assert_eq!(statement.binds().len(), 1);
    }

    #[test]
    fn test_sort_spec_defaults() {
        let sort = SortSpec::parse(None, None).unwrap();
        assert_eq!(sort.column, SortColumn::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_spec_rejects_unknown_column() {
        let err = SortSpec::parse(Some("invalidColumn"), None).unwrap_err();
        assert_eq!(err.kind(), ListingErrorKind::InvalidInput);
        let err = SortSpec::parse(Some("votes"), Some("up")).unwrap_err();
        assert_eq!(err.kind(), ListingErrorKind::InvalidInput);
    }

    #[test]
    fn test_page_spec_parse() {
        let page = PageSpec::parse(Some("2"), Some("5")).unwrap();
        assert_eq!(page.page(), 2);
        assert_eq!(page.limit(), 5);
        assert_eq!(page.offset(), 5);
        assert_eq!(PageSpec::parse(None, None).unwrap(), PageSpec::default());
    }

    #[test]
    fn test_page_spec_rejects_non_positive_or_non_numeric() {
        for (page, limit) in [
            (Some("0"), None),
            (None, Some("0")),
            (Some("-1"), None),
            (Some("two"), None),
            (None, Some("1.5")),
            (None, Some("")),
            (Some(" 2"), None),
            (Some("+2"), None),
            (None, Some("99999999999999999999")),
        ] {
            let err = PageSpec::parse(page, limit).unwrap_err();
            assert_eq!(err.kind(), ListingErrorKind::InvalidInput, "{page:?} {limit:?}");
        }
    }

    #[test]
    fn test_page_spec_rejects_offset_overflow() {
        assert!(PageSpec::new(i64::MAX, 2).is_err());
        assert!(PageSpec::new(1, i64::MAX).is_ok());
    }

    #[test]
    fn test_filter_from_query_lower_cases() {
        let query = ListingQuery::from_pairs([("topic", "CATS"), ("author", "Rogersop")]);
        let filter = ListingFilter::from_query(&query);
        assert_eq!(filter.topic.as_deref(), Some("cats"));
        assert_eq!(filter.author.as_deref(), Some("rogersop"));
        assert!(filter.is_filtered());
        assert!(!ListingFilter::default().is_filtered());
    }
}
