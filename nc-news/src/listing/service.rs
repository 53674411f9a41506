//! Listing orchestration: validate, build, count, fetch, paginate

use std::sync::Arc;
use std::time::Duration;

use super::{
    is_any_key_recognized, paginator, ArticleQueryBuilder, ListingError, ListingFilter,
    ListingQuery, ListingResult, PageSpec, SortSpec,
};
use crate::error::DatabaseOperation;
use crate::store::{with_timeout, StoreExecutor};

/// Runs article listings against a store
///
/// Each call issues the count statement first and, only when something
/// matches, the page statement. Both calls run under `query_timeout`.
pub struct ListingService<S> {
    store: Arc<S>,
    query_timeout: Duration,
}

impl<S> Clone for ListingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            query_timeout: self.query_timeout,
        }
    }
}

impl<S: StoreExecutor> ListingService<S> {
    pub fn new(store: Arc<S>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
        }
    }

    /// List one page of articles for a raw query mapping
    ///
    /// # Errors
    ///
    /// - [`ListingError::InvalidInput`] when no key is recognized, or a sort or
    ///   paging value is off the allow-list
    /// - [`ListingError::RecordsNotFound`] when nothing matches the filter
    /// - [`ListingError::ServiceUnavailable`] when the store misses the deadline
    /// - [`ListingError::Store`] for any other store failure
    pub async fn list_articles(
        &self,
        query: &ListingQuery,
    ) -> Result<ListingResult, ListingError> {
        if !query.is_empty() && !is_any_key_recognized(query) {
            tracing::warn!(
                keys = ?query.keys().collect::<Vec<_>>(),
                "Rejected listing query with no recognized key"
            );
            return Err(ListingError::invalid_input("no recognized listing parameter"));
        }

        let (filter, sort, page) = match plan(query) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected listing query");
                return Err(e);
            }
        };

        tracing::debug!(
            topic = ?filter.topic,
            author = ?filter.author,
            sort_by = %sort.column,
            order_by = %sort.direction,
            page = page.page(),
            limit = page.limit(),
            "Planned article listing"
        );

        let count = ArticleQueryBuilder::count(&filter);
        let rows = with_timeout(
            self.query_timeout,
            DatabaseOperation::Query,
            self.store.fetch(&count),
        )
        .await?;
        let total_count = match paginator::total_count(&rows) {
            Ok(total) => total,
            Err(ListingError::RecordsNotFound) => {
                tracing::info!(returned = 0, total_count = 0, "No articles matched listing");
                return Err(ListingError::RecordsNotFound);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable article count");
                return Err(e);
            }
        };

        let listing = ArticleQueryBuilder::listing(&filter, sort, page);
        let rows = with_timeout(
            self.query_timeout,
            DatabaseOperation::Query,
            self.store.fetch(&listing),
        )
        .await?;
        let result = paginator::paginate(rows, total_count, page)?;

        tracing::info!(
            returned = result.articles.len(),
            total_count = result.total_count,
            "Listed articles"
        );
        Ok(result)
    }
}

fn plan(query: &ListingQuery) -> Result<(ListingFilter, SortSpec, PageSpec), ListingError> {
    let filter = ListingFilter::from_query(query);
    let sort = SortSpec::parse(query.get("sort_by"), query.get("order_by"))?;
    let page = PageSpec::parse(query.get("page"), query.get("limit"))?;
    Ok((filter, sort, page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use crate::listing::ListingErrorKind;
    use crate::store::testing::ScriptedStore;
    use crate::store::BindValue;
    use serde_json::{json, Value};

    fn article(id: i64, topic: &str) -> Value {
        json!({
            "article_id": id,
            "title": format!("Article {id}"),
            "topic": topic,
            "author": "icellusedkars",
            "body": "some gifs",
            "created_at": "2020-11-03T09:12:00Z",
            "votes": 0,
            "article_img_url": "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700",
            "comment_count": 2
        })
    }

    fn scripted(store: ScriptedStore) -> (ListingService<ScriptedStore>, Arc<ScriptedStore>) {
        let store = Arc::new(store);
        (
            ListingService::new(Arc::clone(&store), Duration::from_millis(200)),
            store,
        )
    }

    #[tokio::test]
    async fn test_empty_query_uses_defaults() {
        let (service, store) = scripted(
            ScriptedStore::new()
                .respond_count(13)
                .respond((1..=10).map(|i| article(i, "mitch")).collect()),
        );

        let result = service.list_articles(&ListingQuery::default()).await.unwrap();
        assert_eq!(result.articles.len(), 10);
        assert_eq!(result.total_count, 13);

        let statements = store.statements();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].sql().starts_with("SELECT COUNT(*)::INT8 AS total_count"));
        assert!(statements[1]
            .sql()
            .contains("ORDER BY a.created_at DESC, a.article_id ASC"));
        assert_eq!(
            statements[1].binds(),
            &[BindValue::Integer(10), BindValue::Integer(0)]
        );
    }

    #[tokio::test]
    async fn test_topic_filter_is_bound_in_both_statements() {
        let (service, store) = scripted(
            ScriptedStore::new()
                .respond_count(12)
                .respond((1..=10).map(|i| article(i, "mitch")).collect()),
        );

        let query = ListingQuery::from_pairs([("topic", "Mitch")]);
        let result = service.list_articles(&query).await.unwrap();
        assert!(result.articles.iter().all(|a| a.topic == "mitch"));
        assert_eq!(result.total_count, 12);

        for statement in store.statements() {
            assert_eq!(statement.binds()[0], BindValue::Text("mitch".into()));
        }
    }

    #[tokio::test]
    async fn test_no_matches_skips_page_query() {
        let (service, store) = scripted(ScriptedStore::new().respond_count(0));

        let query = ListingQuery::from_pairs([("topic", "nonexistent-topic")]);
        let err = service.list_articles(&query).await.unwrap_err();
        assert_eq!(err.kind(), ListingErrorKind::RecordsNotFound);
        assert_eq!(store.statements().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_count_column_is_store_error() {
        let (service, store) = scripted(ScriptedStore::new().respond(vec![json!({ "count": 3 })]));

        let err = service
            .list_articles(&ListingQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ListingErrorKind::Store);
        assert_eq!(store.statements().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let cases: Vec<Vec<(&str, &str)>> = vec![
            vec![("sort_by", "invalidColumn")],
            vec![("sort_by", "votes"), ("order_by", "sideways")],
            vec![("page", "two")],
            vec![("limit", "0")],
            vec![("colour", "red")],
        ];
        for pairs in cases {
            let (service, store) = scripted(ScriptedStore::new());
            let err = service
                .list_articles(&ListingQuery::from_pairs(pairs.clone()))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ListingErrorKind::InvalidInput, "{pairs:?}");
            assert!(store.statements().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_key_beside_known_key_is_ignored() {
        let (service, store) = scripted(
            ScriptedStore::new()
                .respond_count(1)
                .respond(vec![article(6, "cats")]),
        );
        let query = ListingQuery::from_pairs([("colour", "red"), ("topic", "cats")]);
        let result = service.list_articles(&query).await.unwrap();
        assert_eq!(result.articles.len(), 1);
        assert!(!store.statements()[1].sql().contains("colour"));
    }

    #[tokio::test]
    async fn test_second_page_window() {
        let (service, store) = scripted(
            ScriptedStore::new()
                .respond_count(13)
                .respond((6..=10).map(|i| article(i, "mitch")).collect()),
        );
        let query = ListingQuery::from_pairs([("page", "2"), ("limit", "5")]);
        let result = service.list_articles(&query).await.unwrap();
        assert_eq!(result.articles.len(), 5);
        assert_eq!(result.total_count, 13);
        assert_eq!(
            store.statements()[1].binds(),
            &[BindValue::Integer(5), BindValue::Integer(5)]
        );
    }

    #[tokio::test]
    async fn test_page_overrun_returns_empty_page_with_total() {
        let (service, _) = scripted(ScriptedStore::new().respond_count(13).respond(vec![]));
        let query = ListingQuery::from_pairs([("page", "99")]);
        let result = service.list_articles(&query).await.unwrap();
        assert!(result.articles.is_empty());
        assert_eq!(result.total_count, 13);
    }

    #[tokio::test]
    async fn test_store_timeout_is_service_unavailable() {
        let (service, _) = scripted(
            ScriptedStore::new()
                .with_delay(Duration::from_secs(2))
                .respond_count(13),
        );
        let err = service
            .list_articles(&ListingQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ListingErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (service, _) = scripted(ScriptedStore::new().fail(DatabaseError::query_failed("boom")));
        let err = service
            .list_articles(&ListingQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ListingErrorKind::Store);
    }

    #[tokio::test]
    async fn test_identical_calls_issue_identical_statements() {
        let (service, store) = scripted(
            ScriptedStore::new()
                .respond_count(2)
                .respond(vec![article(1, "mitch"), article(2, "mitch")])
                .respond_count(2)
                .respond(vec![article(1, "mitch"), article(2, "mitch")]),
        );
        let query = ListingQuery::from_pairs([("sort_by", "votes"), ("order_by", "asc")]);
        let first = service.list_articles(&query).await.unwrap();
        let second = service.list_articles(&query).await.unwrap();
        assert_eq!(first, second);

        let statements = store.statements();
        assert_eq!(statements[0], statements[2]);
        assert_eq!(statements[1], statements[3]);
    }
}
