//! List querying: a normalized request descriptor built from UI state, plus
//! a local executor that applies the same search/filter/sort/pagination
//! semantics to an in-memory slice that the server applies remotely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("page must be at least 1")]
    PageOutOfRange,
    #[error("limit must be positive")]
    LimitOutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Normalized request shape shared by remote and local mode. Construction
/// enforces `page >= 1` and `limit > 0`; the builder methods drop empty
/// search text and empty filter values so callers never have to.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub page: usize,
    pub limit: usize,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
}

impl QueryDescriptor {
    pub fn new(page: usize, limit: usize) -> Result<Self, QueryError> {
        if page < 1 {
            return Err(QueryError::PageOutOfRange);
        }
        if limit < 1 {
            return Err(QueryError::LimitOutOfRange);
        }
        Ok(Self {
            page,
            limit,
            search: None,
            filters: BTreeMap::new(),
            sort_field: None,
            sort_direction: SortDirection::default(),
        })
    }

    /// Attach search text, ignoring empty or whitespace-only input.
    pub fn search(mut self, text: &str) -> Self {
        let text = text.trim();
        if !text.is_empty() {
            self.search = Some(text.to_string());
        }
        self
    }

    /// Attach an exact-match filter, ignoring empty values.
    pub fn filter(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.filters.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        if !field.is_empty() {
            self.sort_field = Some(field.to_string());
            self.sort_direction = direction;
        }
        self
    }

    /// Serialize the descriptor into URL query pairs for remote mode.
    /// Sort is encoded as `field:direction`, matching the server contract.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(field) = &self.sort_field {
            pairs.push((
                "sort".to_string(),
                format!("{}:{}", field, self.sort_direction.as_str()),
            ));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }
}

/// One page of results, in the same shape the remote pagination envelope
/// decodes into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub pages: usize,
}

impl<T> Page<T> {
    pub fn empty(page: usize, limit: usize) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            limit,
            pages: 0,
        }
    }
}

/// Fields an item exposes to the local executor.
pub trait Queryable {
    /// Text fields scanned by the case-insensitive search pass.
    fn search_text(&self) -> Vec<&str>;

    /// Value addressed by a filter or sort key. `None` means the item has
    /// no such field, so it can never match a filter on that key.
    fn field(&self, key: &str) -> Option<String>;
}

fn matches_search<T: Queryable>(item: &T, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    item.search_text()
        .iter()
        .any(|text| text.to_lowercase().contains(&needle))
}

fn matches_filters<T: Queryable>(item: &T, filters: &BTreeMap<String, String>) -> bool {
    filters
        .iter()
        .all(|(key, value)| item.field(key).as_deref() == Some(value.as_str()))
}

/// Run a descriptor against an in-memory slice: search, then exact-match
/// filters, then a stable sort, then pagination. The source slice is never
/// mutated; the returned page owns clones of the matching items.
pub fn execute<T: Queryable + Clone>(items: &[T], query: &QueryDescriptor) -> Page<T> {
    let mut matched: Vec<&T> = items
        .iter()
        .filter(|item| {
            query
                .search
                .as_deref()
                .map_or(true, |needle| matches_search(*item, needle))
        })
        .filter(|item| matches_filters(*item, &query.filters))
        .collect();

    if let Some(field) = &query.sort_field {
        // Single stable sort with a direction-aware comparator: equal keys
        // compare Equal either way, so their source order survives.
        matched.sort_by(|a, b| {
            let ordering = a.field(field).cmp(&b.field(field));
            match query.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    let total = matched.len();
    let pages = total.div_ceil(query.limit);
    let start = (query.page - 1) * query.limit;
    let items = matched
        .into_iter()
        .skip(start)
        .take(query.limit)
        .cloned()
        .collect();

    Page {
        items,
        total,
        page: query.page,
        limit: query.limit,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, ClientStatus};
    use crate::store::fixtures;

    fn descriptor() -> QueryDescriptor {
        QueryDescriptor::new(1, 10).unwrap()
    }

    #[test]
    fn rejects_zero_page_and_zero_limit() {
        assert_eq!(
            QueryDescriptor::new(0, 10).unwrap_err(),
            QueryError::PageOutOfRange
        );
        assert_eq!(
            QueryDescriptor::new(1, 0).unwrap_err(),
            QueryError::LimitOutOfRange
        );
    }

    #[test]
    fn builder_omits_empty_search_and_filters() {
        let query = descriptor()
            .search("   ")
            .filter("status", "")
            .filter("clientId", "2");
        assert_eq!(query.search, None);
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters.get("clientId").unwrap(), "2");
    }

    #[test]
    fn query_pairs_encode_sort_and_filters() {
        let query = descriptor()
            .search("tech")
            .sort("createdAt", SortDirection::Desc)
            .filter("status", "active");
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("page".to_string(), "1".to_string())));
        assert!(pairs.contains(&("search".to_string(), "tech".to_string())));
        assert!(pairs.contains(&("sort".to_string(), "createdAt:desc".to_string())));
        assert!(pairs.contains(&("status".to_string(), "active".to_string())));
    }

    #[test]
    fn search_is_case_insensitive_across_configured_fields() {
        let clients = fixtures::clients();
        let page = execute(&clients, &descriptor().search("tech"));
        // "tech" matches company "TechCorp Inc." even though no name or
        // email contains it verbatim.
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].company, "TechCorp Inc.");
    }

    #[test]
    fn filters_require_exact_field_equality() {
        let clients = fixtures::clients();
        let page = execute(&clients, &descriptor().filter("status", "active"));
        assert_eq!(page.total, 2);
        assert!(
            page.items
                .iter()
                .all(|c| c.status == ClientStatus::Active)
        );
    }

    #[test]
    fn filter_on_unknown_key_matches_nothing() {
        let clients = fixtures::clients();
        let page = execute(&clients, &descriptor().filter("nope", "x"));
        assert_eq!(page.total, 0);
    }

    #[test]
    fn execute_does_not_mutate_the_source() {
        let clients = fixtures::clients();
        let before: Vec<String> = clients.iter().map(|c| c.id.clone()).collect();
        let _ = execute(&clients, &descriptor().sort("name", SortDirection::Asc));
        let after: Vec<String> = clients.iter().map(|c| c.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn sort_orders_by_field_in_both_directions() {
        let clients = fixtures::clients();
        let asc = execute(&clients, &descriptor().sort("name", SortDirection::Asc));
        let names: Vec<&str> = asc.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["John Smith", "Mike Wilson", "Sarah Johnson"]);

        let desc = execute(&clients, &descriptor().sort("name", SortDirection::Desc));
        assert_eq!(desc.items[0].name, "Sarah Johnson");
    }

    #[test]
    fn descending_sort_keeps_source_order_of_equal_keys() {
        let mut clients = fixtures::clients();
        let shared = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        for client in &mut clients {
            client.created_at = shared;
        }

        let desc = execute(
            &clients,
            &descriptor().sort("createdAt", SortDirection::Desc),
        );
        let ids: Vec<&str> = desc.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let asc = execute(
            &clients,
            &descriptor().sort("createdAt", SortDirection::Asc),
        );
        let ids: Vec<&str> = asc.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn unsorted_results_preserve_source_order() {
        let clients = fixtures::clients();
        let page = execute(&clients, &descriptor());
        let ids: Vec<&str> = page.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn pagination_slices_and_counts_pages() {
        let clients = fixtures::clients();
        let first = execute(&clients, &QueryDescriptor::new(1, 2).unwrap());
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total, 3);
        assert_eq!(first.pages, 2);

        let second = execute(&clients, &QueryDescriptor::new(2, 2).unwrap());
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, "3");

        let past_end = execute(&clients, &QueryDescriptor::new(5, 2).unwrap());
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 3);
    }

    #[test]
    fn status_filter_scenario_from_two_item_collection() {
        let mut clients: Vec<Client> = fixtures::clients().into_iter().take(1).collect();
        clients.push(Client {
            id: "2".to_string(),
            status: ClientStatus::Inactive,
            ..clients[0].clone()
        });
        let page = execute(&clients, &descriptor().filter("status", "active"));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "1");
    }
}
