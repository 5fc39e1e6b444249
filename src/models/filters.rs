// src/models/filters.rs

use serde::{Deserialize, Serialize};

use crate::error::Violations;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Hard ceiling on page size; bounds the result set and its memory cost.
pub const MAX_PAGE_SIZE: i64 = 100;
const MAX_PAGE: i64 = 10_000_000;

/// Raw pagination and sort inputs exactly as they arrive on the query
/// string. Kept as strings so a value like `page=abc` lands in the
/// validation report next to the other field errors instead of killing the
/// request in the decoder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A validated pagination window and sort order for one list query.
///
/// `sort_column` can only hold a marker-stripped safelist entry: the sole
/// constructor is [`Filters::validate`]. That gate is the trust boundary in
/// front of the textual `ORDER BY` interpolation in the repositories, where
/// identifiers cannot be bound as query parameters.
#[derive(Debug, Clone)]
pub struct ListParams {
    page: i64,
    page_size: i64,
    sort_column: String,
    sort_direction: SortDirection,
}

impl ListParams {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Renders the `ORDER BY` fragment, e.g. `reward DESC`.
    pub fn order_by(&self) -> String {
        format!("{} {}", self.sort_column, self.sort_direction.as_sql())
    }
}

impl Filters {
    /// Validates the raw inputs against the endpoint's sort safelist and
    /// produces the pagination window for the query.
    ///
    /// Failures accumulate into `v` alongside whatever the caller has
    /// already recorded, so one response reports every bad field at once.
    /// Returns `None` when the sort value is not on the safelist; any
    /// returned window is only usable once `v` has been checked empty.
    /// `default_sort` applies when `sort` is absent and must itself be a
    /// safelist entry.
    pub fn validate(
        &self,
        default_sort: &str,
        safelist: &[&str],
        v: &mut Violations,
    ) -> Option<ListParams> {
        let page = read_int(v, self.page.as_deref(), "page", DEFAULT_PAGE);
        let page_size = read_int(v, self.page_size.as_deref(), "page_size", DEFAULT_PAGE_SIZE);
        v.check(page > 0, "page", "must be greater than zero");
        v.check(page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(page_size > 0, "page_size", "must be greater than zero");
        v.check(
            page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );

        let sort = self.sort.as_deref().unwrap_or(default_sort);
        if !safelist.contains(&sort) {
            v.add("sort", "invalid sort value");
            return None;
        }

        let sort_direction = if sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };

        Some(ListParams {
            page,
            page_size,
            sort_column: sort.trim_start_matches('-').to_string(),
            sort_direction,
        })
    }
}

/// Reads an integer query value, falling back to `default` when absent.
/// An unparseable value records a field error and keeps the default so the
/// remaining rules still run over something sane.
pub fn read_int(v: &mut Violations, raw: Option<&str>, field: &str, default: i64) -> i64 {
    match raw {
        None => default,
        Some(s) => match s.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add(field, "must be an integer value");
                default
            }
        },
    }
}

/// Pagination metadata derived from the windowed total count, serialized as
/// `{"totalRecords", "page", "pageSize", "lastPage"}` in list envelopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub total_records: i64,
    pub page: i64,
    pub page_size: i64,
    pub last_page: i64,
}

impl Metadata {
    /// Computed once per list query. A zero total yields the zero value:
    /// there is no page window over an empty result.
    pub fn calculate(total_records: i64, params: &ListParams) -> Self {
        if total_records == 0 {
            return Metadata::default();
        }

        Metadata {
            total_records,
            page: params.page,
            page_size: params.page_size,
            last_page: (total_records + params.page_size - 1) / params.page_size,
        }
    }
}
