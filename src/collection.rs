//! Remote collection view
//!
//! The list pages (cases, case bank, users, history) all fetch a whole
//! collection, filter it client-side with a conjunction of predicates and
//! show it one fixed-size page at a time. [`CollectionView`] implements that
//! once; pages only supply a [`FilterSet`].

use chrono::{DateTime, NaiveDate, Utc};

/// A conjunction of predicates over `T`.
pub trait FilterSet<T> {
    fn matches(&self, item: &T) -> bool;

    /// Whether any predicate is active
    fn is_active(&self) -> bool;
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn text_contains(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Inclusive date bounds; `None` leaves that side open.
pub fn date_in_range(value: DateTime<Utc>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let day = value.date_naive();
    from.is_none_or(|f| day >= f) && to.is_none_or(|t| day <= t)
}

/// Equality on an optional categorical filter; `None` matches everything.
pub fn equals<V: PartialEq>(value: &V, wanted: Option<&V>) -> bool {
    wanted.is_none_or(|w| w == value)
}

/// Parse an `<input type="date">` value
pub fn parse_date_input(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Why a list shows nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The fetch returned no records
    NoData,
    /// Records exist but the filters exclude all of them
    NoMatches,
}

impl EmptyState {
    pub fn message(&self, noun_plural: &str) -> String {
        match self {
            Self::NoData => format!("Nenhum(a) {noun_plural} cadastrado(a)."),
            Self::NoMatches => {
                format!("Nenhum(a) {noun_plural} corresponde aos filtros aplicados.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionView<T, F> {
    items: Option<Vec<T>>,
    filters: F,
    page: usize,
    page_size: usize,
}

impl<T: Clone, F: FilterSet<T>> CollectionView<T, F> {
    pub fn new(filters: F, page_size: usize) -> Self {
        Self {
            items: None,
            filters,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replace the fetched collection
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = Some(items);
        self.page = self.page.min(self.page_count()).max(1);
    }

    pub fn is_loaded(&self) -> bool {
        self.items.is_some()
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }

    /// Change filters; always returns to the first page
    pub fn set_filters(&mut self, filters: F) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn update_filters(&mut self, change: impl FnOnce(&mut F)) {
        change(&mut self.filters);
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Jump to a page, clamped to the available range
    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count().max(1));
    }

    pub fn total(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    pub fn filtered(&self) -> Vec<&T> {
        self.items
            .iter()
            .flatten()
            .filter(|item| self.filters.matches(item))
            .collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    pub fn page_count(&self) -> usize {
        self.filtered_count().div_ceil(self.page_size)
    }

    /// Items of the current page
    pub fn page_items(&self) -> Vec<T> {
        self.filtered()
            .into_iter()
            .skip((self.page - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect()
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        match &self.items {
            None => None,
            Some(items) if items.is_empty() => Some(EmptyState::NoData),
            Some(_) if self.filtered_count() == 0 => Some(EmptyState::NoMatches),
            Some(_) => None,
        }
    }
}
