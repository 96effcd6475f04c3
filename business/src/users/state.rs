//! View state for the user collection.
//!
//! `filtered_items` is derived from `items`, `filter` and `order`; every setter
//! that touches one of those recomputes it. Admin fetches are the exception, see
//! [`UsersState::set_items_unfiltered`].

use std::ops::Range;

use chrono::{DateTime, Utc};
use roster_states::State;

use crate::model::User;
use crate::users::filter::{SortOrder, filtered_collection};

pub const DEFAULT_PER_PAGE: usize = 20;

/// Zero-based page cursor over the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Always at least one page, even when empty.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.per_page.max(1)).max(1)
    }

    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page * self.per_page).min(total);
        let end = (start + self.per_page).min(total);
        start..end
    }

    fn clamp(&mut self, total: usize) {
        self.page = self.page.min(self.page_count(total) - 1);
    }
}

#[derive(Debug, Clone, Default)]
pub struct UsersState {
    items: Vec<User>,
    filter: String,
    order: SortOrder,
    showing_inactive: bool,
    fetches_in_flight: u32,
    filtered_items: Vec<User>,
    /// Single-record slot filled by `FetchUserCommand`; never merged into `items`.
    model: Option<User>,
    admin_stats: Option<serde_json::Value>,
    pagination: Pagination,
    last_fetch: Option<DateTime<Utc>>,
}

impl State for UsersState {}

impl UsersState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[User] {
        &self.items
    }

    pub fn filtered_items(&self) -> &[User] {
        &self.filtered_items
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn showing_inactive(&self) -> bool {
        self.showing_inactive
    }

    pub fn is_fetching(&self) -> bool {
        self.fetches_in_flight > 0
    }

    pub fn model(&self) -> Option<&User> {
        self.model.as_ref()
    }

    pub fn admin_stats(&self) -> Option<&serde_json::Value> {
        self.admin_stats.as_ref()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Replace the collection and recompute the filtered view.
    pub fn set_items(&mut self, items: Vec<User>, now: DateTime<Utc>) {
        self.items = items;
        self.last_fetch = Some(now);
        self.recompute_filtered();
    }

    /// Replace the collection without touching the filtered view.
    ///
    /// Used by the admin fetch; the filtered view catches up on the next filter,
    /// order or collection change.
    pub fn set_items_unfiltered(&mut self, items: Vec<User>, now: DateTime<Utc>) {
        self.items = items;
        self.last_fetch = Some(now);
    }

    pub fn set_admin_stats(&mut self, stats: serde_json::Value) {
        self.admin_stats = Some(stats);
    }

    pub fn set_model(&mut self, user: User) {
        self.model = Some(user);
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.pagination.page = 0;
        self.recompute_filtered();
    }

    pub fn set_order(&mut self, order: SortOrder) {
        self.order = order;
        self.pagination.page = 0;
        self.recompute_filtered();
    }

    pub fn toggle_order(&mut self) {
        self.set_order(self.order.toggled());
    }

    /// Switch between active and inactive users.
    ///
    /// Returns `true` when the flag changed; the caller must then re-dispatch
    /// `FetchCollectionCommand`, filtering alone cannot switch endpoints.
    pub fn set_showing_inactive(&mut self, showing_inactive: bool) -> bool {
        let changed = self.showing_inactive != showing_inactive;
        self.showing_inactive = showing_inactive;
        changed
    }

    pub fn recompute_filtered(&mut self) {
        self.filtered_items = filtered_collection(&self.items, &self.filter, self.order);
        self.pagination.clamp(self.filtered_items.len());
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.filtered_items.len())
    }

    /// The current page of the filtered view.
    pub fn page_items(&self) -> &[User] {
        &self.filtered_items[self.pagination.range(self.filtered_items.len())]
    }

    pub fn set_page(&mut self, page: usize) {
        self.pagination.page = page;
        self.pagination.clamp(self.filtered_items.len());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.pagination.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.pagination.page.saturating_sub(1));
    }

    pub fn set_per_page(&mut self, per_page: usize) {
        self.pagination.per_page = per_page.max(1);
        self.pagination.clamp(self.filtered_items.len());
    }

    /// Apply `f` to every copy of the record with `id`.
    ///
    /// Returns `false` when no copy exists.
    pub fn update_record(&mut self, id: &str, f: impl Fn(&mut User)) -> bool {
        let mut found = false;
        let copies = self
            .items
            .iter_mut()
            .chain(self.filtered_items.iter_mut())
            .chain(self.model.iter_mut());
        for user in copies.filter(|user| user.id.as_str() == id) {
            f(user);
            found = true;
        }
        found
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.fetches_in_flight += 1;
    }

    pub(crate) fn end_fetch(&mut self) {
        self.fetches_in_flight = self.fetches_in_flight.saturating_sub(1);
    }
}
