// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Filter and pagination engine over the fetched user list.
//!
//! [`Directory`] owns the full user set and the active filters. The visible
//! subset is stored as indices into the full set and recomputed inside every
//! mutating method, so it never drifts from its inputs.

use std::collections::HashSet;
use time::OffsetDateTime;

use crate::model::{FilterState, LoadError, LoadStatus, PAGE_SIZE, User};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    users: Vec<User>,
    cities: Vec<String>,
    filter: FilterState,
    visible: Vec<usize>,
    page_index: usize,
    load_status: LoadStatus,
}

/// One page of the visible set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    pub index: usize,
    pub page_count: usize,
    pub rows: Vec<&'a User>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Page<'_> {
    pub const fn number(&self) -> usize {
        self.index + 1
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Indices of `users` that satisfy `filter`, in their original order.
pub fn recompute_visible(users: &[User], filter: &FilterState) -> Vec<usize> {
    users
        .iter()
        .enumerate()
        .filter(|(_, user)| filter.matches(user))
        .map(|(index, _)| index)
        .collect()
}

/// Distinct cities in first-seen order.
pub fn city_options(users: &[User]) -> Vec<String> {
    let mut seen = HashSet::new();
    users
        .iter()
        .filter(|user| seen.insert(user.city.as_str()))
        .map(|user| user.city.clone())
        .collect()
}

pub const fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>, fetched_at: OffsetDateTime) -> Self {
        let mut directory = Self::default();
        directory.replace_users(users, fetched_at);
        directory
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub const fn page_index(&self) -> usize {
        self.page_index
    }

    pub const fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_users(&self) -> impl Iterator<Item = &User> + '_ {
        self.visible.iter().map(|index| &self.users[*index])
    }

    /// Replaces the full set after a successful load. Filters are cleared.
    pub fn replace_users(&mut self, users: Vec<User>, fetched_at: OffsetDateTime) {
        self.cities = city_options(&users);
        self.users = users;
        self.filter = FilterState::default();
        self.load_status = LoadStatus::Loaded {
            count: self.users.len(),
            fetched_at,
        };
        self.refresh();
        tracing::debug!(
            users = self.users.len(),
            cities = self.cities.len(),
            "user list replaced"
        );
    }

    /// Records a failed load. Previously loaded users stay in place.
    pub fn record_failure(&mut self, error: LoadError) {
        tracing::debug!(kind = error.kind().as_str(), "load failure recorded");
        self.load_status = LoadStatus::Failed(error);
    }

    pub fn set_name_query(&mut self, query: impl Into<String>) {
        self.filter.name_query = query.into();
        self.refresh();
    }

    /// An empty string removes the city constraint.
    pub fn set_city_query(&mut self, city: impl Into<String>) {
        self.filter.city_query = city.into();
        self.refresh();
    }

    pub fn reset(&mut self) {
        self.filter = FilterState::default();
        self.refresh();
    }

    /// Returns whether the page moved.
    pub fn next_page(&mut self) -> bool {
        if (self.page_index + 1) * PAGE_SIZE < self.visible.len() {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether the page moved.
    pub fn prev_page(&mut self) -> bool {
        if self.page_index > 0 {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn has_next_page(&self) -> bool {
        (self.page_index + 1) * PAGE_SIZE < self.visible.len()
    }

    pub const fn has_prev_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn current_page(&self) -> Page<'_> {
        let start = (self.page_index * PAGE_SIZE).min(self.visible.len());
        let end = (start + PAGE_SIZE).min(self.visible.len());
        Page {
            index: self.page_index,
            page_count: page_count(self.visible.len()),
            rows: self.visible[start..end]
                .iter()
                .map(|index| &self.users[*index])
                .collect(),
            has_prev: self.has_prev_page(),
            has_next: self.has_next_page(),
        }
    }

    fn refresh(&mut self) {
        self.visible = recompute_visible(&self.users, &self.filter);
        self.page_index = 0;
    }
}
