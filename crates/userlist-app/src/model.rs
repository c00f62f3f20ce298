// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;
use time::OffsetDateTime;

use crate::ids::UserId;

/// Rows shown per page of the visible set.
pub const PAGE_SIZE: usize = 5;

/// Label of the city selector entry that removes the city constraint.
pub const ALL_CITIES_LABEL: &str = "All Cities";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub city: String,
}

/// Active filter predicates. An empty field places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub name_query: String,
    pub city_query: String,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.name_query.is_empty() && self.city_query.is_empty()
    }

    pub fn city_constraint(&self) -> Option<&str> {
        if self.city_query.is_empty() {
            None
        } else {
            Some(&self.city_query)
        }
    }

    /// Name compared case-insensitively by substring, city by exact equality.
    pub fn matches(&self, user: &User) -> bool {
        if !self.name_query.is_empty()
            && !user
                .name
                .to_lowercase()
                .contains(&self.name_query.to_lowercase())
        {
            return false;
        }

        match self.city_constraint() {
            Some(city) => user.city == city,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    Network,
    Decode,
}

impl LoadErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Decode => "decode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Transport failure or non-success status.
    #[error("request to {endpoint} failed: {reason}")]
    Network { endpoint: String, reason: String },
    /// Body did not match the expected user list shape.
    #[error("unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl LoadError {
    pub fn network(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub const fn kind(&self) -> LoadErrorKind {
        match self {
            Self::Network { .. } => LoadErrorKind::Network,
            Self::Decode { .. } => LoadErrorKind::Decode,
        }
    }
}

/// Outcome of the most recent load attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loaded {
        count: usize,
        fetched_at: OffsetDateTime,
    },
    Failed(LoadError),
}

impl LoadStatus {
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub const fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(error) => Some(error),
            Self::NotLoaded | Self::Loaded { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Search,
    CityPicker,
}

impl AppMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nav => "NAV",
            Self::Search => "SEARCH",
            Self::CityPicker => "CITY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterState, LoadError, LoadErrorKind, LoadStatus, User};
    use crate::UserId;

    fn user(name: &str, city: &str) -> User {
        User {
            id: UserId::new(1),
            name: name.to_owned(),
            email: String::new(),
            city: city.to_owned(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = FilterState::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&user("Anyone", "Anywhere")));
    }

    #[test]
    fn name_query_ignores_case_both_ways() {
        let filter = FilterState {
            name_query: "LeAN".to_owned(),
            city_query: String::new(),
        };
        assert!(filter.matches(&user("Leanne Graham", "Gwenborough")));
        assert!(filter.matches(&user("Kathleen LEANNE", "McKenziehaven")));
        assert!(!filter.matches(&user("Ervin Howell", "Wisokyburgh")));
    }

    #[test]
    fn city_query_is_exact_and_case_sensitive() {
        let filter = FilterState {
            name_query: String::new(),
            city_query: "NYC".to_owned(),
        };
        assert!(filter.matches(&user("Alice", "NYC")));
        assert!(!filter.matches(&user("Alice", "nyc")));
        assert!(!filter.matches(&user("Alice", "NYC East")));
    }

    #[test]
    fn load_error_kind_and_message() {
        let error = LoadError::network("http://example.test/users", "server returned 503");
        assert_eq!(error.kind(), LoadErrorKind::Network);
        assert_eq!(
            error.to_string(),
            "request to http://example.test/users failed: server returned 503"
        );

        let decode = LoadError::decode("http://example.test/users", "expected array");
        assert_eq!(decode.kind().as_str(), "decode");
        assert_eq!(LoadStatus::Failed(decode.clone()).error(), Some(&decode));
    }
}
