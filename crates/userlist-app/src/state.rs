// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::{AppMode, Directory, LoadError, LoadErrorKind, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub directory: Directory,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            directory: Directory::default(),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    EnterSearch,
    OpenCityPicker,
    ExitToNav,
    SetNameQuery(String),
    PushNameChar(char),
    PopNameChar,
    SetCityQuery(String),
    ResetFilters,
    NextPage,
    PrevPage,
    UsersLoaded {
        users: Vec<User>,
        fetched_at: OffsetDateTime,
    },
    LoadFailed(LoadError),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    FilterChanged { visible: usize },
    PageChanged(usize),
    UsersReplaced { count: usize },
    LoadFailed(LoadErrorKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::EnterSearch => self.set_mode(AppMode::Search),
            AppCommand::OpenCityPicker => {
                if self.directory.cities().is_empty() {
                    return vec![self.set_status("no cities to pick from")];
                }
                self.set_mode(AppMode::CityPicker)
            }
            AppCommand::ExitToNav => self.set_mode(AppMode::Nav),
            AppCommand::SetNameQuery(query) => {
                self.directory.set_name_query(query);
                vec![self.filter_changed()]
            }
            AppCommand::PushNameChar(ch) => {
                let mut query = self.directory.filter().name_query.clone();
                query.push(ch);
                self.directory.set_name_query(query);
                vec![self.filter_changed()]
            }
            AppCommand::PopNameChar => {
                let mut query = self.directory.filter().name_query.clone();
                if query.pop().is_none() {
                    return Vec::new();
                }
                self.directory.set_name_query(query);
                vec![self.filter_changed()]
            }
            AppCommand::SetCityQuery(city) => {
                self.directory.set_city_query(city);
                vec![self.filter_changed()]
            }
            AppCommand::ResetFilters => {
                self.directory.reset();
                vec![self.filter_changed(), self.set_status("filters reset")]
            }
            AppCommand::NextPage => {
                if self.directory.next_page() {
                    vec![AppEvent::PageChanged(self.directory.page_index())]
                } else {
                    Vec::new()
                }
            }
            AppCommand::PrevPage => {
                if self.directory.prev_page() {
                    vec![AppEvent::PageChanged(self.directory.page_index())]
                } else {
                    Vec::new()
                }
            }
            AppCommand::UsersLoaded { users, fetched_at } => {
                let count = users.len();
                self.directory.replace_users(users, fetched_at);
                let label = if count == 1 {
                    "loaded 1 user".to_owned()
                } else {
                    format!("loaded {count} users")
                };
                vec![AppEvent::UsersReplaced { count }, self.set_status(&label)]
            }
            AppCommand::LoadFailed(error) => {
                let kind = error.kind();
                let label = format!("load failed: {error}; press r to retry");
                self.directory.record_failure(error);
                vec![AppEvent::LoadFailed(kind), self.set_status(&label)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_mode(&mut self, mode: AppMode) -> Vec<AppEvent> {
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn filter_changed(&self) -> AppEvent {
        AppEvent::FilterChanged {
            visible: self.directory.visible_len(),
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
