//! Presentation state for a volunteer gallery session.
//!
//! A [`Gallery`] wraps a shared [`Directory`] plus the per-session UI state
//! (query, view mode, open dialogs). Front ends translate user input into
//! [`Intent`]s, call [`Gallery::dispatch`], show the returned [`Notice`]s and
//! render [`Gallery::snapshot`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;

use crate::errors::Result;
use crate::projector::{self, Query};
use crate::reconciler::{CreateOutcome, Directory, LoadOutcome};
use crate::record::{CreatePayload, VolunteerRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "list" => Ok(Self::List),
            other => Err(format!("unknown view mode '{other}' (expected grid or list)")),
        }
    }
}

/// User actions understood by [`Gallery::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SetSearch(String),
    SetCategory(Option<String>),
    ClearFilters,
    ToggleViewMode,
    SetViewMode(ViewMode),
    RequestAdd,
    SubmitNew(CreatePayload),
    CancelAdd,
    ViewDetail(String),
    CloseDetail,
    RequestDelete(String),
    ConfirmDelete,
    CancelDelete,
}

/// Transient notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Default)]
struct GalleryState {
    query: Query,
    view_mode: ViewMode,
    add_form_open: bool,
    delete_target: Option<String>,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    pub records: Vec<VolunteerRecord>,
    pub total: usize,
    pub categories: Vec<String>,
    pub query: Query,
    pub selected: Option<VolunteerRecord>,
    pub delete_target: Option<VolunteerRecord>,
    pub view_mode: ViewMode,
    pub add_form_open: bool,
    pub loading: bool,
    pub summary: String,
}

impl GalleryView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct Gallery {
    directory: Arc<Directory>,
    state: GalleryState,
}

impl Gallery {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self {
            directory,
            state: GalleryState::default(),
        }
    }

    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.view_mode
    }

    /// Reload the list. A pending delete whose record did not survive the
    /// reload is dropped, so a later `ConfirmDelete` does nothing.
    pub async fn load(&mut self) -> Result<LoadOutcome> {
        let outcome = self.directory.load().await?;
        if let Some(id) = self.state.delete_target.take() {
            if self.directory.find(&id).await.is_some() {
                self.state.delete_target = Some(id);
            } else {
                tracing::debug!(%id, "dropping stale delete target");
            }
        }
        Ok(outcome)
    }

    /// Apply `intent` and return the notices it produced.
    pub async fn dispatch(&mut self, intent: Intent) -> Vec<Notice> {
        tracing::debug!(?intent, "dispatch");
        self.apply(intent).await
    }

    async fn apply(&mut self, intent: Intent) -> Vec<Notice> {
        match intent {
            Intent::SetSearch(term) => {
                self.state.query.search = term;
                Vec::new()
            }
            Intent::SetCategory(category) => {
                self.state.query.category = category;
                Vec::new()
            }
            Intent::ClearFilters => {
                self.state.query.clear();
                Vec::new()
            }
            Intent::ToggleViewMode => {
                self.state.view_mode = self.state.view_mode.toggle();
                Vec::new()
            }
            Intent::SetViewMode(mode) => {
                self.state.view_mode = mode;
                Vec::new()
            }
            Intent::RequestAdd => {
                self.state.add_form_open = true;
                self.directory.clear_selection().await;
                Vec::new()
            }
            Intent::CancelAdd => {
                self.state.add_form_open = false;
                Vec::new()
            }
            Intent::SubmitNew(payload) => self.submit(payload).await,
            Intent::ViewDetail(id) => {
                if self.directory.select(&id).await {
                    Vec::new()
                } else {
                    vec![Notice::Error(format!("Volunteer {id} not found"))]
                }
            }
            Intent::CloseDetail => {
                self.directory.clear_selection().await;
                Vec::new()
            }
            Intent::RequestDelete(id) => {
                if self.directory.find(&id).await.is_some() {
                    self.state.delete_target = Some(id);
                    Vec::new()
                } else {
                    vec![Notice::Error(format!("Volunteer {id} not found"))]
                }
            }
            Intent::CancelDelete => {
                self.state.delete_target = None;
                Vec::new()
            }
            Intent::ConfirmDelete => self.confirm_delete().await,
        }
    }

    async fn submit(&mut self, payload: CreatePayload) -> Vec<Notice> {
        match self.directory.create_with_fallback(&payload, Utc::now()).await {
            Ok(outcome) => {
                self.state.add_form_open = false;
                let mut notices = Vec::new();
                if let Some(record) = outcome.record() {
                    notices.push(Notice::Success(format!(
                        "Volunteer {} added successfully!",
                        record.name
                    )));
                }
                if matches!(outcome, CreateOutcome::LocalFallback { .. }) {
                    notices.push(Notice::Error(
                        "Saved locally: remote directory unavailable".to_string(),
                    ));
                }
                notices
            }
            // Form stays open so the user can correct the input.
            Err(e) => vec![Notice::Error(e.to_string())],
        }
    }

    async fn confirm_delete(&mut self) -> Vec<Notice> {
        let Some(id) = self.state.delete_target.take() else {
            return Vec::new();
        };
        let outcome = self.directory.delete(&id).await;
        let mut notices = vec![Notice::Success("Volunteer deleted successfully".to_string())];
        if !outcome.remote_confirmed() {
            notices.push(Notice::Error(
                "Deleted locally: remote directory unavailable".to_string(),
            ));
        }
        notices
    }

    /// Current frame.
    pub async fn snapshot(&self) -> GalleryView {
        let all = self.directory.records().await;
        let records = projector::project(&all, &self.state.query);
        let delete_target = match &self.state.delete_target {
            Some(id) => all.iter().find(|r| &r.id == id).cloned(),
            None => None,
        };
        let summary = projector::result_summary(records.len(), all.len(), &self.state.query);

        GalleryView {
            total: all.len(),
            categories: projector::categories(&all),
            query: self.state.query.clone(),
            selected: self.directory.selected().await,
            delete_target,
            view_mode: self.state.view_mode,
            add_form_open: self.state.add_form_open,
            loading: self.directory.is_loading(),
            summary,
            records,
        }
    }
}
