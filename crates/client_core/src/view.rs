//! Presentation model derived from the session state.

use shared::domain::FolderPath;

use crate::{config::Settings, controller::SessionState, format::truncate_folder_path};

pub const APP_TITLE: &str = "SD Sync!";
pub const SOURCE_PLACEHOLDER: &str = "Select source folder";
pub const DESTINATION_PLACEHOLDER: &str = "Select destination folder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Selection {
        source_label: String,
        destination_label: String,
        can_start: bool,
    },
    Progress {
        finished: bool,
        copied: u64,
        skipped: u64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub screen: Screen,
}

impl SessionView {
    pub fn from_state(state: &SessionState, settings: &Settings) -> Self {
        let screen = match state {
            SessionState::Idle {
                source,
                destination,
            } => Screen::Selection {
                source_label: folder_label(
                    source.as_ref(),
                    settings.source_label_width,
                    SOURCE_PLACEHOLDER,
                ),
                destination_label: folder_label(
                    destination.as_ref(),
                    settings.destination_label_width,
                    DESTINATION_PLACEHOLDER,
                ),
                can_start: source.is_some() && destination.is_some(),
            },
            SessionState::Running { counters } => Screen::Progress {
                finished: false,
                copied: counters.copied,
                skipped: counters.skipped,
            },
            SessionState::Finished { counters } => Screen::Progress {
                finished: true,
                copied: counters.copied,
                skipped: counters.skipped,
            },
            SessionState::Errored { message } => Screen::Error {
                message: message.clone(),
            },
        };
        Self { screen }
    }

    pub fn headline(&self) -> String {
        match &self.screen {
            Screen::Selection { .. } => APP_TITLE.to_string(),
            Screen::Progress { finished: true, .. } => "Finished copying files".to_string(),
            Screen::Progress { finished: false, .. } => "Copying files".to_string(),
            Screen::Error { .. } => "Error".to_string(),
        }
    }

    /// Second line under the headline; the selection screen has none.
    pub fn summary(&self) -> Option<String> {
        match &self.screen {
            Screen::Selection { .. } => None,
            Screen::Progress {
                copied, skipped, ..
            } => {
                let mut summary = format!("Copied {copied} files");
                if *skipped > 0 {
                    summary.push_str(&format!(", skipped {skipped} files"));
                }
                Some(summary)
            }
            Screen::Error { message } => Some(message.clone()),
        }
    }
}

fn folder_label(path: Option<&FolderPath>, width: usize, placeholder: &str) -> String {
    match path {
        Some(path) => truncate_folder_path(path.as_str(), width),
        None => placeholder.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
