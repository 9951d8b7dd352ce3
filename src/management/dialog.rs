use std::fmt;

use crate::{
    management::{RemovalError, TrackListManager, TrackSource},
    spotify::{ApiError, LibraryApi},
    types::Track,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Loading,
    ReadyNoDuplicates,
    ReadyWithDuplicates,
    Removing,
    DoneSuccess,
    DoneError,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Error,
}

/// One-line user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub variant: ToastVariant,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogError {
    /// The requested step is not allowed from the current state.
    InvalidTransition { from: DialogState },
    /// Every duplicate found is an unavailable entry that cannot be targeted.
    NothingRemovable { duplicates: usize },
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogError::InvalidTransition { from } => {
                write!(f, "not allowed while the dialog is {:?}", from)
            }
            DialogError::NothingRemovable { duplicates } => write!(
                f,
                "none of the {} duplicate tracks can be removed (unavailable tracks)",
                duplicates
            ),
        }
    }
}

impl std::error::Error for DialogError {}

/// State of the duplicate-removal dialog.
///
/// ```text
/// Loading -> ReadyNoDuplicates | ReadyWithDuplicates
/// ReadyWithDuplicates -> Removing -> DoneSuccess | DoneError
/// any state but Removing -> Dismissed
/// ```
#[derive(Debug, Clone)]
pub struct RemovalDialog {
    state: DialogState,
    duplicates: Vec<usize>,
}

impl Default for RemovalDialog {
    fn default() -> Self {
        Self::open()
    }
}

impl RemovalDialog {
    pub fn open() -> Self {
        Self {
            state: DialogState::Loading,
            duplicates: Vec::new(),
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn duplicates(&self) -> &[usize] {
        &self.duplicates
    }

    /// Stores the analysis result. Ignored once the dialog has moved on, so a
    /// late result for a dismissed dialog is dropped.
    pub fn finish_analysis(&mut self, duplicates: Vec<usize>) -> bool {
        if self.state != DialogState::Loading {
            return false;
        }
        self.state = if duplicates.is_empty() {
            DialogState::ReadyNoDuplicates
        } else {
            DialogState::ReadyWithDuplicates
        };
        self.duplicates = duplicates;
        true
    }

    /// The track list could not be loaded.
    pub fn fail_analysis(&mut self, error: &ApiError) -> Option<Toast> {
        if self.state != DialogState::Loading {
            return None;
        }
        self.state = DialogState::DoneError;
        Some(Toast {
            variant: ToastVariant::Error,
            message: format!("Error analyzing tracks: {}", error),
        })
    }

    pub fn begin_removal(&mut self) -> Result<(), DialogError> {
        if self.state != DialogState::ReadyWithDuplicates {
            return Err(DialogError::InvalidTransition { from: self.state });
        }
        self.state = DialogState::Removing;
        Ok(())
    }

    /// Settles a removal and produces its single notification.
    pub fn finish_removal(
        &mut self,
        result: &Result<usize, RemovalError>,
        library: bool,
    ) -> Result<Toast, DialogError> {
        if self.state != DialogState::Removing {
            return Err(DialogError::InvalidTransition { from: self.state });
        }

        let target = if library { "library" } else { "playlist" };
        let toast = match result {
            Ok(_) => {
                self.state = DialogState::DoneSuccess;
                self.duplicates.clear();
                Toast {
                    variant: ToastVariant::Success,
                    message: format!("Tracks removed from {}", target),
                }
            }
            Err(_) => {
                self.state = DialogState::DoneError;
                Toast {
                    variant: ToastVariant::Error,
                    message: format!("Error removing tracks from {}", target),
                }
            }
        };
        Ok(toast)
    }

    pub fn can_dismiss(&self) -> bool {
        self.state != DialogState::Removing
    }

    pub fn dismiss(&mut self) -> Result<(), DialogError> {
        if !self.can_dismiss() {
            return Err(DialogError::InvalidTransition { from: self.state });
        }
        self.state = DialogState::Dismissed;
        Ok(())
    }
}

/// Drives one duplicate cleanup: load and analyze, then remove on confirm.
pub struct DuplicateCleanup {
    dialog: RemovalDialog,
    list: Option<TrackListManager>,
}

impl DuplicateCleanup {
    /// Opens the dialog and runs the analysis. A load failure leaves the
    /// cleanup in `DoneError` together with the toast to show.
    pub async fn analyze(
        api: &dyn LibraryApi,
        token: &str,
        source: TrackSource,
    ) -> (Self, Option<Toast>) {
        let mut dialog = RemovalDialog::open();

        match TrackListManager::load(api, token, source).await {
            Ok(list) => {
                dialog.finish_analysis(list.duplicates());
                (
                    Self {
                        dialog,
                        list: Some(list),
                    },
                    None,
                )
            }
            Err(e) => {
                let toast = dialog.fail_analysis(&e);
                (Self { dialog, list: None }, toast)
            }
        }
    }

    pub fn dialog(&self) -> &RemovalDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut RemovalDialog {
        &mut self.dialog
    }

    pub fn list(&self) -> Option<&TrackListManager> {
        self.list.as_ref()
    }

    /// Duplicate tracks as shown to the user.
    pub fn duplicate_tracks(&self) -> Vec<&Track> {
        match &self.list {
            Some(list) => self
                .dialog
                .duplicates()
                .iter()
                .filter_map(|&i| list.tracks().get(i))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Removes every removable duplicate; the list is pruned only on success.
    ///
    /// When none of the duplicates can be targeted nothing is sent and the
    /// dialog stays in `ReadyWithDuplicates`.
    pub async fn confirm(
        &mut self,
        api: &dyn LibraryApi,
        token: &str,
    ) -> Result<(Toast, Result<usize, RemovalError>), DialogError> {
        let Some(list) = self.list.as_mut() else {
            return Err(DialogError::InvalidTransition {
                from: self.dialog.state(),
            });
        };

        if self.dialog.state() != DialogState::ReadyWithDuplicates {
            return Err(DialogError::InvalidTransition {
                from: self.dialog.state(),
            });
        }
        let targets = list.removable(self.dialog.duplicates());
        if targets.is_empty() {
            return Err(DialogError::NothingRemovable {
                duplicates: self.dialog.duplicates().len(),
            });
        }

        self.dialog.begin_removal()?;
        let result = list.remove(api, token, &targets).await;
        let toast = self
            .dialog
            .finish_removal(&result, list.source().is_library())?;

        Ok((toast, result))
    }
}
