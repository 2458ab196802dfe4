//! The list/edit/view state machine shared by the post and talking
//! screens.
//!
//! Confirmations and alerts are explicit [`Modal`] state instead of
//! blocking dialogs; while one is open only [`ContentManager::confirm`],
//! [`ContentManager::decline`] and [`ContentManager::dismiss`] are
//! accepted.

use std::fmt;

use chrono::{DateTime, Utc};
use entity::id::RecordId;
use repository::{Record, Table};
use supabase::TableStore;
use tracing::{error, info};

/// What a manager needs to know about the records it edits.
pub trait ContentKind: fmt::Debug + Clone + Send + Sync + 'static {
    type Record: Record + fmt::Debug + PartialEq;
    /// Raw editor fields, exactly as typed.
    type Form: fmt::Debug + Clone + Default + PartialEq + Send + Sync;

    /// Singular noun for messages, e.g. "post".
    const NOUN: &'static str;
    const PLURAL: &'static str;

    fn form_for(record: Option<&Self::Record>) -> Self::Form;

    /// Builds what gets stored. `now` is used only for new records.
    fn draft(
        form: &Self::Form,
        original: Option<&Self::Record>,
        now: DateTime<Utc>,
    ) -> <Self::Record as Record>::Draft;
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Editor<K: ContentKind> {
    /// `None` while creating.
    pub original: Option<K::Record>,
    pub form: K::Form,
    pub preview: bool,
}

impl<K: ContentKind> Editor<K> {
    fn new(original: Option<K::Record>) -> Self {
        Self {
            form: K::form_for(original.as_ref()),
            original,
            preview: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View<K: ContentKind> {
    List,
    Edit(Editor<K>),
    Viewing(K::Record),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    ConfirmDelete(RecordId),
    ConfirmCancel,
    Alert(String),
}

impl Modal {
    pub fn message(&self, noun: &str) -> String {
        match self {
            Modal::ConfirmDelete(_) => format!(
                "Are you sure you want to delete this {}? This cannot be undone.",
                noun
            ),
            Modal::ConfirmCancel => {
                "Discard your changes? Unsaved edits will be lost.".to_string()
            }
            Modal::Alert(message) => message.clone(),
        }
    }

    pub fn is_confirmation(&self) -> bool {
        !matches!(self, Modal::Alert(_))
    }
}

/// An action that does not fit the current state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ManagerError {
    #[error("a dialog is open")]
    ModalOpen,
    #[error("no record with id {0} in the list")]
    UnknownRecord(RecordId),
    #[error("not editing")]
    NotEditing,
}

type Action = Result<(), ManagerError>;

pub struct ContentManager<S, K: ContentKind> {
    table: Table<S, K::Record>,
    records: Vec<K::Record>,
    load: LoadState,
    view: View<K>,
    modal: Option<Modal>,
}

impl<S: fmt::Debug, K: ContentKind> fmt::Debug for ContentManager<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentManager")
            .field("records", &self.records.len())
            .field("load", &self.load)
            .field("view", &self.view)
            .field("modal", &self.modal)
            .finish()
    }
}

impl<S: TableStore, K: ContentKind> ContentManager<S, K> {
    pub fn new(table: Table<S, K::Record>) -> Self {
        Self {
            table,
            records: vec![],
            load: LoadState::Loading,
            view: View::List,
            modal: None,
        }
    }

    /// A new manager with its list already fetched.
    pub async fn mount(table: Table<S, K::Record>) -> Self {
        let mut manager = Self::new(table);
        manager.load().await;
        manager
    }

    pub fn records(&self) -> &[K::Record] {
        &self.records
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn view(&self) -> &View<K> {
        &self.view
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub(crate) fn table(&self) -> &Table<S, K::Record> {
        &self.table
    }

    fn ensure_no_modal(&self) -> Action {
        match self.modal {
            Some(_) => Err(ManagerError::ModalOpen),
            None => Ok(()),
        }
    }

    fn find(&self, id: &RecordId) -> Result<K::Record, ManagerError> {
        let from_viewer = match &self.view {
            View::Viewing(record) if record.id() == id => Some(record),
            _ => None,
        };

        from_viewer
            .or_else(|| self.records.iter().find(|r| r.id() == id))
            .cloned()
            .ok_or_else(|| ManagerError::UnknownRecord(id.clone()))
    }

    pub(crate) fn show(&mut self, record: K::Record) -> Action {
        self.ensure_no_modal()?;
        self.view = View::Viewing(record);
        Ok(())
    }

    pub(crate) fn alert(&mut self, message: String) {
        self.modal = Some(Modal::Alert(message));
    }

    /// Re-fetches the whole list. A failure leaves no stale rows behind.
    pub async fn load(&mut self) -> bool {
        self.load = LoadState::Loading;

        match self.table.find_all().await {
            Ok(records) => {
                self.records = records;
                self.load = LoadState::Loaded;
                true
            }
            Err(e) => {
                error!(task = "load", kind = K::NOUN, err = e.to_string());
                self.records.clear();
                self.load = LoadState::Failed(format!(
                    "Failed to load {}, please try again later.",
                    K::PLURAL
                ));
                false
            }
        }
    }

    pub async fn retry(&mut self) -> bool {
        self.load().await
    }

    pub fn create_new(&mut self) -> Action {
        self.ensure_no_modal()?;
        self.view = View::Edit(Editor::new(None));
        Ok(())
    }

    pub fn edit(&mut self, id: &RecordId) -> Action {
        self.ensure_no_modal()?;
        let record = self.find(id)?;
        self.view = View::Edit(Editor::new(Some(record)));
        Ok(())
    }

    pub fn back_to_list(&mut self) -> Action {
        self.ensure_no_modal()?;
        self.view = View::List;
        Ok(())
    }

    fn editor_mut(&mut self) -> Result<&mut Editor<K>, ManagerError> {
        match &mut self.view {
            View::Edit(editor) => Ok(editor),
            _ => Err(ManagerError::NotEditing),
        }
    }

    /// Replaces the editor's form, e.g. after a helper edited the content.
    pub fn set_form(&mut self, form: K::Form) -> Action {
        self.ensure_no_modal()?;
        self.editor_mut()?.form = form;
        Ok(())
    }

    /// Keeps `form` and flips between the form and its preview.
    pub fn toggle_preview(&mut self, form: K::Form) -> Action {
        self.ensure_no_modal()?;
        let editor = self.editor_mut()?;
        editor.form = form;
        editor.preview = !editor.preview;
        Ok(())
    }

    /// Creates or updates, then reloads and returns to the list. On
    /// failure an alert opens and the editor keeps `form`.
    pub async fn save(&mut self, form: K::Form) -> Action {
        self.ensure_no_modal()?;
        let editor = self.editor_mut()?;
        editor.form = form;

        let draft = K::draft(&editor.form, editor.original.as_ref(), Utc::now());
        let target = editor.original.as_ref().map(|r| r.id().clone());

        let result = match &target {
            Some(id) => self.table.update(id, &draft).await,
            None => self.table.create(&draft).await,
        };

        match result {
            Ok(record) => {
                info!(task = "save", kind = K::NOUN, id = %record.id());
                self.load().await;
                self.view = View::List;
            }
            Err(e) => {
                error!(task = "save", kind = K::NOUN, err = e.to_string());
                self.alert(format!(
                    "Failed to save the {}: {}",
                    K::NOUN,
                    e.message()
                ));
            }
        }
        Ok(())
    }

    pub fn request_delete(&mut self, id: &RecordId) -> Action {
        self.ensure_no_modal()?;
        let record = self.find(id)?;
        self.modal = Some(Modal::ConfirmDelete(record.id().clone()));
        Ok(())
    }

    /// Keeps `form` and asks before throwing the edits away.
    pub fn request_cancel(&mut self, form: K::Form) -> Action {
        self.ensure_no_modal()?;
        self.editor_mut()?.form = form;
        self.modal = Some(Modal::ConfirmCancel);
        Ok(())
    }

    /// Accepts the open confirmation. An open alert is just closed.
    pub async fn confirm(&mut self) {
        match self.modal.take() {
            Some(Modal::ConfirmDelete(id)) => match self.table.delete(&id).await {
                Ok(()) => {
                    info!(task = "delete", kind = K::NOUN, id = %id);
                    if matches!(&self.view, View::Viewing(r) if r.id() == &id)
                    {
                        self.view = View::List;
                    }
                    self.load().await;
                }
                Err(e) => {
                    error!(task = "delete", kind = K::NOUN, err = e.to_string());
                    self.alert(format!(
                        "Failed to delete the {}: {}",
                        K::NOUN,
                        e.message()
                    ));
                }
            },
            Some(Modal::ConfirmCancel) => self.view = View::List,
            Some(Modal::Alert(_)) | None => {}
        }
    }

    /// Declines the open confirmation; nothing else happens.
    pub fn decline(&mut self) {
        if self.modal.as_ref().is_some_and(Modal::is_confirmation) {
            self.modal = None;
        }
    }

    pub fn dismiss(&mut self) {
        if matches!(self.modal, Some(Modal::Alert(_))) {
            self.modal = None;
        }
    }
}
