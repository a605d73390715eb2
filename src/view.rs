use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::form::{CategoryFields, MetadataRow, UploadFields};
use crate::types::{Category, UploadFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormId {
    Upload,
    CreateCategory,
}

/// Select boxes that list categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectId {
    UploadCategory,
    CategoryParent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn root() -> Self {
        Self { value: String::new(), label: "Root".to_string() }
    }
}

/// Options for a category select: `Root` first, then one per category in the given order.
pub fn category_options(categories: &[Category]) -> Vec<SelectOption> {
    std::iter::once(SelectOption::root())
        .chain(categories.iter().map(|c| SelectOption { value: c.path.clone(), label: c.name.clone() }))
        .collect()
}

/// Everything the panel reads from or writes to its forms.
pub trait PanelView: Send + Sync {
    fn set_loading(&self, form: FormId, loading: bool);

    fn category_selects(&self) -> Vec<SelectId>;
    fn clear_select(&self, select: SelectId);
    fn add_option(&self, select: SelectId, option: SelectOption);

    fn upload_fields(&self) -> UploadFields;
    fn metadata_rows(&self) -> Vec<MetadataRow>;
    fn add_metadata_row(&self);
    fn category_fields(&self) -> CategoryFields;

    fn set_progress_visible(&self, visible: bool);
    fn set_progress_width(&self, percent: f64);
}

/// A mutation applied to a `MemoryView`, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Loading(FormId, bool),
    SelectCleared(SelectId),
    OptionAdded(SelectId, SelectOption),
    MetadataRowAdded,
    ProgressVisible(bool),
    ProgressWidth(f64),
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub loading: HashMap<FormId, bool>,
    pub selects: HashMap<SelectId, Vec<SelectOption>>,
    pub upload: UploadFields,
    pub metadata: Vec<MetadataRow>,
    pub category: CategoryFields,
    pub progress_visible: bool,
    pub progress_width: f64,
    pub events: Vec<ViewEvent>,
}

/// In-memory form model; records every mutation.
#[derive(Debug, Default)]
pub struct MemoryView {
    state: Mutex<ViewState>,
}

impl MemoryView {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, state: &mut ViewState, event: ViewEvent) {
        tracing::trace!(?event, "view");
        state.events.push(event);
    }

    pub fn snapshot(&self) -> ViewState { self.lock().clone() }

    pub fn events(&self) -> Vec<ViewEvent> { self.lock().events.clone() }

    pub fn options(&self, select: SelectId) -> Vec<SelectOption> {
        self.lock().selects.get(&select).cloned().unwrap_or_default()
    }

    pub fn is_loading(&self, form: FormId) -> bool {
        self.lock().loading.get(&form).copied().unwrap_or(false)
    }

    /// Number of loading mark/unmark calls seen for `form`.
    pub fn loading_calls(&self, form: FormId) -> usize {
        self.lock().events.iter().filter(|e| matches!(e, ViewEvent::Loading(f, _) if *f == form)).count()
    }

    pub fn fill_upload(&self, name: &str, description: &str, category: &str, file: Option<UploadFile>) {
        self.lock().upload = UploadFields {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            file,
        };
    }

    /// Set the name/value of an existing metadata row; out-of-range indexes are ignored.
    pub fn fill_metadata_row(&self, index: usize, name: &str, value: &str) {
        if let Some(row) = self.lock().metadata.get_mut(index) {
            *row = MetadataRow::new(name, value);
        }
    }

    pub fn fill_category(&self, name: &str, parent: &str, description: &str) {
        self.lock().category = CategoryFields {
            name: name.to_string(),
            parent: parent.to_string(),
            description: description.to_string(),
        };
    }
}

impl PanelView for MemoryView {
    fn set_loading(&self, form: FormId, loading: bool) {
        let mut s = self.lock();
        s.loading.insert(form, loading);
        self.record(&mut s, ViewEvent::Loading(form, loading));
    }

    fn category_selects(&self) -> Vec<SelectId> {
        vec![SelectId::UploadCategory, SelectId::CategoryParent]
    }

    fn clear_select(&self, select: SelectId) {
        let mut s = self.lock();
        s.selects.entry(select).or_default().clear();
        self.record(&mut s, ViewEvent::SelectCleared(select));
    }

    fn add_option(&self, select: SelectId, option: SelectOption) {
        let mut s = self.lock();
        s.selects.entry(select).or_default().push(option.clone());
        self.record(&mut s, ViewEvent::OptionAdded(select, option));
    }

    fn upload_fields(&self) -> UploadFields { self.lock().upload.clone() }

    fn metadata_rows(&self) -> Vec<MetadataRow> { self.lock().metadata.clone() }

    fn add_metadata_row(&self) {
        let mut s = self.lock();
        s.metadata.push(MetadataRow::default());
        self.record(&mut s, ViewEvent::MetadataRowAdded);
    }

    fn category_fields(&self) -> CategoryFields { self.lock().category.clone() }

    fn set_progress_visible(&self, visible: bool) {
        let mut s = self.lock();
        s.progress_visible = visible;
        self.record(&mut s, ViewEvent::ProgressVisible(visible));
    }

    fn set_progress_width(&self, percent: f64) {
        let mut s = self.lock();
        s.progress_width = percent;
        self.record(&mut s, ViewEvent::ProgressWidth(percent));
    }
}
