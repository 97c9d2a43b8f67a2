//! State of one calendar view.
//!
//! Holds the displayed month, which day (if any) has the add dialog or the
//! day panel open, the add form, the edit state and the search term. Every
//! user action goes through here so that outcomes are reported as toasts.
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, warn};
use uuid::Uuid;

use crate::{
    export_file_name, CalError, Event, EventDraft, EventStore, GridCell, KeyValueStore,
    MonthCursor, Notifier, Result, Toast,
};

/// One cell of the rendered month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub cell: GridCell,
    pub is_today: bool,
    pub is_selected: bool,
    pub event_count: usize,
}

/// Everything the renderer needs to draw a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub cursor: MonthCursor,
    pub label: String,
    pub cells: Vec<CellView>,
}

pub struct CalendarWidget<S, N> {
    store: EventStore<S>,
    notifier: N,
    cursor: MonthCursor,
    /// Day whose add dialog is open
    selected_day: Option<u32>,
    /// Day whose event panel is open
    viewing_day: Option<u32>,
    /// Event whose edit form is shown
    editing: Option<Uuid>,
    form: EventDraft,
    search: String,
}

impl<S: KeyValueStore, N: Notifier> CalendarWidget<S, N> {
    /// Creates a widget showing the month that contains `today`.
    pub fn new(store: EventStore<S>, notifier: N, today: NaiveDate) -> Self {
        Self {
            store,
            notifier,
            cursor: MonthCursor::from_date(today),
            selected_day: None,
            viewing_day: None,
            editing: None,
            form: EventDraft::default(),
            search: String::new(),
        }
    }

    pub fn store(&self) -> &EventStore<S> {
        &self.store
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    /// Jumps straight to a month. Open dialogs and panels are closed.
    pub fn show_month(&mut self, cursor: MonthCursor) {
        debug!("Showing {}", cursor.label());
        self.cursor = cursor;
        self.selected_day = None;
        self.viewing_day = None;
        self.editing = None;
    }

    pub fn next_month(&mut self) {
        self.show_month(self.cursor.next());
    }

    pub fn prev_month(&mut self) {
        self.show_month(self.cursor.prev());
    }

    /// Computes the cells of the displayed month with counts and highlights.
    pub fn month_view(&self, today: NaiveDate) -> MonthView {
        let cells = self
            .cursor
            .grid()
            .into_iter()
            .map(|cell| match cell.day() {
                Some(day) => CellView {
                    cell,
                    is_today: self.cursor.is_today(day, today),
                    is_selected: self.viewing_day == Some(day),
                    event_count: self
                        .cursor
                        .date(day)
                        .map(|date| self.store.count_for_day(date))
                        .unwrap_or(0),
                },
                None => CellView {
                    cell,
                    is_today: false,
                    is_selected: false,
                    event_count: 0,
                },
            })
            .collect();

        MonthView {
            cursor: self.cursor,
            label: self.cursor.label(),
            cells,
        }
    }

    // Add dialog

    pub fn open_add(&mut self, day: u32) {
        self.selected_day = Some(day);
    }

    pub fn close_add(&mut self) {
        self.selected_day = None;
    }

    pub fn is_adding(&self) -> bool {
        self.selected_day.is_some()
    }

    pub fn form(&self) -> &EventDraft {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EventDraft {
        &mut self.form
    }

    /// Submits the add form for the selected day.
    ///
    /// Validation failures are reported as error toasts and yield `Ok(None)`.
    /// On success the form is reset and the dialog closed.
    pub fn submit_add(&mut self) -> Result<Option<Event>> {
        match self.store.add(&self.form, self.selected_day, self.cursor) {
            Ok(event) => {
                self.notifier.notify(Toast::success(
                    "Event added",
                    format!("'{}' on {}", event.name, event.day_label()),
                ));
                self.form = EventDraft::default();
                self.selected_day = None;
                Ok(Some(event))
            }
            Err(e) => self.reject("Could not add event", e),
        }
    }

    // Day panel

    pub fn open_day(&mut self, day: u32) {
        self.viewing_day = Some(day);
        self.search.clear();
    }

    pub fn close_day(&mut self) {
        self.viewing_day = None;
        self.editing = None;
        self.search.clear();
    }

    pub fn viewing_date(&self) -> Option<NaiveDate> {
        self.viewing_day.and_then(|day| self.cursor.date(day))
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Events of the open day, filtered by the current search term.
    pub fn day_events(&self) -> Vec<&Event> {
        match self.viewing_date() {
            Some(date) => self.store.search_day(date, &self.search),
            None => Vec::new(),
        }
    }

    // Editing

    /// Shows the edit form for `id`, returning the prefilled form data.
    pub fn begin_edit(&mut self, id: Uuid) -> Result<EventDraft> {
        let event = self
            .store
            .get(id)
            .ok_or_else(|| CalError::EventNotFound { id: id.to_string() })?;
        let draft = EventDraft::from(event);
        self.editing = Some(id);
        Ok(draft)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    /// Saves the edit form for the event being edited.
    pub fn submit_edit(&mut self, draft: &EventDraft) -> Result<Option<Event>> {
        let Some(id) = self.editing else {
            warn!("Edit submitted with no event being edited");
            return Ok(None);
        };

        match self.store.update(id, draft) {
            Ok(event) => {
                self.notifier
                    .notify(Toast::success("Event updated", format!("'{}'", event.name)));
                self.editing = None;
                Ok(Some(event))
            }
            Err(e) => self.reject("Could not update event", e),
        }
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Event> {
        let event = self.store.delete(id)?;
        if self.editing == Some(id) {
            self.editing = None;
        }
        self.notifier.notify(Toast::success(
            "Event deleted",
            format!("'{}' on {}", event.name, event.day_label()),
        ));
        Ok(event)
    }

    /// Exports the displayed month into `dir`.
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        let path = self.store.export(self.cursor, dir)?;
        self.notifier.notify(Toast::success(
            "Events exported",
            export_file_name(self.cursor),
        ));
        Ok(path)
    }

    /// Turns validation failures into an error toast; other errors propagate.
    fn reject(&self, title: &str, error: CalError) -> Result<Option<Event>> {
        if error.is_validation() {
            debug!("{}: {}", title, error);
            self.notifier.notify(Toast::error(title, error.to_string()));
            Ok(None)
        } else {
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventType, MemoryStore, RecordingNotifier, ToastLevel, DEFAULT_STORAGE_KEY};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()
    }

    fn widget<'a>(
        storage: &'a MemoryStore,
        notifier: &'a RecordingNotifier,
    ) -> CalendarWidget<&'a MemoryStore, &'a RecordingNotifier> {
        let store = EventStore::open(storage, DEFAULT_STORAGE_KEY).unwrap();
        CalendarWidget::new(store, notifier, today())
    }

    fn fill(widget: &mut CalendarWidget<&MemoryStore, &RecordingNotifier>, name: &str) {
        let form = widget.form_mut();
        form.name = name.to_string();
        form.start_time = "09:00".to_string();
        form.end_time = "10:00".to_string();
        form.event_type = EventType::Work;
    }

    #[test]
    fn test_month_view_marks_today_and_counts() {
        let storage = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut widget = widget(&storage, &notifier);

        widget.open_add(14);
        fill(&mut widget, "Valentine");
        widget.submit_add().unwrap();

        let view = widget.month_view(today());
        assert_eq!(view.label, "February 2024");
        assert_eq!(view.cells.len(), 4 + 29);
        let cell = &view.cells[4 + 13];
        assert_eq!(cell.cell, GridCell::Day(14));
        assert!(cell.is_today);
        assert_eq!(cell.event_count, 1);
        assert_eq!(view.cells.iter().filter(|c| c.is_today).count(), 1);

        widget.next_month();
        assert!(widget.month_view(today()).cells.iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_submit_add_resets_form_and_closes_dialog() {
        let storage = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut widget = widget(&storage, &notifier);

        widget.open_add(3);
        fill(&mut widget, "Dentist");
        let event = widget.submit_add().unwrap().unwrap();

        assert_eq!(event.day, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert!(!widget.is_adding());
        assert_eq!(widget.form(), &EventDraft::default());
        assert_eq!(notifier.last().unwrap().level, ToastLevel::Success);
    }

    #[test]
    fn test_submit_add_without_day_notifies_error() {
        let storage = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut widget = widget(&storage, &notifier);

        fill(&mut widget, "Dentist");
        assert_eq!(widget.submit_add().unwrap(), None);
        assert_eq!(notifier.last().unwrap().level, ToastLevel::Error);
        assert_eq!(widget.form().name, "Dentist");
        assert!(widget.store().events().is_empty());
    }

    #[test]
    fn test_invalid_times_keep_dialog_open() {
        let storage = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut widget = widget(&storage, &notifier);

        widget.open_add(3);
        fill(&mut widget, "Dentist");
        widget.form_mut().end_time = "08:00".to_string();
        assert_eq!(widget.submit_add().unwrap(), None);
        assert!(widget.is_adding());
        assert_eq!(notifier.toasts().len(), 1);
    }

    #[test]
    fn test_day_panel_search() {
        let storage = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut widget = widget(&storage, &notifier);

        for name in ["Standup", "Lunch", "Standup retro"] {
            widget.open_add(5);
            fill(&mut widget, name);
            widget.submit_add().unwrap();
        }

        assert!(widget.day_events().is_empty());
        widget.open_day(5);
        assert_eq!(widget.day_events().len(), 3);
        widget.set_search("stand");
        let names: Vec<&str> = widget.day_events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Standup", "Standup retro"]);

        widget.open_day(6);
        assert!(widget.day_events().is_empty());
    }

    #[test]
    fn test_edit_flow() {
        let storage = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut widget = widget(&storage, &notifier);

        widget.open_add(5);
        fill(&mut widget, "Standup");
        let event = widget.submit_add().unwrap().unwrap();

        let mut draft = widget.begin_edit(event.id).unwrap();
        assert_eq!(widget.editing(), Some(event.id));
        draft.start_time = "11:00".to_string();
        assert_eq!(widget.submit_edit(&draft).unwrap(), None);
        assert_eq!(widget.editing(), Some(event.id));

        draft.end_time = "11:30".to_string();
        let updated = widget.submit_edit(&draft).unwrap().unwrap();
        assert_eq!(widget.editing(), None);
        assert_eq!(updated.id, event.id);
        assert_eq!(widget.store().events(), &[updated]);
    }

    #[test]
    fn test_delete_notifies() {
        let storage = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut widget = widget(&storage, &notifier);

        widget.open_add(5);
        fill(&mut widget, "Standup");
        let event = widget.submit_add().unwrap().unwrap();

        widget.delete(event.id).unwrap();
        assert!(widget.store().events().is_empty());
        assert_eq!(notifier.last().unwrap().title, "Event deleted");
        assert!(widget.delete(event.id).is_err());
    }

    #[test]
    fn test_navigation_closes_panels() {
        let storage = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut widget = widget(&storage, &notifier);

        widget.open_add(5);
        widget.open_day(5);
        widget.prev_month();
        assert!(!widget.is_adding());
        assert_eq!(widget.viewing_date(), None);
        assert_eq!(widget.cursor(), MonthCursor::new(2024, 1).unwrap());
    }
}
