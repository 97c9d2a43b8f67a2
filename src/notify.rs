//! User-facing notifications.
//!
//! Toasts are fire-and-forget: the caller never inspects what the notifier
//! did with them.
use std::cell::RefCell;

use console::style;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// A short message with a title and a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

pub trait Notifier {
    fn notify(&self, toast: Toast);
}

/// Prints toasts to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        debug!("Toast: {:?}", toast);
        match toast.level {
            ToastLevel::Success => println!(
                "{} {}",
                style(&toast.title).green().bold(),
                toast.description
            ),
            ToastLevel::Error => eprintln!(
                "{} {}",
                style(&toast.title).red().bold(),
                toast.description
            ),
        }
    }
}

/// Keeps every toast it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: RefCell<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.borrow().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.borrow_mut().push(toast);
    }
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast)
    }
}
