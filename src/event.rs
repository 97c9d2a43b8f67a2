//! Core data structures for the monthcal application.
//!
//! This module contains the calendar event record and the form data used to
//! create or edit one.
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{format_day_label, format_time, normalize_name, parse_day, parse_time, CalError, Result};

/// Category of an event, drives its display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Work,
    Personal,
    #[default]
    Others,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Work => "work",
            EventType::Personal => "personal",
            EventType::Others => "others",
        }
    }

    /// Color used when rendering events of this type.
    pub fn color(&self) -> console::Color {
        match self {
            EventType::Work => console::Color::Blue,
            EventType::Personal => console::Color::Green,
            EventType::Others => console::Color::Yellow,
        }
    }

    /// Lenient parse used for stored records: anything unrecognised is `Others`.
    fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for EventType {
    type Err = CalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "work" => Ok(EventType::Work),
            "personal" => Ok(EventType::Personal),
            "others" | "other" => Ok(EventType::Others),
            _ => Err(CalError::InvalidFormat {
                message: format!(
                    "Unknown event type '{}'. Must be one of: work, personal, others",
                    s
                ),
            }),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(EventType::from_stored(&value))
    }
}

/// A calendar event as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredEvent", rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier assigned at creation
    pub id: Uuid,
    /// Event title
    pub name: String,
    #[serde(serialize_with = "serialize_hhmm")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "serialize_hhmm")]
    pub end_time: NaiveTime,
    pub description: String,
    /// The calendar day the event belongs to
    pub day: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: EventType,
}

impl Event {
    /// Creates an event from validated form data.
    pub fn new(draft: &EventDraft, day: NaiveDate) -> Result<Self> {
        let (start_time, end_time) = draft.validate()?;

        Ok(Event {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            start_time,
            end_time,
            description: draft.description.clone(),
            day,
            event_type: draft.event_type,
        })
    }

    /// Human-readable day label, e.g. `5 March 2024`.
    pub fn day_label(&self) -> String {
        format_day_label(self.day)
    }

    /// Whether this event occupies the same (name, day) slot.
    pub fn conflicts_with(&self, name: &str, day: NaiveDate) -> bool {
        self.day == day && normalize_name(&self.name) == normalize_name(name)
    }
}

/// On-disk shape of an event. Accepts legacy records that carry a day label
/// instead of an ISO date, have no id, or have an empty type.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEvent {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
    start_time: String,
    end_time: String,
    #[serde(default)]
    description: String,
    day: String,
    #[serde(rename = "type", default)]
    event_type: Option<String>,
}

impl TryFrom<StoredEvent> for Event {
    type Error = CalError;

    fn try_from(stored: StoredEvent) -> Result<Self> {
        let day = parse_day(&stored.day).ok_or_else(|| CalError::InvalidFormat {
            message: format!("unparseable day '{}'", stored.day),
        })?;

        Ok(Event {
            // Fresh ids only stick once `EventStore::load` writes them back.
            id: stored.id.unwrap_or_else(Uuid::new_v4),
            name: stored.name,
            start_time: parse_time(&stored.start_time)?,
            end_time: parse_time(&stored.end_time)?,
            description: stored.description,
            day,
            event_type: stored
                .event_type
                .as_deref()
                .map(EventType::from_stored)
                .unwrap_or_default(),
        })
    }
}

/// Form data for creating or editing an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub event_type: EventType,
}

impl EventDraft {
    /// Checks the title and time range, returning the parsed times.
    pub fn validate(&self) -> Result<(NaiveTime, NaiveTime)> {
        if self.name.trim().is_empty() {
            return Err(CalError::EmptyTitle);
        }

        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;

        if start >= end {
            return Err(CalError::InvalidTimeRange {
                start: format_time(start),
                end: format_time(end),
            });
        }

        Ok((start, end))
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        EventDraft {
            name: event.name.clone(),
            start_time: format_time(event.start_time),
            end_time: format_time(event.end_time),
            description: event.description.clone(),
            event_type: event.event_type,
        }
    }
}

fn serialize_hhmm<S: serde::Serializer>(
    time: &NaiveTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_time(*time))
}
