//! CLI module for the monthcal application
//!
//! This module handles the command-line interface for interacting with the
//! calendar and its event store.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use chrono::{Datelike, Local, NaiveDate};
use log::{debug, info};
use shell_words::split;
use tempfile::Builder;
use uuid::Uuid;

use crate::{
    parse_date_arg, parse_month_arg, render_events, render_month, CalError, CalendarWidget,
    Commands, Config, ConsoleNotifier, EventStore, FileStore, MonthCursor, Result,
};

type Widget = CalendarWidget<FileStore, ConsoleNotifier>;

/// CLI Application handler - processes CLI commands against the calendar
pub struct App {
    /// Application configuration
    config: Config,

    /// Where the configuration is read from and saved to
    config_path: Option<PathBuf>,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given config
    pub fn new(config: Config, config_path: Option<PathBuf>, verbose: bool) -> Self {
        Self {
            config,
            config_path,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Show { month } => self.handle_show(month)?,

            Commands::Day { date, search, json } => self.handle_day(&date, search, json)?,

            Commands::Add {
                date,
                name,
                start,
                end,
                description,
                event_type,
                edit,
            } => {
                let description = match (description, edit) {
                    (Some(d), _) => d,
                    (None, true) => self.open_editor_for_description(&name, "")?,
                    (None, false) => String::new(),
                };
                self.handle_add(&date, name, start, end, description, &event_type)?
            }

            Commands::Edit {
                id,
                name,
                start,
                end,
                description,
                event_type,
            } => self.handle_edit(&id, name, start, end, description, event_type)?,

            Commands::Delete { id, force } => self.handle_delete(&id, force)?,

            Commands::Export { month, output } => self.handle_export(&month, output)?,

            Commands::Config { show, reset } => self.handle_config(show, reset)?,
        }

        Ok(())
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn open_widget(&self) -> Result<Widget> {
        let storage = FileStore::open(&self.config.data_dir)?;
        let store = EventStore::open(storage, self.config.storage_key.clone())?;
        if self.verbose {
            println!(
                "Loaded {} events from {}",
                store.events().len(),
                self.config.data_dir.display()
            );
        }
        Ok(CalendarWidget::new(store, ConsoleNotifier, Self::today()))
    }

    fn handle_show(&self, month: Option<String>) -> Result<()> {
        let mut widget = self.open_widget()?;
        if let Some(month) = month {
            widget.show_month(parse_month_arg(&month)?);
        }

        print!("{}", render_month(&widget.month_view(Self::today())));
        Ok(())
    }

    fn handle_day(&self, date: &str, search: Option<String>, json: bool) -> Result<()> {
        let date = parse_date_arg(date)?;
        let mut widget = self.open_widget()?;
        widget.show_month(MonthCursor::from_date(date));
        widget.open_day(date.day());
        if let Some(term) = search {
            widget.set_search(term);
        }

        let events = widget.day_events();
        if json {
            println!("{}", serde_json::to_string_pretty(&events)?);
            return Ok(());
        }

        if events.is_empty() {
            println!("No events on {}.", crate::format_day_label(date));
            return Ok(());
        }

        print!("{}", render_events(&events));
        println!(
            "\n{} event{}",
            events.len(),
            if events.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn handle_add(
        &self,
        date: &str,
        name: String,
        start: String,
        end: String,
        description: String,
        event_type: &str,
    ) -> Result<()> {
        let date = parse_date_arg(date)?;
        let mut widget = self.open_widget()?;
        widget.show_month(MonthCursor::from_date(date));
        widget.open_add(date.day());

        let form = widget.form_mut();
        form.name = name;
        form.start_time = start;
        form.end_time = end;
        form.description = description;
        form.event_type = event_type.parse()?;

        match widget.submit_add()? {
            Some(event) => {
                println!("Event created with ID: {}", event.id);
                Ok(())
            }
            None => Err(CalError::ApplicationError {
                message: "Event was not added".to_string(),
            }),
        }
    }

    fn handle_edit(
        &self,
        id: &str,
        name: Option<String>,
        start: Option<String>,
        end: Option<String>,
        description: Option<String>,
        event_type: Option<String>,
    ) -> Result<()> {
        let id = parse_id(id)?;
        let mut widget = self.open_widget()?;
        let mut draft = widget.begin_edit(id)?;

        if let Some(name) = name {
            draft.name = name;
        }
        if let Some(start) = start {
            draft.start_time = start;
        }
        if let Some(end) = end {
            draft.end_time = end;
        }
        if let Some(description) = description {
            draft.description = description;
        }
        if let Some(event_type) = event_type {
            draft.event_type = event_type.parse()?;
        }

        match widget.submit_edit(&draft)? {
            Some(event) => {
                debug!("Edited event {}", event.id);
                Ok(())
            }
            None => Err(CalError::ApplicationError {
                message: "Event was not updated".to_string(),
            }),
        }
    }

    fn handle_delete(&self, id: &str, force: bool) -> Result<()> {
        let id = parse_id(id)?;
        let mut widget = self.open_widget()?;

        let event = widget
            .store()
            .get(id)
            .cloned()
            .ok_or_else(|| CalError::EventNotFound { id: id.to_string() })?;

        if !force {
            println!("You are about to delete the following event:");
            println!("ID:    {}", event.id);
            println!("Name:  {}", event.name);
            println!("Day:   {}", event.day_label());

            print!("\nAre you sure you want to delete this event? [y/N]: ");
            stdout().flush().map_err(CalError::Io)?;

            let mut input = String::new();
            stdin().read_line(&mut input).map_err(CalError::Io)?;

            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        widget.delete(id)?;
        Ok(())
    }

    fn handle_export(&self, month: &str, output: Option<PathBuf>) -> Result<()> {
        let cursor = parse_month_arg(month)?;
        let mut widget = self.open_widget()?;
        widget.show_month(cursor);

        let dir = output.unwrap_or_else(|| self.config.export_dir.clone());
        let path = widget.export(&dir)?;
        println!("{}", path.display());
        Ok(())
    }

    fn handle_config(&self, show: bool, reset: bool) -> Result<()> {
        if reset {
            let path = self.config_path.clone().ok_or_else(|| CalError::ConfigError {
                message: "No configuration path available".to_string(),
            })?;
            Config::default().save(&path)?;
            println!("Configuration reset: {}", path.display());
            return Ok(());
        }

        if show && self.verbose {
            if let Some(path) = &self.config_path {
                println!("Configuration file: {}", path.display());
            }
        }
        println!("{}", serde_json::to_string_pretty(&self.config)?);
        Ok(())
    }

    fn open_editor_for_description(&self, title: &str, existing: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".txt").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;
            writeln!(file, "# Description for: {}", title)?;
            writeln!(file, "# Lines starting with # are ignored.")?;
            write!(file, "{}", existing)?;
        }

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to write the description. Save and exit when done...");
        launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(strip_comment_lines(&content))
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| CalError::InvalidFormat {
        message: format!("Invalid event ID: {}", id),
    })
}

fn launch_editor(editor_cmd: &str, file_path: &Path) -> Result<()> {
    let args = split(editor_cmd).map_err(|e| CalError::EditorError {
        message: format!("Failed to parse editor command: {}", e),
    })?;

    let (program, rest) = args.split_first().ok_or_else(|| CalError::EditorError {
        message: "Empty editor command".to_string(),
    })?;

    let status = Command::new(program).args(rest).arg(file_path).status()?;

    if !status.success() {
        return Err(CalError::EditorError {
            message: "Editor exited with non-zero status".to_string(),
        });
    }

    Ok(())
}

fn strip_comment_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<&str>>()
        .join("\n")
        .trim()
        .to_string()
}
