use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::context::validate_band_name;
use crate::models::{Band, EventDetails, PoolSong};

/// Style for a form value depending on focus and emptiness.
fn value_style(is_active: bool, is_empty: bool) -> Style {
    if is_active {
        Style::default().fg(Color::Yellow)
    } else if is_empty {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn field_line(field_name: &str, value: &str, placeholder: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };
    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, value_style(is_active, value.is_empty())),
    ])
}

/// What a single-line text form is collecting.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum TextPurpose {
    PoolSong,
    Announcement,
}

impl TextPurpose {
    pub(crate) fn title(self) -> &'static str {
        match self {
            TextPurpose::PoolSong => "Add Song",
            TextPurpose::Announcement => "Add MC",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            TextPurpose::PoolSong => "Title",
            TextPurpose::Announcement => "MC",
        }
    }
}

/// One-field form used for song titles and MC text.
#[derive(Clone)]
pub(crate) struct TextForm {
    pub(crate) purpose: TextPurpose,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl TextForm {
    pub(crate) fn new(purpose: TextPurpose) -> Self {
        Self {
            purpose,
            value: String::new(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Trimmed value, or an error when nothing but whitespace was typed.
    pub(crate) fn parse_input(&self) -> Result<String> {
        let value = self.value.trim();
        if value.is_empty() {
            return Err(anyhow!("{} is required.", self.purpose.label()));
        }
        Ok(value.to_string())
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        field_line(self.purpose.label(), &self.value, "<required>", true)
    }

    pub(crate) fn prefix_len(&self) -> usize {
        self.purpose.label().len() + 2
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Fields of the band profile form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BandField {
    #[default]
    Name,
    Logo,
}

#[derive(Default, Clone)]
pub(crate) struct BandForm {
    pub(crate) name: String,
    pub(crate) logo: String,
    pub(crate) active: BandField,
    pub(crate) error: Option<String>,
}

impl BandForm {
    pub(crate) fn from_band(band: Option<&Band>) -> Self {
        match band {
            Some(band) => Self {
                name: band.name.clone(),
                logo: band.logo.clone().unwrap_or_default(),
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BandField::Name => BandField::Logo,
            BandField::Logo => BandField::Name,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BandField::Name => self.name.push(ch),
            BandField::Logo => self.logo.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BandField::Name => {
                self.name.pop();
            }
            BandField::Logo => {
                self.logo.pop();
            }
        }
    }

    /// Validated name plus optional logo reference.
    pub(crate) fn parse_inputs(&self) -> Result<(String, Option<String>)> {
        let name = validate_band_name(&self.name)?;
        let logo = self.logo.trim();
        let logo = (!logo.is_empty()).then(|| logo.to_string());
        Ok((name, logo))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: BandField) -> Line<'static> {
        let (value, placeholder) = match field {
            BandField::Name => (&self.name, "<required>"),
            BandField::Logo => (&self.logo, "<optional path or URL>"),
        };
        field_line(field_name, value, placeholder, self.active == field)
    }

    pub(crate) fn value_len(&self, field: BandField) -> usize {
        match field {
            BandField::Name => self.name.chars().count(),
            BandField::Logo => self.logo.chars().count(),
        }
    }
}

/// Fields of the event details form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum EventField {
    #[default]
    Date,
    EventTitle,
    Venue,
}

#[derive(Default, Clone)]
pub(crate) struct EventForm {
    pub(crate) date: String,
    pub(crate) event_title: String,
    pub(crate) venue: String,
    pub(crate) active: EventField,
}

impl EventForm {
    pub(crate) fn from_details(details: &EventDetails) -> Self {
        Self {
            date: details.date.clone(),
            event_title: details.event_title.clone(),
            venue: details.venue.clone(),
            active: EventField::Date,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            EventField::Date => EventField::EventTitle,
            EventField::EventTitle => EventField::Venue,
            EventField::Venue => EventField::Date,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            EventField::Date => EventField::Venue,
            EventField::EventTitle => EventField::Date,
            EventField::Venue => EventField::EventTitle,
        };
    }

    fn active_value(&mut self) -> &mut String {
        match self.active {
            EventField::Date => &mut self.date,
            EventField::EventTitle => &mut self.event_title,
            EventField::Venue => &mut self.venue,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.active_value().push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.active_value().pop();
    }

    /// Details are saved as typed; completeness is only enforced on export.
    pub(crate) fn to_details(&self) -> EventDetails {
        EventDetails {
            date: self.date.trim().to_string(),
            venue: self.venue.trim().to_string(),
            event_title: self.event_title.trim().to_string(),
        }
    }

    pub(crate) fn build_line(&self, field_name: &str, field: EventField) -> Line<'static> {
        let value = match field {
            EventField::Date => &self.date,
            EventField::EventTitle => &self.event_title,
            EventField::Venue => &self.venue,
        };
        field_line(field_name, value, "<required for export>", self.active == field)
    }

    pub(crate) fn value_len(&self, field: EventField) -> usize {
        match field {
            EventField::Date => self.date.chars().count(),
            EventField::EventTitle => self.event_title.chars().count(),
            EventField::Venue => self.venue.chars().count(),
        }
    }
}

/// State for confirming permanent deletion of a pool song.
pub(crate) struct ConfirmSongDelete {
    pub(crate) song: PoolSong,
}
