//! Known event types, their show flags, and template selection.

use std::fmt;

use popnote_db::{Database, DbError};
use rand::Rng;
use rand::seq::SliceRandom;

use super::kinds;
use crate::host::PopupHost;
use crate::theme::{MASTER_TYPE, NotificationTemplate, Theme, ThemeRepository};

/// Priority bound; values outside `-MAX_PRIORITY..=MAX_PRIORITY` are clamped.
pub const MAX_PRIORITY: i32 = 9999;

/// Set of format tokens (the character after `%`) an event may expand.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TokenSet(u16);

impl TokenSet {
    /// Every token the text renderer understands, in bit order.
    pub const KNOWN: &'static str = "%YyMDdHhmsTtSRr";

    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self::from_tokens(Self::KNOWN)
    }

    /// Tokens usable without any event data (percent sign and clock).
    pub fn time_only() -> Self {
        Self::from_tokens("%YyMDdHhmsTt")
    }

    /// Build a set from token characters; unknown characters are ignored.
    pub fn from_tokens(tokens: &str) -> Self {
        tokens.chars().fold(Self::empty(), Self::with)
    }

    pub fn with(self, token: char) -> Self {
        match Self::bit(token) {
            Some(bit) => Self(self.0 | bit),
            None => self,
        }
    }

    pub fn contains(self, token: char) -> bool {
        Self::bit(token).is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn bit(token: char) -> Option<u16> {
        Self::KNOWN
            .chars()
            .position(|c| c == token)
            .map(|index| 1 << index)
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: String = Self::KNOWN.chars().filter(|c| self.contains(*c)).collect();
        write!(f, "TokenSet({tokens:?})")
    }
}

/// A notification type that can fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
    pub name: String,
    pub description: String,
    pub tokens: TokenSet,
    priority: i32,
    pub show: bool,
}

impl Event {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            description: String::new(),
            tokens: TokenSet::all(),
            priority: 0,
            show: true,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tokens(mut self, tokens: TokenSet) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.set_priority(priority);
        self
    }

    pub fn get_priority(&self) -> i32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority.clamp(-MAX_PRIORITY, MAX_PRIORITY);
    }
}

fn builtin_events() -> Vec<Event> {
    vec![
        Event::new(kinds::MASTER, "Master")
            .description("Fallback layout used when no other template matches"),
        Event::new(kinds::INFO, "Information").description("Informational messages"),
        Event::new(kinds::WARNING, "Warning")
            .description("Warnings")
            .priority(10),
        Event::new(kinds::ERROR, "Error")
            .description("Errors")
            .priority(20),
        Event::new(kinds::FATAL, "Fatal error")
            .description("Errors the sender cannot recover from")
            .priority(30),
    ]
}

/// Registered event types in registration order.
pub struct EventRegistry {
    events: Vec<Event>,
    db: Option<Database>,
}

impl EventRegistry {
    /// Registry with the built-in events and no persistence.
    pub fn new() -> Self {
        Self {
            events: builtin_events(),
            db: None,
        }
    }

    /// Registry with the built-in events whose show flags are restored from
    /// and saved to `db`.
    pub fn with_database(db: Database) -> Result<Self, DbError> {
        let mut registry = Self {
            events: builtin_events(),
            db: Some(db),
        };
        registry.load_prefs()?;
        Ok(registry)
    }

    fn load_prefs(&mut self) -> Result<(), DbError> {
        let Some(db) = &self.db else {
            return Ok(());
        };
        let prefs = db.event_prefs()?;
        for event in &mut self.events {
            if let Some(show) = prefs.get(&event.kind) {
                event.show = *show;
            }
        }
        tracing::debug!(stored = prefs.len(), "Loaded event preferences");
        Ok(())
    }

    /// Add a plugin event. Returns `false` if the type is already known.
    pub fn register(&mut self, mut event: Event) -> bool {
        if self.get(&event.kind).is_some() {
            tracing::debug!(kind = %event.kind, "Event type already registered");
            return false;
        }
        if let Some(db) = &self.db {
            match db.event_enabled(&event.kind) {
                Ok(Some(show)) => event.show = show,
                Ok(None) => {}
                Err(e) => tracing::warn!(kind = %event.kind, error = %e, "Failed to read event preference"),
            }
        }
        tracing::info!(kind = %event.kind, name = %event.name, "Registered event");
        self.events.push(event);
        true
    }

    pub fn unregister(&mut self, kind: &str) -> Option<Event> {
        let index = self.events.iter().position(|e| e.kind == kind)?;
        tracing::info!(kind, "Unregistered event");
        Some(self.events.remove(index))
    }

    pub fn get(&self, kind: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.kind == kind)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether a popup for `kind` may be created right now.
    pub fn should_show(&self, kind: &str, host: &dyn PopupHost) -> bool {
        if host.screensaver_active() {
            return false;
        }
        self.get(kind).is_some_and(|e| e.show)
    }

    /// Change and persist the show flag. Returns `false` for unknown types.
    pub fn set_show(&mut self, kind: &str, show: bool) -> Result<bool, DbError> {
        let Some(event) = self.events.iter_mut().find(|e| e.kind == kind) else {
            return Ok(false);
        };
        event.show = show;
        if let Some(db) = &self.db {
            db.set_event_enabled(kind, show)?;
        }
        tracing::debug!(kind, show, "Updated event show flag");
        Ok(true)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A template together with the theme that owns it.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRef<'a> {
    pub theme: &'a Theme,
    pub template: &'a NotificationTemplate,
}

/// Pick a template for `kind` uniformly among all loaded themes, falling
/// back to their master templates.
pub fn find_template_for_event<'a>(
    themes: &'a ThemeRepository,
    kind: &str,
) -> Option<TemplateRef<'a>> {
    find_template_for_event_with(themes, kind, &mut rand::thread_rng())
}

pub fn find_template_for_event_with<'a, R: Rng + ?Sized>(
    themes: &'a ThemeRepository,
    kind: &str,
    rng: &mut R,
) -> Option<TemplateRef<'a>> {
    let pool = |wanted: &str| -> Vec<TemplateRef<'a>> {
        themes
            .loaded()
            .iter()
            .flat_map(|theme| {
                theme
                    .templates
                    .iter()
                    .filter(move |t| t.kind == wanted)
                    .map(move |template| TemplateRef { theme, template })
            })
            .collect()
    };

    let mut candidates = pool(kind);
    if candidates.is_empty() && kind != MASTER_TYPE {
        tracing::debug!(kind, "No template for event, using master");
        candidates = pool(MASTER_TYPE);
    }
    candidates.choose(rng).copied()
}
