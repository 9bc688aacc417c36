//! One firing of an event.

use std::fmt;
use std::rc::Rc;

use super::registry::Event;

/// Callback run when the user activates the "open" action on a popup.
pub type OpenAction = Rc<dyn Fn(&EventInfo)>;

/// Runtime data carried by one firing of an [`Event`].
#[derive(Clone)]
pub struct EventInfo {
    pub event: Event,
    pub source: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub open_action: Option<OpenAction>,
}

impl EventInfo {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            source: None,
            title: None,
            content: None,
            open_action: None,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn on_open(mut self, action: impl Fn(&EventInfo) + 'static) -> Self {
        self.open_action = Some(Rc::new(action));
        self
    }

    pub fn kind(&self) -> &str {
        &self.event.kind
    }

    /// Run the open action. Returns `false` if none is set.
    pub fn open(&self) -> bool {
        match &self.open_action {
            Some(action) => {
                action(self);
                true
            }
            None => false,
        }
    }

    /// Placeholder data used by theme previews.
    pub fn sample(event: Event) -> Self {
        let title = event.name.clone();
        Self::new(event)
            .source("popnote")
            .title(title)
            .content("This is a preview notification")
    }
}

impl fmt::Debug for EventInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventInfo")
            .field("kind", &self.event.kind)
            .field("source", &self.source)
            .field("title", &self.title)
            .field("content", &self.content)
            .field("open_action", &self.open_action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn open_action_runs_with_info() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let info = EventInfo::new(Event::new("info", "Info"))
            .title("Hi")
            .on_open(move |info| {
                assert_eq!(info.title.as_deref(), Some("Hi"));
                counter.set(counter.get() + 1);
            });
        assert!(info.open());
        assert!(info.clone().open());
        assert_eq!(hits.get(), 2);
        assert!(!EventInfo::new(Event::new("info", "Info")).open());
    }

    #[test]
    fn sample_fills_text_fields() {
        let info = EventInfo::sample(Event::new("error", "Error"));
        assert_eq!(info.kind(), "error");
        assert_eq!(info.title.as_deref(), Some("Error"));
        assert!(info.content.is_some());
    }
}
