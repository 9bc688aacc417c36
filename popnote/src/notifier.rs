//! The engine front door: from a fired event to a popup on screen.

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use popnote_db::{Database, DbError};

use crate::config::PopupConfig;
use crate::display::{DisplayId, DisplayManager};
use crate::event::{
    EventBus, EventInfo, EventRegistry, NotificationSink, find_template_for_event,
};
use crate::host::PopupHost;
use crate::render::render_template;
use crate::theme::ThemeRepository;

/// Owns the event registry, theme repository, observers and displays.
pub struct Notifier {
    host: Rc<dyn PopupHost>,
    db: Option<Database>,
    events: EventRegistry,
    themes: ThemeRepository,
    bus: EventBus,
    displays: DisplayManager,
}

impl Notifier {
    /// Notifier without persistence or themes.
    pub fn new(host: Rc<dyn PopupHost>, config: PopupConfig) -> Self {
        Self {
            displays: DisplayManager::new(Rc::clone(&host), config),
            host,
            db: None,
            events: EventRegistry::new(),
            themes: ThemeRepository::new(),
            bus: EventBus::new(),
        }
    }

    /// Restore event preferences, scan the theme roots and reload the
    /// themes that were active last time.
    pub fn init(
        host: Rc<dyn PopupHost>,
        db: Database,
        config: PopupConfig,
        user_theme_root: &Path,
    ) -> Result<Self, DbError> {
        let events = EventRegistry::with_database(db.clone())?;
        let mut themes = ThemeRepository::new();
        let probed = themes.scan(&config.system_theme_dir, user_theme_root);
        let loaded = themes.load_saved_list(&db)?;
        tracing::info!(probed, loaded, "Notifier initialized");

        Ok(Self {
            displays: DisplayManager::new(Rc::clone(&host), config),
            host,
            db: Some(db),
            events,
            themes,
            bus: EventBus::new(),
        })
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventRegistry {
        &mut self.events
    }

    pub fn themes(&self) -> &ThemeRepository {
        &self.themes
    }

    pub fn themes_mut(&mut self) -> &mut ThemeRepository {
        &mut self.themes
    }

    pub fn displays(&self) -> &DisplayManager {
        &self.displays
    }

    pub fn displays_mut(&mut self) -> &mut DisplayManager {
        &mut self.displays
    }

    pub fn subscribe(&mut self, sink: impl NotificationSink + 'static) {
        self.bus.subscribe(sink);
    }

    pub fn set_config(&mut self, config: PopupConfig) {
        self.displays.set_config(config);
    }

    /// Fresh [`EventInfo`] for a registered event type.
    pub fn event_info(&self, kind: &str) -> Option<EventInfo> {
        self.events.get(kind).cloned().map(EventInfo::new)
    }

    /// Show a popup for `info`. Returns `None` when the event is suppressed
    /// or no popup could be produced.
    pub fn notify(&mut self, info: EventInfo) -> Option<DisplayId> {
        let kind = info.kind().to_string();
        if !self.events.should_show(&kind, self.host.as_ref()) {
            tracing::debug!(kind, "Notification suppressed");
            return None;
        }

        self.bus.publish(&info);

        let Some(found) = find_template_for_event(&self.themes, &kind) else {
            tracing::warn!(kind, "No loaded theme has a template for this event");
            return None;
        };
        let image = match render_template(found.template, found.theme, &info, self.host.as_ref()) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(kind, theme = %found.theme.display_name(), error = %e, "Render failed");
                return None;
            }
        };
        self.displays.show(info, image)
    }

    /// Drive timers forward by `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) {
        self.displays.advance(elapsed);
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.displays.next_deadline()
    }

    /// Persist the loaded theme list and close every popup.
    pub fn shutdown(&mut self) -> Result<(), DbError> {
        self.displays.shutdown();
        if let Some(db) = &self.db {
            self.themes.save_loaded_list(db)?;
        }
        tracing::info!("Notifier shut down");
        Ok(())
    }
}
