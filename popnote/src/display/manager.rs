//! Creation, animation, stacking and retirement of popups.

use std::rc::Rc;
use std::time::Duration;

use image::RgbaImage;
use popnote_image::{alpha_mask, crop, has_alpha};

use super::animation::{AnimationPlan, TICK};
use super::position::{crop_origin, place, stack_extent};
use super::{ClickOutcome, Display, DisplayId, DisplaySnapshot, DisplayState, ManagerStats};
use crate::config::{MouseAction, MouseButton, PopupConfig, StackAxis};
use crate::event::EventInfo;
use crate::geometry::{Rect, usable_area};
use crate::host::PopupHost;
use crate::timer::{TimerHandle, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    /// One reveal or hide step.
    Animate,
    /// Fully shown time is over, start hiding.
    Hide,
    /// Non-animated popup expired.
    Destroy,
}

#[derive(Debug, Clone, Copy)]
struct DisplayTimer {
    id: DisplayId,
    kind: TimerKind,
}

/// Owner of every live [`Display`]. List order is stacking order.
pub struct DisplayManager {
    host: Rc<dyn PopupHost>,
    config: PopupConfig,
    plan: AnimationPlan,
    timers: TimerQueue<DisplayTimer>,
    displays: Vec<Display>,
    next_id: u64,
    stats: ManagerStats,
}

impl DisplayManager {
    pub fn new(host: Rc<dyn PopupHost>, config: PopupConfig) -> Self {
        let plan = AnimationPlan::new(config.duration());
        Self {
            host,
            config,
            plan,
            timers: TimerQueue::new(),
            displays: Vec::new(),
            next_id: 1,
            stats: ManagerStats::default(),
        }
    }

    pub fn config(&self) -> &PopupConfig {
        &self.config
    }

    /// Apply new preferences. Live displays keep their timers but are
    /// restacked for the new corner/axis/screen.
    pub fn set_config(&mut self, config: PopupConfig) {
        self.plan = AnimationPlan::new(config.duration());
        self.config = config;
        self.reposition_all();
    }

    pub fn plan(&self) -> &AnimationPlan {
        &self.plan
    }

    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    pub fn get(&self, id: DisplayId) -> Option<&Display> {
        self.displays.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    pub fn stats(&self) -> ManagerStats {
        self.stats
    }

    pub fn snapshot(&self) -> Vec<DisplaySnapshot> {
        self.displays.iter().map(Display::snapshot).collect()
    }

    /// Virtual clock in milliseconds.
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Time until the next timer fires, `None` when idle.
    pub fn next_deadline(&self) -> Option<Duration> {
        let deadline = self.timers.next_deadline()?;
        Some(Duration::from_millis(deadline.saturating_sub(self.timers.now())))
    }

    /// Put a rendered notification on screen. Returns `None` when the
    /// screen saver is active.
    pub fn show(&mut self, info: EventInfo, image: RgbaImage) -> Option<DisplayId> {
        if self.host.screensaver_active() {
            tracing::debug!(kind = %info.kind(), "Screen saver active, dropping popup");
            return None;
        }

        let throttle = self.config.throttle;
        while throttle > 0 && self.displays.len() >= throttle {
            let oldest = self.displays[0].id;
            tracing::debug!(display = %oldest, throttle, "Throttle reached, evicting oldest popup");
            self.stats.evicted += 1;
            self.destroy_at(0);
        }

        let id = DisplayId(self.next_id);
        self.next_id += 1;

        let (width, height) = image.dimensions();
        let surface = self.host.create_surface(width, height);
        let alpha = has_alpha(&image);
        let animate = self.config.animate;

        let (state, visible, timer) = if animate {
            let visible = self.partial_image(&image, 0);
            let timer = self.arm(id, TimerKind::Animate);
            (DisplayState::Showing, visible, timer)
        } else {
            let timer = self.arm(id, TimerKind::Destroy);
            (DisplayState::Shown, image.clone(), timer)
        };

        tracing::info!(
            display = %id,
            kind = %info.kind(),
            width,
            height,
            animate,
            "Showing popup"
        );

        self.displays.push(Display {
            id,
            info,
            full: image,
            visible,
            has_alpha: alpha,
            state,
            round: 0,
            position: (0, 0),
            pressed: None,
            timer: Some(timer),
            surface,
        });
        self.stats.created += 1;

        let index = self.displays.len() - 1;
        self.present(index);
        Some(id)
    }

    fn arm(&self, id: DisplayId, kind: TimerKind) -> TimerHandle {
        let payload = DisplayTimer { id, kind };
        match kind {
            TimerKind::Animate => self.timers.schedule_repeating(TICK, payload),
            TimerKind::Hide => self.timers.schedule_once(self.plan.shown_time(), payload),
            TimerKind::Destroy => self.timers.schedule_once(self.config.duration(), payload),
        }
    }

    /// Move the clock forward by `elapsed`, firing every timer that falls
    /// due on the way.
    pub fn advance(&mut self, elapsed: Duration) {
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let until = self.timers.now().saturating_add(ms);
        while let Some(timer) = self.timers.pop_due(until) {
            self.fire(timer);
        }
        self.timers.advance_to(until);
    }

    fn fire(&mut self, timer: DisplayTimer) {
        let Some(index) = self.index_of(timer.id) else {
            tracing::debug!(display = %timer.id, "Timer for a display that is gone");
            return;
        };

        match (timer.kind, self.displays[index].state) {
            (TimerKind::Animate, DisplayState::Showing) => {
                let rounds = self.plan.rounds() as i32;
                let round = self.displays[index].round + 1;
                if round > rounds {
                    let handle = self.arm(timer.id, TimerKind::Hide);
                    let display = &mut self.displays[index];
                    display.round = rounds - 1;
                    display.state = DisplayState::Shown;
                    display.visible = display.full.clone();
                    display.timer = Some(handle);
                    tracing::debug!(display = %timer.id, "Popup fully shown");
                } else {
                    let visible = self.partial_image(&self.displays[index].full, round);
                    let display = &mut self.displays[index];
                    display.round = round;
                    display.visible = visible;
                }
                self.present(index);
            }
            (TimerKind::Animate, DisplayState::Hiding) => {
                let round = self.displays[index].round - 1;
                if round <= 0 {
                    self.destroy_at(index);
                    return;
                }
                let visible = self.partial_image(&self.displays[index].full, round);
                let display = &mut self.displays[index];
                display.round = round;
                display.visible = visible;
                self.present(index);
            }
            (TimerKind::Hide, DisplayState::Shown) => {
                tracing::debug!(display = %timer.id, "Hiding popup");
                let handle = self.arm(timer.id, TimerKind::Animate);
                let display = &mut self.displays[index];
                display.state = DisplayState::Hiding;
                display.timer = Some(handle);
            }
            (TimerKind::Destroy, _) => self.destroy_at(index),
            (kind, state) => {
                tracing::debug!(display = %timer.id, ?kind, ?state, "Ignoring stale timer");
            }
        }
    }

    /// Crop of `full` revealed at animation `round`.
    fn partial_image(&self, full: &RgbaImage, round: i32) -> RgbaImage {
        let (full_w, full_h) = full.dimensions();
        let (w, h) = match self.config.stack {
            StackAxis::Vertical => (full_w, self.plan.extent(full_h, round)),
            StackAxis::Horizontal => (self.plan.extent(full_w, round), full_h),
        };
        let (x, y) = crop_origin(self.config.corner, self.config.stack, full_w, full_h, w, h);
        crop(full, x, y, w, h)
    }

    fn area(&self) -> Rect {
        usable_area(&self.host.monitors(), self.config.screen).unwrap_or_else(|| {
            tracing::debug!("Host reports no monitors");
            Rect::default()
        })
    }

    fn offset_before(&self, index: usize) -> u32 {
        self.displays[..index]
            .iter()
            .map(|d| {
                let (w, h) = d.size();
                stack_extent(self.config.stack, w, h)
            })
            .sum()
    }

    /// Push the display's current buffer to its surface and move it into
    /// its stacking slot.
    fn present(&mut self, index: usize) {
        let area = self.area();
        let offset = self.offset_before(index);
        let (corner, stack) = (self.config.corner, self.config.stack);

        let display = &mut self.displays[index];
        let (w, h) = display.visible.dimensions();
        display.position = place(area, corner, stack, offset, w, h);
        display.surface.set_image(&display.visible);
        if display.has_alpha {
            display.surface.set_shape(Some(&alpha_mask(&display.visible)));
        }
        display.surface.move_to(display.position.0, display.position.1);
        display.surface.queue_redraw();
    }

    /// Recompute every position from scratch in list order.
    fn reposition_all(&mut self) {
        self.stats.reposition_passes += 1;
        let area = self.area();
        let (corner, stack) = (self.config.corner, self.config.stack);
        let mut offset = 0;
        for display in &mut self.displays {
            let (w, h) = display.size();
            let position = place(area, corner, stack, offset, w, h);
            if position != display.position {
                display.position = position;
                display.surface.move_to(position.0, position.1);
            }
            offset += stack_extent(stack, w, h);
        }
    }

    fn index_of(&self, id: DisplayId) -> Option<usize> {
        self.displays.iter().position(|d| d.id == id)
    }

    fn destroy_at(&mut self, index: usize) {
        let mut removed = self.displays.remove(index);
        removed.state = DisplayState::Destroyed;
        removed.timer = None;
        let (id, kind) = (removed.id, removed.info.kind().to_string());
        drop(removed);
        tracing::debug!(display = %id, kind, "Destroyed popup");
        self.stats.destroyed += 1;
        self.reposition_all();
    }

    /// Remove a popup immediately. Returns `false` for unknown ids.
    pub fn destroy(&mut self, id: DisplayId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.destroy_at(index);
                true
            }
            None => {
                tracing::debug!(display = %id, "Destroy of unknown popup");
                false
            }
        }
    }

    pub fn button_press(&mut self, id: DisplayId, button: MouseButton) -> bool {
        let Some(index) = self.index_of(id) else {
            tracing::debug!(display = %id, "Press on unknown popup");
            return false;
        };
        self.displays[index].pressed = Some(button);
        true
    }

    /// Release of `button` at screen position (`x`, `y`).
    pub fn button_release(
        &mut self,
        id: DisplayId,
        button: MouseButton,
        x: i32,
        y: i32,
    ) -> ClickOutcome {
        let Some(index) = self.index_of(id) else {
            tracing::debug!(display = %id, "Release on unknown popup");
            return ClickOutcome::Ignored;
        };
        let display = &mut self.displays[index];
        let pressed = display.pressed.take();
        if pressed != Some(button) || !display.bounds().contains(x, y) {
            return ClickOutcome::Ignored;
        }

        let action = self.config.action_for(button);
        tracing::debug!(display = %id, ?button, %action, "Popup clicked");
        match action {
            MouseAction::None => ClickOutcome::Ignored,
            MouseAction::Open => {
                let info = self.displays[index].info.clone();
                self.destroy_at(index);
                if !info.open() {
                    tracing::debug!(display = %id, "Popup has no open action");
                }
                ClickOutcome::Opened
            }
            MouseAction::Close => {
                self.destroy_at(index);
                ClickOutcome::Closed
            }
            MouseAction::Context => {
                self.displays[index].timer = None;
                ClickOutcome::ContextMenu
            }
        }
    }

    /// Re-arm the timer suspended by a context menu: the animation tick
    /// while revealing or hiding, the auto-hide timer once shown.
    pub fn context_menu_closed(&mut self, id: DisplayId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let display = &self.displays[index];
        if display.timer.is_some() {
            return false;
        }
        let kind = match display.state {
            DisplayState::Showing | DisplayState::Hiding => TimerKind::Animate,
            DisplayState::Shown if self.config.animate => TimerKind::Hide,
            DisplayState::Shown => TimerKind::Destroy,
            DisplayState::Destroyed => return false,
        };
        let handle = self.arm(id, kind);
        self.displays[index].timer = Some(handle);
        true
    }

    /// Destroy every popup.
    pub fn shutdown(&mut self) {
        let count = self.displays.len();
        self.displays.clear();
        self.stats.destroyed += count as u64;
        if count > 0 {
            tracing::info!(count, "Closed all popups");
        }
    }
}

impl Drop for DisplayManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Corner;
    use crate::event::Event;
    use crate::geometry::Monitor;
    use crate::host::HeadlessHost;
    use image::Rgba;
    use std::cell::Cell;

    fn config(animate: bool, throttle: usize) -> PopupConfig {
        PopupConfig {
            animate,
            throttle,
            duration_secs: 8,
            ..PopupConfig::default()
        }
    }

    fn manager(config: PopupConfig) -> (Rc<HeadlessHost>, DisplayManager) {
        let host = Rc::new(HeadlessHost::single_monitor());
        let shared: Rc<dyn PopupHost> = host.clone();
        (host, DisplayManager::new(shared, config))
    }

    fn info(kind: &str) -> EventInfo {
        EventInfo::new(Event::new(kind, kind)).title("t")
    }

    fn image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([200, 200, 200, 255]))
    }

    #[test]
    fn static_popups_stack_and_expire() {
        let (host, mut dm) = manager(config(false, 0));
        let first = dm.show(info("info"), image(120, 140)).unwrap();
        dm.advance(Duration::from_secs(1));
        let second = dm.show(info("error"), image(120, 140)).unwrap();

        assert_eq!(dm.get(first).unwrap().state(), DisplayState::Shown);
        assert_eq!(dm.get(first).unwrap().position(), (1800, 940));
        assert_eq!(dm.get(second).unwrap().position(), (1800, 800));

        dm.advance(Duration::from_secs(7));
        assert!(dm.get(first).is_none());
        assert_eq!(dm.get(second).unwrap().position(), (1800, 940));
        assert_eq!(dm.stats().reposition_passes, 1);

        dm.advance(Duration::from_secs(1));
        assert!(dm.is_empty());
        assert_eq!(host.log().borrow().alive(), 0);
        assert_eq!(dm.stats().destroyed, 2);
    }

    #[test]
    fn throttle_one_keeps_a_single_popup() {
        let (host, mut dm) = manager(config(true, 1));
        let first = dm.show(info("info"), image(120, 140)).unwrap();
        let second = dm.show(info("info"), image(120, 140)).unwrap();

        assert_eq!(dm.len(), 1);
        assert!(dm.get(first).is_none());
        assert!(dm.get(second).is_some());
        assert_eq!(host.log().borrow().alive(), 1);
        assert_eq!(dm.stats().evicted, 1);
        assert_eq!(dm.stats().destroyed, 1);
        assert_eq!(dm.stats().reposition_passes, 1);

        for _ in 0..400 {
            dm.advance(Duration::from_millis(33));
            assert!(dm.len() <= 1);
        }
        assert!(dm.is_empty());
    }

    #[test]
    fn throttle_is_never_exceeded() {
        for throttle in [0usize, 1, 2, 3, 5] {
            let (host, mut dm) = manager(config(true, throttle));
            for i in 0..40u64 {
                dm.show(info("info"), image(50 + i as u32, 20));
                dm.advance(Duration::from_millis(17 * (i % 7)));
                if throttle > 0 {
                    assert!(dm.len() <= throttle);
                    assert!(host.log().borrow().alive() <= throttle);
                }
            }
            if throttle == 0 {
                assert!(dm.len() > 5);
            }
        }
    }

    #[test]
    fn animation_reveals_then_hides() {
        let (host, mut dm) = manager(config(true, 0));
        let id = dm.show(info("info"), image(120, 140)).unwrap();
        let rounds = dm.plan().rounds() as i32;
        assert_eq!(rounds, 30);

        let display = dm.get(id).unwrap();
        assert_eq!(display.state(), DisplayState::Showing);
        assert_eq!(display.size(), (120, dm.plan().extent(140, 0)));
        assert_eq!(display.bounds().bottom(), 1080);

        let mut heights = vec![display.size().1];
        while dm.get(id).is_some_and(|d| d.state() == DisplayState::Showing) {
            dm.advance(Duration::from_millis(33));
            heights.push(dm.get(id).unwrap().size().1);
            assert_eq!(dm.get(id).unwrap().bounds().bottom(), 1080);
        }
        assert!(heights.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(dm.get(id).unwrap().size(), (120, 140));
        assert_eq!(dm.get(id).unwrap().round(), rounds - 1);
        assert_eq!(dm.now(), 33 * (rounds as u64 + 1));

        dm.advance(dm.plan().shown_time());
        assert_eq!(dm.get(id).unwrap().state(), DisplayState::Hiding);

        let mut hiding = vec![140];
        while let Some(display) = dm.get(id) {
            hiding.push(display.size().1);
            dm.advance(Duration::from_millis(33));
        }
        assert!(hiding.windows(2).all(|w| w[0] >= w[1]));
        assert!(dm.now() <= 8000);
        assert_eq!(host.log().borrow().alive(), 0);
        assert!(host.log().borrow().surfaces[&1].moves > 30);
    }

    #[test]
    fn top_corner_reveals_bottom_slice() {
        let (_host, mut dm) = manager(PopupConfig {
            corner: Corner::TopLeft,
            ..config(true, 0)
        });
        let mut full = image(10, 100);
        full.put_pixel(0, 99, Rgba([1, 2, 3, 255]));
        let id = dm.show(info("info"), full).unwrap();
        let display = dm.get(id).unwrap();
        let (_, h) = display.size();
        assert!(h < 100);
        assert_eq!(*display.visible_image().get_pixel(0, h - 1), Rgba([1, 2, 3, 255]));
        assert_eq!(display.position(), (0, 32));
    }

    #[test]
    fn horizontal_stacking_uses_widths() {
        let (_host, mut dm) = manager(PopupConfig {
            corner: Corner::TopLeft,
            stack: StackAxis::Horizontal,
            ..config(false, 0)
        });
        let a = dm.show(info("info"), image(120, 140)).unwrap();
        let b = dm.show(info("info"), image(80, 60)).unwrap();
        assert_eq!(dm.get(a).unwrap().position(), (0, 32));
        assert_eq!(dm.get(b).unwrap().position(), (120, 32));
    }

    #[test]
    fn popups_go_to_the_configured_monitor() {
        let mut second = Monitor::new(Rect::new(1920, 0, 1280, 1024));
        second.work_area = None;
        let host = Rc::new(HeadlessHost::new(vec![
            Monitor::new(Rect::new(0, 0, 1920, 1080)),
            second,
        ]));
        let shared: Rc<dyn PopupHost> = host.clone();
        let mut dm = DisplayManager::new(
            shared,
            PopupConfig {
                screen: 1,
                ..config(false, 0)
            },
        );
        let id = dm.show(info("info"), image(120, 140)).unwrap();
        assert_eq!(dm.get(id).unwrap().position(), (3080, 884));
    }

    #[test]
    fn screensaver_blocks_creation() {
        let (host, mut dm) = manager(config(false, 0));
        host.set_screensaver(true);
        assert!(dm.show(info("info"), image(20, 20)).is_none());
        assert_eq!(host.log().borrow().created(), 0);
        host.set_screensaver(false);
        assert!(dm.show(info("info"), image(20, 20)).is_some());
    }

    #[test]
    fn transparent_popups_are_shaped() {
        let (host, mut dm) = manager(config(false, 0));
        let mut img = image(20, 20);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        dm.show(info("info"), img);
        dm.show(info("info"), image(20, 20));
        let log = host.log();
        let log = log.borrow();
        assert!(log.surfaces[&1].shaped);
        assert!(!log.surfaces[&2].shaped);
    }

    #[test]
    fn clicks_dispatch_configured_actions() {
        let (_host, mut dm) = manager(PopupConfig {
            action_left: MouseAction::Open,
            action_middle: MouseAction::Close,
            action_right: MouseAction::Context,
            ..config(false, 0)
        });

        let opened = Rc::new(Cell::new(false));
        let flag = Rc::clone(&opened);
        let a = dm
            .show(info("info").on_open(move |_| flag.set(true)), image(120, 140))
            .unwrap();
        let (x, y) = dm.get(a).unwrap().position();

        // Release outside the popup or without a matching press.
        assert!(dm.button_press(a, MouseButton::Left));
        assert_eq!(dm.button_release(a, MouseButton::Left, x - 1, y), ClickOutcome::Ignored);
        assert_eq!(dm.button_release(a, MouseButton::Left, x + 1, y + 1), ClickOutcome::Ignored);
        assert!(dm.button_press(a, MouseButton::Middle));
        assert_eq!(dm.button_release(a, MouseButton::Left, x + 1, y + 1), ClickOutcome::Ignored);

        assert!(dm.button_press(a, MouseButton::Left));
        assert_eq!(dm.button_release(a, MouseButton::Left, x + 1, y + 1), ClickOutcome::Opened);
        assert!(opened.get());
        assert!(dm.get(a).is_none());

        let b = dm.show(info("info"), image(120, 140)).unwrap();
        dm.button_press(b, MouseButton::Middle);
        assert_eq!(dm.button_release(b, MouseButton::Middle, x + 5, y + 5), ClickOutcome::Closed);
        assert!(dm.is_empty());
        assert!(!dm.button_press(b, MouseButton::Left));
    }

    #[test]
    fn context_menu_suspends_auto_hide() {
        let (_host, mut dm) = manager(config(false, 0));
        let id = dm.show(info("info"), image(120, 140)).unwrap();
        let (x, y) = dm.get(id).unwrap().position();

        dm.button_press(id, MouseButton::Right);
        assert_eq!(dm.button_release(id, MouseButton::Right, x, y), ClickOutcome::ContextMenu);
        assert!(!dm.get(id).unwrap().has_timer());

        dm.advance(Duration::from_secs(60));
        assert!(dm.get(id).is_some());

        assert!(dm.context_menu_closed(id));
        assert!(!dm.context_menu_closed(id));
        dm.advance(Duration::from_secs(8));
        assert!(dm.get(id).is_none());
    }

    #[test]
    fn context_menu_during_reveal_resumes_animation() {
        let (host, mut dm) = manager(config(true, 0));
        let id = dm.show(info("info"), image(120, 140)).unwrap();
        dm.advance(Duration::from_millis(99));
        let display = dm.get(id).unwrap();
        assert_eq!(display.state(), DisplayState::Showing);
        let partial = display.size();
        let (x, y) = display.position();

        dm.button_press(id, MouseButton::Right);
        assert_eq!(dm.button_release(id, MouseButton::Right, x, y), ClickOutcome::ContextMenu);
        assert_eq!(dm.next_deadline(), None);
        dm.advance(Duration::from_secs(5));
        assert_eq!(dm.get(id).unwrap().size(), partial);

        assert!(dm.context_menu_closed(id));
        assert!(dm.next_deadline().is_some());
        dm.advance(Duration::from_secs(600));
        assert!(dm.get(id).is_none());
        assert_eq!(host.log().borrow().alive(), 0);
        assert_eq!(dm.next_deadline(), None);
    }

    #[test]
    fn shutdown_destroys_everything() {
        let (host, mut dm) = manager(config(true, 0));
        dm.show(info("info"), image(20, 20));
        dm.show(info("info"), image(20, 20));
        dm.shutdown();
        assert!(dm.is_empty());
        assert_eq!(host.log().borrow().alive(), 0);
        assert_eq!(dm.next_deadline(), None);
        assert!(!dm.destroy(DisplayId(1)));
    }
}
