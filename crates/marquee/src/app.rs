use crate::command::Command;
use crate::config::{self, Config, WidgetName};
use crate::events::AppEvent;
use crate::scene::Scene;
use async_channel::Receiver;
use marquee_core::autoplay::AutoplayState;
use marquee_core::deeplink::Fragment;
use marquee_core::page::Page;
use marquee_core::settings::SettingsOverride;
use marquee_core::widget::WidgetId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetStatus {
    pub name: WidgetName,
    pub initialized: bool,
    pub active: Option<usize>,
    pub total: usize,
    pub original_total: usize,
    pub autoplay: &'static str,
    pub margin: f64,
}

impl fmt::Display for WidgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.initialized {
            return write!(f, "{} uninitialized", self.name);
        }
        let active = self
            .active
            .map_or_else(|| "none".to_string(), |i| i.to_string());
        write!(
            f,
            "{} active={} panels={}/{} autoplay={} margin={}",
            self.name, active, self.total, self.original_total, self.autoplay, self.margin
        )
    }
}

/// Latest widget states, shared with the socket server for `status`.
pub type StatusBoard = Arc<RwLock<Vec<WidgetStatus>>>;

pub struct App {
    page: Page<Scene>,
    names: HashMap<WidgetName, WidgetId>,
    /// Animated translations and when they complete.
    settling: Vec<(Instant, WidgetId)>,
    board: StatusBoard,
}

impl App {
    pub fn new(config: &Config, board: StatusBoard, now: Instant) -> Self {
        let mut page = Page::new(config.defaults.clone());
        let mut names = HashMap::new();

        for widget in &config.widgets {
            let markup = widget.markup();
            for href in markup.nav.iter().filter_map(|n| n.href.clone()) {
                page.add_link(href, true);
            }
            let id = page.add_container(markup, Scene::new(widget));
            if names.insert(widget.name.clone(), id).is_some() {
                log::warn!("Duplicate widget name '{}', the last one wins", widget.name);
            }
        }
        for link in &config.links {
            page.add_link(link.clone(), false);
        }
        page.set_location(config.location.as_deref().and_then(Fragment::of_href));

        let mut app = Self {
            page,
            names,
            settling: Vec::new(),
            board,
        };

        for init in &config.init {
            app.page.initialize(&init.selector, &init.settings, now);
        }
        let created = app.page.initialize_defaults(now);
        log::info!(
            "Page ready: {} widgets, {} from the default passes",
            app.names.len(),
            created.len()
        );

        app.settle(now);
        app.publish();
        app
    }

    pub fn page(&self) -> &Page<Scene> {
        &self.page
    }

    pub fn id(&self, name: &WidgetName) -> Option<WidgetId> {
        let id = self.names.get(name).copied();
        if id.is_none() {
            log::warn!("Unknown widget '{}'", name);
        }
        id
    }

    pub fn handle(&mut self, command: Command, now: Instant) {
        let id = match command.widget() {
            Some(name) => match self.id(name) {
                Some(id) => Some(id),
                None => return,
            },
            None => None,
        };

        match (command, id) {
            (Command::GoTo(_, request), Some(id)) => {
                self.page.go_to(id, request);
            }
            (Command::ClickNav(_, index), Some(id)) => {
                self.page.click_nav(id, index, now);
            }
            (Command::HoverNav(_, index), Some(id)) => {
                self.page.hover_nav(id, index);
            }
            (Command::ClickPanel(_, index), Some(id)) => {
                self.page.click_panel(id, index);
            }
            (Command::Press(_, control), Some(id)) => {
                self.page.press(id, control, now);
            }
            (Command::Swipe(_, from, to), Some(id)) => {
                self.page.pointer_down(id, from);
                self.page.pointer_up(id, to);
            }
            (Command::PointerEnter(_), Some(id)) => self.page.pointer_enter(id, now),
            (Command::PointerLeave(_), Some(id)) => self.page.pointer_leave(id, now),
            (Command::ToggleAutoplay(_), Some(id)) => {
                self.page.toggle_autoplay(id, now);
            }
            (Command::EnableAutoplay(_), Some(id)) => {
                self.page.enable_autoplay(id, now);
            }
            (Command::TransitionDone(_), Some(id)) => {
                self.settling.retain(|(_, settling)| *settling != id);
                self.page.finish_transition(id);
            }
            (Command::Hash(fragment), _) => {
                self.page.navigate_to_fragment(fragment);
            }
            (Command::Resize, _) => {
                self.page.relayout();
            }
            (Command::Init(selector), _) => {
                let created = self
                    .page
                    .initialize(&selector, &SettingsOverride::default(), now);
                log::info!("Initialized {} widgets for {}", created.len(), selector);
            }
            (Command::Status, _) => {}
            (command, None) => log::warn!("{:?} needs a widget", command),
        }

        self.settle(now);
        self.publish();
    }

    /// Earliest autoplay advance or animation end.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.settling
            .iter()
            .map(|(at, _)| *at)
            .chain(self.page.next_due())
            .min()
    }

    pub fn on_deadline(&mut self, now: Instant) {
        let (done, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.settling)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.settling = pending;
        for (_, id) in done {
            self.page.finish_transition(id);
        }

        for (id, transition) in self.page.tick(now) {
            log::debug!("{id}: autoplay advanced to {}", transition.to);
        }

        self.settle(now);
        self.publish();
    }

    pub fn status(&self) -> Vec<WidgetStatus> {
        let mut names: Vec<(&WidgetName, WidgetId)> =
            self.names.iter().map(|(name, id)| (name, *id)).collect();
        names.sort_by_key(|(_, id)| *id);

        names
            .into_iter()
            .map(|(name, id)| {
                let widget = self.page.widget(id);
                let autoplay = match widget.and_then(|w| w.autoplay()).map(|a| a.state()) {
                    None => "off",
                    Some(AutoplayState::Running { .. }) => "running",
                    Some(AutoplayState::PausedByHover) => "paused-by-hover",
                    Some(AutoplayState::PausedByUser) => "paused",
                };
                WidgetStatus {
                    name: name.clone(),
                    initialized: widget.is_some(),
                    active: widget.and_then(|w| w.active()),
                    total: widget.map_or(0, |w| w.total()),
                    original_total: widget.map_or(0, |w| w.original_total()),
                    autoplay,
                    margin: self.page.surface(id).map_or(0.0, |s| s.margin()),
                }
            })
            .collect()
    }

    /// Turns freshly started animations into completion deadlines.
    fn settle(&mut self, now: Instant) {
        let ids: Vec<WidgetId> = self.page.ids().collect();
        for id in ids {
            let Some(duration) = self
                .page
                .surface_mut(id)
                .and_then(|s| s.take_pending_animation())
            else {
                continue;
            };
            self.settling.retain(|(_, settling)| *settling != id);
            self.settling.push((now + duration, id));
        }
    }

    fn publish(&self) {
        *self.board.write() = self.status();
    }
}

pub async fn run(config: Config, rx: Receiver<AppEvent>, board: StatusBoard) {
    let mut app = App::new(&config, board.clone(), Instant::now());

    loop {
        let deadline = app.next_deadline();
        let wake = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            event = rx.recv() => match event {
                Ok(AppEvent::Command(command)) => app.handle(command, Instant::now()),
                Ok(AppEvent::ConfigReload) => match config::load_config() {
                    Ok(config) => {
                        log::info!("Config reloaded");
                        app = App::new(&config, board.clone(), Instant::now());
                    }
                    Err(e) => log::error!("Failed to reload config, keeping the previous one: {}", e),
                },
                Err(_) => break,
            },
            _ = wake => app.on_deadline(Instant::now()),
        }
    }
}
