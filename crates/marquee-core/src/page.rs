use crate::autoplay::{Autoplay, AutoplayInput, AutoplayState};
use crate::deeplink::{Fragment, LinkMarks, PageLink, match_unique};
use crate::events::Lifecycle;
use crate::gesture::{Bounce, Point, StripPosition, SwipeOutcome, classify};
use crate::index::{self, IndexRequest, Resolution, Step};
use crate::selector::Selector;
use crate::settings::{Marker, Settings, SettingsOverride};
use crate::transition::{self, Effect, Surface, Transition};
use crate::widget::{Control, Markup, Widget, WidgetId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

struct Container<S> {
    markup: Markup,
    surface: S,
    widget: Option<Widget>,
}

pub struct Page<S> {
    containers: Vec<Container<S>>,
    defaults: Settings,
    global: SettingsOverride,
    links: LinkMarks,
    location: Option<Fragment>,
    rng: StdRng,
}

struct Parts<'a, S> {
    widget: &'a mut Widget,
    surface: &'a mut S,
    rng: &'a mut StdRng,
    links: &'a mut LinkMarks,
}

impl<S: Surface> Parts<'_, S> {
    fn resolve(&mut self, request: IndexRequest) -> Option<Resolution> {
        let page_size = transition::page_size(self.widget.settings(), &*self.surface);
        index::resolve(&self.widget.index_context(page_size), request, &mut *self.rng)
    }

    fn run(&mut self, resolution: &Resolution) -> Option<Transition> {
        let transition = transition::apply(&mut *self.widget, &mut *self.surface, resolution)?;
        if transition.fragment.is_some() {
            self.links.point_at(transition.fragment.as_ref());
        }
        Some(transition)
    }

    fn go(&mut self, request: IndexRequest) -> Option<Transition> {
        let resolution = self.resolve(request)?;
        self.run(&resolution)
    }

    fn notify(&mut self, event: Lifecycle) {
        self.surface.apply(Effect::Notify(event));
    }

    fn autoplay(&mut self, input: AutoplayInput, now: Instant) -> Option<AutoplayState> {
        let state = self.widget.autoplay.as_mut()?.handle(input, now);
        self.surface
            .apply(Effect::AutoplayIndicator(state != AutoplayState::PausedByUser));
        Some(state)
    }
}

impl<S: Surface> Page<S> {
    pub fn new(global: SettingsOverride) -> Self {
        Self::with_rng(global, StdRng::from_os_rng())
    }

    /// Page with a deterministic `random` step.
    pub fn with_seed(global: SettingsOverride, seed: u64) -> Self {
        Self::with_rng(global, StdRng::seed_from_u64(seed))
    }

    fn with_rng(global: SettingsOverride, rng: StdRng) -> Self {
        Self {
            containers: Vec::new(),
            defaults: Settings::default(),
            global,
            links: LinkMarks::default(),
            location: None,
            rng,
        }
    }

    pub fn add_container(&mut self, markup: Markup, surface: S) -> WidgetId {
        let id = WidgetId(self.containers.len());
        self.containers.push(Container {
            markup,
            surface,
            widget: None,
        });
        id
    }

    pub fn add_link(&mut self, href: impl Into<String>, in_nav: bool) {
        self.links.add(PageLink::new(href, in_nav));
    }

    pub fn set_location(&mut self, fragment: Option<Fragment>) {
        self.location = fragment;
    }

    pub fn location(&self) -> Option<&Fragment> {
        self.location.as_ref()
    }

    pub fn links(&self) -> &LinkMarks {
        &self.links
    }

    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        (0..self.containers.len()).map(WidgetId)
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.containers.get(id.0)?.widget.as_ref()
    }

    pub fn markup(&self, id: WidgetId) -> Option<&Markup> {
        self.containers.get(id.0).map(|c| &c.markup)
    }

    pub fn surface(&self, id: WidgetId) -> Option<&S> {
        self.containers.get(id.0).map(|c| &c.surface)
    }

    pub fn surface_mut(&mut self, id: WidgetId) -> Option<&mut S> {
        self.containers.get_mut(id.0).map(|c| &mut c.surface)
    }

    fn parts(&mut self, id: WidgetId) -> Option<Parts<'_, S>> {
        let container = self.containers.get_mut(id.0)?;
        let Some(widget) = container.widget.as_mut() else {
            log::debug!("{id} is not initialized");
            return None;
        };
        Some(Parts {
            widget,
            surface: &mut container.surface,
            rng: &mut self.rng,
            links: &mut self.links,
        })
    }

    /// Turns every selected, not yet initialized container into a widget.
    /// Returns the widgets created by this call.
    pub fn initialize(
        &mut self,
        selector: &Selector,
        overrides: &SettingsOverride,
        now: Instant,
    ) -> Vec<WidgetId> {
        let mut located = None;
        if let Some(fragment) = self.location.clone()
            && let Some(hit) = self.locate_in_markup(&fragment)
        {
            self.links.point_at(Some(&fragment));
            located = Some(hit);
        }

        let selected: Vec<WidgetId> = self
            .ids()
            .filter(|id| {
                let container = &self.containers[id.0];
                container.widget.is_none() && selector.matches(&container.markup.classes)
            })
            .collect();

        for &id in &selected {
            let container = &self.containers[id.0];
            let markers = Marker::from_classes(&container.markup.classes);
            let resolved = Settings::resolve(&self.defaults, &[&self.global, overrides], &markers);
            let preselected = located
                .filter(|(hit, _)| *hit == id)
                .map(|(_, nav)| nav)
                .or_else(|| container.markup.nav.iter().position(|n| n.preselected));
            let widget = Widget::new(id, &container.markup, resolved);
            let autoplay = widget.settings().autoplay;
            log::debug!("{id}: initialized with {} panels", widget.total());
            self.containers[id.0].widget = Some(widget);

            let Some(mut parts) = self.parts(id) else {
                continue;
            };
            if parts.widget.markup().counter {
                let total = parts.widget.original_total();
                parts.surface.apply(Effect::CounterTotal(total));
            }
            let total = parts.widget.total();
            let resolution = match preselected.filter(|&nav| nav < total) {
                Some(nav) => Some(Resolution {
                    instant: true,
                    refresh: true,
                    initial: true,
                    ..Resolution::at(nav, total)
                }),
                None => parts.resolve(Step::Initialize.into()),
            };
            if let Some(resolution) = resolution {
                parts.run(&resolution);
            }
            parts.notify(Lifecycle::Initialized);

            if autoplay {
                self.enable_autoplay(id, now);
            }
        }
        selected
    }

    pub fn initialize_defaults(&mut self, now: Instant) -> Vec<WidgetId> {
        let fading = Selector::classes(&["marquee", "fade"]).excluding(&["custom"]);
        let hidden = SettingsOverride {
            hide_transitions: Some(true),
            ..Default::default()
        };
        let mut created = self.initialize(&fading, &hidden, now);

        let sliding = Selector::classes(&["marquee"])
            .excluding(&["fade", "custom"])
            .or(Selector::classes(&["marquee", "slide"]).excluding(&["custom"]));
        created.extend(self.initialize(&sliding, &SettingsOverride::default(), now));
        created
    }

    pub fn go_to(&mut self, id: WidgetId, request: impl Into<IndexRequest>) -> Option<Transition> {
        self.parts(id)?.go(request.into())
    }

    /// A control inside the container was used. Controls missing from the
    /// markup do nothing.
    pub fn press(&mut self, id: WidgetId, control: Control, now: Instant) -> Option<Transition> {
        if !self.markup(id)?.controls.contains(&control) {
            log::debug!("{id} has no {control} control");
            return None;
        }
        let step = match control {
            Control::Pause => {
                self.toggle_autoplay(id, now);
                return None;
            }
            Control::Deselect => {
                self.deselect(id);
                return None;
            }
            Control::Prev => Step::Prev,
            Control::Next => Step::Next,
            Control::First => Step::First,
            Control::Last => Step::Last,
            Control::Random => Step::Random,
        };
        let mut parts = self.parts(id)?;
        parts.notify(Lifecycle::Control(step));
        parts.go(step.into())
    }

    pub fn click_nav(&mut self, id: WidgetId, index: usize, now: Instant) -> Option<Transition> {
        let mut parts = self.parts(id)?;
        if parts.widget.nav().get(index)?.active {
            return None;
        }
        parts.notify(Lifecycle::NavigationClicked { index });
        parts.autoplay(AutoplayInput::ManualNavigation, now);
        parts.go(IndexRequest::from(index))
    }

    pub fn hover_nav(&mut self, id: WidgetId, index: usize) -> Option<Transition> {
        let mut parts = self.parts(id)?;
        if !parts.widget.flags().hover_activate || parts.widget.nav().get(index)?.active {
            return None;
        }
        parts.notify(Lifecycle::NavigationHovered { index });
        parts.go(IndexRequest::from(index))
    }

    pub fn click_panel(&mut self, id: WidgetId, index: usize) -> Option<Transition> {
        let mut parts = self.parts(id)?;
        if !parts.widget.flags().click_to_focus || parts.widget.panels().get(index)?.active {
            return None;
        }
        parts.notify(Lifecycle::ClickToFocus { index });
        parts.go(IndexRequest::from(index))
    }

    pub fn deselect(&mut self, id: WidgetId) -> Option<usize> {
        let mut parts = self.parts(id)?;
        let previous = transition::deselect(&mut *parts.widget, &mut *parts.surface)?;
        parts.notify(Lifecycle::Deselected);
        Some(previous)
    }

    pub fn pointer_down(&mut self, id: WidgetId, at: Point) {
        if let Some(parts) = self.parts(id)
            && parts.widget.settings().touch_enabled
        {
            parts.widget.touch_start = Some(at);
        }
    }

    pub fn pointer_up(&mut self, id: WidgetId, at: Point) -> Option<Transition> {
        let mut parts = self.parts(id)?;
        let start = parts.widget.touch_start.take()?;
        let settings = parts.widget.settings();
        let mode = settings.touch_mode;
        let bounce_px = settings.bounce_px;
        let gesture = classify(start, at, settings.swipe_threshold_px);
        let position = StripPosition {
            current: parts.widget.active().unwrap_or(0),
            total: parts.widget.total(),
        };

        let outcome = gesture.outcome(mode, position);
        if outcome != SwipeOutcome::Ignored
            && let Some(direction) = gesture.direction
        {
            parts.notify(Lifecycle::Swiped(direction));
        }
        match outcome {
            SwipeOutcome::Ignored => None,
            SwipeOutcome::Navigate(step) => parts.go(step.into()),
            SwipeOutcome::Bounce(edge) => {
                parts.surface.apply(Effect::Bounce(Bounce::new(edge, bounce_px)));
                parts.notify(Lifecycle::Bounced(edge));
                None
            }
        }
    }

    pub fn pointer_enter(&mut self, id: WidgetId, now: Instant) {
        if let Some(mut parts) = self.parts(id) {
            parts.widget.hovered = true;
            parts.autoplay(AutoplayInput::PointerEnter, now);
        }
    }

    pub fn pointer_leave(&mut self, id: WidgetId, now: Instant) {
        if let Some(mut parts) = self.parts(id) {
            parts.widget.hovered = false;
            parts.autoplay(AutoplayInput::PointerLeave, now);
        }
    }

    /// Starts autoplay on a widget. Returns false when it was already on.
    pub fn enable_autoplay(&mut self, id: WidgetId, now: Instant) -> bool {
        let Some(parts) = self.parts(id) else {
            return false;
        };
        if parts.widget.autoplay.is_some() {
            return false;
        }
        let interval = Duration::from_millis(parts.widget.settings().autoplay_interval_ms);
        let hovered = parts.widget.hovered;
        parts.widget.autoplay = Some(Autoplay::start(interval, now, hovered));
        parts.surface.apply(Effect::AutoplayIndicator(true));
        log::debug!("{id}: autoplay every {interval:?}");
        true
    }

    pub fn toggle_autoplay(&mut self, id: WidgetId, now: Instant) -> Option<AutoplayState> {
        self.parts(id)?.autoplay(AutoplayInput::Toggle, now)
    }

    pub fn tick(&mut self, now: Instant) -> Vec<(WidgetId, Transition)> {
        let ids: Vec<WidgetId> = self.ids().collect();
        ids.into_iter()
            .filter_map(|id| {
                let mut parts = self.parts_quiet(id)?;
                if !parts.widget.autoplay.as_mut()?.poll(now) {
                    return None;
                }
                parts.go(Step::Next.into()).map(|t| (id, t))
            })
            .collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.containers
            .iter()
            .filter_map(|c| c.widget.as_ref()?.autoplay()?.due())
            .min()
    }

    /// Location fragment changed. Navigates only when exactly one nav entry
    /// on the whole page points at `fragment`.
    pub fn navigate_to_fragment(&mut self, fragment: Fragment) -> Option<(WidgetId, Transition)> {
        self.location = Some(fragment.clone());
        let entries: Vec<(WidgetId, usize, Option<Fragment>)> = self
            .containers
            .iter()
            .enumerate()
            .filter_map(|(i, c)| Some((WidgetId(i), c.widget.as_ref()?)))
            .flat_map(|(id, w)| {
                w.nav()
                    .iter()
                    .enumerate()
                    .map(move |(index, entry)| (id, index, entry.fragment.clone()))
            })
            .collect();
        let Some(hit) = match_unique(entries.iter().map(|(_, _, f)| f.as_ref()), &fragment) else {
            log::debug!("no unique nav entry for {fragment}");
            return None;
        };
        let (id, index) = (entries[hit].0, entries[hit].1);

        self.links.point_at(Some(&fragment));
        let mut parts = self.parts(id)?;
        parts.notify(Lifecycle::HashUpdated(fragment));
        parts.go(IndexRequest::from(index)).map(|t| (id, t))
    }

    /// Re-measures after a viewport change: every widget snaps back onto its
    /// active panel.
    pub fn relayout(&mut self) -> Vec<(WidgetId, Transition)> {
        let ids: Vec<WidgetId> = self.ids().collect();
        ids.into_iter()
            .filter_map(|id| {
                let mut parts = self.parts_quiet(id)?;
                parts.widget.active()?;
                parts.go(Step::Current.into()).map(|t| (id, t))
            })
            .collect()
    }

    pub fn finish_transition(&mut self, id: WidgetId) {
        if let Some(parts) = self.parts(id) {
            parts.widget.in_flight = false;
        }
    }

    fn parts_quiet(&mut self, id: WidgetId) -> Option<Parts<'_, S>> {
        if self.widget(id).is_none() {
            return None;
        }
        self.parts(id)
    }

    fn locate_in_markup(&self, fragment: &Fragment) -> Option<(WidgetId, usize)> {
        let entries: Vec<(WidgetId, usize, Option<Fragment>)> = self
            .containers
            .iter()
            .enumerate()
            .flat_map(|(i, c)| {
                c.markup.nav.iter().take(c.markup.panels).enumerate().map(move |(index, n)| {
                    (
                        WidgetId(i),
                        index,
                        n.href.as_deref().and_then(Fragment::of_href),
                    )
                })
            })
            .collect();
        let hit = match_unique(entries.iter().map(|(_, _, f)| f.as_ref()), fragment)?;
        Some((entries[hit].0, entries[hit].1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Edge;
    use crate::transition::testing::Recorder;
    use crate::transition::{Counter, Motion};
    use crate::widget::NavMarkup;
    use proptest::prelude::*;

    fn markup(classes: &[&str], prefix: &str, panels: usize) -> Markup {
        Markup {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            panels,
            nav: (0..panels)
                .map(|i| NavMarkup {
                    href: Some(format!("#{prefix}{i}")),
                    preselected: false,
                })
                .collect(),
            caption_areas: Vec::new(),
            counter: true,
            controls: vec![
                Control::Prev,
                Control::Next,
                Control::Random,
                Control::Pause,
                Control::Deselect,
            ],
        }
    }

    fn page() -> Page<Recorder> {
        Page::with_seed(SettingsOverride::default(), 7)
    }

    fn all() -> Selector {
        Selector::classes(&["marquee"])
    }

    fn init_one(classes: &[&str], panels: usize, now: Instant) -> (Page<Recorder>, WidgetId) {
        let mut page = page();
        let id = page.add_container(markup(classes, "p", panels), Recorder::new(vec![100.0]));
        page.initialize(&all(), &SettingsOverride::default(), now);
        (page, id)
    }

    fn notifications(page: &Page<Recorder>, id: WidgetId) -> Vec<Lifecycle> {
        page.surface(id).unwrap().notifications()
    }

    fn take(page: &mut Page<Recorder>, id: WidgetId) -> Vec<Effect> {
        page.surface_mut(id).unwrap().take()
    }

    #[test]
    fn test_initialize_selects_first_panel_instantly() {
        let now = Instant::now();
        let (page, id) = init_one(&["marquee"], 3, now);

        let w = page.widget(id).unwrap();
        assert_eq!(w.active(), Some(0));
        assert!(!w.is_in_flight());

        let effects = &page.surface(id).unwrap().effects;
        assert_eq!(effects.first(), Some(&Effect::CounterTotal(3)));
        assert!(effects.contains(&Effect::Translate {
            margin: 0.0,
            motion: Motion::Instant,
        }));
        assert_eq!(notifications(&page, id).last(), Some(&Lifecycle::Initialized));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee"], 3, now);
        page.go_to(id, 2usize).unwrap();

        let again = page.initialize(&all(), &SettingsOverride::default(), now);
        assert!(again.is_empty());
        assert_eq!(page.widget(id).unwrap().active(), Some(2));
    }

    #[test]
    fn test_no_autoselect() {
        let (page, id) = init_one(&["marquee", "no-autoselect"], 3, Instant::now());
        assert_eq!(page.widget(id).unwrap().active(), None);
        assert_eq!(notifications(&page, id), vec![Lifecycle::Initialized]);
    }

    #[test]
    fn test_preselected_nav_entry_wins_over_first_panel() {
        let mut page = page();
        let mut m = markup(&["marquee"], "p", 3);
        m.nav[2].preselected = true;
        let id = page.add_container(m, Recorder::new(vec![100.0]));
        page.initialize(&all(), &SettingsOverride::default(), Instant::now());

        assert_eq!(page.widget(id).unwrap().active(), Some(2));
        assert!(page.surface(id).unwrap().effects.contains(&Effect::Translate {
            margin: -200.0,
            motion: Motion::Instant,
        }));
    }

    #[test]
    fn test_location_selects_panel_on_load() {
        let mut page = page();
        let a = page.add_container(markup(&["marquee"], "a", 3), Recorder::new(vec![100.0]));
        let b = page.add_container(markup(&["marquee"], "b", 3), Recorder::new(vec![100.0]));
        page.add_link("#b1", false);
        page.add_link("/elsewhere", false);
        page.set_location(Some(Fragment::new("#b1")));
        page.initialize(&all(), &SettingsOverride::default(), Instant::now());

        assert_eq!(page.widget(a).unwrap().active(), Some(0));
        assert_eq!(page.widget(b).unwrap().active(), Some(1));
        assert_eq!(
            page.links().marked().map(|l| l.href.as_str()).collect::<Vec<_>>(),
            vec!["#b1"]
        );
    }

    #[test]
    fn test_merge_order() {
        let mut page = Page::with_seed(
            SettingsOverride {
                transition_ms: Some(800),
                swipe_threshold_px: Some(50.0),
                ..Default::default()
            },
            1,
        );
        let plain = page.add_container(markup(&["marquee"], "a", 2), Recorder::new(vec![]));
        let fast = page.add_container(markup(&["marquee", "fast"], "b", 2), Recorder::new(vec![]));
        let call = SettingsOverride {
            transition_ms: Some(300),
            ..Default::default()
        };
        page.initialize(&all(), &call, Instant::now());

        let settings = page.widget(plain).unwrap().settings();
        assert_eq!(settings.transition_ms, 300);
        assert_eq!(settings.swipe_threshold_px, 50.0);
        assert_eq!(page.widget(fast).unwrap().settings().transition_ms, 1);
    }

    #[test]
    fn test_default_passes() {
        let mut page = page();
        let fade = page.add_container(markup(&["marquee", "fade"], "a", 2), Recorder::new(vec![]));
        let slide = page.add_container(markup(&["marquee", "slide"], "b", 2), Recorder::new(vec![]));
        let custom = page.add_container(markup(&["marquee", "custom"], "c", 2), Recorder::new(vec![]));
        let other = page.add_container(markup(&["gallery"], "d", 2), Recorder::new(vec![]));

        let created = page.initialize_defaults(Instant::now());
        assert_eq!(created, vec![fade, slide]);
        assert!(page.widget(fade).unwrap().settings().hide_transitions);
        assert!(!page.widget(slide).unwrap().settings().hide_transitions);
        assert!(page.widget(custom).is_none());
        assert!(page.widget(other).is_none());

        let custom_selector: Selector = ".custom".parse().unwrap();
        assert_eq!(
            page.initialize(&custom_selector, &SettingsOverride::default(), Instant::now()),
            vec![custom]
        );
    }

    #[test]
    fn test_controls() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee"], 3, now);
        take(&mut page, id);

        let t = page.press(id, Control::Next, now).unwrap();
        assert_eq!((t.from, t.to), (Some(0), 1));
        assert_eq!(
            notifications(&page, id),
            vec![
                Lifecycle::Control(Step::Next),
                Lifecycle::PanelActive { index: 1 }
            ]
        );

        // not in the markup
        assert_eq!(page.press(id, Control::Last, now), None);

        page.press(id, Control::Deselect, now);
        assert_eq!(page.widget(id).unwrap().active(), None);
        assert_eq!(notifications(&page, id).last(), Some(&Lifecycle::Deselected));
    }

    #[test]
    fn test_random_control_changes_panel() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee"], 5, now);
        for _ in 0..20 {
            let before = page.widget(id).unwrap().active();
            let t = page.press(id, Control::Random, now).unwrap();
            assert_ne!(Some(t.to), before);
        }
    }

    #[test]
    fn test_wraparound_and_infinite_growth() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee"], 3, now);
        page.go_to(id, Step::Last).unwrap();
        assert_eq!(page.go_to(id, Step::Next).map(|t| t.to), Some(0));

        let (mut page, id) = init_one(&["marquee", "infinite"], 3, now);
        page.go_to(id, 1usize).unwrap();
        let t = page.go_to(id, Step::Next).unwrap();
        assert_eq!(t.to, 2);
        assert_eq!(page.widget(id).unwrap().total(), 6);
        let t = page.go_to(id, 4usize).unwrap();
        assert_eq!(t.to, 4);
        assert!(page.surface(id).unwrap().effects.contains(&Effect::Counter(Counter {
            ordinal: 2,
            total: 3
        })));
    }

    #[test]
    fn test_click_nav() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee", "autoplay"], 3, now);
        assert!(page.widget(id).unwrap().autoplay().unwrap().is_running());

        assert_eq!(page.click_nav(id, 0, now), None);
        assert_eq!(page.click_nav(id, 9, now), None);

        let t = page.click_nav(id, 2, now).unwrap();
        assert_eq!(t.to, 2);
        assert_eq!(t.fragment, Some(Fragment::new("#p2")));
        assert!(notifications(&page, id).contains(&Lifecycle::NavigationClicked { index: 2 }));
        assert_eq!(
            page.widget(id).unwrap().autoplay().unwrap().state(),
            AutoplayState::PausedByUser
        );
        assert_eq!(page.next_due(), None);
    }

    #[test]
    fn test_click_nav_marks_page_links() {
        let now = Instant::now();
        let mut page = page();
        let id = page.add_container(markup(&["marquee"], "p", 3), Recorder::new(vec![100.0]));
        page.add_link("#p1", false);
        page.add_link("#p1", true);
        page.initialize(&all(), &SettingsOverride::default(), now);

        page.click_nav(id, 1, now).unwrap();
        assert_eq!(page.links().marked().count(), 1);
        assert_eq!(page.links().current(), Some(&Fragment::new("#p1")));
    }

    #[test]
    fn test_hover_and_panel_clicks_need_their_markers() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee"], 3, now);
        assert_eq!(page.hover_nav(id, 1), None);
        assert_eq!(page.click_panel(id, 1), None);

        let (mut page, id) = init_one(&["marquee", "hover-activate", "clickToFocus"], 3, now);
        assert_eq!(page.hover_nav(id, 1).map(|t| t.to), Some(1));
        assert_eq!(page.click_panel(id, 2).map(|t| t.to), Some(2));
        assert_eq!(page.click_panel(id, 2), None);
        let events = notifications(&page, id);
        assert!(events.contains(&Lifecycle::NavigationHovered { index: 1 }));
        assert!(events.contains(&Lifecycle::ClickToFocus { index: 2 }));
    }

    #[test]
    fn test_swipes() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee"], 3, now);
        take(&mut page, id);

        // finger moves left at the first panel
        page.pointer_down(id, Point::new(200.0, 10.0));
        assert_eq!(page.pointer_up(id, Point::new(100.0, 12.0)), None);
        let effects = take(&mut page, id);
        assert!(effects.contains(&Effect::Bounce(Bounce::new(Edge::First, 40.0))));
        assert!(effects.contains(&Effect::Notify(Lifecycle::Bounced(Edge::First))));

        page.pointer_down(id, Point::new(100.0, 10.0));
        let t = page.pointer_up(id, Point::new(200.0, 12.0)).unwrap();
        assert_eq!(t.to, 1);

        // short and vertical gestures do nothing
        page.pointer_down(id, Point::new(100.0, 10.0));
        assert_eq!(page.pointer_up(id, Point::new(110.0, 10.0)), None);
        page.pointer_down(id, Point::new(100.0, 10.0));
        assert_eq!(page.pointer_up(id, Point::new(140.0, 300.0)), None);

        // release without press
        assert_eq!(page.pointer_up(id, Point::new(300.0, 10.0)), None);
    }

    #[test]
    fn test_infinite_step_back_moves_nav_marker() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee", "infinite"], 3, now);

        let t = page.go_to(id, Step::Prev).unwrap();
        assert_eq!((t.from, t.to), (Some(3), 2));
        let surface = page.surface(id).unwrap();
        assert_eq!(surface.marked_panels.iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(surface.marked_nav.iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_infinite_widgets_bounce_at_the_first_panel() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee", "infinite"], 3, now);
        take(&mut page, id);

        page.pointer_down(id, Point::new(200.0, 10.0));
        assert_eq!(page.pointer_up(id, Point::new(100.0, 10.0)), None);
        assert_eq!(page.widget(id).unwrap().total(), 3);
        assert_eq!(page.widget(id).unwrap().active(), Some(0));
        assert!(take(&mut page, id).contains(&Effect::Bounce(Bounce::new(Edge::First, 40.0))));
    }

    #[test]
    fn test_touch_disabled() {
        let now = Instant::now();
        let mut page = Page::with_seed(
            SettingsOverride {
                touch_enabled: Some(false),
                ..Default::default()
            },
            3,
        );
        let id = page.add_container(markup(&["marquee"], "p", 3), Recorder::new(vec![]));
        page.initialize(&all(), &SettingsOverride::default(), now);

        page.pointer_down(id, Point::new(0.0, 0.0));
        assert_eq!(page.pointer_up(id, Point::new(200.0, 0.0)), None);
    }

    #[test]
    fn test_autoplay_ticks_and_hover() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let (mut page, id) = init_one(&["marquee", "autoplay"], 3, t0);
        assert_eq!(page.next_due(), Some(t0 + ms(4000)));

        assert!(page.tick(t0 + ms(3999)).is_empty());
        let advanced = page.tick(t0 + ms(4000));
        assert_eq!(advanced.len(), 1);
        assert_eq!(advanced[0].1.to, 1);

        page.pointer_enter(id, t0 + ms(5000));
        assert_eq!(page.next_due(), None);
        assert!(page.tick(t0 + ms(20_000)).is_empty());

        page.pointer_leave(id, t0 + ms(21_000));
        assert_eq!(page.next_due(), Some(t0 + ms(25_000)));
    }

    #[test]
    fn test_pause_control() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee", "autoplay"], 3, now);
        take(&mut page, id);

        page.press(id, Control::Pause, now);
        assert_eq!(take(&mut page, id), vec![Effect::AutoplayIndicator(false)]);
        page.press(id, Control::Pause, now);
        assert_eq!(take(&mut page, id), vec![Effect::AutoplayIndicator(true)]);

        let (mut page, id) = init_one(&["marquee"], 3, now);
        assert_eq!(page.toggle_autoplay(id, now), None);
        assert!(page.enable_autoplay(id, now));
        assert!(!page.enable_autoplay(id, now));
    }

    #[test]
    fn test_navigate_to_fragment() {
        let now = Instant::now();
        let mut page = page();
        let a = page.add_container(markup(&["marquee"], "a", 3), Recorder::new(vec![]));
        let b = page.add_container(markup(&["marquee"], "b", 3), Recorder::new(vec![]));
        let dup = page.add_container(markup(&["marquee"], "b", 3), Recorder::new(vec![]));
        page.initialize(&all(), &SettingsOverride::default(), now);

        let (id, t) = page.navigate_to_fragment(Fragment::new("#a2")).unwrap();
        assert_eq!((id, t.to), (a, 2));
        assert!(notifications(&page, a).contains(&Lifecycle::HashUpdated(Fragment::new("#a2"))));

        // ambiguous and unknown fragments
        assert_eq!(page.navigate_to_fragment(Fragment::new("#b1")), None);
        assert_eq!(page.navigate_to_fragment(Fragment::new("#zz")), None);
        assert_eq!(page.widget(b).unwrap().active(), Some(0));
        assert_eq!(page.widget(dup).unwrap().active(), Some(0));
        assert_eq!(page.location(), Some(&Fragment::new("#zz")));
    }

    #[test]
    fn test_relayout_snaps_active_widgets() {
        let now = Instant::now();
        let mut page = page();
        let a = page.add_container(markup(&["marquee"], "a", 3), Recorder::new(vec![100.0]));
        let b = page.add_container(
            markup(&["marquee", "no-autoselect"], "b", 3),
            Recorder::new(vec![100.0]),
        );
        page.initialize(&all(), &SettingsOverride::default(), now);
        page.go_to(a, 1usize).unwrap();

        let snapped = page.relayout();
        assert_eq!(snapped.len(), 1);
        assert_eq!(snapped[0].0, a);
        assert_eq!(snapped[0].1.motion, Motion::Instant);
        assert_eq!(page.widget(b).unwrap().active(), None);
    }

    #[test]
    fn test_finish_transition() {
        let now = Instant::now();
        let (mut page, id) = init_one(&["marquee"], 3, now);
        page.go_to(id, 1usize).unwrap();
        assert!(page.widget(id).unwrap().is_in_flight());

        page.finish_transition(id);
        assert!(!page.widget(id).unwrap().is_in_flight());
        take(&mut page, id);
        page.go_to(id, 2usize).unwrap();
        assert_ne!(
            page.surface(id).unwrap().effects.first(),
            Some(&Effect::StopAnimations)
        );
    }

    #[test]
    fn test_uninitialized_widgets_ignore_everything() {
        let now = Instant::now();
        let mut page = page();
        let id = page.add_container(markup(&["gallery"], "p", 3), Recorder::new(vec![]));
        page.initialize(&all(), &SettingsOverride::default(), now);

        assert_eq!(page.go_to(id, 1usize), None);
        assert_eq!(page.click_nav(id, 1, now), None);
        assert!(page.tick(now + Duration::from_secs(60)).is_empty());
        assert_eq!(page.go_to(WidgetId(42), 1usize), None);
        assert!(page.surface(id).unwrap().effects.is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        GoTo(i64),
        Step(Step),
        Click(usize),
        Swipe(f64),
        Deselect,
        Relayout,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-8i64..16).prop_map(Op::GoTo),
            prop_oneof![
                Just(Step::First),
                Just(Step::Last),
                Just(Step::Next),
                Just(Step::Prev),
                Just(Step::Random),
            ]
            .prop_map(Op::Step),
            (0usize..6).prop_map(Op::Click),
            (-200.0f64..200.0).prop_map(Op::Swipe),
            Just(Op::Deselect),
            Just(Op::Relayout),
        ]
    }

    proptest! {
        #[test]
        fn single_active_panel(
            panels in 1usize..6,
            infinite in any::<bool>(),
            ops in prop::collection::vec(op(), 0..12),
        ) {
            let now = Instant::now();
            let classes: &[&str] = if infinite { &["marquee", "infinite"] } else { &["marquee"] };
            let (mut page, id) = init_one(classes, panels, now);

            for op in ops {
                match op {
                    Op::GoTo(i) => { page.go_to(id, IndexRequest::Index(i)); }
                    Op::Step(step) => { page.go_to(id, step); }
                    Op::Click(i) => { page.click_nav(id, i, now); }
                    Op::Swipe(dx) => {
                        page.pointer_down(id, Point::new(300.0, 0.0));
                        page.pointer_up(id, Point::new(300.0 + dx, 0.0));
                    }
                    Op::Deselect => { page.deselect(id); }
                    Op::Relayout => { page.relayout(); }
                }

                let w = page.widget(id).unwrap();
                let active: Vec<usize> = w.panels().iter().filter(|p| p.active).map(|p| p.index).collect();
                prop_assert!(active.len() <= 1);
                prop_assert_eq!(active.first().copied(), w.active());
                prop_assert!(w.total() >= w.original_total());
                for (i, entry) in w.nav().iter().enumerate() {
                    prop_assert_eq!(entry.active, w.panels()[i].active);
                }

                let surface = page.surface(id).unwrap();
                prop_assert_eq!(surface.marked_panels.iter().copied().collect::<Vec<_>>(), active);
                let nav: Vec<usize> = (0..w.nav().len()).filter(|&i| w.nav()[i].active).collect();
                prop_assert_eq!(surface.marked_nav.iter().copied().collect::<Vec<_>>(), nav);
            }
        }
    }
}
