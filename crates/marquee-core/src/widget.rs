use crate::autoplay::Autoplay;
use crate::deeplink::Fragment;
use crate::gesture::Point;
use crate::index::{Growth, IndexContext};
use crate::settings::{CaptionTarget, ModeFlags, Resolved, Settings};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display as StrumDisplay, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("widget#{_0}")]
pub struct WidgetId(pub usize);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Control {
    Prev,
    Next,
    First,
    Last,
    Random,
    Deselect,
    Pause,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavMarkup {
    pub href: Option<String>,
    pub preselected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markup {
    pub classes: Vec<String>,
    pub panels: usize,
    pub nav: Vec<NavMarkup>,
    pub caption_areas: Vec<String>,
    pub counter: bool,
    pub controls: Vec<Control>,
}

impl Markup {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn has_caption_area(&self, target: &CaptionTarget) -> bool {
        self.caption_areas.iter().any(|c| c == target.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub index: usize,
    /// Original panel this one shows; equal to `index` unless it is a copy.
    pub source: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub fragment: Option<Fragment>,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    settings: Settings,
    flags: ModeFlags,
    markup: Markup,
    panels: Vec<Panel>,
    nav: Vec<NavEntry>,
    active: Option<usize>,
    original_total: usize,
    pub(crate) autoplay: Option<Autoplay>,
    /// Pointer state kept for autoplay started later.
    pub(crate) hovered: bool,
    pub(crate) touch_start: Option<Point>,
    pub(crate) in_flight: bool,
}

impl Widget {
    pub fn new(id: WidgetId, markup: &Markup, resolved: Resolved) -> Self {
        let panels = (0..markup.panels)
            .map(|index| Panel {
                index,
                source: index,
                active: false,
            })
            .collect();
        let nav = markup
            .nav
            .iter()
            .take(markup.panels)
            .map(|entry| NavEntry {
                fragment: entry.href.as_deref().and_then(Fragment::of_href),
                active: false,
            })
            .collect();

        Self {
            id,
            settings: resolved.settings,
            flags: resolved.flags,
            markup: markup.clone(),
            panels,
            nav,
            active: None,
            original_total: markup.panels,
            autoplay: None,
            hovered: false,
            touch_start: None,
            in_flight: false,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn nav(&self) -> &[NavEntry] {
        &self.nav
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn total(&self) -> usize {
        self.panels.len()
    }

    pub fn original_total(&self) -> usize {
        self.original_total
    }

    pub fn autoplay(&self) -> Option<&Autoplay> {
        self.autoplay.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn has_caption(&self) -> bool {
        self.markup.has_caption_area(&self.settings.caption_target)
    }

    pub fn source_of(&self, index: usize) -> Option<usize> {
        self.panels.get(index).map(|p| p.source)
    }

    pub fn index_context(&self, page_size: usize) -> IndexContext {
        IndexContext {
            current: self.active,
            total: self.total(),
            original_total: self.original_total,
            page_size,
            flags: self.flags,
        }
    }

    /// Copies the strip. Prepending shifts every existing index, including
    /// the active one.
    pub(crate) fn grow(&mut self, growth: Growth) {
        let len = self.panels.len();
        if len == 0 {
            return;
        }
        let sources: Vec<usize> = (0..growth.count())
            .map(|i| self.panels[i % len].source)
            .collect();

        match growth {
            Growth::Append(_) => {
                self.panels
                    .extend(sources.into_iter().enumerate().map(|(i, source)| Panel {
                        index: len + i,
                        source,
                        active: false,
                    }));
            }
            Growth::Prepend(n) => {
                // nav entries do not move with the panels
                let active = self.set_active(None);
                let mut grown: Vec<Panel> = sources
                    .into_iter()
                    .map(|source| Panel {
                        index: 0,
                        source,
                        active: false,
                    })
                    .collect();
                grown.append(&mut self.panels);
                for (index, panel) in grown.iter_mut().enumerate() {
                    panel.index = index;
                }
                self.panels = grown;
                self.set_active(active.map(|a| a + n));
            }
        }
    }

    /// Moves the active marker on panels and nav entries. Returns the
    /// previously active index.
    pub(crate) fn set_active(&mut self, index: Option<usize>) -> Option<usize> {
        let previous = self.active.take();
        if let Some(prev) = previous {
            self.mark(prev, false);
        }
        if let Some(index) = index.filter(|&i| i < self.panels.len()) {
            self.mark(index, true);
            self.active = Some(index);
        }
        previous
    }

    fn mark(&mut self, index: usize, on: bool) {
        if let Some(panel) = self.panels.get_mut(index) {
            panel.active = on;
        }
        if let Some(entry) = self.nav.get_mut(index) {
            entry.active = on;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(panels: usize) -> Widget {
        let markup = Markup {
            panels,
            nav: (0..panels)
                .map(|i| NavMarkup {
                    href: Some(format!("#p{i}")),
                    preselected: false,
                })
                .collect(),
            ..Default::default()
        };
        Widget::new(
            WidgetId(0),
            &markup,
            Settings::resolve(&Settings::default(), &[], &[]),
        )
    }

    fn active_count(w: &Widget) -> (usize, usize) {
        (
            w.panels().iter().filter(|p| p.active).count(),
            w.nav().iter().filter(|n| n.active).count(),
        )
    }

    #[test]
    fn test_set_active_moves_single_marker() {
        let mut w = widget(3);
        assert_eq!(w.set_active(Some(1)), None);
        assert_eq!(w.set_active(Some(2)), Some(1));
        assert_eq!(active_count(&w), (1, 1));
        assert!(w.panels()[2].active && w.nav()[2].active);

        w.set_active(None);
        assert_eq!(active_count(&w), (0, 0));
        assert_eq!(w.active(), None);
    }

    #[test]
    fn test_append_keeps_sources() {
        let mut w = widget(3);
        w.set_active(Some(2));
        w.grow(Growth::Append(3));

        assert_eq!(w.total(), 6);
        assert_eq!(w.original_total(), 3);
        assert_eq!(
            w.panels().iter().map(|p| p.source).collect::<Vec<_>>(),
            vec![0, 1, 2, 0, 1, 2]
        );
        assert_eq!(w.active(), Some(2));
        assert_eq!(w.nav().len(), 3);
    }

    #[test]
    fn test_prepend_shifts_active() {
        let mut w = widget(3);
        w.set_active(Some(0));
        w.grow(Growth::Prepend(3));

        assert_eq!(w.active(), Some(3));
        assert!(w.panels()[3].active);
        assert_eq!(active_count(&w), (1, 0));
        assert_eq!(
            w.panels().iter().map(|p| p.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5]
        );
        assert_eq!(w.source_of(3), Some(0));
        assert_eq!(w.source_of(2), Some(2));
    }

    #[test]
    fn test_nav_fragments_from_hrefs() {
        let w = widget(2);
        assert_eq!(
            w.nav()[1].fragment.as_ref().map(|f| f.as_str()),
            Some("#p1")
        );
    }
}
