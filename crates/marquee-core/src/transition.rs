use crate::deeplink::Fragment;
use crate::events::Lifecycle;
use crate::gesture::Bounce;
use crate::index::{Growth, PageEdge, Resolution};
use crate::settings::{MarkerName, Settings, TextSelector};
use crate::widget::Widget;
use derive_more::Display;

pub const TEXT_FADE_MS: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Instant,
    Animated { ms: u64 },
}

impl Motion {
    pub fn is_instant(&self) -> bool {
        matches!(self, Self::Instant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    Blink,
    Dim { ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkTarget {
    Panel(usize),
    Nav(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionMarkers {
    pub first: bool,
    pub last: bool,
    pub number: usize,
    pub page_edge: Option<PageEdge>,
}

/// "2/3" style counter, always against the original panel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{ordinal}/{total}")]
pub struct Counter {
    pub ordinal: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StopAnimations,
    Grow(Growth),
    Mark {
        target: MarkTarget,
        marker: MarkerName,
        on: bool,
    },
    Position(PositionMarkers),
    /// `None` fades the caption area out.
    Caption(Option<String>),
    Counter(Counter),
    CounterTotal(usize),
    FadeText {
        selector: TextSelector,
        fade: Fade,
    },
    Translate {
        margin: f64,
        motion: Motion,
    },
    Resize {
        height: f64,
        motion: Motion,
    },
    Ordinal(Counter),
    Bounce(Bounce),
    AutoplayIndicator(bool),
    Notify(Lifecycle),
}

pub trait Surface {
    fn panel_offset(&self, index: usize) -> f64;
    /// Natural height; zero when not rendered.
    fn panel_height(&self, index: usize) -> f64;
    fn panel_width(&self) -> f64;
    fn strip_margin(&self) -> f64;
    fn padding_left(&self) -> f64 {
        0.0
    }
    fn viewport_width(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn caption_fragment(&self, _nav: usize) -> Option<String> {
        None
    }
    fn title_attribute(&self, _nav: usize) -> Option<String> {
        None
    }
    fn apply(&mut self, effect: Effect);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: Option<usize>,
    pub to: usize,
    pub motion: Motion,
    pub fragment: Option<Fragment>,
}

pub fn page_size<S: Surface + ?Sized>(settings: &Settings, surface: &S) -> usize {
    settings
        .panels_per_page
        .unwrap_or_else(|| {
            let panel = surface.panel_width();
            if panel > 0.0 {
                (surface.viewport_width() / panel).floor() as usize
            } else {
                1
            }
        })
        .max(1)
}

pub fn apply<S: Surface + ?Sized>(
    widget: &mut Widget,
    surface: &mut S,
    resolution: &Resolution,
) -> Option<Transition> {
    let target = resolution.target;
    let shifted = match resolution.growth {
        Some(Growth::Prepend(n)) => widget.active().map(|a| a + n),
        _ => widget.active(),
    };
    if shifted == Some(target) && !resolution.refresh {
        return None;
    }
    if widget.in_flight {
        surface.apply(Effect::StopAnimations);
        widget.in_flight = false;
    }
    // nav entries stay put when copies are prepended
    let nav_len = widget.nav().len();
    let previous_nav = widget.active().filter(|&a| a < nav_len);
    if let Some(growth) = resolution.growth {
        widget.grow(growth);
        surface.apply(Effect::Grow(growth));
    }
    if target >= widget.total() {
        log::warn!("{}: target {target} outside {} panels", widget.id(), widget.total());
        return None;
    }

    let settings = widget.settings().clone();
    let marker = settings.active_marker.clone();

    let previous = widget.set_active(Some(target));
    if let Some(prev) = previous {
        mark(surface, &marker, MarkTarget::Panel(prev), false);
    }
    if let Some(prev) = previous_nav {
        mark(surface, &marker, MarkTarget::Nav(prev), false);
    }
    mark(surface, &marker, MarkTarget::Panel(target), true);
    if target < nav_len {
        mark(surface, &marker, MarkTarget::Nav(target), true);
    }

    let position = PositionMarkers {
        first: target == 0,
        last: target + 1 == widget.total(),
        number: target + 1,
        page_edge: resolution.page_edge,
    };
    surface.apply(Effect::Position(position));
    if position.first {
        surface.apply(Effect::Notify(Lifecycle::ReachedFirst));
    }
    if position.last {
        surface.apply(Effect::Notify(Lifecycle::ReachedLast));
    }

    let source = widget.source_of(target).unwrap_or(target);
    if widget.has_caption() {
        let caption = (source < nav_len)
            .then(|| {
                surface
                    .caption_fragment(source)
                    .or_else(|| surface.title_attribute(source))
            })
            .flatten()
            .filter(|c| !c.trim().is_empty());
        surface.apply(Effect::Caption(caption));
    }

    let counter = Counter {
        ordinal: source + 1,
        total: widget.original_total(),
    };
    if widget.markup().counter {
        surface.apply(Effect::Counter(counter));
    }

    let travel = surface.panel_offset(target)
        - surface.strip_margin()
        - settings.left_offset_px
        - surface.padding_left();
    let margin = 0.0 - travel;

    let instant = resolution.instant || (settings.hide_transitions && !resolution.initial);
    let motion = if instant {
        Motion::Instant
    } else {
        Motion::Animated {
            ms: settings.transition_ms,
        }
    };

    let fade_text = settings.fade_text && !resolution.initial;
    match motion {
        Motion::Instant => {
            surface.apply(Effect::FadeText {
                selector: settings.fade_text_selector.clone(),
                fade: Fade::Blink,
            });
        }
        Motion::Animated { .. } if fade_text => {
            surface.apply(Effect::FadeText {
                selector: settings.fade_text_selector.clone(),
                fade: Fade::Dim { ms: TEXT_FADE_MS },
            });
        }
        Motion::Animated { .. } => {}
    }
    surface.apply(Effect::Translate { margin, motion });
    widget.in_flight = !motion.is_instant();

    if settings.resizable {
        let height = surface.panel_height(target);
        if height <= 0.0 {
            log::debug!("{}: panel {target} not rendered, height kept", widget.id());
        } else if instant {
            surface.apply(Effect::Resize {
                height,
                motion: Motion::Instant,
            });
        } else if height != surface.viewport_height() {
            surface.apply(Effect::Resize {
                height,
                motion: Motion::Animated {
                    ms: settings.transition_ms / 2,
                },
            });
        }
    }

    surface.apply(Effect::Ordinal(counter));
    let fragment = widget
        .nav()
        .get(target)
        .and_then(|entry| entry.fragment.clone());

    surface.apply(Effect::Notify(Lifecycle::PanelActive { index: target }));
    log::debug!("{}: {previous:?} -> {target} ({motion:?})", widget.id());

    Some(Transition {
        from: previous,
        to: target,
        motion,
        fragment,
    })
}

pub fn deselect<S: Surface + ?Sized>(widget: &mut Widget, surface: &mut S) -> Option<usize> {
    let previous = widget.set_active(None)?;
    let marker = widget.settings().active_marker.clone();
    mark(surface, &marker, MarkTarget::Panel(previous), false);
    if previous < widget.nav().len() {
        mark(surface, &marker, MarkTarget::Nav(previous), false);
    }
    if widget.has_caption() {
        surface.apply(Effect::Caption(None));
    }
    Some(previous)
}

fn mark<S: Surface + ?Sized>(surface: &mut S, marker: &MarkerName, target: MarkTarget, on: bool) {
    surface.apply(Effect::Mark {
        target,
        marker: marker.clone(),
        on,
    });
}
