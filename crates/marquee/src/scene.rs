use crate::config::{WidgetConfig, WidgetName};
use marquee_core::index::Growth;
use marquee_core::transition::{Effect, Motion, PositionMarkers, Surface};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Scene {
    name: WidgetName,
    panel_width: f64,
    viewport_width: f64,
    padding_left: f64,
    heights: Vec<f64>,
    captions: Vec<Option<String>>,
    titles: Vec<Option<String>>,
    margin: f64,
    viewport_height: f64,
    caption: Option<String>,
    counter: Option<String>,
    counter_total: Option<usize>,
    ordinal: Option<String>,
    position: Option<PositionMarkers>,
    autoplay: Option<bool>,
    pending_animation: Option<Duration>,
}

impl Scene {
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            name: config.name.clone(),
            panel_width: config.panel_width,
            viewport_width: config.viewport_width.unwrap_or(config.panel_width),
            padding_left: config.padding_left,
            heights: config.panels.iter().map(|p| p.height).collect(),
            captions: config.panels.iter().map(|p| p.caption.clone()).collect(),
            titles: config.panels.iter().map(|p| p.title.clone()).collect(),
            margin: 0.0,
            viewport_height: 0.0,
            caption: None,
            counter: None,
            counter_total: None,
            ordinal: None,
            position: None,
            autoplay: None,
            pending_animation: None,
        }
    }

    pub fn name(&self) -> &WidgetName {
        &self.name
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn height(&self) -> f64 {
        self.viewport_height
    }

    pub fn strip_len(&self) -> usize {
        self.heights.len()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn counter(&self) -> Option<&str> {
        self.counter.as_deref()
    }

    pub fn ordinal(&self) -> Option<&str> {
        self.ordinal.as_deref()
    }

    pub fn counter_total(&self) -> Option<usize> {
        self.counter_total
    }

    pub fn position(&self) -> Option<PositionMarkers> {
        self.position
    }

    pub fn autoplay_indicator(&self) -> Option<bool> {
        self.autoplay
    }

    /// Duration of the translation started by the last effects, if it was
    /// animated. Cleared on read.
    pub fn take_pending_animation(&mut self) -> Option<Duration> {
        self.pending_animation.take()
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    fn grow(&mut self, growth: Growth) {
        let len = self.heights.len();
        if len == 0 {
            return;
        }
        let copies: Vec<f64> = (0..growth.count()).map(|i| self.heights[i % len]).collect();
        match growth {
            Growth::Append(_) => self.heights.extend(copies),
            Growth::Prepend(_) => {
                self.heights.splice(0..0, copies);
            }
        }
    }
}

impl Surface for Scene {
    fn panel_offset(&self, index: usize) -> f64 {
        self.padding_left + self.margin + index as f64 * self.panel_width
    }

    fn panel_height(&self, index: usize) -> f64 {
        self.heights.get(index).copied().unwrap_or(0.0)
    }

    fn panel_width(&self) -> f64 {
        self.panel_width
    }

    fn strip_margin(&self) -> f64 {
        self.margin
    }

    fn padding_left(&self) -> f64 {
        self.padding_left
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn caption_fragment(&self, nav: usize) -> Option<String> {
        self.captions.get(nav).cloned().flatten()
    }

    fn title_attribute(&self, nav: usize) -> Option<String> {
        self.titles.get(nav).cloned().flatten()
    }

    fn apply(&mut self, effect: Effect) {
        log::debug!("{}: {:?}", self.name, effect);

        match effect {
            Effect::StopAnimations => self.pending_animation = None,
            Effect::Grow(growth) => self.grow(growth),
            Effect::Position(position) => self.position = Some(position),
            Effect::Caption(caption) => self.caption = caption,
            Effect::Counter(counter) => self.counter = Some(counter.to_string()),
            Effect::CounterTotal(total) => self.counter_total = Some(total),
            Effect::Translate { margin, motion } => {
                self.margin = margin;
                self.pending_animation = match motion {
                    Motion::Instant => None,
                    Motion::Animated { ms } => Some(Duration::from_millis(ms)),
                };
            }
            Effect::Resize { height, .. } => self.viewport_height = height,
            Effect::Ordinal(counter) => self.ordinal = Some(counter.to_string()),
            Effect::AutoplayIndicator(on) => self.autoplay = Some(on),
            Effect::Notify(event) => log::info!("{}: {}", self.name, event),
            Effect::Mark { .. } | Effect::FadeText { .. } | Effect::Bounce(_) => {}
        }
    }
}
