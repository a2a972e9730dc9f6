use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display as StrumDisplay, EnumString};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct MarkerName(String);

crate::impl_string_newtype!(MarkerName);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct TextSelector(String);

crate::impl_string_newtype!(TextSelector);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct CaptionTarget(String);

crate::impl_string_newtype!(CaptionTarget);

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum TouchMode {
    #[default]
    Swipe,
    Drag,
}

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
#[strum(ascii_case_insensitive)]
pub enum Marker {
    #[strum(to_string = "fade")]
    Fade,
    #[strum(to_string = "slide")]
    Slide,
    #[strum(to_string = "infinite")]
    Infinite,
    #[strum(to_string = "multiple")]
    Multiple,
    #[strum(to_string = "fixed")]
    Fixed,
    #[strum(to_string = "autosize")]
    Autosize,
    #[strum(to_string = "hover-activate")]
    HoverActivate,
    #[strum(to_string = "no-autoselect")]
    NoAutoselect,
    #[strum(to_string = "clickToFocus", serialize = "click-to-focus")]
    ClickToFocus,
    #[strum(to_string = "fast")]
    Fast,
    #[strum(to_string = "autoplay")]
    Autoplay,
    #[strum(to_string = "custom")]
    Custom,
}

impl Marker {
    /// Picks the recognised markers out of a class list. Anything else
    /// (`marquee`, styling classes) is ignored.
    pub fn from_classes<S: AsRef<str>>(classes: &[S]) -> Vec<Marker> {
        classes
            .iter()
            .filter_map(|c| c.as_ref().parse().ok())
            .collect()
    }
}

pub const FAST_TRANSITION_MS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub active_marker: MarkerName,
    pub fade_text: bool,
    pub fade_text_selector: TextSelector,
    pub hide_transitions: bool,
    pub transition_ms: u64,
    pub caption_target: CaptionTarget,
    pub autoplay: bool,
    pub autoplay_interval_ms: u64,
    pub resizable: bool,
    pub touch_enabled: bool,
    pub touch_mode: TouchMode,
    pub swipe_threshold_px: f64,
    pub hover_activates_nav: bool,
    pub autoselect_first: bool,
    /// Explicit page size for `multiple` widgets. Measured from the viewport
    /// when unset.
    pub panels_per_page: Option<usize>,
    pub left_offset_px: f64,
    pub bounce_px: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_marker: MarkerName::new("current"),
            fade_text: true,
            fade_text_selector: TextSelector::new("h1,.summary"),
            hide_transitions: false,
            transition_ms: 500,
            caption_target: CaptionTarget::new("marquee_current_description"),
            autoplay: false,
            autoplay_interval_ms: 4000,
            resizable: true,
            touch_enabled: true,
            touch_mode: TouchMode::Swipe,
            swipe_threshold_px: 30.0,
            hover_activates_nav: false,
            autoselect_first: true,
            panels_per_page: None,
            left_offset_px: 0.0,
            bounce_px: 40.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOverride {
    pub active_marker: Option<MarkerName>,
    pub fade_text: Option<bool>,
    pub fade_text_selector: Option<TextSelector>,
    pub hide_transitions: Option<bool>,
    pub transition_ms: Option<u64>,
    pub caption_target: Option<CaptionTarget>,
    pub autoplay: Option<bool>,
    pub autoplay_interval_ms: Option<u64>,
    pub resizable: Option<bool>,
    pub touch_enabled: Option<bool>,
    pub touch_mode: Option<TouchMode>,
    pub swipe_threshold_px: Option<f64>,
    pub hover_activates_nav: Option<bool>,
    pub autoselect_first: Option<bool>,
    pub panels_per_page: Option<usize>,
    pub left_offset_px: Option<f64>,
    pub bounce_px: Option<f64>,
}

macro_rules! overlay {
    ($src:expr, $dst:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$src.$field {
                $dst.$field = value.clone();
            }
        )+
    };
}

impl SettingsOverride {
    pub fn apply(&self, settings: &mut Settings) {
        overlay!(self, settings;
            active_marker,
            fade_text,
            fade_text_selector,
            hide_transitions,
            transition_ms,
            caption_target,
            autoplay,
            autoplay_interval_ms,
            resizable,
            touch_enabled,
            touch_mode,
            swipe_threshold_px,
            hover_activates_nav,
            autoselect_first,
            left_offset_px,
            bounce_px,
        );
        if let Some(per_page) = self.panels_per_page {
            settings.panels_per_page = Some(per_page);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub infinite: bool,
    pub multiple: bool,
    pub click_to_focus: bool,
    pub hover_activate: bool,
    pub autoselect: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub settings: Settings,
    pub flags: ModeFlags,
}

impl Settings {
    pub fn resolve(base: &Settings, overrides: &[&SettingsOverride], markers: &[Marker]) -> Resolved {
        let mut settings = base.clone();
        for layer in overrides {
            layer.apply(&mut settings);
        }

        let has = |m: Marker| markers.contains(&m);

        if has(Marker::Slide) {
            settings.hide_transitions = false;
        }
        if has(Marker::Fade) {
            settings.hide_transitions = true;
        }
        if has(Marker::Autosize) {
            settings.resizable = true;
        }
        // fixed wins over autosize
        if has(Marker::Fixed) {
            settings.resizable = false;
        }
        if has(Marker::HoverActivate) {
            settings.hover_activates_nav = true;
        }
        if has(Marker::NoAutoselect) {
            settings.autoselect_first = false;
        }
        if has(Marker::Fast) {
            settings.transition_ms = FAST_TRANSITION_MS;
        }
        if has(Marker::Autoplay) {
            settings.autoplay = true;
        }

        let flags = ModeFlags {
            infinite: has(Marker::Infinite),
            multiple: has(Marker::Multiple),
            click_to_focus: has(Marker::ClickToFocus),
            hover_activate: settings.hover_activates_nav,
            autoselect: settings.autoselect_first,
        };

        Resolved { settings, flags }
    }
}
