use crate::deeplink::Fragment;
use crate::gesture::{Edge, SwipeDirection};
use crate::index::Step;
use strum::Display as StrumDisplay;

/// Notifications for external listeners. The engine never reacts to them.
#[derive(Debug, Clone, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum Lifecycle {
    Initialized,
    PanelActive { index: usize },
    ReachedFirst,
    ReachedLast,
    NavigationClicked { index: usize },
    NavigationHovered { index: usize },
    /// A prev/next/first/last/random control was used.
    Control(Step),
    Deselected,
    Swiped(SwipeDirection),
    HashUpdated(Fragment),
    ClickToFocus { index: usize },
    Bounced(Edge),
}
