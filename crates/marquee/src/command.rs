use crate::config::WidgetName;
use marquee_core::deeplink::Fragment;
use marquee_core::gesture::Point;
use marquee_core::index::{IndexRequest, ParseRequestError};
use marquee_core::selector::{Selector, SelectorError};
use marquee_core::widget::Control;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid quoting: {0}")]
    Split(#[from] shell_words::ParseError),
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    Arguments {
        command: Verb,
        expected: &'static str,
    },
    #[error("Invalid number '{0}'")]
    Number(String),
    #[error("Invalid fragment '{0}'")]
    Fragment(String),
    #[error(transparent)]
    Request(#[from] ParseRequestError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("Unknown control: {0}")]
    Control(#[from] strum::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Verb {
    Goto,
    Click,
    Hover,
    Focus,
    Press,
    Swipe,
    Enter,
    Leave,
    Toggle,
    Autoplay,
    Hash,
    Resize,
    Init,
    Done,
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GoTo(WidgetName, IndexRequest),
    ClickNav(WidgetName, usize),
    HoverNav(WidgetName, usize),
    ClickPanel(WidgetName, usize),
    Press(WidgetName, Control),
    Swipe(WidgetName, Point, Point),
    PointerEnter(WidgetName),
    PointerLeave(WidgetName),
    ToggleAutoplay(WidgetName),
    EnableAutoplay(WidgetName),
    Hash(Fragment),
    Resize,
    Init(Selector),
    TransitionDone(WidgetName),
    Status,
}

impl Command {
    pub fn widget(&self) -> Option<&WidgetName> {
        match self {
            Self::GoTo(w, _)
            | Self::ClickNav(w, _)
            | Self::HoverNav(w, _)
            | Self::ClickPanel(w, _)
            | Self::Press(w, _)
            | Self::Swipe(w, _, _)
            | Self::PointerEnter(w)
            | Self::PointerLeave(w)
            | Self::ToggleAutoplay(w)
            | Self::EnableAutoplay(w)
            | Self::TransitionDone(w) => Some(w),
            Self::Hash(_) | Self::Resize | Self::Init(_) | Self::Status => None,
        }
    }
}

fn number<T: FromStr>(s: &str) -> Result<T, CommandError> {
    s.parse().map_err(|_| CommandError::Number(s.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words = shell_words::split(line)?;
        let Some((first, args)) = words.split_first() else {
            return Err(CommandError::Empty);
        };
        let verb: Verb = first
            .parse()
            .map_err(|_| CommandError::Unknown(first.clone()))?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let wrong = |expected| CommandError::Arguments {
            command: verb,
            expected,
        };
        let name = |s: &str| WidgetName::new(s);

        let command = match (verb, args.as_slice()) {
            (Verb::Goto, &[w, target]) => Self::GoTo(name(w), target.parse()?),
            (Verb::Goto, _) => return Err(wrong("<widget> <target>")),
            (Verb::Click, &[w, i]) => Self::ClickNav(name(w), number(i)?),
            (Verb::Hover, &[w, i]) => Self::HoverNav(name(w), number(i)?),
            (Verb::Focus, &[w, i]) => Self::ClickPanel(name(w), number(i)?),
            (Verb::Click | Verb::Hover | Verb::Focus, _) => return Err(wrong("<widget> <index>")),
            (Verb::Press, &[w, control]) => Self::Press(name(w), control.parse()?),
            (Verb::Press, _) => return Err(wrong("<widget> <control>")),
            (Verb::Swipe, &[w, x0, y0, x1, y1]) => Self::Swipe(
                name(w),
                Point::new(number(x0)?, number(y0)?),
                Point::new(number(x1)?, number(y1)?),
            ),
            (Verb::Swipe, _) => return Err(wrong("<widget> <x0> <y0> <x1> <y1>")),
            (Verb::Enter, &[w]) => Self::PointerEnter(name(w)),
            (Verb::Leave, &[w]) => Self::PointerLeave(name(w)),
            (Verb::Toggle, &[w]) => Self::ToggleAutoplay(name(w)),
            (Verb::Autoplay, &[w]) => Self::EnableAutoplay(name(w)),
            (Verb::Done, &[w]) => Self::TransitionDone(name(w)),
            (Verb::Enter | Verb::Leave | Verb::Toggle | Verb::Autoplay | Verb::Done, _) => {
                return Err(wrong("<widget>"));
            }
            (Verb::Hash, &[fragment]) => Self::Hash(
                Fragment::of_href(fragment)
                    .ok_or_else(|| CommandError::Fragment(fragment.to_string()))?,
            ),
            (Verb::Hash, _) => return Err(wrong("<#fragment>")),
            (Verb::Init, &[selector]) => Self::Init(selector.parse()?),
            (Verb::Init, _) => return Err(wrong("<selector>")),
            (Verb::Resize, &[]) => Self::Resize,
            (Verb::Status, &[]) => Self::Status,
            (Verb::Resize | Verb::Status, _) => return Err(wrong("no arguments")),
        };
        Ok(command)
    }
}
