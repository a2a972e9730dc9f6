use crate::settings::ModeFlags;
use rand::Rng;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Step {
    First,
    Last,
    Next,
    #[strum(to_string = "prev", serialize = "previous")]
    Prev,
    Random,
    Initialize,
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum IndexRequest {
    Index(i64),
    Step(Step),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseRequestError {
    #[error("Unrecognised panel request '{0}'")]
    Unknown(String),
}

impl FromStr for IndexRequest {
    type Err = ParseRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<i64>() {
            return Ok(Self::Index(index));
        }
        s.parse::<Step>()
            .map(Self::Step)
            .map_err(|_| ParseRequestError::Unknown(s.to_string()))
    }
}

impl fmt::Display for IndexRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Step(step) => write!(f, "{step}"),
        }
    }
}

impl From<Step> for IndexRequest {
    fn from(step: Step) -> Self {
        Self::Step(step)
    }
}

impl From<usize> for IndexRequest {
    fn from(index: usize) -> Self {
        Self::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    Append(usize),
    Prepend(usize),
}

impl Growth {
    pub fn count(&self) -> usize {
        match *self {
            Self::Append(n) | Self::Prepend(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum PageEdge {
    FirstPage,
    LastPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexContext {
    pub current: Option<usize>,
    pub total: usize,
    pub original_total: usize,
    pub page_size: usize,
    pub flags: ModeFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub target: usize,
    pub total: usize,
    pub instant: bool,
    pub refresh: bool,
    pub initial: bool,
    pub growth: Option<Growth>,
    pub page_edge: Option<PageEdge>,
}

impl Resolution {
    pub fn at(target: usize, total: usize) -> Self {
        Self {
            target,
            total,
            instant: false,
            refresh: false,
            initial: false,
            growth: None,
            page_edge: None,
        }
    }
}

/// Resolves `request` against `ctx`. `None` means no transition at all.
pub fn resolve<R: Rng + ?Sized>(
    ctx: &IndexContext,
    request: IndexRequest,
    rng: &mut R,
) -> Option<Resolution> {
    if ctx.total == 0 {
        return None;
    }
    let current = ctx.current.unwrap_or(0);

    let resolution = match request {
        IndexRequest::Index(requested) => ctx.normalize(current, requested),
        IndexRequest::Step(step) => match step {
            Step::First => ctx.normalize(current, 0),
            Step::Last => ctx.normalize(current, to_i64(ctx.total - 1)),
            Step::Next if ctx.flags.multiple => ctx.page_forward(current),
            Step::Prev if ctx.flags.multiple => ctx.page_back(current),
            Step::Next => ctx.normalize(current, to_i64(current) + 1),
            Step::Prev => ctx.normalize(current, to_i64(current) - 1),
            Step::Random => ctx.random(current, rng),
            Step::Initialize => {
                if !ctx.flags.autoselect {
                    return None;
                }
                Resolution {
                    instant: true,
                    refresh: true,
                    initial: true,
                    ..Resolution::at(0, ctx.total)
                }
            }
            Step::Current => Resolution {
                instant: true,
                refresh: true,
                ..Resolution::at(current, ctx.total)
            },
        },
    };

    Some(resolution)
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl IndexContext {
    fn normalize(&self, current: usize, requested: i64) -> Resolution {
        let total = to_i64(self.total);

        if !self.flags.infinite {
            let target = if requested < 0 {
                self.total - 1
            } else if requested >= total {
                0
            } else {
                requested as usize
            };
            return Resolution::at(target, self.total);
        }

        if requested < 0 {
            let added = self.total;
            return Resolution {
                instant: true,
                growth: Some(Growth::Prepend(added)),
                ..Resolution::at(added - 1, self.total + added)
            };
        }

        let mut grown = self.total;
        let mut target = requested as u64;
        if target >= grown as u64 {
            grown *= 2;
            target %= grown as u64;
        }
        let target = target as usize;
        if target > current && target == grown - 1 {
            grown *= 2;
        }

        Resolution {
            growth: (grown > self.total).then_some(Growth::Append(grown - self.total)),
            ..Resolution::at(target, grown)
        }
    }

    fn page_forward(&self, current: usize) -> Resolution {
        let page = self.page_size.max(1);
        let last_page = self.total.saturating_sub(page);
        let target = (current + page).min(last_page.max(current));
        Resolution {
            page_edge: (target >= last_page).then_some(PageEdge::LastPage),
            ..Resolution::at(target, self.total)
        }
    }

    fn page_back(&self, current: usize) -> Resolution {
        let page = self.page_size.max(1);
        let target = current.saturating_sub(page);
        Resolution {
            page_edge: (target == 0).then_some(PageEdge::FirstPage),
            ..Resolution::at(target, self.total)
        }
    }

    fn random<R: Rng + ?Sized>(&self, current: usize, rng: &mut R) -> Resolution {
        if self.total <= 1 {
            return Resolution::at(current, self.total);
        }
        // draw from total-1 slots and skip over the current one
        let pick = rng.random_range(0..self.total - 1);
        let target = if pick >= current { pick + 1 } else { pick };
        Resolution::at(target, self.total)
    }
}
