use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Fragment(String);

crate::impl_string_newtype!(Fragment);

impl Fragment {
    /// Extracts the fragment of an href (`page.html#intro` -> `#intro`).
    /// Bare names are accepted too. Empty fragments are not fragments.
    pub fn of_href(href: &str) -> Option<Self> {
        let name = match href.split_once('#') {
            Some((_, name)) => name,
            None if href.contains('/') || href.contains('.') => return None,
            None => href,
        };
        let name = name.trim();
        (!name.is_empty()).then(|| Self(format!("#{name}")))
    }
}

/// Index of the single entry whose fragment equals `wanted`; `None` when
/// nothing or more than one entry matches.
pub fn match_unique<'a, I>(fragments: I, wanted: &Fragment) -> Option<usize>
where
    I: IntoIterator<Item = Option<&'a Fragment>>,
{
    let mut matches = fragments
        .into_iter()
        .enumerate()
        .filter(|(_, f)| *f == Some(wanted))
        .map(|(i, _)| i);

    let first = matches.next()?;
    matches.next().is_none().then_some(first)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub href: String,
    pub fragment: Option<Fragment>,
    pub in_nav: bool,
    pub marked: bool,
}

impl PageLink {
    pub fn new(href: impl Into<String>, in_nav: bool) -> Self {
        let href = href.into();
        Self {
            fragment: Fragment::of_href(&href),
            href,
            in_nav,
            marked: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkMarks {
    links: Vec<PageLink>,
    current: Option<Fragment>,
}

impl LinkMarks {
    pub fn new(links: Vec<PageLink>) -> Self {
        Self {
            links,
            current: None,
        }
    }

    pub fn add(&mut self, link: PageLink) {
        self.links.push(link);
    }

    pub fn current(&self) -> Option<&Fragment> {
        self.current.as_ref()
    }

    pub fn links(&self) -> &[PageLink] {
        &self.links
    }

    pub fn marked(&self) -> impl Iterator<Item = &PageLink> {
        self.links.iter().filter(|l| l.marked)
    }

    pub fn point_at(&mut self, fragment: Option<&Fragment>) -> usize {
        self.current = fragment.cloned();
        let mut count = 0;
        for link in &mut self.links {
            link.marked = !link.in_nav && fragment.is_some() && link.fragment.as_ref() == fragment;
            count += usize::from(link.marked);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(s: &str) -> Fragment {
        Fragment::new(s)
    }

    #[test]
    fn test_fragment_of_href() {
        let cases = vec![
            ("#intro", Some("#intro")),
            ("/docs/page.html#intro", Some("#intro")),
            ("intro", Some("#intro")),
            ("#", None),
            ("", None),
            ("/docs/page.html", None),
        ];

        for (href, expected) in cases {
            assert_eq!(Fragment::of_href(href), expected.map(frag), "{href}");
        }
    }

    #[test]
    fn test_match_unique() {
        let a = frag("#a");
        let b = frag("#b");
        let nav = [Some(&a), None, Some(&b)];

        assert_eq!(match_unique(nav, &b), Some(2));
        assert_eq!(match_unique(nav, &frag("#c")), None);

        let ambiguous = [Some(&a), Some(&a)];
        assert_eq!(match_unique(ambiguous, &a), None);
    }

    #[test]
    fn test_point_at_moves_marks() {
        let mut marks = LinkMarks::new(vec![
            PageLink::new("#one", false),
            PageLink::new("/other#one", false),
            PageLink::new("#one", true),
            PageLink::new("#two", false),
        ]);

        assert_eq!(marks.point_at(Some(&frag("#one"))), 2);
        assert_eq!(
            marks.marked().map(|l| l.href.as_str()).collect::<Vec<_>>(),
            vec!["#one", "/other#one"]
        );

        assert_eq!(marks.point_at(Some(&frag("#two"))), 1);
        assert_eq!(marks.marked().next().map(|l| l.href.as_str()), Some("#two"));
        assert_eq!(marks.current(), Some(&frag("#two")));

        assert_eq!(marks.point_at(None), 0);
    }
}
