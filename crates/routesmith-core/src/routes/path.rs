//! Canonical path strings from URI segments.

use std::borrow::Cow;

use crate::model::Segment;

impl Segment {
    /// Render one segment: literals as-is, every label variant as `{name}`
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Segment::Literal(text) | Segment::Other(text) => Cow::Borrowed(text),
            Segment::Label(name) | Segment::GreedyLabel(name) | Segment::NonGreedyLabel(name) => {
                Cow::Owned(format!("{{{}}}", name))
            }
        }
    }
}

/// Encode segments as `/seg/seg/...`. An empty list encodes to the empty string.
pub fn encode(segments: &[Segment]) -> String {
    segments.iter().fold(String::new(), |mut path, segment| {
        path.push('/');
        path.push_str(&segment.render());
        path
    })
}
