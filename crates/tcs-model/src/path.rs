//! Dot-joined addresses into a [`ValueNode`](crate::ValueNode) tree.

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// A validated, non-empty sequence of keys.
///
/// Segments are matched literally. Empty paths, empty segments and leading or
/// trailing dots are malformed, so a `Path` can only be obtained through
/// [`Path::parse`] or [`Path::from_segments`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        let segments: Vec<String> = text.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self(segments))
    }

    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty()
            || segments
                .iter()
                .any(|segment| segment.is_empty() || segment.contains('.'))
        {
            return None;
        }
        Some(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The final key, i.e. the field name of the addressed node.
    pub fn key(&self) -> &str {
        // Non-empty by construction.
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent_segments(&self) -> &[String] {
        &self.0[..self.0.len() - 1]
    }

    pub fn child(&self, key: &str) -> Option<Self> {
        if key.is_empty() || key.contains('.') {
            return None;
        }
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Some(Self(segments))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for Path {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ModelError::InvalidPath(s.to_string()))
    }
}
