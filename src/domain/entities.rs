//! Domain entities: typed handles and value objects over the markup tree

use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

/// Handle to a `w:p` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Paragraph(Index);

impl Paragraph {
    pub fn new(idx: Index) -> Self {
        Self(idx)
    }

    pub fn index(&self) -> Index {
        self.0
    }
}

/// Handle to a `w:tbl` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Table(Index);

impl Table {
    pub fn new(idx: Index) -> Self {
        Self(idx)
    }

    pub fn index(&self) -> Index {
        self.0
    }
}

/// What closes a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionBoundary {
    /// An explicit `w:sectPr` node
    Marker(Index),
    /// No trailing body-level marker: the section runs to the end of the body
    EndOfBody,
}

/// A section is a derived view identified only by its closing boundary.
///
/// It holds no content. Membership is recomputed from the live tree on every
/// access, so a `Section` stays meaningful across mutations as long as its
/// marker node does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Section {
    boundary: SectionBoundary,
}

impl Section {
    pub fn from_marker(marker: Index) -> Self {
        Self {
            boundary: SectionBoundary::Marker(marker),
        }
    }

    /// The section of a body without a trailing marker.
    pub fn implicit() -> Self {
        Self {
            boundary: SectionBoundary::EndOfBody,
        }
    }

    pub fn boundary(&self) -> SectionBoundary {
        self.boundary
    }

    pub fn marker(&self) -> Option<Index> {
        match self.boundary {
            SectionBoundary::Marker(idx) => Some(idx),
            SectionBoundary::EndOfBody => None,
        }
    }
}

/// Physical placement of a boundary marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerHost {
    /// `w:p/w:pPr/w:sectPr`: closes a non-final section; holds the paragraph
    Paragraph(Index),
    /// `w:body/w:sectPr`: closes the final section
    Body,
}

/// How the section starts relative to the previous one (`w:type/@w:val`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionBreakType {
    #[default]
    NextPage,
    Continuous,
    EvenPage,
    OddPage,
    NextColumn,
}

impl SectionBreakType {
    pub fn from_val(val: &str) -> Option<Self> {
        match val {
            "nextPage" => Some(Self::NextPage),
            "continuous" => Some(Self::Continuous),
            "evenPage" => Some(Self::EvenPage),
            "oddPage" => Some(Self::OddPage),
            "nextColumn" => Some(Self::NextColumn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NextPage => "nextPage",
            Self::Continuous => "continuous",
            Self::EvenPage => "evenPage",
            Self::OddPage => "oddPage",
            Self::NextColumn => "nextColumn",
        }
    }
}

impl fmt::Display for SectionBreakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of tracked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    Insertion,
    Deletion,
}

impl RevisionKind {
    /// Local name of the wrapper element.
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::Insertion => crate::domain::wml::INS,
            Self::Deletion => crate::domain::wml::DEL,
        }
    }
}

/// Run-level formatting for newly inserted text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Formatting {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    /// Font size in points
    pub size: Option<f64>,
    pub font_family: Option<String>,
    /// Hex RGB, with or without a leading `#`
    pub color: Option<String>,
    /// Highlight name, e.g. `yellow`
    pub highlight: Option<String>,
}

impl Formatting {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("nextPage", SectionBreakType::NextPage)]
    #[case("continuous", SectionBreakType::Continuous)]
    #[case("evenPage", SectionBreakType::EvenPage)]
    #[case("oddPage", SectionBreakType::OddPage)]
    #[case("nextColumn", SectionBreakType::NextColumn)]
    fn given_wml_value_when_parsing_break_type_then_matches(
        #[case] val: &str,
        #[case] expected: SectionBreakType,
    ) {
        assert_eq!(SectionBreakType::from_val(val), Some(expected));
        assert_eq!(expected.as_str(), val);
    }

    #[test]
    fn given_unknown_break_value_when_parsing_then_none() {
        assert_eq!(SectionBreakType::from_val("sideways"), None);
    }

    #[test]
    fn given_default_formatting_when_checked_then_plain() {
        assert!(Formatting::default().is_plain());
        let bold = Formatting {
            bold: true,
            ..Formatting::default()
        };
        assert!(!bold.is_plain());
    }
}
