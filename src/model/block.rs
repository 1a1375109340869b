//! Block and inline structures produced from HTML content.

use super::math::MathExpression;

/// Character formatting applied to a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl RunFormat {
    pub const PLAIN: RunFormat = RunFormat {
        bold: false,
        italic: false,
        underline: false,
    };

    /// Combine two formats; a flag set in either is set in the result.
    pub fn union(self, other: RunFormat) -> RunFormat {
        RunFormat {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }
}

/// Atomic unit of styled text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRun {
    pub text: String,
    pub format: RunFormat,
}

impl FormattedRun {
    pub fn new(text: impl Into<String>, format: RunFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunFormat::PLAIN)
    }

    pub fn bold(&self) -> bool {
        self.format.bold
    }

    pub fn italic(&self) -> bool {
        self.format.italic
    }

    pub fn underline(&self) -> bool {
        self.format.underline
    }
}

/// An external link whose relationship id is registered in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub display_runs: Vec<FormattedRun>,
    pub target_uri: String,
    pub relationship_id: String,
}

impl Hyperlink {
    pub fn text(&self) -> String {
        self.display_runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Inline content of a paragraph-like block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Run(FormattedRun),
    Hyperlink(Hyperlink),
    Math(MathExpression),
}

impl Inline {
    /// Visible text; formulas contribute their source.
    pub fn text(&self) -> String {
        match self {
            Inline::Run(run) => run.text.clone(),
            Inline::Hyperlink(link) => link.text(),
            Inline::Math(math) => math.source.clone(),
        }
    }
}

/// Concatenated visible text of an inline sequence.
pub fn inline_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::text).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Start,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Ordered(u32),
}

impl ListMarker {
    pub fn label(&self) -> String {
        match self {
            ListMarker::Bullet => "•".to_string(),
            ListMarker::Ordered(n) => format!("{n}."),
        }
    }
}

/// One table cell: an independent block sequence.
pub type Cell = Vec<Block>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
    /// Leading rows that came from `thead` or `th`-only rows.
    pub header_rows: usize,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A structural unit of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        /// 1..=3
        level: u8,
        runs: Vec<Inline>,
    },
    Paragraph {
        runs: Vec<Inline>,
        alignment: Alignment,
    },
    ListItem {
        runs: Vec<Inline>,
        /// `None` for a continuation paragraph of the previous item.
        marker: Option<ListMarker>,
        /// Zero-based nesting depth.
        level: u8,
    },
    Table(Table),
}

impl Block {
    pub fn paragraph(runs: Vec<Inline>) -> Self {
        Block::Paragraph {
            runs,
            alignment: Alignment::Start,
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            runs: vec![Inline::Run(FormattedRun::plain(text))],
        }
    }

    /// Inline content, if the block is paragraph-like.
    pub fn runs(&self) -> Option<&[Inline]> {
        match self {
            Block::Heading { runs, .. }
            | Block::Paragraph { runs, .. }
            | Block::ListItem { runs, .. } => Some(runs),
            Block::Table(_) => None,
        }
    }

    /// Visible text of the block; table cells are joined by tabs and rows by
    /// newlines.
    pub fn text(&self) -> String {
        match self {
            Block::Table(table) => table
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| {
                            cell.iter().map(Block::text).collect::<Vec<_>>().join("\n")
                        })
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.runs().map(inline_text).unwrap_or_default(),
        }
    }
}
