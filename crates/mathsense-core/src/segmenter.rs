//! Splits an equation into navigable parts.
//!
//! The default strategy is textual: it splits the full spoken rendering on
//! commas, so part quality depends on the upstream renderer emitting
//! comma-separated clauses. The tree strategy walks the expression instead.

use crate::expression::{Expression, Granularity, Node, NodeKind};
use crate::speech::speak_node;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Spoken text that stands in for "no rendering available".
pub const SPOKEN_PLACEHOLDER: &str = "math equation";
/// Text of the single part substituted when segmentation yields nothing.
pub const FALLBACK_PART_TEXT: &str = "equation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SegmentationStrategy {
    #[default]
    SpokenText,
    ExpressionTree,
}

impl std::fmt::Display for SegmentationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SegmentationStrategy::SpokenText => "spoken-text",
            SegmentationStrategy::ExpressionTree => "expression-tree",
        };
        write!(f, "{}", label)
    }
}

/// One navigable fragment. `number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Part {
    number: usize,
    display_text: String,
    spoken_text: String,
    granularity: Granularity,
}

impl Part {
    pub fn new(
        number: usize,
        display_text: impl Into<String>,
        spoken_text: impl Into<String>,
        granularity: Granularity,
    ) -> Self {
        Self {
            number,
            display_text: display_text.into(),
            spoken_text: spoken_text.into(),
            granularity,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn spoken_text(&self) -> &str {
        &self.spoken_text
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}

/// Comma-split segmentation of a full spoken rendering. Never empty.
pub fn segment_parts(full_spoken_text: &str) -> Vec<Part> {
    let pieces: Vec<&str> = full_spoken_text
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect();

    if pieces.is_empty() || is_placeholder(full_spoken_text) {
        return vec![fallback_part(full_spoken_text)];
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(idx, piece)| Part::new(idx + 1, piece, piece, Granularity::Term))
        .collect()
}

/// Tree segmentation: one part per top-level term, with operators as their
/// own symbol parts. Never empty.
pub fn segment_expression(expression: &Expression) -> Vec<Part> {
    if expression.is_verbatim() {
        let text = match expression.root().kind() {
            NodeKind::Text(text) => text.as_str(),
            _ => "",
        };
        return vec![fallback_part(text)];
    }

    let mut drafts: Vec<(String, String, Granularity)> = Vec::new();
    let mut term: Vec<&Node> = Vec::new();
    for node in expression.top_level() {
        if node.is_operator() {
            flush_term(&mut term, &mut drafts);
            drafts.push((node.display_text(), speak_node(node), Granularity::Symbol));
        } else {
            term.push(node);
        }
    }
    flush_term(&mut term, &mut drafts);

    let drafts: Vec<_> = drafts
        .into_iter()
        .filter(|(_, spoken, _)| !spoken.is_empty())
        .collect();
    if drafts.is_empty() {
        return vec![fallback_part("")];
    }
    drafts
        .into_iter()
        .enumerate()
        .map(|(idx, (display, spoken, granularity))| Part::new(idx + 1, display, spoken, granularity))
        .collect()
}

fn flush_term(term: &mut Vec<&Node>, drafts: &mut Vec<(String, String, Granularity)>) {
    if term.is_empty() {
        return;
    }
    let granularity = match term.as_slice() {
        [single] => match single.granularity() {
            Granularity::Character => Granularity::Term,
            other => other,
        },
        _ => Granularity::Term,
    };
    let display: String = term.iter().map(|node| node.display_text()).collect();
    let spoken = term
        .iter()
        .map(|node| speak_node(node))
        .filter(|spoken| !spoken.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    drafts.push((display, spoken, granularity));
    term.clear();
}

fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed == SPOKEN_PLACEHOLDER
}

fn fallback_part(full_text: &str) -> Part {
    let text = if is_placeholder(full_text) {
        FALLBACK_PART_TEXT
    } else {
        full_text.trim()
    };
    Part::new(1, text, text, Granularity::Structure)
}
