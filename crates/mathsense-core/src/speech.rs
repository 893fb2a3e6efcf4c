//! Linear spoken renderings of math.
//!
//! `speakable` is the lexical renderer: an ordered table of token
//! substitutions over the LaTeX source. It does not look at structure, so a
//! fraction nested in a root reads the same as one at top level. The order of
//! the table matters (longer tokens first) and is kept stable for
//! compatibility with existing worksheets.
//!
//! `speak_expression` walks an [`Expression`] tree with the same vocabulary and
//! is used when only MathML is available.

use crate::expression::{Expression, Node, NodeKind};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

static SUBSTITUTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\\frac\{", "fraction of "),
        (r"\}\{", " over "),
        (r"\}", ""),
        (r"\\sqrt\{", "square root of "),
        (r"\^\{?", " to the power of "),
        (r"_\{?", " sub "),
        (r"\\cdot", " times "),
        (r"\\times", " times "),
        (r"\{", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Verbosity {
    #[default]
    Brief,
    Verbose,
}

impl Verbosity {
    /// Applies the verbosity framing to already-rendered text.
    pub fn frame(self, text: &str) -> String {
        match self {
            Verbosity::Brief => text.to_string(),
            Verbosity::Verbose => format!("Start equation. {text}. End equation."),
        }
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Verbosity::Brief => "brief",
            Verbosity::Verbose => "verbose",
        };
        write!(f, "{}", label)
    }
}

/// Lexical LaTeX-to-speech rendering.
pub fn speakable(source: &str, verbosity: Verbosity) -> String {
    let text = SUBSTITUTIONS
        .iter()
        .fold(source.to_string(), |text, (pattern, replacement)| {
            pattern.replace_all(&text, NoExpand(replacement)).into_owned()
        });
    verbosity.frame(&text)
}

/// Structural rendering of a parsed expression.
pub fn speak_expression(expression: &Expression, verbosity: Verbosity) -> String {
    verbosity.frame(&speak_node(expression.root()))
}

/// Structural rendering of one node, whitespace-collapsed.
pub fn speak_node(node: &Node) -> String {
    let mut out = String::new();
    render_node(node, &mut out);
    RE_HORIZONTAL_WS.replace_all(&out, " ").trim().to_string()
}

fn render_node(node: &Node, out: &mut String) {
    match node.kind() {
        NodeKind::Text(text) => {
            out.push(' ');
            out.push_str(text);
            out.push(' ');
        }
        NodeKind::Operator(symbol) => {
            out.push(' ');
            out.push_str(operator_words(symbol));
            out.push(' ');
        }
        NodeKind::Fraction {
            numerator,
            denominator,
        } => {
            out.push_str(" fraction of ");
            render_node(numerator, out);
            out.push_str(" over ");
            render_node(denominator, out);
        }
        NodeKind::Root { radicand, index } => {
            match index {
                Some(index) => {
                    out.push_str(" root ");
                    render_node(index, out);
                    out.push_str(" of ");
                }
                None => out.push_str(" square root of "),
            }
            render_node(radicand, out);
        }
        NodeKind::Superscript { base, exponent } => {
            render_node(base, out);
            out.push_str(" to the power of ");
            render_node(exponent, out);
        }
        NodeKind::Subscript { base, subscript } => {
            render_node(base, out);
            out.push_str(" sub ");
            render_node(subscript, out);
        }
        NodeKind::Grouping(children) => {
            for child in children {
                render_node(child, out);
            }
        }
    }
}

fn operator_words(symbol: &str) -> &str {
    match symbol {
        "+" => "plus",
        "-" | "−" => "minus",
        "=" => "equals",
        "·" | "⋅" | "×" | "*" => "times",
        "÷" => "divided by",
        "/" => "over",
        "±" => "plus or minus",
        "∓" => "minus or plus",
        "<" => "is less than",
        ">" => "is greater than",
        "≤" => "is less than or equal to",
        "≥" => "is greater than or equal to",
        "≠" => "is not equal to",
        "≈" => "is approximately equal to",
        "(" | "[" | "{" => "open paren",
        ")" | "]" | "}" => "close paren",
        "!" => "factorial",
        "→" => "goes to",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_scenario_matches_documented_output() {
        assert_eq!(
            speakable(r"\frac{1}{2}+\sqrt{4}", Verbosity::Verbose),
            "Start equation. fraction of 1 over 2+square root of 4. End equation."
        );
    }

    #[test]
    fn verbose_is_brief_with_framing() {
        for source in [r"x^2", r"a_1 \cdot b", "", r"\sqrt{\frac{1}{x}}"] {
            assert_eq!(
                speakable(source, Verbosity::Verbose),
                format!("Start equation. {}. End equation.", speakable(source, Verbosity::Brief))
            );
        }
    }

    #[test]
    fn brief_output_has_no_control_sequences() {
        for source in [
            r"\frac{1}{2}+\sqrt{4}",
            r"\sqrt{\frac{a}{b}}",
            r"x^{2}+y_{i}",
            r"3 \cdot 4 \times 5",
            r"{a}^2",
        ] {
            let spoken = speakable(source, Verbosity::Brief);
            assert!(
                !spoken.contains(['\\', '{', '}', '^', '_']),
                "{source:?} rendered as {spoken:?}"
            );
        }
    }

    #[test]
    fn nested_constructs_render_left_to_right() {
        assert_eq!(
            speakable(r"\sqrt{\frac{1}{x}}", Verbosity::Brief),
            "square root of fraction of 1 over x"
        );
        assert_eq!(speakable("x^2", Verbosity::Brief), "x to the power of 2");
        assert_eq!(speakable("a_1", Verbosity::Brief), "a sub 1");
        assert_eq!(speakable(r"2\cdot3", Verbosity::Brief), "2 times 3");
    }

    #[test]
    fn structural_renderer_reads_mathml() {
        let expr = Expression::from_mathml(
            "<math><mfrac><mn>1</mn><mn>2</mn></mfrac><mo>+</mo>\
             <msqrt><mn>4</mn></msqrt></math>",
        );
        assert_eq!(
            speak_expression(&expr, Verbosity::Brief),
            "fraction of 1 over 2 plus square root of 4"
        );
    }

    #[test]
    fn structural_renderer_handles_indexed_root_and_scripts() {
        let expr = Expression::from_latex(r"\sqrt[3]{x_1^2}");
        assert_eq!(
            speak_expression(&expr, Verbosity::Brief),
            "root 3 of x sub 1 to the power of 2"
        );
    }
}
