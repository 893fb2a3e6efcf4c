//! Presentation-MathML reader built on `quick-xml` events.

use crate::expression::{MAX_NESTING_DEPTH, Node};
use anyhow::{Context, Result, anyhow, bail};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Invisible operators (function application, invisible times, separator, plus).
const INVISIBLE_OPERATORS: &[char] = &['\u{2061}', '\u{2062}', '\u{2063}', '\u{2064}'];

struct Frame {
    name: String,
    children: Vec<Node>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
            text: String::new(),
        }
    }
}

pub(crate) fn parse_mathml(source: &str) -> Result<Node> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("reading MathML at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                let name = local_name(start.local_name().as_ref())?;
                if stack.len() >= MAX_NESTING_DEPTH {
                    bail!("<{name}> nests deeper than {MAX_NESTING_DEPTH} elements");
                }
                stack.push(Frame::new(name));
            }
            Event::Empty(empty) => {
                let name = local_name(empty.local_name().as_ref())?;
                if let Some(node) = build_element(&name, Vec::new(), "")? {
                    attach(&mut stack, &mut roots, node);
                }
            }
            Event::Text(text) => {
                let decoded = text.decode().context("decoding MathML text")?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&decoded);
                }
            }
            Event::CData(data) => {
                let decoded = data.decode().context("decoding MathML CDATA")?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&decoded);
                }
            }
            Event::GeneralRef(reference) => {
                let resolved = match reference.resolve_char_ref()? {
                    Some(ch) => ch.to_string(),
                    None => {
                        let name = reference.decode().context("decoding entity reference")?;
                        entity_text(&name).to_string()
                    }
                };
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&resolved);
                }
            }
            Event::End(end) => {
                let name = local_name(end.local_name().as_ref())?;
                let frame = stack
                    .pop()
                    .ok_or_else(|| anyhow!("closing </{name}> without an open element"))?;
                if frame.name != name {
                    bail!("mismatched </{name}>; expected </{}>", frame.name);
                }
                if let Some(node) = build_element(&frame.name, frame.children, &frame.text)? {
                    attach(&mut stack, &mut roots, node);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        bail!("unclosed <{}> at end of input", open.name);
    }
    if roots.is_empty() {
        bail!("MathML contained no renderable content");
    }
    let root = Node::group_or_single(roots);
    if root.depth() > MAX_NESTING_DEPTH {
        bail!("MathML nests deeper than {MAX_NESTING_DEPTH} levels");
    }
    Ok(root)
}

fn local_name(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .context("element name is not UTF-8")
}

fn attach(stack: &mut [Frame], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn expect_arity(name: &str, children: &[Node], arity: usize) -> Result<()> {
    if children.len() != arity {
        bail!(
            "<{name}> expects {arity} children, found {}",
            children.len()
        );
    }
    Ok(())
}

fn build_element(name: &str, mut children: Vec<Node>, text: &str) -> Result<Option<Node>> {
    let node = match name {
        "mi" | "mn" | "mtext" | "ms" => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            Node::text(trimmed)
        }
        "mo" => {
            let trimmed: String = text
                .trim()
                .chars()
                .filter(|ch| !INVISIBLE_OPERATORS.contains(ch))
                .collect();
            if trimmed.is_empty() {
                return Ok(None);
            }
            Node::operator(trimmed)
        }
        "mfrac" => {
            expect_arity(name, &children, 2)?;
            let denominator = children.pop().context("mfrac denominator")?;
            let numerator = children.pop().context("mfrac numerator")?;
            Node::fraction(numerator, denominator)
        }
        "msqrt" => {
            if children.is_empty() {
                bail!("<msqrt> has no radicand");
            }
            Node::root(Node::group_or_single(children), None)
        }
        "mroot" => {
            expect_arity(name, &children, 2)?;
            let index = children.pop().context("mroot index")?;
            let radicand = children.pop().context("mroot radicand")?;
            Node::root(radicand, Some(index))
        }
        "msup" => {
            expect_arity(name, &children, 2)?;
            let exponent = children.pop().context("msup exponent")?;
            let base = children.pop().context("msup base")?;
            Node::superscript(base, exponent)
        }
        "msub" => {
            expect_arity(name, &children, 2)?;
            let subscript = children.pop().context("msub subscript")?;
            let base = children.pop().context("msub base")?;
            Node::subscript(base, subscript)
        }
        "msubsup" => {
            expect_arity(name, &children, 3)?;
            let exponent = children.pop().context("msubsup exponent")?;
            let subscript = children.pop().context("msubsup subscript")?;
            let base = children.pop().context("msubsup base")?;
            Node::superscript(Node::subscript(base, subscript), exponent)
        }
        "mfenced" => {
            let mut fenced = Vec::with_capacity(children.len() + 2);
            fenced.push(Node::operator("("));
            fenced.extend(children);
            fenced.push(Node::operator(")"));
            Node::grouping(fenced)
        }
        "semantics" => {
            if children.is_empty() {
                return Ok(None);
            }
            children.swap_remove(0)
        }
        "annotation" | "annotation-xml" | "mphantom" | "mspace" | "none" | "mprescripts" => {
            return Ok(None);
        }
        "math" | "mrow" | "mstyle" | "mpadded" | "menclose" | "merror" | "mtable" | "mtr"
        | "mtd" => {
            if children.is_empty() {
                return Ok(None);
            }
            Node::group_or_single(children)
        }
        other => {
            tracing::trace!(element = other, "Treating unknown MathML element as a row");
            if children.is_empty() {
                return Ok(None);
            }
            Node::group_or_single(children)
        }
    };
    Ok(Some(node))
}

fn entity_text(name: &str) -> &str {
    match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "minus" => "−",
        "times" => "×",
        "sdot" | "middot" => "·",
        "plusmn" => "±",
        "InvisibleTimes" | "ApplyFunction" | "it" | "af" => "",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::NodeKind;

    #[test]
    fn parses_fraction_and_superscript() {
        let node = parse_mathml(
            "<math><mfrac><mn>1</mn><mn>2</mn></mfrac><mo>+</mo>\
             <msup><mi>x</mi><mn>2</mn></msup></math>",
        )
        .expect("valid mathml");
        assert_eq!(node.display_text(), "1/2+x^2");
    }

    #[test]
    fn semantics_keeps_presentation_only() {
        let node = parse_mathml(
            "<math><semantics><mrow><mi>a</mi><mo>=</mo><mi>b</mi></mrow>\
             <annotation encoding=\"application/x-tex\">a=b</annotation></semantics></math>",
        )
        .expect("valid mathml");
        assert_eq!(node.display_text(), "a=b");
    }

    #[test]
    fn invisible_times_is_dropped() {
        let node = parse_mathml("<math><mn>2</mn><mo>&#x2062;</mo><mi>x</mi></math>")
            .expect("valid mathml");
        let NodeKind::Grouping(children) = node.kind() else {
            panic!("expected grouping, got {node:?}");
        };
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn namespaced_elements_use_local_names() {
        let node = parse_mathml(
            "<m:math xmlns:m=\"http://www.w3.org/1998/Math/MathML\">\
             <m:msqrt><m:mn>4</m:mn></m:msqrt></m:math>",
        )
        .expect("valid mathml");
        assert!(matches!(node.kind(), NodeKind::Root { .. }));
    }

    #[test]
    fn wrong_arity_and_unclosed_markup_fail() {
        assert!(parse_mathml("<math><mfrac><mn>1</mn></mfrac></math>").is_err());
        assert!(parse_mathml("<math><mrow><mi>x</mi></math>").is_err());
        assert!(parse_mathml("<math><mrow><mi>x</mi></mrow>").is_err());
        assert!(parse_mathml("").is_err());
    }

    #[test]
    fn excessive_nesting_is_rejected() {
        let depth = 100_000;
        let source = format!(
            "<math>{}<mi>x</mi>{}</math>",
            "<mrow>".repeat(depth),
            "</mrow>".repeat(depth)
        );
        assert!(parse_mathml(&source).is_err());
    }
}
