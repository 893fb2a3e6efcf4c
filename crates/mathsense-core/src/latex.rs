//! Recursive-descent LaTeX reader for the math subset found in worksheets.

use crate::expression::{MAX_NESTING_DEPTH, Node};
use anyhow::{Result, anyhow, bail};

const OPERATOR_CHARS: &[char] = &[
    '+', '-', '=', '<', '>', '*', '/', '(', ')', '[', ']', ',', '!', '|', ':', ';', '\'',
];

pub(crate) fn parse_latex(source: &str) -> Result<Node> {
    let mut parser = LatexParser::new(source);
    let items = parser.parse_sequence(None)?;
    if items.is_empty() {
        bail!("empty LaTeX expression");
    }
    within_depth(Node::group_or_single(items))
}

fn within_depth(node: Node) -> Result<Node> {
    if node.depth() > MAX_NESTING_DEPTH {
        bail!("expression nests deeper than {MAX_NESTING_DEPTH} levels");
    }
    Ok(node)
}

struct LatexParser {
    chars: Vec<char>,
    pos: usize,
    nesting: usize,
}

impl LatexParser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            nesting: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn descend(&mut self) -> Result<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING_DEPTH {
            bail!(
                "nesting deeper than {MAX_NESTING_DEPTH} levels at offset {}",
                self.pos
            );
        }
        Ok(())
    }

    /// Parses a group whose opener was already consumed, through `close`.
    fn parse_group(&mut self, close: char) -> Result<Vec<Node>> {
        self.descend()?;
        let children = self.parse_sequence(Some(close));
        self.nesting -= 1;
        children
    }

    /// Parses items until `terminator` (consumed) or end of input.
    fn parse_sequence(&mut self, terminator: Option<char>) -> Result<Vec<Node>> {
        let mut items: Vec<Node> = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else {
                if let Some(close) = terminator {
                    bail!("unclosed group; expected '{close}' at offset {}", self.pos);
                }
                break;
            };
            if Some(ch) == terminator {
                self.pos += 1;
                break;
            }
            match ch {
                '}' => bail!("unbalanced '}}' at offset {}", self.pos),
                '^' | '_' => {
                    self.pos += 1;
                    let base = items
                        .pop()
                        .ok_or_else(|| anyhow!("script marker '{ch}' without a base at offset {}", self.pos))?;
                    let argument = self.parse_argument()?;
                    let node = if ch == '^' {
                        Node::superscript(base, argument)
                    } else {
                        Node::subscript(base, argument)
                    };
                    items.push(within_depth(node)?);
                }
                _ => {
                    if let Some(node) = self.parse_atom()? {
                        items.push(node);
                    }
                }
            }
        }
        Ok(items)
    }

    /// One script or command argument: a braced group or a single token.
    fn parse_argument(&mut self) -> Result<Node> {
        self.descend()?;
        let argument = self.parse_argument_inner();
        self.nesting -= 1;
        argument
    }

    fn parse_argument_inner(&mut self) -> Result<Node> {
        self.skip_whitespace();
        match self.peek() {
            None => bail!("missing argument at end of input"),
            Some('{') => {
                self.pos += 1;
                let children = self.parse_group('}')?;
                Ok(Node::group_or_single(children))
            }
            Some('}') => bail!("missing argument before '}}' at offset {}", self.pos),
            Some(ch) if ch.is_ascii_digit() => {
                self.pos += 1;
                Ok(Node::text(ch.to_string()))
            }
            Some(_) => self
                .parse_atom()?
                .ok_or_else(|| anyhow!("argument at offset {} produced no content", self.pos)),
        }
    }

    fn parse_atom(&mut self) -> Result<Option<Node>> {
        let Some(ch) = self.bump() else {
            return Ok(None);
        };
        let node = match ch {
            '{' => {
                let children = self.parse_group('}')?;
                if children.is_empty() {
                    return Ok(None);
                }
                Node::group_or_single(children)
            }
            '\\' => return self.parse_command(),
            '&' | '~' => return Ok(None),
            c if c.is_ascii_digit() || c == '.' => {
                let mut number = c.to_string();
                while let Some(next) = self.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        number.push(next);
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                Node::text(number)
            }
            c if OPERATOR_CHARS.contains(&c) => Node::operator(c.to_string()),
            c => Node::text(c.to_string()),
        };
        Ok(Some(node))
    }

    fn read_command_name(&mut self) -> Result<String> {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphabetic() {
                name.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        if name.is_empty() {
            let single = self
                .bump()
                .ok_or_else(|| anyhow!("dangling backslash at end of input"))?;
            name.push(single);
        }
        Ok(name)
    }

    fn parse_command(&mut self) -> Result<Option<Node>> {
        let name = self.read_command_name()?;
        let node = match name.as_str() {
            "frac" | "dfrac" | "tfrac" | "cfrac" => {
                let numerator = self.parse_argument()?;
                let denominator = self.parse_argument()?;
                Node::fraction(numerator, denominator)
            }
            "sqrt" => {
                self.skip_whitespace();
                let index = if self.peek() == Some('[') {
                    self.pos += 1;
                    let children = self.parse_group(']')?;
                    Some(Node::group_or_single(children))
                } else {
                    None
                };
                let radicand = self.parse_argument()?;
                Node::root(radicand, index)
            }
            "left" | "right" | "big" | "Big" | "bigl" | "bigr" | "Bigl" | "Bigr" => {
                self.skip_whitespace();
                match self.peek() {
                    Some('.') => {
                        self.pos += 1;
                        return Ok(None);
                    }
                    Some('\\') => {
                        self.pos += 1;
                        let delimiter = self.read_command_name()?;
                        Node::operator(delimiter_symbol(&delimiter))
                    }
                    Some(delimiter) => {
                        self.pos += 1;
                        Node::operator(delimiter.to_string())
                    }
                    None => bail!("\\{name} without a delimiter"),
                }
            }
            "text" | "mathrm" | "mathit" | "mathbf" | "operatorname" | "mbox" | "textrm" => {
                self.skip_whitespace();
                if self.bump() != Some('{') {
                    bail!("\\{name} expects a braced argument");
                }
                let raw = self.read_raw_group()?;
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                Node::text(trimmed)
            }
            "," | ";" | ":" | "!" | " " | "quad" | "qquad" | "displaystyle" | "textstyle" => {
                return Ok(None);
            }
            other => match command_symbol(other) {
                Some(symbol) => Node::operator(symbol),
                None => Node::text(other),
            },
        };
        Ok(Some(node))
    }

    /// Reads a brace-balanced group verbatim; the opening brace is consumed.
    fn read_raw_group(&mut self) -> Result<String> {
        let mut depth = 1usize;
        let mut raw = String::new();
        while let Some(ch) = self.bump() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(raw);
                    }
                }
                _ => {}
            }
            raw.push(ch);
        }
        bail!("unclosed text group")
    }
}

fn command_symbol(name: &str) -> Option<&'static str> {
    let symbol = match name {
        "cdot" => "·",
        "times" => "×",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "ne" | "neq" => "≠",
        "approx" => "≈",
        "lt" => "<",
        "gt" => ">",
        "to" | "rightarrow" => "→",
        "{" => "{",
        "}" => "}",
        "%" => "%",
        _ => return None,
    };
    Some(symbol)
}

fn delimiter_symbol(name: &str) -> String {
    match name {
        "{" | "lbrace" => "{".to_string(),
        "}" | "rbrace" => "}".to_string(),
        "langle" => "⟨".to_string(),
        "rangle" => "⟩".to_string(),
        "|" | "vert" => "|".to_string(),
        other => other.to_string(),
    }
}
