//! A small XML reader covering what IPPcode22 source files use.
//!
//! Supports the XML declaration and other processing instructions,
//! comments, a DOCTYPE (skipped, internal subset included), CDATA sections,
//! quoted attributes, self-closing tags, the five predefined entities and
//! numeric character references. Namespaces and DTD validation are not
//! interpreted.

use thiserror::Error;

/// Well-formedness errors. All map to the malformed-source category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("line {line}: unexpected end of document")]
    UnexpectedEof { line: usize },

    #[error("line {line}: expected {expected}")]
    Expected { line: usize, expected: &'static str },

    #[error("line {line}: closing tag </{close}> does not match <{open}>")]
    MismatchedTag {
        line: usize,
        open: String,
        close: String,
    },

    #[error("line {line}: unknown entity '&{entity};'")]
    BadEntity { line: usize, entity: String },

    #[error("line {line}: duplicate attribute '{name}'")]
    DuplicateAttribute { line: usize, name: String },

    #[error("line {line}: content after the root element")]
    TrailingContent { line: usize },

    #[error("line {line}: elements nested deeper than {limit} levels")]
    TooDeep { line: usize, limit: usize },

    #[error("line {line}: source is not valid UTF-8")]
    InvalidEncoding { line: usize },
}

/// Deepest element nesting accepted. IPPcode22 sources use three levels.
pub const MAX_DEPTH: usize = 64;

/// An element with its attributes, child elements and direct text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Character data directly inside this element, entities decoded.
    pub text: String,
    /// Line of the start tag.
    pub line: usize,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse a complete document and return its root element.
pub fn parse_document(src: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::new(src.strip_prefix('\u{feff}').unwrap_or(src));

    reader.skip_misc()?;
    if reader.starts_with("<!DOCTYPE") {
        reader.skip_doctype()?;
        reader.skip_misc()?;
    }
    if !reader.starts_with("<") {
        return Err(reader.eof_or(XmlError::Expected {
            line: reader.line(),
            expected: "root element",
        }));
    }
    reader.pos += 1;
    let root = reader.element()?;

    reader.skip_misc()?;
    if reader.pos < reader.src.len() {
        return Err(XmlError::TrailingContent {
            line: reader.line(),
        });
    }
    Ok(root)
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    /// Byte offset at which each line starts.
    line_starts: Vec<usize>,
    depth: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            src,
            pos: 0,
            line_starts,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn line(&self) -> usize {
        self.line_starts.partition_point(|&start| start <= self.pos)
    }

    fn eof_or(&self, err: XmlError) -> XmlError {
        if self.pos >= self.src.len() {
            XmlError::UnexpectedEof { line: self.line() }
        } else {
            err
        }
    }

    fn expect(&mut self, token: &str, expected: &'static str) -> Result<(), XmlError> {
        if self.starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(self.eof_or(XmlError::Expected {
                line: self.line(),
                expected,
            }))
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self
            .rest()
            .trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'));
        self.pos = self.src.len() - trimmed.len();
    }

    /// Advance past the next occurrence of `terminator`.
    fn skip_past(&mut self, terminator: &str) -> Result<&'a str, XmlError> {
        match self.rest().find(terminator) {
            Some(offset) => {
                let skipped = &self.rest()[..offset];
                self.pos += offset + terminator.len();
                Ok(skipped)
            }
            None => {
                self.pos = self.src.len();
                Err(XmlError::UnexpectedEof { line: self.line() })
            }
        }
    }

    /// Whitespace, comments and processing instructions.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.skip_past("?>")?;
            } else if self.starts_with("<!--") {
                self.skip_past("-->")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self) -> Result<(), XmlError> {
        let mut depth = 0usize;
        for (offset, c) in self.rest().char_indices() {
            match c {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => {
                    self.pos += offset + 1;
                    return Ok(());
                }
                _ => {}
            }
        }
        self.pos = self.src.len();
        Err(XmlError::UnexpectedEof { line: self.line() })
    }

    fn name(&mut self) -> Result<String, XmlError> {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|&(i, c)| !is_name_char(c) || (i == 0 && !is_name_start(c)))
            .map_or(rest.len(), |(i, _)| i);
        if end == 0 {
            return Err(self.eof_or(XmlError::Expected {
                line: self.line(),
                expected: "name",
            }));
        }
        self.pos += end;
        Ok(rest[..end].to_string())
    }

    /// Parse an element whose `<` has been consumed.
    fn element(&mut self) -> Result<Element, XmlError> {
        if self.depth == MAX_DEPTH {
            return Err(XmlError::TooDeep {
                line: self.line(),
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let element = self.element_body()?;
        self.depth -= 1;
        Ok(element)
    }

    fn element_body(&mut self) -> Result<Element, XmlError> {
        let line = self.line();
        let name = self.name()?;
        let mut element = Element {
            name,
            line,
            ..Element::default()
        };

        loop {
            let before = self.pos;
            self.skip_whitespace();
            if self.starts_with("/>") {
                self.pos += 2;
                return Ok(element);
            }
            if self.starts_with(">") {
                self.pos += 1;
                break;
            }
            if self.pos == before {
                return Err(self.eof_or(XmlError::Expected {
                    line: self.line(),
                    expected: "whitespace before attribute",
                }));
            }

            let attr_line = self.line();
            let key = self.name()?;
            self.skip_whitespace();
            self.expect("=", "'=' after attribute name")?;
            self.skip_whitespace();
            let value = self.attribute_value()?;
            if element.attribute(&key).is_some() {
                return Err(XmlError::DuplicateAttribute {
                    line: attr_line,
                    name: key,
                });
            }
            element.attributes.push((key, value));
        }

        self.content(&mut element)?;
        Ok(element)
    }

    fn attribute_value(&mut self) -> Result<String, XmlError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                return Err(self.eof_or(XmlError::Expected {
                    line: self.line(),
                    expected: "quoted attribute value",
                }))
            }
        };
        self.pos += 1;
        let line = self.line();
        let raw = self.rest();
        let end = raw
            .find(quote)
            .ok_or(XmlError::UnexpectedEof { line })?;
        let raw = &raw[..end];
        if raw.contains('<') {
            return Err(XmlError::Expected {
                line,
                expected: "attribute value without '<'",
            });
        }
        self.pos += end + 1;
        decode_entities(raw, line)
    }

    /// Children and text up to and including the matching end tag.
    fn content(&mut self, element: &mut Element) -> Result<(), XmlError> {
        loop {
            if self.pos >= self.src.len() {
                return Err(XmlError::UnexpectedEof { line: self.line() });
            }
            if self.starts_with("</") {
                self.pos += 2;
                let line = self.line();
                let close = self.name()?;
                self.skip_whitespace();
                self.expect(">", "'>' after end tag name")?;
                if close != element.name {
                    return Err(XmlError::MismatchedTag {
                        line,
                        open: element.name.clone(),
                        close,
                    });
                }
                return Ok(());
            } else if self.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if self.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let data = self.skip_past("]]>")?;
                element.text.push_str(data);
            } else if self.starts_with("<?") {
                self.skip_past("?>")?;
            } else if self.starts_with("<") {
                self.pos += 1;
                let child = self.element()?;
                element.children.push(child);
            } else {
                let line = self.line();
                let rest = self.rest();
                let end = rest.find('<').unwrap_or(rest.len());
                let text = decode_entities(&rest[..end], line)?;
                element.text.push_str(&text);
                self.pos += end;
            }
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

/// Replace entity and character references.
fn decode_entities(raw: &str, line: usize) -> Result<String, XmlError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after.find(';').ok_or_else(|| XmlError::BadEntity {
            line,
            entity: after.chars().take(8).collect(),
        })?;
        let entity = &after[..semi];
        out.push(resolve_entity(entity).ok_or_else(|| XmlError::BadEntity {
            line,
            entity: entity.to_string(),
        })?);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => entity.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
