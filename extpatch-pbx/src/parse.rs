use crate::error::ParseError;
use crate::value::{Dict, PbxString, Value, is_unquoted_char};

/// Parse pbxproj text into a [`Value`] tree.
///
/// Accepts an optional byte-order mark and the `// !$*UTF8*$!` header (any
/// comment is skipped). The document must consist of exactly one value.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut p = Parser { src: input, pos: 0 };
    p.skip_trivia()?;
    let value = p.value()?;
    p.skip_trivia()?;
    if p.pos < p.src.len() {
        let (line, column) = p.position(p.pos);
        return Err(ParseError::TrailingContent { line, column });
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn position(&self, at: usize) -> (usize, usize) {
        let before = &self.src[..at];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(idx) => before[idx + 1..].chars().count(),
            None => before.chars().count(),
        } + 1;
        (line, column)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let (line, column) = self.position(self.pos);
        match self.peek() {
            Some(found) => ParseError::Unexpected {
                found,
                expected,
                line,
                column,
            },
            None => ParseError::UnexpectedEof { line, column },
        }
    }

    fn eof(&self) -> ParseError {
        let (line, column) = self.position(self.pos);
        ParseError::UnexpectedEof { line, column }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = self.rest();
            if let Some(body) = rest.strip_prefix("/*") {
                match body.find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => {
                        let (line, column) = self.position(self.pos);
                        return Err(ParseError::UnterminatedComment { line, column });
                    }
                }
            } else if rest.starts_with("//") {
                match rest.find('\n') {
                    Some(end) => self.pos += end + 1,
                    None => self.pos = self.src.len(),
                }
            } else if let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
                self.pos += c.len_utf8();
            } else {
                return Ok(());
            }
        }
    }

    fn expect(&mut self, ch: char, expected: &'static str) -> Result<(), ParseError> {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some('{') => self.dict(),
            Some('(') => self.array(),
            Some('<') => self.data(),
            Some('"') | Some('\'') => self.quoted_string().map(Value::String),
            Some(c) if is_unquoted_char(c) => Ok(Value::String(self.unquoted_string())),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn dict(&mut self) -> Result<Value, ParseError> {
        self.expect('{', "'{'")?;
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Dict(dict));
            }
            let key = self.key()?;
            self.skip_trivia()?;
            self.expect('=', "'='")?;
            self.skip_trivia()?;
            let value = self.value()?;
            self.skip_trivia()?;
            self.expect(';', "';'")?;
            dict.insert(key, value);
        }
    }

    fn key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some('"') | Some('\'') => Ok(self.quoted_string()?.into_string()),
            Some(c) if is_unquoted_char(c) => Ok(self.unquoted_string().into_string()),
            _ => Err(self.unexpected("a key or '}'")),
        }
    }

    fn array(&mut self) -> Result<Value, ParseError> {
        self.expect('(', "'('")?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {}
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }

    fn data(&mut self) -> Result<Value, ParseError> {
        let (line, column) = self.position(self.pos);
        let invalid = ParseError::InvalidData { line, column };
        self.expect('<', "'<'")?;
        let mut digits = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                Some(c) if c.is_whitespace() => {}
                Some(_) => return Err(invalid),
                None => return Err(self.eof()),
            }
        }
        hex::decode(&digits).map(Value::Data).map_err(|_| invalid)
    }

    fn unquoted_string(&mut self) -> PbxString {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let rest = self.rest();
            if !is_unquoted_char(c) || rest.starts_with("//") || rest.starts_with("/*") {
                break;
            }
            self.pos += c.len_utf8();
        }
        PbxString::from_parts(self.src[start..self.pos].to_string(), false)
    }

    fn quoted_string(&mut self) -> Result<PbxString, ParseError> {
        let Some(quote) = self.bump() else {
            return Err(self.eof());
        };
        let mut text = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.eof());
            };
            if c == quote {
                break;
            }
            if c != '\\' {
                text.push(c);
                continue;
            }
            let escape_at = self.pos - 1;
            let Some(e) = self.bump() else {
                return Err(self.eof());
            };
            let decoded = match e {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                'a' => '\u{07}',
                'b' => '\u{08}',
                'f' => '\u{0c}',
                'v' => '\u{0b}',
                'U' | 'u' => self.unicode_escape(escape_at)?,
                other => other,
            };
            text.push(decoded);
        }
        Ok(PbxString::from_parts(text, true))
    }

    fn unicode_escape(&mut self, escape_at: usize) -> Result<char, ParseError> {
        let (line, column) = self.position(escape_at);
        let invalid = ParseError::InvalidEscape { line, column };
        let digits = self.rest().get(..4).ok_or_else(|| invalid.clone())?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| invalid.clone())?;
        let ch = char::from_u32(code).ok_or(invalid)?;
        self.pos += 4;
        Ok(ch)
    }
}
