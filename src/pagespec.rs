//! [MODULE C] Page-spec grammar: syntax, semantics, and evaluator.
//!
//! ```text
//! pagespecs  = [ modulo ":" ] specs
//! specs      = spec ( ( "+" | "," ) spec )*
//! spec       = [ "-" ] [ pageno ] turns? ( "@" scale )* ( "(" xoff "," yoff ")" )?
//! turns      = ( "L" | "R" | "U" | "H" | "V" )+
//! dimen      = number ( "pt" | "in" | "cm" | "mm" | "w" | "h" )?
//! ```
//!
//! `specs` is represented as an ordered `Vec<PageSpec>` rather than a linked
//! list (spec.md §9's design note); a merge group is all but the last
//! member of a run of specs joined by `+`, marked with `SpecFlags::ADD_NEXT`.

use bitflags::bitflags;

use crate::config::OutputConfig;
use crate::dimension;
use crate::error::{Error, Result};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpecFlags: u16 {
        const REVERSED = 1 << 0;
        const GSAVE    = 1 << 1;
        const OFFSET   = 1 << 2;
        const ROTATE   = 1 << 3;
        const HFLIP    = 1 << 4;
        const VFLIP    = 1 << 5;
        const SCALE    = 1 << 6;
        const ADD_NEXT = 1 << 7;
    }
}

/// One region of one input page placed on one output sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub pageno: i32,
    pub flags: SpecFlags,
    /// Degrees, canonicalised to {0, 90, 180, 270}. Only meaningful when
    /// `SpecFlags::ROTATE` is set.
    pub rotate: i32,
    pub scale: f64,
    pub xoff: f64,
    pub yoff: f64,
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec {
            pageno: 0,
            flags: SpecFlags::empty(),
            rotate: 0,
            scale: 1.0,
            xoff: 0.0,
            yoff: 0.0,
        }
    }
}

impl PageSpec {
    /// `GSAVE` is implicit whenever any transform flag is set.
    fn finalize(mut self) -> Self {
        if self
            .flags
            .intersects(SpecFlags::OFFSET | SpecFlags::ROTATE | SpecFlags::HFLIP | SpecFlags::VFLIP | SpecFlags::SCALE)
        {
            self.flags.insert(SpecFlags::GSAVE);
        }
        self
    }

    pub fn needs_transform(&self) -> bool {
        self.flags
            .intersects(SpecFlags::OFFSET | SpecFlags::ROTATE | SpecFlags::HFLIP | SpecFlags::VFLIP | SpecFlags::SCALE)
    }
}

/// The result of parsing a `pagespecs` string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSpecs {
    pub modulo: i32,
    pub specs: Vec<PageSpec>,
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    cfg: &'a OutputConfig,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, cfg: &'a OutputConfig) -> Self {
        Parser {
            chars: input.chars().peekable(),
            cfg,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn take_digits(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    fn take_signed_number(&mut self) -> Option<String> {
        let mut out = String::new();
        if matches!(self.peek(), Some('+') | Some('-')) {
            out.push(self.bump().unwrap());
        }
        let mut saw_digit = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                saw_digit = true;
                out.push(c);
                self.bump();
            } else if c == '.' && !out.contains('.') {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if saw_digit {
            Some(out)
        } else {
            None
        }
    }

    /// A dimension token: a signed number plus an optional alphabetic unit
    /// suffix, read up to (but not including) a delimiter like `,` or `)`.
    fn take_dimension_token(&mut self) -> Result<String> {
        let mut out = self
            .take_signed_number()
            .ok_or_else(|| Error::PageSpecSyntax("expected a number".to_string()))?;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Ok(out)
    }

    fn parse_modulo_prefix(&mut self) -> Result<Option<i32>> {
        // Lookahead: digits followed by ':' is a modulo prefix; otherwise
        // the digits belong to the first spec's pageno and we must not
        // consume them.
        let mut lookahead = self.chars.clone();
        let mut digits = String::new();
        while let Some(&c) = lookahead.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                lookahead.next();
            } else {
                break;
            }
        }
        if !digits.is_empty() && lookahead.peek() == Some(&':') {
            for _ in 0..digits.len() {
                self.bump();
            }
            self.bump(); // ':'
            let modulo: i32 = digits
                .parse()
                .map_err(|_| Error::PageSpecSyntax(format!("bad modulo {digits:?}")))?;
            Ok(Some(modulo))
        } else {
            Ok(None)
        }
    }

    fn parse_specs(&mut self) -> Result<Vec<PageSpec>> {
        let mut specs = Vec::new();
        let mut pageno_omitted_indices = Vec::new();
        loop {
            let (spec, pageno_omitted) = self.parse_one_spec()?;
            if pageno_omitted {
                pageno_omitted_indices.push(specs.len());
            }
            specs.push(spec);
            match self.peek() {
                Some('+') => {
                    self.bump();
                    specs.last_mut().unwrap().flags.insert(SpecFlags::ADD_NEXT);
                }
                Some(',') => {
                    self.bump();
                }
                None => break,
                Some(c) => {
                    return Err(Error::PageSpecSyntax(format!(
                        "unexpected character {c:?}"
                    )))
                }
            }
        }
        if !pageno_omitted_indices.is_empty() && specs.len() > 1 {
            return Err(Error::PageSpecSyntax(
                "pageno may only be omitted when the entire spec list is a single spec".to_string(),
            ));
        }
        Ok(specs)
    }

    fn parse_one_spec(&mut self) -> Result<(PageSpec, bool)> {
        let mut spec = PageSpec::default();

        if self.eat('-') {
            spec.flags.insert(SpecFlags::REVERSED);
        }

        let digits = self.take_digits();
        let pageno_omitted = digits.is_empty();
        if !pageno_omitted {
            spec.pageno = digits
                .parse()
                .map_err(|_| Error::PageSpecSyntax(format!("bad page number {digits:?}")))?;
        }

        loop {
            match self.peek() {
                Some('L') => {
                    spec.rotate = (spec.rotate + 90).rem_euclid(360);
                    self.bump();
                }
                Some('R') => {
                    spec.rotate = (spec.rotate + 270).rem_euclid(360);
                    self.bump();
                }
                Some('U') => {
                    spec.rotate = (spec.rotate + 180).rem_euclid(360);
                    self.bump();
                }
                Some('H') => {
                    spec.flags.toggle(SpecFlags::HFLIP);
                    self.bump();
                }
                Some('V') => {
                    spec.flags.toggle(SpecFlags::VFLIP);
                    self.bump();
                }
                _ => break,
            }
        }
        if spec.rotate != 0 {
            spec.flags.insert(SpecFlags::ROTATE);
        }

        while self.eat('@') {
            let token = self.take_signed_number().ok_or_else(|| {
                Error::PageSpecSyntax("expected a scale factor after '@'".to_string())
            })?;
            let value: f64 = token
                .parse()
                .map_err(|_| Error::PageSpecSyntax(format!("bad scale {token:?}")))?;
            spec.flags.insert(SpecFlags::SCALE);
            spec.scale *= value;
        }

        if self.eat('(') {
            let xtok = self.take_dimension_token()?;
            if !self.eat(',') {
                return Err(Error::PageSpecSyntax("expected ',' in offset".to_string()));
            }
            let ytok = self.take_dimension_token()?;
            if !self.eat(')') {
                return Err(Error::PageSpecSyntax("expected ')' in offset".to_string()));
            }
            spec.xoff = dimension::parse(&xtok, self.cfg)?;
            spec.yoff = dimension::parse(&ytok, self.cfg)?;
            spec.flags.insert(SpecFlags::OFFSET);
        }

        Ok((spec.finalize(), pageno_omitted))
    }
}

/// Parse a full `pagespecs` string against `modulo_default` (used when no
/// `modulo:` prefix is present) and the given dimension-lexer configuration.
pub fn parse(input: &str, modulo_default: i32, cfg: &OutputConfig) -> Result<ParsedSpecs> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::PageSpecSyntax("empty page specification".to_string()));
    }
    let mut parser = Parser::new(trimmed, cfg);
    let modulo = parser.parse_modulo_prefix()?.unwrap_or(modulo_default);
    if modulo <= 0 {
        return Err(Error::BadModulo(modulo));
    }
    let specs = parser.parse_specs()?;
    if parser.peek().is_some() {
        return Err(Error::PageSpecSyntax("trailing characters after spec list".to_string()));
    }
    for spec in &specs {
        if spec.pageno < 0 || spec.pageno >= modulo {
            return Err(Error::PageOutOfRange {
                pageno: spec.pageno,
                modulo,
            });
        }
    }
    Ok(ParsedSpecs { modulo, specs })
}
