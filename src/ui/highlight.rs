//! Lightweight GLSL colouring for the editor. This is a lexer for display
//! only; validation is left to the driver's compiler.

use std::ops::Range;

use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontId};

pub const KEYWORDS: &[&str] = &[
    "attribute", "const", "uniform", "varying", "break", "continue", "do", "for", "while", "if",
    "else", "in", "out", "inout", "true", "false",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Preprocessor,
    Comment,
    Number,
    Identifier,
    Operator,
    Whitespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

/// Splits `text` into tokens covering every byte, in order.
pub fn tokenize(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line_has_code = false;

    while pos < bytes.len() {
        let start = pos;
        let c = bytes[pos];
        let rest = &text[pos..];

        let kind = if rest.starts_with("//") {
            pos = rest.find('\n').map(|i| pos + i).unwrap_or(bytes.len());
            TokenKind::Comment
        } else if rest.starts_with("/*") {
            pos = rest[2..].find("*/").map(|i| pos + i + 4).unwrap_or(bytes.len());
            TokenKind::Comment
        } else if c == b'#' && !line_has_code {
            pos = rest.find('\n').map(|i| pos + i).unwrap_or(bytes.len());
            TokenKind::Preprocessor
        } else if c.is_ascii_whitespace() {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                if bytes[pos] == b'\n' {
                    line_has_code = false;
                }
                pos += 1;
            }
            TokenKind::Whitespace
        } else if c.is_ascii_digit()
            || (c == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit))
        {
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'.') {
                pos += 1;
            }
            TokenKind::Number
        } else if c.is_ascii_alphabetic() || c == b'_' {
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                pos += 1;
            }
            if KEYWORDS.contains(&&text[start..pos]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        } else {
            pos += rest.chars().next().map(char::len_utf8).unwrap_or(1);
            TokenKind::Operator
        };

        if kind != TokenKind::Whitespace {
            line_has_code = true;
        }
        tokens.push(Token {
            kind,
            range: start..pos,
        });
    }

    tokens
}

/// Token colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub preprocessor: Color32,
    pub comment: Color32,
    pub keyword: Color32,
    pub identifier: Color32,
    pub number: Color32,
    pub operator: Color32,
    pub default: Color32,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            preprocessor: Color32::from_rgb(168, 70, 20),
            comment: Color32::from_rgb(150, 150, 150),
            keyword: Color32::from_rgb(255, 102, 0),
            identifier: Color32::from_rgb(220, 220, 220),
            number: Color32::from_rgb(183, 101, 81),
            operator: Color32::from_rgb(200, 200, 200),
            default: Color32::from_rgb(220, 220, 220),
        }
    }

    pub fn light() -> Self {
        Self {
            preprocessor: Color32::from_rgb(168, 70, 20),
            comment: Color32::from_rgb(100, 100, 100),
            keyword: Color32::from_rgb(255, 102, 0),
            identifier: Color32::BLACK,
            number: Color32::from_rgb(163, 21, 21),
            operator: Color32::BLACK,
            default: Color32::BLACK,
        }
    }

    pub fn for_dark_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn color(&self, kind: TokenKind) -> Color32 {
        match kind {
            TokenKind::Keyword => self.keyword,
            TokenKind::Preprocessor => self.preprocessor,
            TokenKind::Comment => self.comment,
            TokenKind::Number => self.number,
            TokenKind::Identifier => self.identifier,
            TokenKind::Operator => self.operator,
            TokenKind::Whitespace => self.default,
        }
    }
}

pub fn layout_job(text: &str, palette: &Palette, font_id: &FontId) -> LayoutJob {
    let mut job = LayoutJob::default();
    for token in tokenize(text) {
        job.append(
            &text[token.range.clone()],
            0.0,
            TextFormat::simple(font_id.clone(), palette.color(token.kind)),
        );
    }
    job
}
