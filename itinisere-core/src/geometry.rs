//! Convert the traffic API's WKT line geometry into GeoJSON.
//!
//! Traffic segments arrive as `MULTILINESTRING ((lon lat, lon lat), (lon lat, ...))`
//! text. The converter tokenizes the text and parses it with a small
//! recursive-descent parser, so malformed shapes are rejected with a
//! [`ShapeError`] instead of producing broken JSON.
//!
//! # Examples
//!
//! ```
//! use itinisere_core::geometry::to_geojson;
//!
//! let fragment = to_geojson("MULTILINESTRING ((5.71 45.18, 5.72 45.19))")?;
//! assert_eq!(
//!     fragment,
//!     r#""type": "MultiLineString", "coordinates": [[[5.71, 45.18], [5.72, 45.19]]]"#
//! );
//! # Ok::<(), itinisere_core::geometry::ShapeError>(())
//! ```

use std::iter::Peekable;
use std::vec::IntoIter;

use geo::{Coord, LineString, MultiLineString};
use geojson::{Geometry, Value};
use thiserror::Error;

/// Geometry keyword accepted by [`parse_shape`].
pub const MULTILINESTRING_KEYWORD: &str = "MULTILINESTRING";

/// Errors returned while parsing a WKT shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The input held no tokens.
    #[error("shape text is empty")]
    Empty,
    /// The input named a geometry type other than `MULTILINESTRING`.
    #[error("unsupported geometry type {found:?}; expected MULTILINESTRING")]
    UnsupportedGeometry {
        /// Keyword found at the start of the shape.
        found: String,
    },
    /// A token appeared where the grammar expected something else.
    #[error("unexpected {found} at byte {position}; expected {expected}")]
    UnexpectedToken {
        /// Byte offset of the token.
        position: usize,
        /// Description of the token found.
        found: String,
        /// Description of what the parser wanted.
        expected: &'static str,
    },
    /// A character outside the WKT alphabet.
    #[error("unexpected character {found:?} at byte {position}")]
    UnexpectedCharacter {
        /// Byte offset of the character.
        position: usize,
        /// The offending character.
        found: char,
    },
    /// The input stopped before the geometry was closed.
    #[error("shape ended early; expected {expected}")]
    UnexpectedEnd {
        /// Description of what the parser wanted.
        expected: &'static str,
    },
    /// A numeric token could not be read as a finite number.
    #[error("invalid number {text:?} at byte {position}")]
    InvalidNumber {
        /// Byte offset of the number.
        position: usize,
        /// Raw token text.
        text: String,
    },
    /// A line-string held fewer than two points.
    #[error("line-string {index} has fewer than two points")]
    DegenerateLine {
        /// Zero-based index of the line-string within the shape.
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Number(&'a str),
    Open,
    Close,
    Comma,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Self::Word(word) => format!("word {word:?}"),
            Self::Number(text) => format!("number {text}"),
            Self::Open => "'('".to_owned(),
            Self::Close => "')'".to_owned(),
            Self::Comma => "','".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Spanned<'a> {
    position: usize,
    token: Token<'a>,
}

fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E')
}

fn tokenize(text: &str) -> Result<Vec<Spanned<'_>>, ShapeError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((position, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '(' => Token::Open,
            ')' => Token::Close,
            ',' => Token::Comma,
            c if c.is_ascii_alphabetic() => {
                let end = take_while(&mut chars, text.len(), |c| c.is_ascii_alphabetic());
                Token::Word(text.get(position..end).unwrap_or_default())
            }
            c if is_number_char(c) => {
                let end = take_while(&mut chars, text.len(), is_number_char);
                Token::Number(text.get(position..end).unwrap_or_default())
            }
            found => return Err(ShapeError::UnexpectedCharacter { position, found }),
        };
        tokens.push(Spanned { position, token });
    }
    Ok(tokens)
}

/// Advance past characters matching `accept`, returning the end byte offset.
fn take_while(
    chars: &mut Peekable<std::str::CharIndices<'_>>,
    len: usize,
    accept: impl Fn(char) -> bool,
) -> usize {
    while let Some(&(_, ch)) = chars.peek() {
        if !accept(ch) {
            break;
        }
        chars.next();
    }
    chars.peek().map_or(len, |&(offset, _)| offset)
}

struct Parser<'a> {
    tokens: Peekable<IntoIter<Spanned<'a>>>,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Spanned<'a>>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
        }
    }

    fn unexpected(spanned: Spanned<'_>, expected: &'static str) -> ShapeError {
        ShapeError::UnexpectedToken {
            position: spanned.position,
            found: spanned.token.describe(),
            expected,
        }
    }

    fn punct(&mut self, want: Token<'static>, expected: &'static str) -> Result<(), ShapeError> {
        match self.tokens.next() {
            Some(spanned) if spanned.token == want => Ok(()),
            Some(other) => Err(Self::unexpected(other, expected)),
            None => Err(ShapeError::UnexpectedEnd { expected }),
        }
    }

    fn eat_comma(&mut self) -> bool {
        self.tokens
            .next_if(|spanned| spanned.token == Token::Comma)
            .is_some()
    }

    fn multi_line_string(&mut self) -> Result<MultiLineString<f64>, ShapeError> {
        match self.tokens.next() {
            Some(Spanned {
                token: Token::Word(word),
                ..
            }) if word.eq_ignore_ascii_case(MULTILINESTRING_KEYWORD) => {}
            Some(Spanned {
                token: Token::Word(word),
                ..
            }) => {
                return Err(ShapeError::UnsupportedGeometry {
                    found: word.to_owned(),
                });
            }
            Some(other) => return Err(Self::unexpected(other, "geometry keyword")),
            None => return Err(ShapeError::Empty),
        }

        self.punct(Token::Open, "'('")?;
        let mut lines = vec![self.line_string(0)?];
        while self.eat_comma() {
            let index = lines.len();
            lines.push(self.line_string(index)?);
        }
        self.punct(Token::Close, "')' or ','")?;
        Ok(MultiLineString::new(lines))
    }

    fn line_string(&mut self, index: usize) -> Result<LineString<f64>, ShapeError> {
        self.punct(Token::Open, "'('")?;
        let mut coords = vec![self.point()?];
        while self.eat_comma() {
            coords.push(self.point()?);
        }
        self.punct(Token::Close, "')' or ','")?;
        if coords.len() < 2 {
            return Err(ShapeError::DegenerateLine { index });
        }
        Ok(LineString::new(coords))
    }

    fn point(&mut self) -> Result<Coord<f64>, ShapeError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Coord { x, y })
    }

    fn number(&mut self) -> Result<f64, ShapeError> {
        match self.tokens.next() {
            Some(Spanned {
                token: Token::Number(text),
                position,
            }) => text
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| ShapeError::InvalidNumber {
                    position,
                    text: text.to_owned(),
                }),
            Some(other) => Err(Self::unexpected(other, "number")),
            None => Err(ShapeError::UnexpectedEnd { expected: "number" }),
        }
    }

    fn finish(&mut self) -> Result<(), ShapeError> {
        match self.tokens.next() {
            Some(trailing) => Err(Self::unexpected(trailing, "end of shape")),
            None => Ok(()),
        }
    }
}

/// Parse a WKT `MULTILINESTRING` into a [`MultiLineString`].
///
/// # Errors
///
/// Returns a [`ShapeError`] when the text is not a well-formed
/// `MULTILINESTRING` whose line-strings each hold at least two points.
pub fn parse_shape(text: &str) -> Result<MultiLineString<f64>, ShapeError> {
    let mut parser = Parser::new(tokenize(text)?);
    let shape = parser.multi_line_string()?;
    parser.finish()?;
    Ok(shape)
}

/// Convert WKT shape text into a GeoJSON geometry fragment.
///
/// The fragment holds the `type` and `coordinates` members without the
/// surrounding braces, so it can be embedded directly in a JSON object.
///
/// # Errors
///
/// Propagates any [`ShapeError`] from [`parse_shape`].
pub fn to_geojson(text: &str) -> Result<String, ShapeError> {
    let shape = parse_shape(text)?;
    Ok(format!(
        "\"type\": \"MultiLineString\", \"coordinates\": {}",
        coordinates_text(&shape)
    ))
}

fn coordinates_text(shape: &MultiLineString<f64>) -> String {
    let lines: Vec<String> = shape
        .iter()
        .map(|line| {
            let points: Vec<String> = line
                .coords()
                .map(|coord| format!("[{}, {}]", coord.x, coord.y))
                .collect();
            format!("[{}]", points.join(", "))
        })
        .collect();
    format!("[{}]", lines.join(", "))
}

/// Build a GeoJSON geometry from a parsed shape.
#[must_use]
pub fn to_geojson_geometry(shape: &MultiLineString<f64>) -> Geometry {
    let lines = shape
        .iter()
        .map(|line| line.coords().map(|coord| vec![coord.x, coord.y]).collect())
        .collect();
    Geometry::new(Value::MultiLineString(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_two_lines_in_order() {
        let shape = parse_shape("MULTILINESTRING ((5.71 45.18, 5.72 45.19), (5.80 45.20, 5.81 45.21))")
            .expect("shape should parse");

        let lines: Vec<Vec<(f64, f64)>> = shape
            .iter()
            .map(|line| line.coords().map(|c| (c.x, c.y)).collect())
            .collect();
        assert_eq!(
            lines,
            vec![
                vec![(5.71, 45.18), (5.72, 45.19)],
                vec![(5.80, 45.20), (5.81, 45.21)],
            ]
        );
    }

    #[rstest]
    fn fragment_embeds_as_geojson_geometry() {
        let fragment =
            to_geojson("MULTILINESTRING ((5.71 45.18, 5.72 45.19), (5.80 45.20, 5.81 45.21))")
                .expect("shape should convert");

        let parsed: serde_json::Value =
            serde_json::from_str(&format!("{{{fragment}}}")).expect("fragment should be JSON");

        assert_eq!(
            parsed,
            serde_json::json!({
                "type": "MultiLineString",
                "coordinates": [
                    [[5.71, 45.18], [5.72, 45.19]],
                    [[5.80, 45.20], [5.81, 45.21]]
                ]
            })
        );
    }

    #[rstest]
    #[case::lowercase_keyword("multilinestring ((5.0 45.0, 5.1 45.1))")]
    #[case::tight_spacing("MULTILINESTRING((5.0 45.0,5.1 45.1))")]
    #[case::loose_spacing("MULTILINESTRING (  ( 5.0  45.0 ,  5.1 45.1 ) )")]
    #[case::three_digit_longitude("MULTILINESTRING ((105.0 45.0, 105.1 45.1))")]
    #[case::negative_longitude("MULTILINESTRING ((-1.5 45.0, -1.4 45.1))")]
    fn accepts_spacing_and_number_variants(#[case] text: &str) {
        let shape = parse_shape(text).expect("shape should parse");
        assert_eq!(shape.0.len(), 1);
        assert_eq!(shape.0[0].0.len(), 2);
    }

    #[rstest]
    fn rejects_empty_input() {
        assert_eq!(parse_shape("   "), Err(ShapeError::Empty));
    }

    #[rstest]
    fn rejects_other_geometry_types() {
        let err = parse_shape("LINESTRING (5.0 45.0, 5.1 45.1)").expect_err("should fail");
        assert_eq!(
            err,
            ShapeError::UnsupportedGeometry {
                found: "LINESTRING".to_owned()
            }
        );
    }

    #[rstest]
    fn rejects_single_point_line() {
        let err = parse_shape("MULTILINESTRING ((5.0 45.0, 5.1 45.1), (5.2 45.2))")
            .expect_err("should fail");
        assert_eq!(err, ShapeError::DegenerateLine { index: 1 });
    }

    #[rstest]
    #[case::missing_latitude("MULTILINESTRING ((5.0, 5.1 45.1))")]
    #[case::extra_ordinate("MULTILINESTRING ((5.0 45.0 300, 5.1 45.1))")]
    #[case::missing_open("MULTILINESTRING (5.0 45.0, 5.1 45.1)")]
    #[case::trailing_text("MULTILINESTRING ((5.0 45.0, 5.1 45.1)) extra")]
    fn rejects_malformed_structure(#[case] text: &str) {
        let err = parse_shape(text).expect_err("should fail");
        assert!(
            matches!(err, ShapeError::UnexpectedToken { .. }),
            "expected UnexpectedToken, got {err:?}"
        );
    }

    #[rstest]
    fn rejects_unclosed_shape() {
        let err = parse_shape("MULTILINESTRING ((5.0 45.0, 5.1 45.1)").expect_err("should fail");
        assert!(matches!(err, ShapeError::UnexpectedEnd { .. }));
    }

    #[rstest]
    #[case::double_dot("MULTILINESTRING ((5..0 45.0, 5.1 45.1))")]
    #[case::overflow("MULTILINESTRING ((1e999 45.0, 5.1 45.1))")]
    fn rejects_invalid_numbers(#[case] text: &str) {
        let err = parse_shape(text).expect_err("should fail");
        assert!(matches!(err, ShapeError::InvalidNumber { .. }));
    }

    #[rstest]
    fn rejects_foreign_characters() {
        let err = parse_shape("MULTILINESTRING ((5.0 45.0; 5.1 45.1))").expect_err("should fail");
        assert_eq!(
            err,
            ShapeError::UnexpectedCharacter {
                position: 26,
                found: ';'
            }
        );
    }

    #[rstest]
    fn geometry_mirrors_parsed_shape() {
        let shape = parse_shape("MULTILINESTRING ((5.0 45.0, 5.1 45.1))").expect("parse");
        let geometry = to_geojson_geometry(&shape);
        assert_eq!(
            geometry.value,
            Value::MultiLineString(vec![vec![vec![5.0, 45.0], vec![5.1, 45.1]]])
        );
    }
}
