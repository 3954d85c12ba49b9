//! Well-known text decoder.
//!
//! Reads a single geometry, optionally prefixed with an EWKT `SRID=n;` tag.
//! Z, M and ZM coordinates are accepted and reduced to two dimensions.

use std::sync::LazyLock;

use regex::Regex;
use tasker_models::{Coord, Feature, Geometry, Ring};

use super::{FormatDecoder, GeometryFormat, Result};
use crate::error::DecodeError;

/// One token: a word, a number, punctuation, or any other stray character.
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z]+|[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?|[(),]|\S")
        .expect("Invalid WKT token regex")
});

/// EWKT spatial reference prefix.
static SRID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?i:SRID)=\d+\s*;").expect("Invalid SRID regex"));

/// Deepest `GEOMETRYCOLLECTION` nesting accepted.
const MAX_COLLECTION_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, Default)]
pub struct WktDecoder;

impl FormatDecoder for WktDecoder {
    fn format(&self) -> GeometryFormat {
        GeometryFormat::Wkt
    }

    fn decode(&self, text: &str) -> Result<Vec<Feature>> {
        let body = match SRID_REGEX.find(text) {
            Some(m) => &text[m.end()..],
            None => text,
        };
        let mut parser = Parser::new(body)?;
        let geometry = parser.geometry()?;
        parser.expect_end()?;
        Ok(geometry.map(Feature::new).into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Number(f64),
    Open,
    Close,
    Comma,
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        for m in TOKEN_REGEX.find_iter(text) {
            let s = m.as_str();
            let token = match s {
                "(" => Token::Open,
                ")" => Token::Close,
                "," => Token::Comma,
                _ if s.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                    Token::Word(s.to_ascii_uppercase())
                }
                _ => match s.parse::<f64>() {
                    Ok(n) => Token::Number(n),
                    Err(_) => {
                        return Err(DecodeError::Wkt {
                            offset: m.start(),
                            message: format!("unexpected character '{}'", s),
                        })
                    }
                },
            };
            tokens.push((m.start(), token));
        }
        Ok(Self {
            tokens,
            pos: 0,
            end: text.len(),
            depth: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(o, _)| *o).unwrap_or(self.end)
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(DecodeError::Wkt {
            offset: self.offset(),
            message: message.into(),
        })
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            self.error(format!("expected {:?}", expected))
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            self.error("trailing input after geometry")
        }
    }

    fn word(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Word(w)) => {
                let w = w.clone();
                self.pos += 1;
                Ok(w)
            }
            _ => self.error("expected a geometry type"),
        }
    }

    /// Consumes `EMPTY` if it is next.
    fn empty(&mut self) -> bool {
        if matches!(self.peek(), Some(Token::Word(w)) if w == "EMPTY") {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parses one tagged geometry. `POINT EMPTY` yields `None`.
    fn geometry(&mut self) -> Result<Option<Geometry>> {
        let start = self.offset();
        let word = self.word()?;
        let kind = strip_dimension(&word);
        if matches!(self.peek(), Some(Token::Word(w)) if matches!(w.as_str(), "Z" | "M" | "ZM")) {
            self.pos += 1;
        }
        let empty = self.empty();

        let geometry = match kind {
            "POINT" if empty => return Ok(None),
            "POINT" => {
                self.expect(Token::Open)?;
                let c = self.coord()?;
                self.expect(Token::Close)?;
                Geometry::Point(c)
            }
            "LINESTRING" => Geometry::LineString(if empty { Vec::new() } else { self.coords()? }),
            "LINEARRING" => Geometry::LinearRing(if empty { Vec::new() } else { self.coords()? }),
            "POLYGON" => Geometry::Polygon(if empty { Vec::new() } else { self.rings()? }),
            "MULTILINESTRING" => {
                Geometry::MultiLineString(if empty { Vec::new() } else { self.rings()? })
            }
            "MULTIPOINT" => Geometry::MultiPoint(if empty { Vec::new() } else { self.multipoint()? }),
            "MULTIPOLYGON" => Geometry::MultiPolygon(if empty {
                Vec::new()
            } else {
                self.list(|p| p.rings())?
            }),
            "GEOMETRYCOLLECTION" if empty => Geometry::GeometryCollection(Vec::new()),
            "GEOMETRYCOLLECTION" => {
                if self.depth >= MAX_COLLECTION_DEPTH {
                    return Err(DecodeError::Wkt {
                        offset: start,
                        message: format!(
                            "geometry collections nested deeper than {}",
                            MAX_COLLECTION_DEPTH
                        ),
                    });
                }
                self.depth += 1;
                let children = self.list(|p| p.geometry());
                self.depth -= 1;
                Geometry::GeometryCollection(children?.into_iter().flatten().collect())
            }
            _ => {
                return Err(DecodeError::Wkt {
                    offset: start,
                    message: format!("unknown geometry type '{}'", word),
                })
            }
        };
        Ok(Some(geometry))
    }

    /// `( item, item, ... )`
    fn list<T, F>(&mut self, mut item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        self.expect(Token::Open)?;
        let mut items = vec![item(self)?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            items.push(item(self)?);
        }
        self.expect(Token::Close)?;
        Ok(items)
    }

    /// Two to four numbers; only x and y are kept.
    fn coord(&mut self) -> Result<Coord> {
        let mut values = Vec::with_capacity(4);
        while let Some(Token::Number(n)) = self.peek() {
            values.push(*n);
            self.pos += 1;
        }
        match values.as_slice() {
            [x, y] | [x, y, _] | [x, y, _, _] => Ok(Coord::new(*x, *y)),
            _ => self.error("expected 2 to 4 coordinate values"),
        }
    }

    fn coords(&mut self) -> Result<Ring> {
        self.list(|p| p.coord())
    }

    fn rings(&mut self) -> Result<Vec<Ring>> {
        self.list(|p| p.coords())
    }

    /// Accepts both `MULTIPOINT (1 2, 3 4)` and `MULTIPOINT ((1 2), (3 4))`.
    fn multipoint(&mut self) -> Result<Ring> {
        self.list(|p| {
            if p.peek() == Some(&Token::Open) {
                p.pos += 1;
                let c = p.coord()?;
                p.expect(Token::Close)?;
                Ok(c)
            } else {
                p.coord()
            }
        })
    }
}

/// Drops a `Z`, `M` or `ZM` suffix glued to the type name (`POINTZ`).
fn strip_dimension(word: &str) -> &str {
    const KINDS: [&str; 8] = [
        "POINT",
        "LINESTRING",
        "LINEARRING",
        "POLYGON",
        "MULTIPOINT",
        "MULTILINESTRING",
        "MULTIPOLYGON",
        "GEOMETRYCOLLECTION",
    ];
    if KINDS.contains(&word) {
        return word;
    }
    for suffix in ["ZM", "Z", "M"] {
        if let Some(base) = word.strip_suffix(suffix) {
            if KINDS.contains(&base) {
                return base;
            }
        }
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasker_models::GeometryKind;

    fn decode_one(text: &str) -> Geometry {
        let mut features = WktDecoder.decode(text).unwrap();
        assert_eq!(features.len(), 1);
        features.remove(0).geometry.unwrap()
    }

    #[test]
    fn test_polygon_with_hole() {
        let geometry = decode_one("POLYGON ((0 0, 10 0, 10 10, 0 0), (1 1, 2 1, 2 2, 1 1))");
        match geometry {
            Geometry::Polygon(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[0][1], Coord::new(10.0, 0.0));
            }
            other => panic!("unexpected geometry: {:?}", other),
        }
    }

    #[test]
    fn test_case_dimensions_and_srid() {
        let geometry = decode_one("SRID=4326;linestring z (0 0 5, 1.5e1 -2 5)");
        assert_eq!(
            geometry,
            Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(15.0, -2.0)])
        );
        assert_eq!(decode_one("POINTM (1 2 3)"), Geometry::Point(Coord::new(1.0, 2.0)));
    }

    #[test]
    fn test_multipoint_forms() {
        let bare = decode_one("MULTIPOINT (1 2, 3 4)");
        let wrapped = decode_one("MULTIPOINT ((1 2), (3 4))");
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn test_geometry_collection() {
        let geometry = decode_one(
            "GEOMETRYCOLLECTION (POINT (1 2), POINT EMPTY, MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0))))",
        );
        match geometry {
            Geometry::GeometryCollection(children) => {
                assert_eq!(children.len(), 2);
                assert_eq!(children[1].kind(), GeometryKind::MultiPolygon);
            }
            other => panic!("unexpected geometry: {:?}", other),
        }
    }

    #[test]
    fn test_point_empty_has_no_features() {
        assert!(WktDecoder.decode("POINT EMPTY").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_malformed_input() {
        for text in [
            "",
            "POLYGON ((0 0, 1 1)",
            "POINT (1)",
            "CIRCLE (1 2)",
            "POINT (1 2) POINT (3 4)",
            "{\"type\": \"Point\"}",
            "<kml/>",
        ] {
            assert!(WktDecoder.decode(text).is_err(), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_rejects_deeply_nested_collections() {
        let depth = 20_000;
        let text = format!(
            "{}POINT (1 2){}",
            "GEOMETRYCOLLECTION (".repeat(depth),
            ")".repeat(depth)
        );
        assert!(matches!(
            WktDecoder.decode(&text),
            Err(DecodeError::Wkt { offset: _, ref message }) if message.contains("nested")
        ));
    }

    #[test]
    fn test_nested_collections_within_limit() {
        let depth = MAX_COLLECTION_DEPTH;
        let text = format!(
            "{}POINT (1 2){}",
            "GEOMETRYCOLLECTION (".repeat(depth),
            ")".repeat(depth)
        );
        assert_eq!(WktDecoder.decode(&text).unwrap().len(), 1);
    }
}
