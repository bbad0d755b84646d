//! Formula text handling: normalisation, reference scanning and substitution.
//!
//! A formula is split into literal text and reference tokens. Reference
//! values are substituted back as numeric literals produced by the engine,
//! so the expression evaluator never sees user-controlled identifiers.

use std::collections::HashSet;

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    combinator::map,
    multi::many0,
    IResult,
};

use gridflow_core::{CellCoord, CellError};

use crate::reference::{parse_reference, reference_token};

/// A piece of normalised formula text
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Reference {
        token: String,
        target: Result<CellCoord, CellError>,
    },
}

fn literal_run(input: &str) -> IResult<&str, &str> {
    alt((
        take_while1(|c: char| !c.is_ascii_uppercase()),
        // Letters that are not followed by digits are not a reference
        take_while1(|c: char| c.is_ascii_uppercase()),
    ))(input)
}

fn segments(input: &str) -> IResult<&str, Vec<Segment>> {
    many0(alt((
        map(reference_token, |token: &str| Segment::Reference {
            token: token.to_string(),
            target: parse_reference(token),
        }),
        map(literal_run, |text: &str| Segment::Literal(text.to_string())),
    )))(input)
}

/// Strip the leading `=`, all whitespace and all `$` markers
pub fn normalize(raw: &str) -> String {
    raw.strip_prefix('=')
        .unwrap_or(raw)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect()
}

/// A parsed formula, ready for dependency collection and substitution
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    segments: Vec<Segment>,
}

impl Formula {
    /// Parse raw cell input (with or without the leading `=`)
    pub fn parse(raw: &str) -> Self {
        let source = normalize(raw);
        // Every char is either part of a reference or a literal run, so the
        // scanner always consumes the whole input.
        let segments = match segments(&source) {
            Ok((_, segments)) => segments,
            Err(_) => vec![Segment::Literal(source.clone())],
        };
        Self { source, segments }
    }

    /// Normalised formula text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolved references in order of appearance (duplicates kept)
    pub fn references(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Reference { target: Ok(coord), .. } => Some(*coord),
            _ => None,
        })
    }

    /// Distinct precedents of this formula
    pub fn dependencies(&self) -> HashSet<CellCoord> {
        self.references().collect()
    }

    /// First reference token that failed to decode, if any
    pub fn reference_error(&self) -> Option<CellError> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Reference { target: Err(e), .. } => Some(*e),
            _ => None,
        })
    }

    /// Replace every reference with its value, in order of appearance.
    ///
    /// `values` must hold one entry per item of [`Formula::references`].
    /// Values are parenthesised so negative numbers keep their meaning.
    pub fn substitute(&self, values: &[f64]) -> Result<String, CellError> {
        let mut values = values.iter();
        let mut expression = String::with_capacity(self.source.len() + 8);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => expression.push_str(text),
                Segment::Reference { target: Ok(_), .. } => {
                    let value = values.next().ok_or(CellError::InvalidReference)?;
                    expression.push('(');
                    expression.push_str(&format_literal(*value));
                    expression.push(')');
                }
                Segment::Reference { target: Err(e), .. } => return Err(*e),
            }
        }

        Ok(expression)
    }
}

/// Render a number as a literal the arithmetic grammar accepts.
///
/// `f64`'s `Display` never uses exponent notation and round-trips exactly.
fn format_literal(value: f64) -> String {
    if value.is_finite() {
        format!("{}", value)
    } else {
        // Non-finite values never come out of the evaluator; keep the
        // grammar rejecting them rather than inventing a number.
        "NaN".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("= $A$1 + B 2"), "A1+B2");
        assert_eq!(normalize("A1"), "A1");
    }

    #[test]
    fn test_scan_references() {
        let formula = Formula::parse("=A$1+B10*(C3-A1)");
        let refs: Vec<_> = formula.references().collect();
        assert_eq!(
            refs,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(9, 1),
                CellCoord::new(2, 2),
                CellCoord::new(0, 0),
            ]
        );
        assert_eq!(formula.dependencies().len(), 3);
        assert_eq!(formula.source(), "A1+B10*(C3-A1)");
    }

    #[test]
    fn test_letters_without_digits_stay_literal() {
        let formula = Formula::parse("=1/0*X9Z");
        assert_eq!(
            formula.segments(),
            &[
                Segment::Literal("1/0*".to_string()),
                Segment::Reference {
                    token: "X9".to_string(),
                    target: Ok(CellCoord::new(8, 23)),
                },
                Segment::Literal("Z".to_string()),
            ]
        );
        assert_eq!(formula.substitute(&[4.0]).unwrap(), "1/0*(4)Z");
    }

    #[test]
    fn test_invalid_reference_token() {
        let formula = Formula::parse("=A0+B1");
        assert_eq!(formula.reference_error(), Some(CellError::InvalidReference));
        // Valid references still count as dependencies
        assert_eq!(formula.references().collect::<Vec<_>>(), vec![CellCoord::new(0, 1)]);
        assert_eq!(formula.substitute(&[1.0]), Err(CellError::InvalidReference));
    }

    #[test]
    fn test_substitute_negative_and_fractional() {
        let formula = Formula::parse("=A1-B1");
        assert_eq!(formula.substitute(&[-2.5, 0.1]).unwrap(), "(-2.5)-(0.1)");
    }

    #[test]
    fn test_lowercase_is_not_a_reference() {
        let formula = Formula::parse("=a1+1");
        assert_eq!(formula.references().count(), 0);
        assert_eq!(formula.substitute(&[]).unwrap(), "a1+1");
    }
}
