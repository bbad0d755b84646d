//! Reference token grammar: `[$]?[A-Z]+[$]?[0-9]+`.
//!
//! Uppercase only, no sheet qualifiers, no ranges. `$` markers are accepted
//! and have no effect: absolute and relative references resolve identically.

use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, opt, recognize},
    sequence::tuple,
    IResult,
};

use gridflow_core::{col_from_label, CellCoord, CellError};

fn column_letters(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_uppercase())(input)
}

fn row_digits(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit())(input)
}

/// Recognize one reference token at the start of `input`
pub(crate) fn reference_token(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('$')),
        column_letters,
        opt(char('$')),
        row_digits,
    )))(input)
}

fn reference_parts(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = opt(char('$'))(input)?;
    let (input, letters) = column_letters(input)?;
    let (input, _) = opt(char('$'))(input)?;
    let (input, digits) = row_digits(input)?;
    Ok((input, (letters, digits)))
}

/// Parse a whole token such as `B12` or `$A$1` into a 0-based coordinate.
///
/// Fails with [`CellError::InvalidReference`] if the token does not match the
/// grammar, names row 0, or does not fit the coordinate space.
pub fn parse_reference(token: &str) -> Result<CellCoord, CellError> {
    let (_, (letters, digits)) =
        all_consuming(reference_parts)(token).map_err(|_| CellError::InvalidReference)?;

    let col = col_from_label(letters).ok_or(CellError::InvalidReference)?;
    let row: u32 = digits.parse().map_err(|_| CellError::InvalidReference)?;
    if row == 0 {
        return Err(CellError::InvalidReference);
    }

    Ok(CellCoord::new(row - 1, col))
}
