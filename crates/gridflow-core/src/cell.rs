use serde::{Deserialize, Serialize};

use crate::error::CellError;

/// Represents the value a cell evaluates to
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// No record at this coordinate
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// Raw input is stored but has not been evaluated yet
    Pending,
    Error(CellError),
}

impl CellValue {
    /// Coerce non-formula raw input: numbers become `Number`, everything else `Text`
    pub fn from_literal(input: &str) -> Self {
        if input.is_empty() {
            return CellValue::Empty;
        }

        match input.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(input.to_string()),
        }
    }

    /// Check if the value is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CellValue::Pending)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Operand value in arithmetic context.
    ///
    /// Empty cells and text count as 0; errors are returned so the caller
    /// can propagate them. `Pending` must be resolved before calling this.
    pub fn as_operand(&self) -> Result<f64, CellError> {
        match self {
            CellValue::Number(n) => Ok(*n),
            CellValue::Error(e) => Err(*e),
            CellValue::Empty | CellValue::Text(_) | CellValue::Pending => Ok(0.0),
        }
    }

    /// Text shown in the grid for this value
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty | CellValue::Pending => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Error(e) => e.to_string(),
        }
    }
}

/// A materialized cell: raw input is the source of truth, the computed value
/// is derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    pub raw_input: String,
    pub computed_value: CellValue,
}

impl CellRecord {
    /// New record whose value has not been computed yet
    pub fn new(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            computed_value: CellValue::Pending,
        }
    }

    /// Check if this is a formula
    pub fn is_formula(&self) -> bool {
        is_formula(&self.raw_input)
    }
}

/// A raw input beginning with `=` denotes a formula
pub fn is_formula(raw: &str) -> bool {
    raw.starts_with('=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_literal() {
        assert_eq!(CellValue::from_literal("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::from_literal("-1.5"), CellValue::Number(-1.5));
        assert_eq!(
            CellValue::from_literal("0-3"),
            CellValue::Text("0-3".to_string())
        );
        assert_eq!(CellValue::from_literal(""), CellValue::Empty);
        assert_eq!(
            CellValue::from_literal("inf"),
            CellValue::Text("inf".to_string())
        );
    }

    #[test]
    fn test_cell_value_as_operand() {
        assert_eq!(CellValue::Number(42.0).as_operand(), Ok(42.0));
        assert_eq!(CellValue::Empty.as_operand(), Ok(0.0));
        assert_eq!(CellValue::Text("hello".to_string()).as_operand(), Ok(0.0));
        assert_eq!(
            CellValue::Error(CellError::DivisionByZero).as_operand(),
            Err(CellError::DivisionByZero)
        );
    }

    #[test]
    fn test_cell_value_as_text() {
        assert_eq!(CellValue::Number(42.0).as_text(), "42");
        assert_eq!(CellValue::Number(42.5).as_text(), "42.5");
        assert_eq!(CellValue::Pending.as_text(), "");
        assert_eq!(CellValue::Error(CellError::Syntax).as_text(), "#ERROR!");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_string(&CellValue::Number(3.0)).unwrap();
        assert_eq!(json, r#"{"type":"Number","value":3.0}"#);

        let record = CellRecord::new("=A1");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"rawInput":"=A1","computedValue":{"type":"Pending"}}"#);
        assert!(record.is_formula());
    }
}
