//! Machine data types and the compatibility rules used during resolution
//!
//! The target machine knows exactly four value types. Every source-level type
//! keyword maps to one of them:
//!
//! | keyword  | type  |
//! |----------|-------|
//! | `int`    | `i32` |
//! | `long`   | `i64` |
//! | `float`  | `f32` |
//! | `double` | `f64` |
//!
//! Compatibility is exact equality. There is no implicit promotion between
//! integer and floating-point types, or between widths; a conversion has to be
//! written as a cast.

use std::fmt;

use serde::Serialize;

use super::ast::{NodeValue, SourceLocation};
use super::errors::ParseError;

/// Machine value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    I32,
    I64,
    F32,
    F64,
}

/// Type given to a numeric literal that no surrounding construct constrains
pub const LITERAL_DEFAULT: DataType = DataType::I32;

impl DataType {
    /// Map a source type keyword, `None` if it is not a value type
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "int" => Some(DataType::I32),
            "long" => Some(DataType::I64),
            "float" => Some(DataType::F32),
            "double" => Some(DataType::F64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::I32 => "i32",
            DataType::I64 => "i64",
            DataType::F32 => "f32",
            DataType::F64 => "f64",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, DataType::I32 | DataType::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a declared type keyword
pub fn resolve_declared_type(
    keyword: &str,
    location: SourceLocation,
) -> Result<DataType, ParseError> {
    DataType::from_keyword(keyword).ok_or_else(|| ParseError::UnknownType {
        name: keyword.to_string(),
        location,
    })
}

/// Whether a value of type `actual` may be used where `expected` is required
pub fn types_compatible(expected: DataType, actual: DataType) -> bool {
    expected == actual
}

/// Require `actual` to be usable as `expected`.
///
/// `actual` is `None` for calls to `void` functions, which never satisfy a
/// typed context.
pub fn expect_type(
    expected: DataType,
    actual: Option<DataType>,
    context: &str,
    location: SourceLocation,
) -> Result<(), ParseError> {
    match actual {
        Some(actual) if types_compatible(expected, actual) => Ok(()),
        Some(actual) => Err(ParseError::TypeMismatch {
            message: format!("{context}: expected {expected}, found {actual}"),
            location,
        }),
        None => Err(ParseError::TypeMismatch {
            message: format!("{context}: expected {expected}, found void"),
            location,
        }),
    }
}

fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

/// Whether a literal is spelled with a fraction or an exponent
pub fn is_fractional_spelling(text: &str) -> bool {
    hex_digits(text).is_none() && text.contains(['.', 'e', 'E'])
}

/// Convert the spelling of a numeric literal into a value of `data_type`.
///
/// Integer spellings are accepted for every type. Fractional or exponent
/// spellings are only accepted for floating-point types.
pub fn literal_value(
    text: &str,
    negative: bool,
    data_type: DataType,
    location: SourceLocation,
) -> Result<NodeValue, ParseError> {
    let hex = hex_digits(text);

    let malformed = || ParseError::Syntax {
        message: format!("Malformed number literal '{}'", text),
        location,
    };

    if is_fractional_spelling(text) {
        if !data_type.is_float() {
            return Err(ParseError::TypeMismatch {
                message: format!(
                    "literal '{}' is not a valid {} value",
                    text, data_type
                ),
                location,
            });
        }
        let value: f64 = text.parse().map_err(|_| malformed())?;
        let value = if negative { -value } else { value };
        return float_value(value, text, data_type, location);
    }

    let out_of_range = || ParseError::TypeMismatch {
        message: format!(
            "literal '{}{}' is out of range for {}",
            if negative { "-" } else { "" },
            text,
            data_type
        ),
        location,
    };

    // The sign is applied before the range check so that the most negative
    // value of each integer type is accepted
    let magnitude = match hex {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => text.parse::<u64>(),
    }
    .map_err(|_| out_of_range())?;
    let value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };

    match data_type {
        DataType::I32 => i32::try_from(value)
            .map(|v| NodeValue::Int(i64::from(v)))
            .map_err(|_| out_of_range()),
        DataType::I64 => i64::try_from(value)
            .map(NodeValue::Int)
            .map_err(|_| out_of_range()),
        DataType::F32 | DataType::F64 => float_value(value as f64, text, data_type, location),
    }
}

/// Reject values that are not finite in the target float width
fn float_value(
    value: f64,
    text: &str,
    data_type: DataType,
    location: SourceLocation,
) -> Result<NodeValue, ParseError> {
    let finite = match data_type {
        DataType::F32 => (value as f32).is_finite(),
        _ => value.is_finite(),
    };
    if !finite {
        return Err(ParseError::TypeMismatch {
            message: format!("literal '{}' is out of range for {}", text, data_type),
            location,
        });
    }
    Ok(NodeValue::Float(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::errors::ErrorKind;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_keyword_mapping() {
        assert_eq!(resolve_declared_type("int", loc()).unwrap(), DataType::I32);
        assert_eq!(resolve_declared_type("long", loc()).unwrap(), DataType::I64);
        assert_eq!(resolve_declared_type("float", loc()).unwrap(), DataType::F32);
        assert_eq!(resolve_declared_type("double", loc()).unwrap(), DataType::F64);
    }

    #[test]
    fn test_unknown_keyword() {
        for keyword in ["char", "void", "bool", "foo"] {
            let err = resolve_declared_type(keyword, loc()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownType, "{keyword}");
        }
    }

    #[test]
    fn test_compatibility_is_exact() {
        assert!(types_compatible(DataType::F32, DataType::F32));
        assert!(!types_compatible(DataType::F32, DataType::F64));
        assert!(!types_compatible(DataType::I64, DataType::I32));
        assert!(!types_compatible(DataType::I32, DataType::F32));
    }

    #[test]
    fn test_expect_type_reports_void() {
        let err = expect_type(DataType::I32, None, "argument", loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("found void"));
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(
            literal_value("3.14", false, DataType::F32, loc()).unwrap(),
            NodeValue::Float(3.14)
        );
        assert_eq!(
            literal_value("42", false, DataType::F64, loc()).unwrap(),
            NodeValue::Float(42.0)
        );
        assert_eq!(
            literal_value("0x2A", true, DataType::I64, loc()).unwrap(),
            NodeValue::Int(-42)
        );
        assert_eq!(
            literal_value("2147483648", true, DataType::I32, loc()).unwrap(),
            NodeValue::Int(-2147483648)
        );
    }

    #[test]
    fn test_literal_rejections() {
        let err = literal_value("3.14", false, DataType::I32, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = literal_value("2147483648", false, DataType::I32, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = literal_value("1.2.3", false, DataType::F64, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_integer_extremes() {
        assert_eq!(
            literal_value("9223372036854775808", true, DataType::I64, loc()).unwrap(),
            NodeValue::Int(i64::MIN)
        );
        assert_eq!(
            literal_value("0x7FFFFFFFFFFFFFFF", false, DataType::I64, loc()).unwrap(),
            NodeValue::Int(i64::MAX)
        );

        let err = literal_value("9223372036854775808", false, DataType::I64, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = literal_value("18446744073709551616", false, DataType::I64, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = literal_value("2147483649", true, DataType::I32, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_float_range() {
        let err = literal_value("1e39", false, DataType::F32, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = literal_value("1e39", true, DataType::F32, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = literal_value("1e309", false, DataType::F64, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        assert_eq!(
            literal_value("1e39", false, DataType::F64, loc()).unwrap(),
            NodeValue::Float(1e39)
        );
        assert_eq!(
            literal_value("3.4e38", false, DataType::F32, loc()).unwrap(),
            NodeValue::Float(3.4e38)
        );
    }
}
