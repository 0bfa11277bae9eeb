//! Parsing of desired padding sizes.
//!
//! Sizes are whole gibibytes. A bare number means GiB; a binary unit suffix
//! (`MiB`, `GiB`, `TiB`, or the short forms `M`, `G`, `T`) is accepted as long
//! as the value comes out to a whole number of GiB.
//!
//! | Input        | Result      |
//! |--------------|-------------|
//! | `40`         | 40          |
//! | `40GiB`      | 40          |
//! | `2 TiB`      | 2048        |
//! | `40960MiB`   | 40          |
//! | `1536MiB`    | rejected    |
//! | `1.5`, `-3`  | rejected    |

use serde_json::Value;

use crate::error::{PadError, Result};

const MIB_PER_GIB: u64 = 1024;

pub fn parse_gib(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    if digits.is_empty() {
        return Err(invalid(input, "expected a non-negative whole number"));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|_| invalid(input, "number is too large"))?;

    match unit.trim().to_ascii_lowercase().as_str() {
        "" | "g" | "gib" => Ok(amount),
        "t" | "tib" => amount
            .checked_mul(1024)
            .ok_or_else(|| invalid(input, "number is too large")),
        "m" | "mib" => {
            if amount % MIB_PER_GIB != 0 {
                return Err(invalid(input, "not a whole number of GiB"));
            }
            Ok(amount / MIB_PER_GIB)
        }
        _ => Err(invalid(input, "unknown unit (use MiB, GiB or TiB)")),
    }
}

/// Accepts the JSON forms an invocation payload may carry: a non-negative
/// integer (GiB) or a size string.
pub fn gib_from_json(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            PadError::InvalidInput(format!(
                "desired padding {n} is not a non-negative whole number of GiB"
            ))
        }),
        Value::String(s) => parse_gib(s),
        other => Err(PadError::InvalidInput(format!(
            "desired padding must be a number or size string, got {other}"
        ))),
    }
}

fn invalid(input: &str, reason: &str) -> PadError {
    PadError::InvalidInput(format!("desired padding {input:?}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_numbers_are_gib() {
        assert_eq!(parse_gib("0").unwrap(), 0);
        assert_eq!(parse_gib("40").unwrap(), 40);
        assert_eq!(parse_gib("  7 ").unwrap(), 7);
    }

    #[test]
    fn units_are_case_insensitive() {
        assert_eq!(parse_gib("40GiB").unwrap(), 40);
        assert_eq!(parse_gib("40g").unwrap(), 40);
        assert_eq!(parse_gib("2 TiB").unwrap(), 2048);
        assert_eq!(parse_gib("40960mib").unwrap(), 40);
    }

    #[test]
    fn partial_gib_is_rejected() {
        assert!(matches!(
            parse_gib("1536MiB"),
            Err(PadError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_integers_are_rejected() {
        for input in ["", "-3", "1.5", "GiB", "12KiB", "ten"] {
            assert!(
                matches!(parse_gib(input), Err(PadError::InvalidInput(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(parse_gib("18446744073709551616").is_err());
        assert!(parse_gib("18446744073709551615TiB").is_err());
    }

    #[test]
    fn json_forms() {
        assert_eq!(gib_from_json(&json!(40)).unwrap(), 40);
        assert_eq!(gib_from_json(&json!("40GiB")).unwrap(), 40);
        assert!(gib_from_json(&json!(-1)).is_err());
        assert!(gib_from_json(&json!(2.5)).is_err());
        assert!(gib_from_json(&json!(null)).is_err());
        assert!(gib_from_json(&json!([40])).is_err());
    }
}
