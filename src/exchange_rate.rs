use sqlx::FromRow;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RateObservation {
    pub id: i64,
    pub name: String,
    pub bid: f64,
    pub created_at: String,
}

/// Parses the provider's textual bid. Only finite, non-negative values are
/// accepted.
pub fn parse_bid(value: &str) -> Result<f64, PipelineError> {
    match value.parse::<f64>() {
        Ok(bid) if bid.is_finite() && bid >= 0.0 => Ok(bid),
        _ => Err(PipelineError::Parse {
            value: value.to_string(),
        }),
    }
}

/// Fixed six-decimal rendering shared by the response body and the client sink.
pub fn format_bid(bid: f64) -> String {
    format!("{bid:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_decimal() {
        assert_eq!(parse_bid("5.25").unwrap(), 5.25);
        assert_eq!(parse_bid("0").unwrap(), 0.0);
    }

    #[test]
    fn rejects_garbage_and_out_of_range_values() {
        for value in ["", "abc", "5,25", "-1.0", "NaN", "inf", "-inf"] {
            let err = parse_bid(value).unwrap_err();
            assert!(
                matches!(err, PipelineError::Parse { value: ref got } if got == value),
                "{value} should not parse"
            );
            assert_eq!(err.to_string(), "invalid value for bid");
        }
    }

    #[test]
    fn formats_with_six_decimals() {
        assert_eq!(format_bid(5.25), "5.250000");
        assert_eq!(format_bid(5.1234), "5.123400");
        assert_eq!(format_bid(0.0), "0.000000");
    }
}
