use crate::utils::error::{CarPredictError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CarPredictError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CarPredictError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CarPredictError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(CarPredictError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_header_name(field_name: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() || !name.chars().all(|c| c.is_ascii_graphic() && c != ':') {
        return Err(CarPredictError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Header names must be non-empty visible ASCII without ':'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CarPredictError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("estimator.endpoint", "https://example.com/predict").is_ok());
        assert!(validate_url("estimator.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("estimator.endpoint", "").is_err());
        assert!(validate_url("estimator.endpoint", "invalid-url").is_err());
        assert!(validate_url("estimator.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_header_name() {
        assert!(validate_header_name("headers", "X-Api-Key").is_ok());
        assert!(validate_header_name("headers", "").is_err());
        assert!(validate_header_name("headers", "Bad Header").is_err());
        assert!(validate_header_name("headers", "a:b").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("placeholder.delay_ms", 10u64, 0, 60_000).is_ok());
        assert!(validate_range("placeholder.delay_ms", 60_001u64, 0, 60_000).is_err());
    }
}
