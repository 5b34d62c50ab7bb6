use crate::utils::error::{ProbeError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProbeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_port(field_name: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(ProbeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: port.to_string(),
            reason: "Port must be between 1 and 65535".to_string(),
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
        return Err(ProbeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Every entry must be a non-empty `host:port` address.
pub fn validate_address_list(field_name: &str, addresses: &[String]) -> Result<()> {
    let usable: Vec<&String> = addresses.iter().filter(|a| !a.trim().is_empty()).collect();
    if usable.is_empty() {
        return Err(ProbeError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for address in usable {
        let port = address
            .rsplit_once(':')
            .and_then(|(host, port)| (!host.is_empty()).then_some(port))
            .and_then(|port| port.parse::<u16>().ok());
        if port.is_none() {
            return Err(ProbeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: address.clone(),
                reason: "Expected host:port".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_port() {
        assert!(validate_port("port", 6379).is_ok());
        assert!(validate_port("port", 0).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout", 10, 1, 3600).is_ok());
        assert!(validate_range("timeout", 0, 1, 3600).is_err());
    }

    #[test]
    fn test_validate_address_list() {
        let brokers = vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()];
        assert!(validate_address_list("brokers", &brokers).is_ok());

        let empty = vec!["".to_string()];
        assert!(matches!(
            validate_address_list("brokers", &empty),
            Err(ProbeError::MissingConfigError { .. })
        ));

        let no_port = vec!["kafka-1".to_string()];
        assert!(validate_address_list("brokers", &no_port).is_err());
    }
}
