use super::Config;
use crate::error::{NexoraError, Result};
use regex::Regex;

/// Expand `${VAR_NAME}` references through `lookup`.
/// Unknown variables are left untouched.
pub fn expand_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let Ok(re) = Regex::new(r"\$\{([^}]+)\}") else {
        return value.to_string();
    };

    let mut result = value.to_string();
    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        let replacement = lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name));
        result = result.replace(&cap[0], &replacement);
    }

    result
}

pub fn validate(config: &Config) -> Result<()> {
    if config.context_window == 0 {
        return Err(NexoraError::ConfigError(
            "context_window must be at least 1".to_string(),
        ));
    }
    if config.request_timeout == 0 {
        return Err(NexoraError::ConfigError(
            "request_timeout must be at least 1 second".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(NexoraError::ConfigError(format!(
            "temperature {} is outside 0.0..=2.0",
            config.temperature
        )));
    }
    if config.primary_model.trim().is_empty() || config.backup_model.trim().is_empty() {
        return Err(NexoraError::ConfigError(
            "model names must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_known_and_unknown_vars() {
        let expanded = expand_with("key=${KNOWN} other=${MISSING}", |name| {
            (name == "KNOWN").then(|| "secret".to_string())
        });
        assert_eq!(expanded, "key=secret other=${MISSING}");
    }

    #[test]
    fn test_expand_without_placeholders_is_identity() {
        assert_eq!(expand_with("plain", |_| None), "plain");
    }
}
