use serde::Serialize;

use super::Status;

/// An environment variable the hive-mcp tooling reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvVarSpec {
    pub name: &'static str,
    pub required: bool,
    /// Masked in every report.
    pub sensitive: bool,
}

pub const ENV_VARS: &[EnvVarSpec] = &[
    EnvVarSpec {
        name: "HIVE_MCP_DIR",
        required: true,
        sensitive: false,
    },
    EnvVarSpec {
        name: "BB_MCP_DIR",
        required: true,
        sensitive: false,
    },
    EnvVarSpec {
        name: "OPENROUTER_API_KEY",
        required: false,
        sensitive: true,
    },
    EnvVarSpec {
        name: "HOME",
        required: true,
        sensitive: false,
    },
    EnvVarSpec {
        name: "SHELL",
        required: true,
        sensitive: false,
    },
];

/// Result of checking one environment variable.
///
/// `value` is already masked for sensitive variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarCheck {
    pub status: Status,
    pub name: String,
    pub value: Option<String>,
    pub required: bool,
    pub sensitive: bool,
}

/// True for names that look like they hold credentials.
pub fn is_sensitive_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("key") || lower.contains("secret")
}

/// Masks a secret, keeping the first and last four characters when it is
/// long enough that doing so reveals little.
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}****{tail}")
    } else {
        "****".to_string()
    }
}

fn check_env_var<F>(spec: &EnvVarSpec, lookup: &F) -> EnvVarCheck
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(spec.name).filter(|v| !v.is_empty());
    let status = match (&value, spec.required) {
        (Some(_), _) => Status::Ok,
        (None, true) => Status::Missing,
        (None, false) => Status::Warning,
    };
    let value = value.map(|v| if spec.sensitive { mask_value(&v) } else { v });

    EnvVarCheck {
        status,
        name: spec.name.to_string(),
        value,
        required: spec.required,
        sensitive: spec.sensitive,
    }
}

/// Checks every variable in [`ENV_VARS`], reading values through `lookup`.
pub fn check_env_vars<F>(lookup: F) -> Vec<EnvVarCheck>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VARS
        .iter()
        .map(|spec| check_env_var(spec, &lookup))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_mask_long_value() {
        assert_eq!(mask_value("sk-or-v1-abcdefwxyz"), "sk-o****wxyz");
    }

    #[test]
    fn test_mask_short_value_hides_everything() {
        assert_eq!(mask_value("12345678"), "****");
        assert_eq!(mask_value(""), "****");
    }

    #[test]
    fn test_sensitive_names() {
        assert!(is_sensitive_name("OPENROUTER_API_KEY"));
        assert!(is_sensitive_name("client_secret"));
        assert!(!is_sensitive_name("HIVE_MCP_DIR"));
    }

    #[test]
    fn test_missing_required_and_optional() {
        let checks = check_env_vars(lookup(&[("HOME", "/home/dev")]));
        let by_name = |name: &str| checks.iter().find(|c| c.name == name).unwrap().clone();

        assert_eq!(by_name("HOME").status, Status::Ok);
        assert_eq!(by_name("HIVE_MCP_DIR").status, Status::Missing);
        assert_eq!(by_name("OPENROUTER_API_KEY").status, Status::Warning);
        assert_eq!(checks.len(), ENV_VARS.len());
    }

    #[test]
    fn test_sensitive_value_is_masked() {
        let checks = check_env_vars(lookup(&[("OPENROUTER_API_KEY", "abcd1234567890wxyz")]));
        let key = checks
            .iter()
            .find(|c| c.name == "OPENROUTER_API_KEY")
            .unwrap();
        assert_eq!(key.status, Status::Ok);
        assert_eq!(key.value.as_deref(), Some("abcd****wxyz"));
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let checks = check_env_vars(lookup(&[("SHELL", "")]));
        let shell = checks.iter().find(|c| c.name == "SHELL").unwrap();
        assert_eq!(shell.status, Status::Missing);
        assert_eq!(shell.value, None);
    }
}
