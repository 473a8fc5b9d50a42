//! Credential resolution.
//!
//! Priority: explicit argument, then the named environment variable, then the
//! config value (which may itself be a `${ENV_VAR}` reference). There is no
//! built-in fallback key; callers fail closed on `None`.

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve an API key from its three sources, in priority order.
pub fn resolve_api_key(explicit: Option<&str>, env_var: &str, config_value: &str) -> Option<String> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }
    if let Some(key) = std::env::var(env_var).ok().filter(|k| !k.is_empty()) {
        return Some(key);
    }
    resolve_env_var(config_value)
}
