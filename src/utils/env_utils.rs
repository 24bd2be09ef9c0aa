use std::env;

pub fn try_get_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

pub fn get_env_or(key: &str, default: &str) -> String {
    try_get_env(key).unwrap_or_else(|| default.to_string())
}
