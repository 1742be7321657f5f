//! Configuration loading and environment parsing.

use super::validation::validate_config;
use super::Config;
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Inline JSON document.
pub const CONFIG_JSON_ENV: &str = "TETRIS_RELAY_CONFIG_JSON";
/// Path to a JSON config file.
pub const CONFIG_PATH_ENV: &str = "TETRIS_RELAY_CONFIG_PATH";
/// Prefix for per-field overrides, e.g. `TETRIS_RELAY__SERVER__WORKER_THREADS=8`.
pub const ENV_OVERRIDE_PREFIX: &str = "TETRIS_RELAY__";

/// Load configuration. Sources are merged lowest priority first, so a
/// field set by an earlier source in this list wins:
///
/// 1) `TETRIS_RELAY_CONFIG_JSON` env var containing raw JSON
/// 2) file named by `TETRIS_RELAY_CONFIG_PATH`
/// 3) `config.json` in the current working directory
/// 4) `config.json` next to the executable
/// 5) compiled-in defaults
///
/// `TETRIS_RELAY__SECTION__FIELD` variables are applied on top of all of
/// them. Unreadable or unparsable sources are reported on stderr and
/// skipped; this function never fails. Validation problems are reported
/// but not propagated, see [`validate_config`].
#[must_use]
pub fn load() -> Config {
    let defaults = Config::default();
    let mut merged = serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(Map::new()));

    for layer in file_layers().into_iter().rev() {
        merge_values(&mut merged, layer);
    }
    if let Some(inline) = env::var(CONFIG_JSON_ENV)
        .ok()
        .and_then(|json| parse_json_document(&json, CONFIG_JSON_ENV))
    {
        merge_values(&mut merged, inline);
    }

    apply_env_overrides(&mut merged, env::vars());

    let config = match serde_json::from_value::<Config>(merged) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to deserialize config; using defaults: {err}");
            defaults
        }
    };

    if let Err(err) = validate_config(&config) {
        eprintln!("Configuration validation error: {err}");
    }

    config
}

/// File sources, highest priority first.
fn file_layers() -> Vec<Value> {
    let mut paths = Vec::new();
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        paths.push(PathBuf::from(path));
    }
    paths.push(PathBuf::from("config.json"));
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(exe_dir.join("config.json"));
    }

    paths.iter().filter_map(|path| read_file_source(path)).collect()
}

fn read_file_source(path: &Path) -> Option<Value> {
    if path.as_os_str().is_empty() || !path.exists() {
        return None;
    }

    match fs::read_to_string(path) {
        Ok(contents) => parse_json_document(&contents, &format!("file {}", path.display())),
        Err(err) => {
            eprintln!("Failed to read config from {}: {err}", path.display());
            None
        }
    }
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

/// Deep-merge `source` into `target`; objects merge key by key, anything
/// else replaces.
fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn apply_env_overrides<I>(root: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, raw_value) in vars {
        let Some(path) = key.strip_prefix(ENV_OVERRIDE_PREFIX) else {
            continue;
        };

        let segments: Vec<String> = path
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        if segments.is_empty() {
            continue;
        }

        set_nested_value(root, &segments, parse_scalar(raw_value.trim()));
    }
}

/// JSON literal if it parses as one (`8`, `true`, `"x"`), otherwise a string.
fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set_nested_value(target: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        let entry = map.entry(first.clone()).or_insert(Value::Null);
        set_nested_value(entry, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_merge_values_is_deep() {
        let mut target = json!({
            "port": 1,
            "server": {"worker_threads": 4, "recv_timeout_ms": 1000}
        });
        merge_values(&mut target, json!({"server": {"worker_threads": 8}}));
        assert_eq!(
            target,
            json!({"port": 1, "server": {"worker_threads": 8, "recv_timeout_ms": 1000}})
        );
    }

    #[test]
    fn test_env_overrides_nested_and_typed() {
        let mut root = serde_json::to_value(Config::default()).unwrap();
        apply_env_overrides(
            &mut root,
            vars(&[
                ("TETRIS_RELAY__PORT", "4000"),
                ("TETRIS_RELAY__SERVER__WORKER_THREADS", " 8 "),
                ("TETRIS_RELAY__LOGGING__LEVEL", "debug"),
                ("TETRIS_RELAY__LOGGING__ENABLE_FILE_LOGGING", "true"),
                ("TETRIS_RELAY_CONFIG_JSON", "{}"),
                ("UNRELATED", "1"),
                ("TETRIS_RELAY__", "ignored"),
            ]),
        );

        let config: Config = serde_json::from_value(root).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.server.worker_threads, 8);
        assert_eq!(config.server.recv_timeout_ms, 1000);
        assert_eq!(config.logging.level, Some(crate::config::LogLevel::Debug));
        assert!(config.logging.enable_file_logging);
    }

    #[test]
    fn test_set_nested_value_replaces_scalars_with_objects() {
        let mut root = json!({"server": 5});
        set_nested_value(
            &mut root,
            &["server".to_string(), "worker_threads".to_string()],
            json!(2),
        );
        assert_eq!(root, json!({"server": {"worker_threads": 2}}));
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("12"), json!(12));
        assert_eq!(parse_scalar("false"), json!(false));
        assert_eq!(parse_scalar("127.0.0.1"), json!("127.0.0.1"));
        assert_eq!(parse_scalar(""), json!(""));
    }

    #[test]
    fn test_parse_json_document_rejects_garbage() {
        assert!(parse_json_document("   ", "test").is_none());
        assert!(parse_json_document("{not json", "test").is_none());
        assert_eq!(parse_json_document(r#"{"port": 1}"#, "test"), Some(json!({"port": 1})));
    }
}
