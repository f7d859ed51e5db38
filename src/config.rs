use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::SimConfig;

pub fn load_config(path: &Path) -> Result<SimConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArrivalMethod, Distribution, InputMode};
    use std::path::PathBuf;

    fn write_temp(contents: &str, extension: &str) -> PathBuf {
        use std::time::{SystemTime, UNIX_EPOCH};
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be available")
            .as_nanos();
        path.push(format!("queue-sim-{}.{}", nanos, extension));
        fs::write(&path, contents).expect("config write should succeed");
        path
    }

    #[test]
    fn toml_config_round_trips() {
        let path = write_temp(
            r#"
num_servers = 2
seed = 42

[arrival]
lambda = 5.0
method = "table"

[service]
kind = "exponential"
mean = 3.0

[priority]
min = 1
max = 3

[input]
customers = 20
"#,
            "toml",
        );
        let config = load_config(&path).expect("config should parse");
        assert_eq!(config.num_servers, 2);
        assert_eq!(config.arrival.method, ArrivalMethod::Table);
        assert_eq!(config.service, Distribution::Exponential { mean: 3.0 });
        assert_eq!(config.input, InputMode::FixedCount { customers: 20 });
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn json_config_round_trips() {
        let path = write_temp(
            r#"{
  "num_servers": 1,
  "arrival": { "lambda": 4.0, "method": "exponential" },
  "service": { "kind": "uniform", "min": 2.0, "max": 8.0 },
  "input": { "horizon-minutes": 120.0 }
}"#,
            "json",
        );
        let config = load_config(&path).expect("config should parse");
        assert_eq!(config.arrival.method, ArrivalMethod::Exponential);
        assert_eq!(
            config.input,
            InputMode::TimeHorizon {
                horizon_minutes: 120.0
            }
        );
        assert_eq!(config.priority, None);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let path = write_temp("num_servers = 1", "yaml");
        assert!(matches!(
            load_config(&path),
            Err(Error::UnsupportedConfigFormat(_))
        ));
    }

    #[test]
    fn malformed_toml_reports_a_parse_error() {
        let path = write_temp("num_servers = ", "toml");
        assert!(matches!(load_config(&path), Err(Error::ConfigParse(_))));
    }
}
