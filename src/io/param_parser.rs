use hashbrown::HashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{self, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigurationError;

#[derive(Clone, Debug, PartialEq)]
pub struct UsedParameter {
    pub name: String,
    pub value: Value,
    pub changed: bool,
}

/// Key-value configuration read from a JSON file of sections:
///
/// ```json
/// { "Driver": { "tmax": 1.0 }, "Grid": { "nx": 100, "xmin": -5.0, "xmax": 5.0 } }
/// ```
///
/// Keys are addressed as `Section.key` and matched case-insensitively. Every
/// lookup moves the key from the unused set to the used set so the resolved
/// configuration can be reported afterwards.
#[derive(Clone, Debug, Default)]
pub struct Parameters {
    pub config_file: Option<PathBuf>,
    unused: HashMap<String, (String, Value)>,
    used: HashMap<String, UsedParameter>,
}
impl Parameters {
    pub fn parse(file_path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let file_path = file_path.as_ref();
        let file_content =
            fs::read_to_string(file_path).map_err(|source| ConfigurationError::Unreadable {
                path: file_path.to_path_buf(),
                source,
            })?;
        let root: Value =
            serde_json::from_str(&file_content).map_err(|source| ConfigurationError::Malformed {
                path: file_path.to_path_buf(),
                source,
            })?;
        let mut params = Parameters::from_value(root)?;
        params.config_file = Some(file_path.to_path_buf());
        Ok(params)
    }
    pub fn from_value(root: Value) -> Result<Self, ConfigurationError> {
        let Value::Object(sections) = root else {
            return Err(ConfigurationError::InvalidType {
                key: "<root>".to_string(),
                reason: "configuration must be an object of sections".to_string(),
            });
        };
        let mut unused = HashMap::new();
        for (section, entries) in sections {
            let Value::Object(entries) = entries else {
                return Err(ConfigurationError::InvalidType {
                    key: section,
                    reason: "a section must be an object of key/value pairs".to_string(),
                });
            };
            for (key, value) in entries {
                let name = format!("{}.{}", section, key);
                unused.insert(name.to_lowercase(), (name, value));
            }
        }
        Ok(Parameters {
            config_file: None,
            unused,
            used: HashMap::new(),
        })
    }
    /// Value of `key`, or `default` when the configuration does not set it.
    pub fn with_default<T>(&mut self, key: &str, default: T) -> Result<T, ConfigurationError>
    where
        T: DeserializeOwned + Serialize,
    {
        match self.lookup(key)? {
            Some(value) => {
                let changed = serde_json::to_value(&value).ok() != serde_json::to_value(&default).ok();
                self.mark_used(key, &value, changed);
                Ok(value)
            }
            None => {
                self.mark_used(key, &default, false);
                Ok(default)
            }
        }
    }
    /// Value of `key`; fails when the configuration does not set it.
    pub fn required<T>(&mut self, key: &str) -> Result<T, ConfigurationError>
    where
        T: DeserializeOwned + Serialize,
    {
        let value = self.lookup(key)?.ok_or_else(|| ConfigurationError::Missing {
            key: key.to_string(),
        })?;
        self.mark_used(key, &value, true);
        Ok(value)
    }
    fn lookup<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>, ConfigurationError> {
        let lowered = key.to_lowercase();
        let raw = match self.unused.remove(&lowered) {
            Some((_, value)) => value,
            None => match self.used.get(&lowered) {
                Some(used) if used.changed => used.value.clone(),
                _ => return Ok(None),
            },
        };
        serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|e| ConfigurationError::InvalidType {
                key: key.to_string(),
                reason: format!("{} (got {})", e, raw),
            })
    }
    fn mark_used<T: Serialize>(&mut self, key: &str, value: &T, changed: bool) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.used.insert(
            key.to_lowercase(),
            UsedParameter {
                name: key.to_string(),
                value,
                changed,
            },
        );
    }
    /// Resolved parameters of one section, sorted by key.
    pub fn used_in_section(&self, section: &str) -> Vec<&UsedParameter> {
        let prefix = format!("{}.", section.to_lowercase());
        let mut params: Vec<&UsedParameter> = self
            .used
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, v)| v)
            .collect();
        params.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        params
    }
    /// Keys present in the configuration that no component asked for, sorted.
    pub fn unused(&self) -> Vec<(&str, &Value)> {
        let mut params: Vec<(&str, &Value)> = self
            .unused
            .values()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        params.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));
        params
    }
    /// Human-readable lines for a section, aligned on the key column.
    pub fn section_report(&self, section: &str) -> Vec<String> {
        let params = self.used_in_section(section);
        let key_len = params
            .iter()
            .map(|p| p.name.len() - section.len() - 1)
            .max()
            .unwrap_or(0);
        let mut lines = vec![format!("[ {} ]", section)];
        for p in params {
            let key = &p.name[section.len() + 1..];
            let mut line = format!("   {:<width$} : {}", key, p.value, width = key_len);
            if p.changed {
                line.push_str("   (CHANGED)");
            }
            lines.push(line);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Parameters {
        Parameters::from_value(json!({
            "Driver": { "tmax": 2.5, "max_iter": 100 },
            "GRID": { "Nx": 64, "xmin": -1.0, "xmax": 1.0 },
            "Hydro": { "f_cfl": 0.75, "bogus": "yes" }
        }))
        .unwrap()
    }

    #[test]
    fn test_lookups_are_case_insensitive() {
        let mut params = sample();
        let nx: usize = params.required("Grid.nx").unwrap();
        assert_eq!(nx, 64);
        let xmax: f64 = params.required("grid.XMAX").unwrap();
        assert!((xmax - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_defaults_and_changed_flags() {
        let mut params = sample();
        let max_iter: usize = params.with_default("Driver.max_iter", 10).unwrap();
        let output_dt: f64 = params.with_default("Driver.output_dt", 0.0).unwrap();
        let f_cfl: f64 = params.with_default("Hydro.f_cfl", 0.75).unwrap();
        assert_eq!(max_iter, 100);
        assert_eq!(output_dt, 0.0);
        assert_eq!(f_cfl, 0.75);

        let driver = params.used_in_section("Driver");
        assert_eq!(driver.len(), 2);
        assert_eq!(driver[0].name, "Driver.max_iter");
        assert!(driver[0].changed);
        assert!(!driver[1].changed);
        // set explicitly, but to the default value
        assert!(!params.used_in_section("Hydro")[0].changed);
    }

    #[test]
    fn test_missing_and_mistyped_parameters() {
        let mut params = sample();
        assert!(matches!(
            params.required::<f64>("Grid.dx"),
            Err(ConfigurationError::Missing { .. })
        ));
        assert!(matches!(
            params.required::<usize>("Driver.tmax"),
            Err(ConfigurationError::InvalidType { .. })
        ));
        assert!(matches!(
            params.with_default::<f64>("Hydro.bogus", 1.0),
            Err(ConfigurationError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_repeated_lookup_returns_same_value() {
        let mut params = sample();
        let first: f64 = params.required("Driver.tmax").unwrap();
        let second: f64 = params.required("Driver.tmax").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unused_parameters_are_reported() {
        let mut params = sample();
        let _: f64 = params.required("Driver.tmax").unwrap();
        let _: usize = params.required("Driver.max_iter").unwrap();
        let _: usize = params.required("Grid.nx").unwrap();
        let _: f64 = params.required("Grid.xmin").unwrap();
        let _: f64 = params.required("Grid.xmax").unwrap();
        let _: f64 = params.required("Hydro.f_cfl").unwrap();
        let unused = params.unused();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].0, "Hydro.bogus");
    }

    #[test]
    fn test_section_report() {
        let mut params = sample();
        let _: f64 = params.required("Driver.tmax").unwrap();
        let _: f64 = params.with_default("Driver.output_dt", 0.0).unwrap();
        let report = params.section_report("Driver");
        assert_eq!(report[0], "[ Driver ]");
        assert_eq!(report[1], "   output_dt : 0.0");
        assert_eq!(report[2], "   tmax      : 2.5   (CHANGED)");
    }

    #[test]
    fn test_non_object_sections_are_rejected() {
        assert!(Parameters::from_value(json!([1, 2])).is_err());
        assert!(Parameters::from_value(json!({ "Driver": 3 })).is_err());
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "Driver": { "tmax": 1.0 } }"#).unwrap();
        let mut params = Parameters::parse(&path).unwrap();
        assert_eq!(params.config_file.as_deref(), Some(path.as_path()));
        let tmax: f64 = params.required("Driver.tmax").unwrap();
        assert_eq!(tmax, 1.0);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Parameters::parse(&path),
            Err(ConfigurationError::Malformed { .. })
        ));
        assert!(matches!(
            Parameters::parse(dir.path().join("absent.json")),
            Err(ConfigurationError::Unreadable { .. })
        ));
    }
}
