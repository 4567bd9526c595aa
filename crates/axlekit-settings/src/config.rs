//! Configuration Management
//!
//! Planner configuration with machine, search and machine-code sections plus
//! the axle catalog. Files are read and written as TOML or JSON depending on
//! the extension. The shell edits the configuration through [`Config::set_var`].

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use axlekit_core::{AxleType, Catalog, Length, MachineParameters, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Setting keys accepted by [`Config::set_var`], with a description and an example value
pub const SETTING_KEYS: &[(&str, &str, &str)] = &[
    ("matLen", "material (bar) length in mm", "2800"),
    ("matDia", "material diameter in mm", "20"),
    ("cutLen", "cutting width in mm", "5"),
    ("wasteThreshold", "leftovers shorter than this many mm are scrap", "1000"),
    ("maxWasteLen", "longest scrap block chopped in one cycle, in mm", "50"),
    ("hThreshold", "remaining pieces handed to the sequence search, 0 = bulk only", "500"),
    ("restarts", "number of search restarts", "10"),
    ("seed", "search seed, \"none\" for a random seed", "42"),
    ("maxSweeps", "sweep limit per restart, \"none\" for unlimited", "none"),
    ("parallel", "\"1\" to search on all cores, \"0\" for one thread", "1"),
    ("genMachCode", "\"1\" to write a machine code file, \"0\" otherwise", "1"),
    ("outDir", "directory for machine code files", "."),
    ("axTypes", "axle types as NAME=AMOUNTxLENGTH joined with _", "A=1000x512_B=400x123_C=50x709"),
];

/// Stock and saw settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Raw bar length in mm
    pub bar_length: Length,
    /// Bar diameter in mm
    pub diameter: Length,
    /// Material lost per cut in mm
    pub cut_width: Length,
    /// Leftovers below this length are scrap, in mm
    pub waste_discard_threshold: Length,
}

impl Default for MachineSettings {
    fn default() -> Self {
        let params = MachineParameters::default();
        Self {
            bar_length: params.bar_length,
            diameter: params.diameter,
            cut_width: params.cut_width,
            waste_discard_threshold: params.waste_discard_threshold,
        }
    }
}

/// Bulk allocation and sequence search settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Remaining pieces at which bulk allocation stops
    pub heuristic_threshold: Quantity,
    /// Search restarts
    pub restarts: usize,
    /// Fixed search seed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Sweep limit per restart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sweeps: Option<usize>,
    /// Use the rayon pool
    pub parallel: bool,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            heuristic_threshold: 0,
            restarts: 10,
            seed: None,
            max_sweeps: None,
            parallel: true,
        }
    }
}

/// Machine code output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineCodeSettings {
    /// Write a program file after each run
    pub enabled: bool,
    /// Longest scrap block removed by one parting cycle, in mm
    pub max_waste_cut_length: Length,
    /// Where program files go
    pub output_dir: PathBuf,
}

impl Default for MachineCodeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_waste_cut_length: 50,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub machine: MachineSettings,
    pub planner: PlannerSettings,
    pub machine_code: MachineCodeSettings,
    pub catalog: Catalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            machine: MachineSettings::default(),
            planner: PlannerSettings::default(),
            machine_code: MachineCodeSettings::default(),
            catalog: Catalog::new(vec![AxleType::new("A", 100, 10)]),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating the parent directory
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// Whether every piece fits a bar is left to the planner, so that
    /// bar length and catalog can be changed one at a time.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.machine.bar_length == 0 {
            return Err(out_of_range("matLen", self.machine.bar_length));
        }

        if self.planner.restarts == 0 {
            return Err(out_of_range("restarts", self.planner.restarts));
        }

        // TOML integers are signed
        if let Some(seed) = self.planner.seed.filter(|&s| s > i64::MAX as u64) {
            return Err(out_of_range("seed", seed));
        }

        if self.machine_code.max_waste_cut_length == 0 {
            return Err(out_of_range(
                "maxWasteLen",
                self.machine_code.max_waste_cut_length,
            ));
        }

        self.catalog.validate()?;
        Ok(())
    }

    /// Machine parameters for a planning run
    pub fn machine_parameters(&self) -> MachineParameters {
        MachineParameters::new(self.machine.bar_length, self.machine.cut_width)
            .with_diameter(self.machine.diameter)
            .with_waste_discard_threshold(self.machine.waste_discard_threshold)
            .with_heuristic_threshold(self.planner.heuristic_threshold)
    }

    /// Update one setting by its shell key (case-insensitive)
    ///
    /// The configuration is left untouched when the value does not parse
    /// or the result does not validate.
    pub fn set_var(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        let mut next = self.clone();
        next.apply(key, value.trim())?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        match key.to_ascii_lowercase().as_str() {
            "matlen" => self.machine.bar_length = parse_number(key, value)?,
            "matdia" => self.machine.diameter = parse_number(key, value)?,
            "cutlen" => self.machine.cut_width = parse_number(key, value)?,
            "wastethreshold" => self.machine.waste_discard_threshold = parse_number(key, value)?,
            "maxwastelen" => self.machine_code.max_waste_cut_length = parse_number(key, value)?,
            "hthreshold" => self.planner.heuristic_threshold = parse_number(key, value)?,
            "restarts" => self.planner.restarts = parse_number(key, value)?,
            "seed" => self.planner.seed = parse_optional(key, value)?,
            "maxsweeps" => self.planner.max_sweeps = parse_optional(key, value)?,
            "parallel" => self.planner.parallel = parse_switch(key, value)?,
            "genmachcode" => self.machine_code.enabled = parse_switch(key, value)?,
            "outdir" => {
                if value.is_empty() {
                    return Err(SettingsError::invalid(key, "directory must not be empty"));
                }
                self.machine_code.output_dir = PathBuf::from(value);
            }
            "axtypes" => self.catalog = parse_catalog(value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string()).into()),
        }
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<String> = self.catalog.iter().map(ToString::to_string).collect();
        let seed = self
            .planner
            .seed
            .map_or_else(|| "random".to_string(), |s| s.to_string());
        let sweeps = self
            .planner
            .max_sweeps
            .map_or_else(|| "unlimited".to_string(), |s| s.to_string());

        writeln!(f, "Current settings:")?;
        writeln!(f, "Axle types:           {}", types.join(", "))?;
        writeln!(f, "Material length:      {}mm", self.machine.bar_length)?;
        writeln!(f, "Material diameter:    {}mm", self.machine.diameter)?;
        writeln!(f, "Cutting width:        {}mm", self.machine.cut_width)?;
        writeln!(f, "Waste threshold:      {}mm", self.machine.waste_discard_threshold)?;
        writeln!(f, "Max waste length:     {}mm", self.machine_code.max_waste_cut_length)?;
        writeln!(f, "hThreshold:           {}", self.planner.heuristic_threshold)?;
        writeln!(f, "Restarts:             {}", self.planner.restarts)?;
        writeln!(f, "Seed:                 {}", seed)?;
        writeln!(f, "Max sweeps:           {}", sweeps)?;
        writeln!(f, "Parallel search:      {}", self.planner.parallel)?;
        writeln!(f, "Output machine code:  {}", self.machine_code.enabled)?;
        write!(f, "Output directory:     {}", self.machine_code.output_dir.display())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

fn out_of_range(key: &str, value: impl Display) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T>(key: &str, value: &str) -> SettingsResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| SettingsError::invalid(key, format!("'{}' is not a valid number ({})", value, e)))
}

fn parse_optional<T>(key: &str, value: &str) -> SettingsResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match value.to_ascii_lowercase().as_str() {
        "none" | "random" | "unlimited" => Ok(None),
        _ => parse_number(key, value).map(Some),
    }
}

fn parse_switch(key: &str, value: &str) -> SettingsResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => Err(SettingsError::invalid(key, format!("expected 1 or 0, got '{}'", value))),
    }
}

/// Parse `NAME=AMOUNTxLENGTH` entries joined with `_`
pub fn parse_catalog(text: &str) -> ConfigResult<Catalog> {
    let types = text
        .split('_')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_axle_type)
        .collect::<ConfigResult<Vec<_>>>()?;

    let catalog = Catalog::new(types);
    catalog.validate()?;
    Ok(catalog)
}

fn parse_axle_type(entry: &str) -> ConfigResult<AxleType> {
    let malformed = || ConfigError::MalformedAxleType(entry.to_string());

    let (name, definition) = entry.split_once('=').ok_or_else(malformed)?;
    let (amount, length) = definition.split_once(['x', 'X']).ok_or_else(malformed)?;
    let demand: Quantity = amount.trim().parse().map_err(|_| malformed())?;
    let unit_length: Length = length.trim().parse().map_err(|_| malformed())?;

    Ok(AxleType::new(name.trim(), unit_length, demand))
}

/// Inverse of [`parse_catalog`]
pub fn format_catalog(catalog: &Catalog) -> String {
    catalog
        .iter()
        .map(|t| format!("{}={}x{}", t.name, t.demand, t.unit_length))
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.machine.bar_length, 2800);
        assert_eq!(config.machine.diameter, 20);
        assert_eq!(config.machine.cut_width, 5);
        assert_eq!(config.machine_code.max_waste_cut_length, 50);
        assert_eq!(config.planner.heuristic_threshold, 0);
        assert!(config.machine_code.enabled);
        assert_eq!(format_catalog(&config.catalog), "A=10x100");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_set_var_keys_are_case_insensitive() {
        let mut config = Config::default();
        config.set_var("matLen", "3000").unwrap();
        config.set_var("MATDIA", "25").unwrap();
        config.set_var("cutlen", "3").unwrap();
        config.set_var("hThreshold", "40").unwrap();
        config.set_var("genMachCode", "0").unwrap();
        config.set_var("seed", "42").unwrap();

        assert_eq!(config.machine.bar_length, 3000);
        assert_eq!(config.machine.diameter, 25);
        assert_eq!(config.machine.cut_width, 3);
        assert_eq!(config.planner.heuristic_threshold, 40);
        assert!(!config.machine_code.enabled);
        assert_eq!(config.planner.seed, Some(42));

        config.set_var("seed", "none").unwrap();
        assert_eq!(config.planner.seed, None);
    }

    #[test]
    fn test_failed_set_leaves_config_unchanged() {
        let mut config = Config::default();
        let before = config.clone();

        assert!(config.set_var("matLen", "abc").is_err());
        assert!(config.set_var("matLen", "0").is_err());
        assert!(config.set_var("restarts", "0").is_err());
        assert!(config.set_var("genMachCode", "maybe").is_err());
        assert!(config.set_var("axTypes", "A=10x100_A=5x50").is_err());
        assert!(matches!(
            config.set_var("colour", "blue"),
            Err(SettingsError::Config(ConfigError::UnknownKey(_)))
        ));

        assert_eq!(config, before);
    }

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog("A=1000x512_B=400x123_C=50X709").unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(0), Some(&AxleType::new("A", 512, 1000)));
        assert_eq!(catalog.get(2), Some(&AxleType::new("C", 709, 50)));
        assert_eq!(format_catalog(&catalog), "A=1000x512_B=400x123_C=50x709");
    }

    #[test]
    fn test_parse_catalog_rejects_garbage() {
        assert!(matches!(
            parse_catalog("A=1000"),
            Err(ConfigError::MalformedAxleType(_))
        ));
        assert!(matches!(
            parse_catalog("A1000x5"),
            Err(ConfigError::MalformedAxleType(_))
        ));
        assert!(matches!(parse_catalog(""), Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn test_machine_parameters() {
        let mut config = Config::default();
        config.set_var("wasteThreshold", "600").unwrap();
        config.set_var("hThreshold", "12").unwrap();

        let params = config.machine_parameters();
        assert_eq!(params.bar_length, 2800);
        assert_eq!(params.waste_discard_threshold, 600);
        assert_eq!(params.heuristic_threshold, 12);
    }

    #[test]
    fn test_display_lists_catalog() {
        let text = Config::default().to_string();
        assert!(text.starts_with("Current settings:"));
        assert!(text.contains("A=10x100mm"));
        assert!(text.contains("Material length:      2800mm"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Config::default()
            .save_to_file(Path::new("settings.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(_))
        ));
    }
}
