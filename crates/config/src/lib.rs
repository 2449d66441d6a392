//! Configuration models and loaders for sizing studies.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// One sizing study: a mission, the vehicle technology assumptions and the topologies to size.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StudyConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "all_topologies")]
    pub topologies: Vec<TopologyConfig>,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    pub propulsion: PropulsionConfig,
    pub battery: BatteryConfig,
    pub mission: MissionConfig,
    pub aero: AeroConfig,
    #[serde(default)]
    pub rotor: RotorConfig,
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TopologyConfig {
    Rotorcraft,
    FixedWing,
    HybridVtol,
}

fn all_topologies() -> Vec<TopologyConfig> {
    vec![
        TopologyConfig::Rotorcraft,
        TopologyConfig::FixedWing,
        TopologyConfig::HybridVtol,
    ]
}

/// How the best topology is picked from a batch.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonConfig {
    #[default]
    MaxMargin,
    MinMass,
    MinInstalledPower,
}

/// Atmosphere and gravity; defaults describe the Martian surface.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub density_kg_m3: f64,
    pub gravity_m_s2: f64,
    pub dynamic_viscosity_pa_s: f64,
    pub speed_of_sound_m_s: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            density_kg_m3: 0.020,
            gravity_m_s2: 3.711,
            dynamic_viscosity_pa_s: 1.08e-5,
            speed_of_sound_m_s: 240.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PropulsionConfig {
    pub motor_efficiency: f64,
    pub esc_efficiency: f64,
    pub propeller_efficiency_cruise: f64,
    pub figure_of_merit_hover: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BatteryConfig {
    pub specific_energy_wh_per_kg: f64,
    pub depth_of_discharge: f64,
    pub round_trip_efficiency: f64,
    pub reserve_fraction: f64,
}

/// Mission target; exactly one of `required_endurance_s` and `range_m` must be set.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct MissionConfig {
    pub payload_mass_kg: f64,
    pub cruise_speed_m_s: f64,
    #[serde(default)]
    pub required_endurance_s: Option<f64>,
    #[serde(default)]
    pub range_m: Option<f64>,
    #[serde(default = "default_hover_segment_s")]
    pub hover_segment_s: f64,
}

fn default_hover_segment_s() -> f64 {
    120.0
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicyConfig {
    #[default]
    MaxWingLoading,
    MinPowerLoading,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct AeroConfig {
    pub cl_max: f64,
    pub aspect_ratio: f64,
    #[serde(default = "default_stall_margin_factor")]
    pub stall_margin_factor: f64,
    /// Defaults to cruise speed over the stall margin factor.
    #[serde(default)]
    pub stall_speed_m_s: Option<f64>,
    #[serde(default = "default_cd0")]
    pub cd0: f64,
    #[serde(default = "default_oswald_efficiency")]
    pub oswald_efficiency: f64,
    #[serde(default)]
    pub target_reynolds: Option<f64>,
    #[serde(default)]
    pub structural_max_wing_loading_n_m2: Option<f64>,
    #[serde(default = "default_climb_rate_m_s")]
    pub climb_rate_m_s: f64,
    #[serde(default)]
    pub max_power_loading_w_n: Option<f64>,
    #[serde(default = "default_safety_power_margin")]
    pub safety_power_margin: f64,
    #[serde(default)]
    pub selection_policy: SelectionPolicyConfig,
}

fn default_stall_margin_factor() -> f64 {
    1.2
}

fn default_cd0() -> f64 {
    0.035
}

fn default_oswald_efficiency() -> f64 {
    0.8
}

fn default_climb_rate_m_s() -> f64 {
    0.5
}

fn default_safety_power_margin() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RotorConfig {
    pub rotor_count: u32,
    pub disk_loading_n_m2: f64,
}

impl Default for RotorConfig {
    fn default() -> Self {
        Self {
            rotor_count: 4,
            disk_loading_n_m2: 30.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WeightsConfig {
    pub structural_fraction: f64,
    pub wing_areal_density_kg_m2: f64,
    pub propulsion_specific_power_w_per_kg: f64,
    pub avionics_mass_kg: f64,
    pub energy_margin: f64,
    pub max_battery_fraction: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            structural_fraction: 0.25,
            wing_areal_density_kg_m2: 0.8,
            propulsion_specific_power_w_per_kg: 3_000.0,
            avionics_mass_kg: 0.5,
            energy_margin: 0.1,
            max_battery_fraction: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    pub mass_seed_kg: Option<f64>,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub damping: f64,
    pub mass_ceiling_kg: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mass_seed_kg: None,
            tolerance: 1e-4,
            max_iterations: 100,
            damping: 1.0,
            mass_ceiling_kg: None,
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no studies found in {0}")]
    Empty(PathBuf),
    #[error("study '{0}' not found")]
    NotFound(String),
    #[error("study '{0}' must set exactly one of mission.required_endurance_s and mission.range_m")]
    MissionTarget(String),
    #[error("study '{0}' lists no topologies")]
    NoTopologies(String),
}

impl StudyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.mission.required_endurance_s, self.mission.range_m) {
            (Some(_), None) | (None, Some(_)) => {}
            _ => return Err(ConfigError::MissionTarget(self.name.clone())),
        }
        if self.topologies.is_empty() {
            return Err(ConfigError::NoTopologies(self.name.clone()));
        }
        Ok(())
    }
}

/// Load and validate every study in a YAML list, a TOML file, or a directory of TOML files.
pub fn load_studies<P: AsRef<Path>>(path: P) -> Result<Vec<StudyConfig>, ConfigError> {
    let path = path.as_ref();
    let studies: Vec<StudyConfig> = load_records(path)?;
    for study in &studies {
        study.validate()?;
    }
    debug!("loaded {} studies from {}", studies.len(), path.display());
    Ok(studies)
}

/// Load one study, by name when several share a file.
pub fn load_study<P: AsRef<Path>>(
    path: P,
    requested: Option<&str>,
) -> Result<StudyConfig, ConfigError> {
    let path = path.as_ref();
    let studies = load_studies(path)?;
    select_study(studies, requested).map_err(|err| match err {
        ConfigError::Empty(_) => ConfigError::Empty(path.to_path_buf()),
        other => other,
    })
}

/// Pick a study by case-insensitive name, defaulting to the first one.
pub fn select_study(
    studies: Vec<StudyConfig>,
    requested: Option<&str>,
) -> Result<StudyConfig, ConfigError> {
    match requested {
        Some(name) => studies
            .into_iter()
            .find(|study| study.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::NotFound(name.to_string())),
        None => studies
            .into_iter()
            .next()
            .ok_or_else(|| ConfigError::Empty(PathBuf::new())),
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
- name: nominal
  propulsion:
    motor_efficiency: 0.9
    esc_efficiency: 0.95
    propeller_efficiency_cruise: 0.8
    figure_of_merit_hover: 0.65
  battery:
    specific_energy_wh_per_kg: 270
    depth_of_discharge: 0.8
    round_trip_efficiency: 0.95
    reserve_fraction: 0.2
  mission:
    payload_mass_kg: 2.0
    cruise_speed_m_s: 40.0
    required_endurance_s: 3600
  aero:
    cl_max: 1.2
    aspect_ratio: 6.0
    stall_speed_m_s: 29.2
- name: scout
  topologies: [fixed_wing]
  comparison: min_mass
  propulsion:
    motor_efficiency: 0.9
    esc_efficiency: 0.95
    propeller_efficiency_cruise: 0.8
    figure_of_merit_hover: 0.65
  battery:
    specific_energy_wh_per_kg: 300
    depth_of_discharge: 0.8
    round_trip_efficiency: 0.95
    reserve_fraction: 0.2
  mission:
    payload_mass_kg: 1.0
    cruise_speed_m_s: 45.0
    range_m: 100000
  aero:
    cl_max: 1.3
    aspect_ratio: 8.0
    selection_policy: min_power_loading
"#;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn yaml_list_applies_defaults() {
        let file = write_temp(".yaml", YAML);
        let studies = load_studies(file.path()).unwrap();
        assert_eq!(studies.len(), 2);

        let nominal = &studies[0];
        assert_eq!(nominal.topologies.len(), 3);
        assert_eq!(nominal.comparison, ComparisonConfig::MaxMargin);
        assert_eq!(nominal.environment, EnvironmentConfig::default());
        assert_eq!(nominal.mission.hover_segment_s, 120.0);
        assert_eq!(nominal.aero.cd0, 0.035);
        assert_eq!(nominal.aero.stall_margin_factor, 1.2);
        assert_eq!(nominal.rotor.rotor_count, 4);
        assert_eq!(nominal.solver.max_iterations, 100);

        let scout = select_study(studies, Some("SCOUT")).unwrap();
        assert_eq!(scout.topologies, vec![TopologyConfig::FixedWing]);
        assert_eq!(scout.comparison, ComparisonConfig::MinMass);
        assert_eq!(scout.mission.range_m, Some(100_000.0));
        assert_eq!(
            scout.aero.selection_policy,
            SelectionPolicyConfig::MinPowerLoading
        );
    }

    #[test]
    fn toml_file_is_a_single_study() {
        let file = write_temp(
            ".toml",
            r#"
name = "toml-study"
topologies = ["hybrid_vtol"]

[propulsion]
motor_efficiency = 0.9
esc_efficiency = 0.95
propeller_efficiency_cruise = 0.8
figure_of_merit_hover = 0.65

[battery]
specific_energy_wh_per_kg = 270.0
depth_of_discharge = 0.8
round_trip_efficiency = 0.95
reserve_fraction = 0.2

[mission]
payload_mass_kg = 2.0
cruise_speed_m_s = 40.0
required_endurance_s = 1800.0
hover_segment_s = 90.0

[aero]
cl_max = 1.2
aspect_ratio = 6.0

[rotor]
rotor_count = 6

[solver]
damping = 0.5
"#,
        );
        let study = load_study(file.path(), None).unwrap();
        assert_eq!(study.name, "toml-study");
        assert_eq!(study.topologies, vec![TopologyConfig::HybridVtol]);
        assert_eq!(study.mission.hover_segment_s, 90.0);
        assert_eq!(study.rotor.rotor_count, 6);
        assert_eq!(study.rotor.disk_loading_n_m2, 30.0);
        assert_eq!(study.solver.damping, 0.5);
        assert_eq!(study.solver.tolerance, 1e-4);
    }

    #[test]
    fn mission_needs_exactly_one_target() {
        let both = YAML.replacen(
            "required_endurance_s: 3600",
            "required_endurance_s: 3600\n    range_m: 5000",
            1,
        );
        let file = write_temp(".yaml", &both);
        assert!(matches!(
            load_studies(file.path()),
            Err(ConfigError::MissionTarget(name)) if name == "nominal"
        ));

        let neither = YAML.replacen("required_endurance_s: 3600", "", 1);
        let file = write_temp(".yml", &neither);
        assert!(matches!(
            load_studies(file.path()),
            Err(ConfigError::MissionTarget(_))
        ));
    }

    #[test]
    fn unknown_study_name_is_reported() {
        let file = write_temp(".yaml", YAML);
        assert!(matches!(
            load_study(file.path(), Some("glider")),
            Err(ConfigError::NotFound(name)) if name == "glider"
        ));
        let empty = write_temp(".yaml", "[]");
        assert!(matches!(
            load_study(empty.path(), None),
            Err(ConfigError::Empty(_))
        ));
    }
}
