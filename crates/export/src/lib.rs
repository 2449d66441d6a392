//! Export helpers for CSV and JSON sizing artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod design {
    use std::io::Write;

    use serde::Serialize;
    use sizing_solver::{BatchReport, DesignPoint, SizingError, Topology};

    use crate::ExportError;

    /// Flat row describing one topology's outcome, success or failure.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct DesignRecord {
        pub topology: String,
        pub status: String,
        pub feasible: bool,
        pub best: bool,
        pub mtow_kg: Option<f64>,
        pub wing_loading_n_m2: Option<f64>,
        pub power_loading_w_n: Option<f64>,
        pub wing_area_m2: Option<f64>,
        pub wingspan_m: Option<f64>,
        pub chord_m: Option<f64>,
        pub hover_power_w: Option<f64>,
        pub cruise_power_w: Option<f64>,
        pub installed_power_w: Option<f64>,
        pub required_energy_wh: Option<f64>,
        pub usable_energy_wh: Option<f64>,
        pub margin_percent: Option<f64>,
        pub endurance_s: Option<f64>,
        pub range_m: Option<f64>,
        pub battery_mass_kg: Option<f64>,
        pub battery_capped: Option<bool>,
        pub structure_kg: Option<f64>,
        pub wing_kg: Option<f64>,
        pub propulsion_kg: Option<f64>,
        pub rotor_diameter_m: Option<f64>,
        pub reynolds_number: Option<f64>,
        pub mach_number: Option<f64>,
        pub binding_constraint: Option<String>,
        /// Semicolon-separated so the CSV stays one field per column.
        pub active_constraints: Option<String>,
        pub iterations: Option<usize>,
        pub message: Option<String>,
    }

    impl DesignRecord {
        pub fn from_design(design: &DesignPoint) -> Self {
            let breakdown = &design.mass_breakdown;
            Self {
                topology: design.topology.name().to_string(),
                status: "converged".to_string(),
                feasible: design.feasible,
                best: false,
                mtow_kg: Some(design.mtow_kg),
                wing_loading_n_m2: Some(design.wing_loading_n_m2),
                power_loading_w_n: Some(design.power_loading_w_n),
                wing_area_m2: Some(design.wing_area_m2),
                wingspan_m: Some(design.wingspan_m),
                chord_m: Some(design.chord_m),
                hover_power_w: design.hover_power_w,
                cruise_power_w: design.cruise_power_w,
                installed_power_w: Some(design.installed_power_w),
                required_energy_wh: Some(design.required_energy_wh),
                usable_energy_wh: Some(design.usable_energy_wh),
                margin_percent: Some(design.margin_percent),
                endurance_s: Some(design.endurance_s),
                range_m: Some(design.range_m),
                battery_mass_kg: Some(design.battery_mass_kg),
                battery_capped: Some(design.battery_capped),
                structure_kg: Some(breakdown.structure_kg),
                wing_kg: Some(breakdown.wing_kg),
                propulsion_kg: Some(breakdown.propulsion_kg),
                rotor_diameter_m: design.rotor_diameter_m,
                reynolds_number: design.reynolds_number,
                mach_number: design.mach_number,
                binding_constraint: Some(design.binding_constraint.clone()),
                active_constraints: Some(design.active_constraints.join(";")),
                iterations: Some(design.iterations),
                message: None,
            }
        }

        pub fn from_error(topology: Topology, error: &SizingError) -> Self {
            Self {
                topology: topology.name().to_string(),
                status: error.kind().name().to_string(),
                feasible: false,
                best: false,
                mtow_kg: None,
                wing_loading_n_m2: None,
                power_loading_w_n: None,
                wing_area_m2: None,
                wingspan_m: None,
                chord_m: None,
                hover_power_w: None,
                cruise_power_w: None,
                installed_power_w: None,
                required_energy_wh: None,
                usable_energy_wh: None,
                margin_percent: None,
                endurance_s: None,
                range_m: None,
                battery_mass_kg: None,
                battery_capped: None,
                structure_kg: None,
                wing_kg: None,
                propulsion_kg: None,
                rotor_diameter_m: None,
                reynolds_number: None,
                mach_number: None,
                binding_constraint: None,
                active_constraints: None,
                iterations: None,
                message: Some(error.to_string()),
            }
        }

        pub fn from_result(topology: Topology, result: &Result<DesignPoint, SizingError>) -> Self {
            match result {
                Ok(design) => Self::from_design(design),
                Err(error) => Self::from_error(topology, error),
            }
        }
    }

    /// One record per topology, in topology order, with the winner flagged.
    pub fn records(report: &BatchReport) -> Vec<DesignRecord> {
        report
            .results
            .iter()
            .map(|(topology, result)| {
                let mut record = DesignRecord::from_result(*topology, result);
                record.best = report.best == Some(*topology);
                record
            })
            .collect()
    }

    pub fn write_csv<W: Write>(writer: W, records: &[DesignRecord]) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        for record in records {
            csv.serialize(record)?;
        }
        csv.flush()?;
        Ok(())
    }

    #[derive(Debug, Serialize)]
    struct BatchSummary<'a> {
        study: &'a str,
        comparison: &'a str,
        best: Option<&'a str>,
        designs: &'a [DesignRecord],
    }

    /// Pretty-printed JSON document for one study's batch.
    pub fn write_json<W: Write>(
        writer: W,
        study: &str,
        report: &BatchReport,
    ) -> Result<(), ExportError> {
        let designs = records(report);
        let summary = BatchSummary {
            study,
            comparison: report.comparison.name(),
            best: report.best.map(Topology::name),
            designs: &designs,
        };
        serde_json::to_writer_pretty(writer, &summary)?;
        Ok(())
    }
}

pub mod chart {
    use std::io::Write;

    use serde::Serialize;
    use sizing_solver::matching::ChartSample;

    use crate::ExportError;

    #[derive(Debug, Serialize)]
    struct SampleRow {
        wing_loading_n_m2: f64,
        required_power_loading_w_n: f64,
        power_loading_ceiling_w_n: Option<f64>,
        feasible: bool,
    }

    /// Matching-chart envelope samples as CSV, for plotting elsewhere.
    pub fn write_samples<W: Write>(writer: W, samples: &[ChartSample]) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        for sample in samples {
            csv.serialize(SampleRow {
                wing_loading_n_m2: sample.wing_loading_n_m2,
                required_power_loading_w_n: sample.required_power_loading_w_n,
                power_loading_ceiling_w_n: sample.power_loading_ceiling_w_n,
                feasible: sample.feasible,
            })?;
        }
        csv.flush()?;
        Ok(())
    }
}

pub mod sweep {
    use std::io::Write;

    use serde::Serialize;
    use sizing_solver::{SweepParameter, SweepSample};

    use crate::ExportError;

    /// Compact row per sweep sample.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct SweepRecord {
        pub parameter: String,
        pub value: f64,
        pub status: String,
        pub feasible: bool,
        pub mtow_kg: Option<f64>,
        pub battery_mass_kg: Option<f64>,
        pub installed_power_w: Option<f64>,
        pub wing_area_m2: Option<f64>,
        pub margin_percent: Option<f64>,
        pub endurance_s: Option<f64>,
        pub binding_constraint: Option<String>,
        pub message: Option<String>,
    }

    impl SweepRecord {
        pub fn from_sample(parameter: SweepParameter, sample: &SweepSample) -> Self {
            let mut record = Self {
                parameter: parameter.name().to_string(),
                value: sample.value,
                status: String::new(),
                feasible: false,
                mtow_kg: None,
                battery_mass_kg: None,
                installed_power_w: None,
                wing_area_m2: None,
                margin_percent: None,
                endurance_s: None,
                binding_constraint: None,
                message: None,
            };
            match &sample.result {
                Ok(design) => {
                    record.status = "converged".to_string();
                    record.feasible = design.feasible;
                    record.mtow_kg = Some(design.mtow_kg);
                    record.battery_mass_kg = Some(design.battery_mass_kg);
                    record.installed_power_w = Some(design.installed_power_w);
                    record.wing_area_m2 = Some(design.wing_area_m2);
                    record.margin_percent = Some(design.margin_percent);
                    record.endurance_s = Some(design.endurance_s);
                    record.binding_constraint = Some(design.binding_constraint.clone());
                }
                Err(error) => {
                    record.status = error.kind().name().to_string();
                    record.message = Some(error.to_string());
                }
            }
            record
        }
    }

    pub fn write_csv<W: Write>(
        writer: W,
        parameter: SweepParameter,
        samples: &[SweepSample],
    ) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        for sample in samples {
            csv.serialize(SweepRecord::from_sample(parameter, sample))?;
        }
        csv.flush()?;
        Ok(())
    }
}
