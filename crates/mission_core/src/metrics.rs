//! Mission results derived from the collected projection.
//!
//! `aggregate` samples the projection for summary results. No state
//! mutation. The CSV helpers below write one row per period.

use crate::{CollectedDebris, Material, MissionParameters, MissionResults};
use std::collections::BTreeMap;
use std::io::Write;

/// Current CSV schema version. Bump when columns are added/removed/reordered.
const METRICS_VERSION: u32 = 1;

/// Summarize `projection` as of `current_period`.
pub fn aggregate(
    projection: &[CollectedDebris],
    params: &MissionParameters,
    current_period: u32,
) -> MissionResults {
    let mut total_mass = 0.0;
    let mut total_value = 0.0;
    let mut threat_sum = 0.0;
    let mut material_breakdown: BTreeMap<Material, f64> = BTreeMap::new();

    for collected in projection {
        total_mass += collected.recovered_mass;
        total_value += collected.debris.value;
        threat_sum += collected.debris.threat_level;
        *material_breakdown
            .entry(collected.debris.material)
            .or_insert(0.0) += collected.recovered_mass;
    }

    let total_cost = params.cost_per_period() * f64::from(current_period);
    let risk_reduced = if params.num_debris == 0 {
        0.0
    } else {
        threat_sum / f64::from(params.num_debris) * 100.0
    };

    MissionResults {
        total_collected: u32::try_from(projection.len()).unwrap_or(u32::MAX),
        total_mass,
        total_value,
        total_cost,
        profit: total_value - total_cost,
        risk_reduced,
        material_breakdown,
    }
}

/// Write the CSV header row for per-period metrics.
pub fn write_metrics_header(writer: &mut impl Write) -> std::io::Result<()> {
    write!(
        writer,
        "period,metrics_version,\
         total_collected,total_mass_kg,total_value,total_cost,profit,risk_reduced_pct"
    )?;
    for material in Material::ALL {
        write!(writer, ",{}_kg", material_column(material))?;
    }
    writeln!(writer)
}

/// Append the results for `period` as a CSV row.
pub fn append_metrics_row(
    writer: &mut impl Write,
    period: u32,
    results: &MissionResults,
) -> std::io::Result<()> {
    write!(
        writer,
        "{},{},{},{},{},{},{},{}",
        period,
        METRICS_VERSION,
        results.total_collected,
        results.total_mass,
        results.total_value,
        results.total_cost,
        results.profit,
        results.risk_reduced,
    )?;
    for material in Material::ALL {
        let kg = results
            .material_breakdown
            .get(&material)
            .copied()
            .unwrap_or(0.0);
        write!(writer, ",{kg}")?;
    }
    writeln!(writer)
}

fn material_column(material: Material) -> &'static str {
    match material {
        Material::Aluminum => "aluminum",
        Material::Titanium => "titanium",
        Material::Steel => "steel",
        Material::Copper => "copper",
        Material::CarbonFiber => "carbon_fiber",
    }
}

/// Maximum data rows per CSV file before rotating to a new file.
const MAX_ROWS_PER_FILE: usize = 50_000;

/// Rotating metrics CSV writer. Splits into numbered files
/// (`metrics_000.csv`, `metrics_001.csv`, ...) after [`MAX_ROWS_PER_FILE`] rows each.
pub struct MetricsFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    max_rows_per_file: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    /// Create a new writer, opening the first CSV file with a header row.
    pub fn new(run_dir: std::path::PathBuf) -> std::io::Result<Self> {
        Self::with_max_rows(run_dir, MAX_ROWS_PER_FILE)
    }

    fn with_max_rows(
        run_dir: std::path::PathBuf,
        max_rows_per_file: usize,
    ) -> std::io::Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            max_rows_per_file,
            writer,
        })
    }

    /// Append one row, rotating to a new file if the current one is full.
    pub fn write_row(&mut self, period: u32, results: &MissionResults) -> std::io::Result<()> {
        if self.rows_in_current_file >= self.max_rows_per_file {
            self.writer.flush()?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        append_metrics_row(&mut self.writer, period, results)?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(
    run_dir: &std::path::Path,
    index: u32,
) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    let file = std::fs::File::create(run_dir.join(format!("metrics_{index:03}.csv")))?;
    let mut writer = std::io::BufWriter::new(file);
    write_metrics_header(&mut writer)?;
    Ok(writer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DebrisId, DebrisObject};

    fn collected(id: usize, material: Material, mass: f64, threat: f64) -> CollectedDebris {
        let debris = DebrisObject {
            id: DebrisId::from_ordinal(id),
            altitude: 500.0,
            mass,
            material,
            distance: 2000.0,
            threat_level: threat,
            accessibility: 0.5,
            value: mass * material.unit_price() * 0.5,
            priority: 0.0,
        };
        CollectedDebris {
            recovered_mass: mass * 0.5,
            collection_period: 1,
            debris,
        }
    }

    fn params() -> MissionParameters {
        MissionParameters {
            num_debris: 4,
            collection_efficiency: 0.5,
            cost_per_mission: 1_000.0,
            mission_duration: 10,
            ..MissionParameters::default()
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_empty_projection_all_zeros() {
        let results = aggregate(&[], &params(), 0);
        assert_eq!(results.total_collected, 0);
        assert_eq!(results.total_mass, 0.0);
        assert_eq!(results.total_value, 0.0);
        assert_eq!(results.total_cost, 0.0);
        assert_eq!(results.profit, 0.0);
        assert_eq!(results.risk_reduced, 0.0);
        assert!(results.material_breakdown.is_empty());
    }

    #[test]
    fn test_totals_and_breakdown() {
        let projection = vec![
            collected(0, Material::Steel, 100.0, 0.5),
            collected(1, Material::Steel, 200.0, 0.25),
            collected(2, Material::Copper, 400.0, 0.25),
        ];
        let results = aggregate(&projection, &params(), 3);

        assert_eq!(results.total_collected, 3);
        assert!((results.total_mass - 350.0).abs() < 1e-9);
        let expected_value = 300.0 * 30_000.0 * 0.5 + 400.0 * 80_000.0 * 0.5;
        assert!((results.total_value - expected_value).abs() < 1e-6);
        assert!((results.total_cost - 300.0).abs() < 1e-9);
        assert!((results.profit - (expected_value - 300.0)).abs() < 1e-6);
        // (0.5 + 0.25 + 0.25) / 4 debris
        assert!((results.risk_reduced - 25.0).abs() < 1e-9);
        assert!((results.material_breakdown[&Material::Steel] - 150.0).abs() < 1e-9);
        assert!((results.material_breakdown[&Material::Copper] - 200.0).abs() < 1e-9);
        assert!(!results.material_breakdown.contains_key(&Material::Titanium));
    }

    #[test]
    fn test_profit_can_be_negative() {
        let mut p = params();
        p.cost_per_mission = 1e12;
        let results = aggregate(&[collected(0, Material::Steel, 50.0, 0.1)], &p, 5);
        assert!(results.profit < 0.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_zero_debris_risk_is_zero() {
        let mut p = params();
        p.num_debris = 0;
        let results = aggregate(&[], &p, 4);
        assert_eq!(results.risk_reduced, 0.0);
    }

    #[test]
    fn test_aggregate_is_pure() {
        let projection = vec![
            collected(0, Material::Titanium, 321.0, 0.9),
            collected(1, Material::CarbonFiber, 77.0, 0.3),
        ];
        let a = aggregate(&projection, &params(), 2);
        let b = aggregate(&projection, &params(), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_csv_header_and_row_have_same_column_count() {
        let mut buf = Vec::new();
        write_metrics_header(&mut buf).unwrap();
        let projection = vec![collected(0, Material::Aluminum, 100.0, 0.5)];
        append_metrics_row(&mut buf, 1, &aggregate(&projection, &params(), 1)).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].split(',').count(),
            lines[1].split(',').count(),
            "header and row column counts differ"
        );
        assert!(lines[0].ends_with("carbon_fiber_kg"));
        assert!(lines[1].starts_with("1,1,1,"));
    }

    #[test]
    fn test_file_writer_creates_first_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = MetricsFileWriter::new(dir.path().to_path_buf()).unwrap();
        writer.write_row(1, &MissionResults::default()).unwrap();
        writer.write_row(2, &MissionResults::default()).unwrap();
        writer.flush().unwrap();

        let text = std::fs::read_to_string(dir.path().join("metrics_000.csv")).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_file_writer_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = MetricsFileWriter::with_max_rows(dir.path().to_path_buf(), 2).unwrap();
        for period in 1..=5 {
            writer.write_row(period, &MissionResults::default()).unwrap();
        }
        writer.flush().unwrap();

        let rows = |name: &str| {
            std::fs::read_to_string(dir.path().join(name))
                .unwrap()
                .lines()
                .count()
        };
        assert_eq!(rows("metrics_000.csv"), 3);
        assert_eq!(rows("metrics_001.csv"), 3);
        assert_eq!(rows("metrics_002.csv"), 2);
        assert!(!dir.path().join("metrics_003.csv").exists());

        let last = std::fs::read_to_string(dir.path().join("metrics_002.csv")).unwrap();
        assert!(last.lines().nth(1).unwrap().starts_with("5,"));
    }
}
