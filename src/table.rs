//! Tabular interface to the ingestion and output collaborators.
//!
//! Records come in as a CSV whose headers match the `SampleRecord` field
//! names. The Aggregated Cell table goes out as CSV, and the full report
//! (windows, yearly series, pass-through configuration) as JSON.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::stability::StabilityWindow;
use crate::analysis::yearly::YearlyStatistic;
use crate::logging::{self, Stage};
use crate::model::{AggregatedCell, SampleRecord};
use crate::pipeline::{BaselineReport, PopulationAnalysis};

/// File name of the Aggregated Cell table inside the output directory.
pub const CELLS_FILE: &str = "aggregated_cells.csv";

/// File name of the JSON report inside the output directory.
pub const REPORT_FILE: &str = "baseline_report.json";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from reading records or writing results.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("cannot open {path}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A row could not be read or deserialized into a record, or a cell
    /// could not be written.
    #[error("CSV error in {path}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("cannot create {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot serialize report to {path}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Reads sample records from a CSV file with a header row.
pub fn read_records(path: &Path) -> Result<Vec<SampleRecord>, TableError> {
    let file = File::open(path).map_err(|e| TableError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let records = rdr
        .deserialize()
        .collect::<Result<Vec<SampleRecord>, csv::Error>>()
        .map_err(|e| TableError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    logging::info(
        Stage::Table,
        None,
        &format!("read {} record(s) from {}", records.len(), path.display()),
    );
    Ok(records)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Writes the Aggregated Cell table as CSV, in the order given.
pub fn write_cells(path: &Path, cells: &[AggregatedCell]) -> Result<(), TableError> {
    let csv_err = |e| TableError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for cell in cells {
        wtr.serialize(cell).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| TableError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Window outcome as it appears in the report: either the window or the
/// reason there is none.
#[derive(Debug, Serialize)]
struct WindowArtifact {
    window: Option<StabilityWindow>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct PopulationArtifact<'a> {
    yearly: &'a [YearlyStatistic],
    #[serde(flatten)]
    window: WindowArtifact,
}

impl<'a> From<&'a PopulationAnalysis> for PopulationArtifact<'a> {
    fn from(analysis: &'a PopulationAnalysis) -> Self {
        let window = match &analysis.window {
            Ok(w) => WindowArtifact {
                window: Some(*w),
                error: None,
            },
            Err(e) => WindowArtifact {
                window: None,
                error: Some(e.to_string()),
            },
        };
        PopulationArtifact {
            yearly: &analysis.yearly,
            window,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportArtifact<'a> {
    parameter: &'static str,
    unit: &'a str,
    test_years: &'a [i32],
    reference_years: &'a [i32],
    group_counts: BTreeMap<&'static str, usize>,
    cell_count: usize,
    full_surface: PopulationArtifact<'a>,
    selected_taxa: PopulationArtifact<'a>,
}

/// Writes the report (without the cell table) as pretty-printed JSON.
pub fn write_report(path: &Path, report: &BaselineReport) -> Result<(), TableError> {
    let artifact = ReportArtifact {
        parameter: report.parameter.label(),
        unit: &report.unit,
        test_years: &report.test_years,
        reference_years: &report.reference_years,
        group_counts: report
            .group_counts
            .iter()
            .map(|(group, count)| (group.label(), *count))
            .collect(),
        cell_count: report.cells.len(),
        full_surface: PopulationArtifact::from(&report.full),
        selected_taxa: PopulationArtifact::from(&report.selected),
    };

    let json = serde_json::to_string_pretty(&artifact).map_err(|e| TableError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| TableError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Creates `dir` if needed and writes both output files into it.
pub fn write_outputs(dir: &Path, report: &BaselineReport) -> Result<(), TableError> {
    fs::create_dir_all(dir).map_err(|e| TableError::Create {
        path: dir.to_path_buf(),
        source: e,
    })?;
    write_cells(&dir.join(CELLS_FILE), &report.cells)?;
    write_report(&dir.join(REPORT_FILE), report)?;
    logging::info(
        Stage::Table,
        None,
        &format!("wrote {} cell(s) and report to {}", report.cells.len(), dir.display()),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellTaxa, TaxonGroup, TrophicType};
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str =
        "year,station,date,phylum,class,order,family,genus,species,trophic_type,depth_min,parameter,value,unit";

    #[test]
    fn test_read_records_deserializes_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "{}", HEADER).unwrap();
        writeln!(
            f,
            "2014,BY15 GOTLANDSDJ,2014-07-08,Cyanobacteria,Cyanophyceae,Nostocales,Aphanizomenonaceae,Aphanizomenon,Aphanizomenon flosaquae,AU,0,Biovolume concentration,0.031,mm3/l"
        )
        .unwrap();
        writeln!(
            f,
            "2014,BY15 GOTLANDSDJ,2014-07-08,Ciliophora,,,,Mesodinium,Mesodinium rubrum,MX,0,Biovolume concentration,0.002,mm3/l"
        )
        .unwrap();
        drop(f);

        let records = read_records(&path).expect("fixture should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].station, "BY15 GOTLANDSDJ");
        assert_eq!(records[0].month(), 7);
        assert_eq!(records[0].trophic_type, TrophicType::Autotrophic);
        assert_eq!(records[1].class, "");
        assert_eq!(records[1].species, "Mesodinium rubrum");
        assert!(records[1].is_surface());
    }

    #[test]
    fn test_read_records_reports_bad_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.csv");
        fs::write(
            &path,
            format!("{}\nnot-a-year,S,2014-07-08,,,,,,,AU,0,Abundance,1,ind/l\n", HEADER),
        )
        .unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, TableError::Csv { .. }), "got {:?}", err);
    }

    #[test]
    fn test_missing_input_is_open_error() {
        let err = read_records(Path::new("/nonexistent/records.csv")).unwrap_err();
        assert!(matches!(err, TableError::Open { .. }));
    }

    #[test]
    fn test_write_cells_emits_labels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CELLS_FILE);
        let cells = vec![
            AggregatedCell {
                station: "B1".to_string(),
                date: NaiveDate::from_ymd_opt(2011, 3, 2).unwrap(),
                year: 2011,
                month: 3,
                taxa: CellTaxa::Group(TaxonGroup::MesodiniumRubrum),
                biomass: 1.5,
            },
            AggregatedCell {
                station: "B1".to_string(),
                date: NaiveDate::from_ymd_opt(2011, 3, 2).unwrap(),
                year: 2011,
                month: 3,
                taxa: CellTaxa::Selected,
                biomass: 1.5,
            },
        ];
        write_cells(&path, &cells).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "station,date,year,month,taxa,biomass");
        assert_eq!(lines[1], "B1,2011-03-02,2011,3,Mesodinium rubrum,1.5");
        assert_eq!(lines[2], "B1,2011-03-02,2011,3,Selected,1.5");
    }
}
