/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Minimal SPEC data files
//!
//! A file holds one header block (`#F`, `#E`, `#D`, `#C`, `#O0`) followed
//! by scan blocks (`#S`, `#D`, `#P0`, `#C`, `#N`, `#L` and data rows).
//! Names on `#O0`/`#L` lines and positions on `#P0` lines are separated by
//! two spaces; data values by one, with seven decimals.

use super::errors::{Result, SpecError};
use crate::dtheta::{AcceptanceSeries, MeshConfig};
use log::{debug, info};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Motors recorded for every acceptance scan
pub const ACCEPTANCE_MOTORS: [&str; 7] = [
    "case", "r1p", "mask", "cryst_x", "cryst_z", "wrc", "csteps",
];

/// Columns of an acceptance scan
pub const ACCEPTANCE_COLUMNS: [&str; 3] = ["thetaB", "sa", "eres"];

/// File header block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecHeader {
    /// Unix time; the current time when `None`
    pub epoch: Option<u64>,
    /// Free-form date; the epoch is repeated when `None`
    pub date: Option<String>,
    pub title: String,
    pub motor_names: Vec<String>,
    pub comments: Vec<String>,
}

impl SpecHeader {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn with_motors<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.motor_names = names.iter().map(|n| n.as_ref().to_string()).collect();
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comments.push(comment.to_string());
        self
    }
}

/// One scan block
#[derive(Debug, Clone, PartialEq)]
pub struct SpecScan {
    /// Scan number, assigned by the writer
    pub number: usize,
    pub title: String,
    pub date: Option<String>,
    pub motor_positions: Vec<f64>,
    pub comments: Vec<String>,
    pub labels: Vec<String>,
    /// Data, one vector per label
    pub columns: Vec<Vec<f64>>,
}

impl SpecScan {
    /// Scan with labelled columns of equal length
    pub fn new<S: AsRef<str>>(title: &str, labels: &[S], columns: Vec<Vec<f64>>) -> Result<Self> {
        if labels.len() != columns.len() {
            return Err(SpecError::ColumnMismatch(format!(
                "{} labels for {} columns",
                labels.len(),
                columns.len()
            )));
        }
        if let Some(first) = columns.first() {
            if columns.iter().any(|c| c.len() != first.len()) {
                return Err(SpecError::ColumnMismatch(
                    "columns have different lengths".to_string(),
                ));
            }
        }
        Ok(Self {
            number: 0,
            title: title.to_string(),
            date: None,
            motor_positions: Vec::new(),
            comments: Vec::new(),
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            columns,
        })
    }

    pub fn with_motor_positions(mut self, positions: Vec<f64>) -> Self {
        self.motor_positions = positions;
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comments.push(comment.to_string());
        self
    }

    /// Number of data rows
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Data column by label
    pub fn column(&self, label: &str) -> Option<&[f64]> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.columns[i].as_slice())
    }
}

/// Appends scans to a SPEC file, keeping the scan numbering
#[derive(Debug)]
pub struct SpecWriter {
    path: PathBuf,
    next_scan: usize,
}

impl SpecWriter {
    /// Create (or overwrite) a file and write its header
    pub fn create<P: AsRef<Path>>(path: P, header: &SpecHeader) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut out = BufWriter::new(File::create(&path)?);
        let epoch = header.epoch.unwrap_or_else(now);
        writeln!(out, "#F {}", path.display())?;
        writeln!(out, "#E {}", epoch)?;
        match &header.date {
            Some(date) => writeln!(out, "#D {}", date)?,
            None => writeln!(out, "#D {}", epoch)?,
        }
        writeln!(out, "#C {}", header.title)?;
        if !header.motor_names.is_empty() {
            writeln!(out, "{}", joined("#O0 ", &header.motor_names))?;
        }
        for comment in &header.comments {
            writeln!(out, "#C {}", comment)?;
        }
        writeln!(out)?;
        out.flush()?;
        debug!("SPEC header written to {}", path.display());
        Ok(Self { path, next_scan: 1 })
    }

    /// Continue an existing file; numbering resumes after its last scan
    ///
    /// A missing file is created by the first scan, without header.
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let next_scan = if path.is_file() {
            let text = fs::read_to_string(&path)?;
            text.lines().filter(|l| l.starts_with("#S ")).count() + 1
        } else {
            1
        };
        Ok(Self { path, next_scan })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number the next scan will get
    pub fn next_scan(&self) -> usize {
        self.next_scan
    }

    /// Append a scan and return the number it was given
    pub fn write_scan(&mut self, scan: &SpecScan) -> Result<usize> {
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut out = BufWriter::new(file);
        let number = self.next_scan;
        writeln!(out, "#S {} {}", number, scan.title)?;
        match &scan.date {
            Some(date) => writeln!(out, "#D {}", date)?,
            None => writeln!(out, "#D {}", now())?,
        }
        if !scan.motor_positions.is_empty() {
            let positions: Vec<String> = scan.motor_positions.iter().map(f64::to_string).collect();
            writeln!(out, "{}", joined("#P0 ", &positions))?;
        }
        for comment in &scan.comments {
            writeln!(out, "#C {}", comment)?;
        }
        writeln!(out, "#N {}", scan.labels.len())?;
        writeln!(out, "{}", joined("#L ", &scan.labels))?;
        for row in 0..scan.rows() {
            let values: Vec<String> = scan
                .columns
                .iter()
                .map(|column| format!("{:.7}", column[row]))
                .collect();
            writeln!(out, "{}", values.join(" "))?;
        }
        writeln!(out)?;
        out.flush()?;
        self.next_scan += 1;
        debug!("scan #{} '{}' written ({} rows)", number, scan.title, scan.rows());
        Ok(number)
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn joined<S: AsRef<str>>(tag: &str, items: &[S]) -> String {
    let mut parts = vec![tag];
    parts.extend(items.iter().map(|s| s.as_ref()));
    parts.join("  ")
}

/// Names or positions after a control tag, separated by two spaces
fn split_fields(rest: &str) -> Vec<String> {
    rest.split("  ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parsed SPEC file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecFile {
    pub header: SpecHeader,
    pub scans: Vec<SpecScan>,
}

impl SpecFile {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut file = SpecFile::default();
        let mut title_seen = false;
        let mut expected_columns: Option<usize> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            let parse_error = |reason: String| SpecError::Parse {
                line: line_no,
                reason,
            };

            if let Some(rest) = line.strip_prefix("#S ") {
                let rest = rest.trim();
                let (number, title) = rest.split_once(' ').unwrap_or((rest, ""));
                let number = number
                    .parse::<usize>()
                    .map_err(|e| parse_error(format!("bad scan number '{}': {}", number, e)))?;
                file.scans.push(SpecScan {
                    number,
                    title: title.trim().to_string(),
                    date: None,
                    motor_positions: Vec::new(),
                    comments: Vec::new(),
                    labels: Vec::new(),
                    columns: Vec::new(),
                });
                expected_columns = None;
                continue;
            }

            match file.scans.last_mut() {
                None => {
                    if let Some(rest) = line.strip_prefix("#E ") {
                        let epoch = rest.trim().parse::<u64>().map_err(|e| {
                            parse_error(format!("bad epoch '{}': {}", rest.trim(), e))
                        })?;
                        file.header.epoch = Some(epoch);
                    } else if let Some(rest) = line.strip_prefix("#D ") {
                        file.header.date = Some(rest.trim().to_string());
                    } else if let Some(rest) = line.strip_prefix("#C ") {
                        if title_seen {
                            file.header.comments.push(rest.trim().to_string());
                        } else {
                            file.header.title = rest.trim().to_string();
                            title_seen = true;
                        }
                    } else if line.starts_with("#O") {
                        let rest = line.split_once(' ').map_or("", |(_, r)| r);
                        file.header.motor_names.extend(split_fields(rest));
                    }
                    // #F and unknown header lines carry nothing we keep
                }
                Some(scan) => {
                    if let Some(rest) = line.strip_prefix("#D ") {
                        scan.date = Some(rest.trim().to_string());
                    } else if line.starts_with("#P") {
                        let rest = line.split_once(' ').map_or("", |(_, r)| r);
                        for field in split_fields(rest) {
                            let value = field.parse::<f64>().map_err(|e| {
                                parse_error(format!("bad motor position '{}': {}", field, e))
                            })?;
                            scan.motor_positions.push(value);
                        }
                    } else if let Some(rest) = line.strip_prefix("#C ") {
                        scan.comments.push(rest.trim().to_string());
                    } else if let Some(rest) = line.strip_prefix("#N ") {
                        let n = rest.trim().parse::<usize>().map_err(|e| {
                            parse_error(format!("bad column count '{}': {}", rest.trim(), e))
                        })?;
                        expected_columns = Some(n);
                    } else if let Some(rest) = line.strip_prefix("#L ") {
                        scan.labels = split_fields(rest);
                        if let Some(n) = expected_columns {
                            if n != scan.labels.len() {
                                return Err(SpecError::ColumnMismatch(format!(
                                    "scan {}: #N {} but {} labels",
                                    scan.number,
                                    n,
                                    scan.labels.len()
                                )));
                            }
                        }
                        scan.columns = vec![Vec::new(); scan.labels.len()];
                    } else if line.starts_with('#') {
                        // other control lines are not used
                    } else {
                        let values = line
                            .split_whitespace()
                            .map(str::parse::<f64>)
                            .collect::<std::result::Result<Vec<_>, _>>()
                            .map_err(|e| parse_error(format!("bad data value: {}", e)))?;
                        if values.len() != scan.columns.len() {
                            return Err(parse_error(format!(
                                "{} values for {} columns",
                                values.len(),
                                scan.columns.len()
                            )));
                        }
                        for (column, value) in scan.columns.iter_mut().zip(values) {
                            column.push(value);
                        }
                    }
                }
            }
        }
        Ok(file)
    }

    pub fn scan(&self, number: usize) -> Option<&SpecScan> {
        self.scans.iter().find(|s| s.number == number)
    }

    /// Position of a header motor in a scan
    pub fn motor_position(&self, scan: &SpecScan, motor: &str) -> Option<f64> {
        self.header
            .motor_names
            .iter()
            .position(|m| m == motor)
            .and_then(|i| scan.motor_positions.get(i).copied())
    }
}

/// Write one acceptance scan per case to a new SPEC file
///
/// Motors follow [`ACCEPTANCE_MOTORS`]; the recorded `wrc` is the smallest
/// width of the series. Returns the number of scans written.
pub fn write_acceptance_scans<P: AsRef<Path>>(
    path: P,
    series: &[AcceptanceSeries],
    mesh: &MeshConfig,
) -> Result<usize> {
    let header = SpecHeader::new("scan data from rowland-rs acceptance sweep")
        .with_motors(&ACCEPTANCE_MOTORS);
    let mut writer = SpecWriter::create(path, &header)?;
    for s in series {
        let wrc = s.wrc.iter().copied().fold(f64::INFINITY, f64::min);
        let motors = vec![
            f64::from(s.case.code()),
            mesh.rm,
            f64::from(mesh.shape.code()),
            mesh.half_width,
            mesh.half_height,
            if wrc.is_finite() { wrc } else { 0.0 },
            mesh.resolution as f64,
        ];
        let scan = SpecScan::new(
            s.case.label(),
            &ACCEPTANCE_COLUMNS,
            vec![
                s.theta.clone(),
                s.solid_angle.clone(),
                s.energy_resolution.clone(),
            ],
        )?
        .with_motor_positions(motors);
        writer.write_scan(&scan)?;
    }
    info!(
        "{} acceptance scans written to {}",
        series.len(),
        writer.path().display()
    );
    Ok(series.len())
}
