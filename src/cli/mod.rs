/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command Line Interface (CLI) module
//!
//! `geometry` prints the Rowland circle positions of a design, `acceptance`
//! runs an acceptance sweep and stores it as a SPEC file. Designs and
//! sweeps are read from JSON documents.

use crate::dtheta::SweepConfig;
use crate::io::write_acceptance_scans;
use crate::rowland::{BenderMechanism, RowlandCircle, RowlandConfig};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use serde::de::DeserializeOwned;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Rowland circle spectrometer design tool
#[derive(Debug, Parser)]
#[command(name = "rowland-rs")]
#[command(version)]
#[command(about = "Geometry and acceptance of Rowland circle spectrometers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print distances, energy, positions and pivots of a design
    Geometry(GeometryArgs),

    /// Sweep diffractor cases over Bragg angles and write a SPEC file
    Acceptance(AcceptanceArgs),
}

#[derive(Debug, Args)]
pub struct GeometryArgs {
    /// Rowland circle design (JSON); defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bragg angle overriding the design (deg)
    #[arg(short, long)]
    pub theta: Option<f64>,

    /// Analysers on each side of the central one
    #[arg(short, long, default_value_t = 0)]
    pub analysers: i32,
}

#[derive(Debug, Args)]
pub struct AcceptanceArgs {
    /// Sweep description (JSON); defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output SPEC file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Geometry(args) => {
            let config = match &args.config {
                Some(path) => load_json(path)?,
                None => RowlandConfig::default(),
            };
            print!("{}", geometry_report(config, args.theta, args.analysers)?);
        }
        Commands::Acceptance(args) => {
            let config: SweepConfig = match &args.config {
                Some(path) => load_json(path)?,
                None => SweepConfig::default(),
            };
            let report = config.run().context("acceptance sweep failed")?;
            for failure in &report.failures {
                warn!(
                    "{} at {} deg skipped: {}",
                    failure.case, failure.theta, failure.error
                );
            }
            let n = write_acceptance_scans(&args.output, &report.series, &config.mesh)
                .with_context(|| format!("cannot write {}", args.output.display()))?;
            println!(
                "{} scans written to {} ({} points skipped)",
                n,
                args.output.display(),
                report.failures.len()
            );
        }
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Text report of a design at its (or the given) Bragg angle
pub fn geometry_report(config: RowlandConfig, theta: Option<f64>, analysers: i32) -> Result<String> {
    let bender = BenderMechanism::from_config(&config);
    let mut rc = RowlandCircle::new(config).context("invalid Rowland circle design")?;
    if let Some(theta) = theta {
        rc.set_theta0(theta)?;
    }

    let mut out = String::new();
    let s = rc.summary();
    writeln!(out, "theta0 = {:.4} deg, alpha = {:.4} deg", s.theta0, s.alpha)?;
    writeln!(out, "d = {:.6} A, E = {:.3} eV", s.d_spacing, s.energy)?;
    writeln!(out, "Rm = {:.3} mm, p = {:.3} mm, q = {:.3} mm, Rs = {:.3} mm", s.rm, s.p, s.q, s.rs)?;

    let det = rc.get_det_pos();
    writeln!(out, "detector = {}", det)?;
    writeln!(out, "analyser = {}", rc.get_ana_pos(0.0)?)?;
    let miscut = rc.get_miscut_off();
    writeln!(
        out,
        "miscut offset = ({:.4}, {:.4}) mm{}",
        miscut.horizontal,
        miscut.vertical,
        if miscut.exceeds_half_width {
            " exceeds half width"
        } else {
            ""
        }
    )?;

    if analysers > 0 {
        writeln!(
            out,
            "{:>3} {:>10} {:>11} {:>11} {:>11}",
            "n", "chi", "aXoff", "SagOff", "SagOff0"
        )?;
        for n in 0..=analysers {
            let pivot = rc.get_pivot(n)?;
            writeln!(
                out,
                "{:>3} {:>10.5} {:>11.5} {:>11.5} {:>11.5}",
                n, pivot.chi, pivot.axoff, pivot.sagoff, pivot.sagoff_ideal
            )?;
        }
        if let Some(bender) = bender {
            let solution = bender.solve(&rc, analysers)?;
            writeln!(
                out,
                "bender B = ({:.5}, {:.5}) mm, dc = {:.5} mm, actuator = {:.5} mm",
                solution.anchor.axoff, solution.anchor.sagoff, solution.dc, solution.actuator_position
            )?;
        }
    }
    Ok(out)
}
