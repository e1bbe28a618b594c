use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::info;
use serde::Serialize;

use crate::settings::Settings;
use crate::spectrum::{Spectrum, Summary};

/// File name of the TE spectrum table.
pub const SPECTRUM_FILE: &str = "spectrum_te";
/// File name of the JSON run summary.
pub const SUMMARY_FILE: &str = "summary.json";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::EnergyGrid;
    use crate::material::Material;
    use crate::stack::{Stack, StackPlan};

    fn spectrum() -> Spectrum {
        let stack = Stack::builder(Material::Substrate)
            .layer(Material::SiliconNitride, 45.1)
            .build(Material::Air)
            .unwrap();
        let plan = StackPlan::new(&stack, 0.0).unwrap();
        let grid = EnergyGrid {
            start: 3.0,
            stop: 3.0035,
            step: 0.001,
        };
        Spectrum::compute(&plan, &grid).unwrap()
    }

    #[test]
    fn spectrum_table_has_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let spectrum = spectrum();
        let path = write_spectrum(&spectrum, dir.path()).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let rows: Vec<Vec<f64>> = text
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(|l| l.split_whitespace().map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), spectrum.len());
        assert_eq!(rows[0][2], 0.0);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), 4);
            assert!((row[0] - spectrum.energies[i]).abs() < 1e-6);
            assert!((row[2] - spectrum.reflectivity[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn summary_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let summary = spectrum().summary().unwrap();
        let path = write_summary(&settings, &summary, dir.path()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["summary"]["samples"], 3);
        assert_eq!(value["settings"]["mirror_periods"], 8);
    }
}

#[derive(Serialize)]
struct Report<'a> {
    settings: &'a Settings,
    summary: &'a Summary,
}

/// Writes `energy wavelength R T` rows for every sample of the spectrum.
pub fn write_spectrum(spectrum: &Spectrum, directory: &Path) -> Result<PathBuf> {
    fs::create_dir_all(directory)
        .with_context(|| format!("failed to create output directory {:?}", directory))?;
    let path = directory.join(SPECTRUM_FILE);
    let file = File::create(&path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# energy_eV wavelength_nm reflectivity transmittance")?;
    for i in 0..spectrum.len() {
        let p = spectrum.point(i);
        writeln!(
            writer,
            "{:.6} {:.6} {:.9e} {:.9e}",
            p.energy, p.wavelength, p.reflectivity, p.transmittance
        )?;
    }
    writer.flush()?;

    info!("Wrote {} samples to {:?}", spectrum.len(), path);
    Ok(path)
}

/// Writes the settings and spectrum summary as pretty JSON.
pub fn write_summary(settings: &Settings, summary: &Summary, directory: &Path) -> Result<PathBuf> {
    fs::create_dir_all(directory)
        .with_context(|| format!("failed to create output directory {:?}", directory))?;
    let path = directory.join(SUMMARY_FILE);
    let file = File::create(&path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &Report { settings, summary })?;
    writer.flush()?;

    info!("Wrote summary to {:?}", path);
    Ok(path)
}

/// Writes every output file for a finished run into `settings.directory`.
pub fn writeup(settings: &Settings, spectrum: &Spectrum) -> Result<()> {
    write_spectrum(spectrum, &settings.directory)?;
    let summary = spectrum
        .summary()
        .ok_or_else(|| anyhow!("no evaluated samples to summarise"))?;
    info!(
        "Peak R = {:.4} at {:.3} eV, dip R = {:.4} at {:.3} eV",
        summary.peak.reflectivity,
        summary.peak.energy,
        summary.dip.reflectivity,
        summary.dip.energy
    );
    write_summary(settings, &summary, &settings.directory)?;
    Ok(())
}
