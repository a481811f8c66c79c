//! End-to-end reconciliation run

use crate::config::{resolve_path, ReconcileConfig};
use crate::error::{KmlError, Result};
use crate::reconcile::{
    extract_extended_fields, extract_schema_field_names, find_placemarks, insert_name, load,
    select_folder, serialize_document, synthesize_name,
};
use crate::tabular::{write_tabular, TabularOutcome};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Placemarks that received a name
    pub placemarks: usize,
    /// Columns in the CSV header
    pub columns: Vec<String>,
    /// Where the fixed KML was written
    pub kml_path: PathBuf,
    /// Where the CSV was (or would have been) written
    pub csv_path: PathBuf,
    /// Result of the CSV export; a failed export does not fail the run
    pub csv: TabularOutcome,
}

/// Fix a KML file and export its placemark data
///
/// Writes `<output_dir>/<input file name>` with a `<name>` inserted into
/// every placemark, then `<output_dir>/<input stem>.csv` with one row per
/// placemark.
///
/// # Errors
///
/// Aborts with [`KmlError::InputNotFound`] for a missing input file,
/// [`KmlError::Xml`]/[`KmlError::Parse`] for malformed KML,
/// [`KmlError::Structure`] for a missing schema or folder and
/// [`KmlError::MissingField`] for a placemark without the name field.
/// The KML file may already be written when a later step fails; a CSV
/// failure is reported in the returned [`ReconcileReport`] instead.
pub fn run(config: &ReconcileConfig) -> Result<ReconcileReport> {
    let input = resolve_path(&config.input_path)?;
    if !input.is_file() {
        error!("Specified KML file does not exist: {}", input.display());
        return Err(KmlError::InputNotFound(input));
    }
    let file_name = input
        .file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| KmlError::InputNotFound(input.clone()))?;

    let output_dir = resolve_path(&config.output_dir)?;
    ensure_directory(&output_dir)?;

    if let Some(start_with) = config.start_with {
        debug!(start_with, "start-with has no effect on KML reconciliation");
    }

    info!("Loading file {}", input.display());
    let mut doc = load(&input)?;

    let columns = extract_schema_field_names(&doc)?;
    debug!("Schema field names: {columns:?}");

    let folder = select_folder(&doc)?;
    info!(
        "Found Folder named {}",
        folder.name(&doc).unwrap_or_default()
    );

    let placemarks = find_placemarks(&doc);
    info!("Folder contains {} Placemarks", placemarks.len());

    let mut rows = Vec::with_capacity(placemarks.len());
    for (index, &placemark) in placemarks.iter().enumerate() {
        let fields = extract_extended_fields(&doc, placemark);
        let name = synthesize_name(&fields, &config.name_field)
            .map_err(|source| KmlError::MissingField { index, source })?;
        insert_name(&mut doc, placemark, &name);
        rows.push(fields);
    }

    let kml_path = output_dir.join(&file_name);
    info!("Saving data to KML file: {}", kml_path.display());
    fs::write(&kml_path, serialize_document(&doc)?)?;

    let csv_path = kml_path.with_extension("csv");
    info!("Saving field data to CSV file: {}", csv_path.display());
    let csv = write_tabular(&csv_path, &columns, &rows);

    info!("Processing complete");
    Ok(ReconcileReport {
        placemarks: rows.len(),
        columns,
        kml_path,
        csv_path,
        csv,
    })
}

/// Create `dir` and any missing parents
fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(KmlError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("output path exists but is not a directory: {}", dir.display()),
        )));
    }
    if !dir.exists() {
        debug!("Creating output path: {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
