use anyhow::{Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use crate::config::AnalysisOptions;
use crate::engine::{analyzer, extractor};
use crate::error::{ErrorCode, SightError};
use crate::loader;
use crate::models::analysis::{AnalysisResult, ExtractResult};
use crate::models::component::ComponentRecord;

// ---------------------------------------------------------------------------
// AppService: entry point shared by every CLI command
// ---------------------------------------------------------------------------

pub struct AppService {
    options: AnalysisOptions,
}

impl Default for AppService {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

impl AppService {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    // -----------------------------------------------------------------------
    // Validation helpers
    // -----------------------------------------------------------------------

    fn to_utf8(path: std::path::PathBuf) -> Result<Utf8PathBuf> {
        Utf8PathBuf::from_path_buf(path).map_err(|p| {
            SightError::invalid_request(format!("Path is not valid UTF-8: {}", p.display())).into()
        })
    }

    /// Validate and canonicalize a file path.
    fn validate_path(&self, path: &str) -> Result<Utf8PathBuf> {
        let canonical = std::fs::canonicalize(path).map_err(|_| {
            warn!(path = path, "validate_path: file not found");
            SightError::file_not_found(path)
        })?;
        if !canonical.is_file() {
            bail!(SightError::invalid_request(format!("Not a file: {path}")));
        }
        Self::to_utf8(canonical)
    }

    /// Validate and canonicalize a directory path.
    fn validate_dir(&self, dir: &str) -> Result<Utf8PathBuf> {
        let canonical = std::fs::canonicalize(dir).map_err(|_| {
            SightError::new(ErrorCode::FileNotFound, format!("Directory not found: {dir}"))
        })?;
        if !canonical.is_dir() {
            bail!(SightError::invalid_request(format!("Not a directory: {dir}")));
        }
        Self::to_utf8(canonical)
    }

    fn read(&self, path: &Utf8Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| {
            SightError::new(ErrorCode::IoError, format!("Failed to read {path}: {e}")).into()
        })
    }

    // -----------------------------------------------------------------------
    // Analysis
    // -----------------------------------------------------------------------

    /// Analyze every component of the Angular project at `dir`.
    pub fn analyze_dir(&self, dir: &str) -> Result<AnalysisResult> {
        let dir = self.validate_dir(dir)?;
        let records = loader::load_project(&dir)?;
        info!(dir = %dir, components = records.len(), "project loaded");
        self.analyze_records(&records)
    }

    /// Analyze the components listed in a JSON manifest.
    pub fn analyze_manifest(&self, path: &str) -> Result<AnalysisResult> {
        let path = self.validate_path(path)?;
        let records = loader::load_manifest(&path)?;
        debug!(path = %path, components = records.len(), "manifest loaded");
        self.analyze_records(&records)
    }

    pub fn analyze_records(&self, records: &[ComponentRecord]) -> Result<AnalysisResult> {
        analyzer::analyze(records, &self.options)
    }

    // -----------------------------------------------------------------------
    // Extraction
    // -----------------------------------------------------------------------

    /// Raw instances of a single template with optional stylesheets.
    pub fn extract(
        &self,
        template: &str,
        styles: &[String],
        name: Option<&str>,
    ) -> Result<ExtractResult> {
        let template_path = self.validate_path(template)?;
        let markup = self.read(&template_path)?;

        let mut sheets = Vec::with_capacity(styles.len());
        for style in styles {
            let path = self.validate_path(style)?;
            sheets.push(self.read(&path)?);
        }

        let component = match name {
            Some(name) => name.to_string(),
            None => template_path
                .file_name()
                .and_then(|f| f.split('.').next())
                .unwrap_or("Component")
                .to_string(),
        };

        let record = ComponentRecord::new(component.clone(), markup, sheets);
        record.validate()?;
        let instances = extractor::extract(&record, self.options.chunk_size);
        Ok(ExtractResult {
            component,
            instances,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_directory_is_file_not_found() {
        let err = AppService::default()
            .analyze_dir("/definitely/not/here")
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SightError>().unwrap().code,
            ErrorCode::FileNotFound
        );
    }

    #[test]
    fn file_given_as_directory_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = AppService::default()
            .analyze_dir(file.path().to_str().unwrap())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SightError>().unwrap().code,
            ErrorCode::InvalidRequest
        );
    }

    #[test]
    fn extract_names_component_after_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("nav-bar.component.html");
        let sheet = dir.path().join("nav-bar.component.css");
        fs::write(&template, r#"<nav><button class="link" (click)="home()">Home</button></nav>"#).unwrap();
        fs::write(&sheet, ".link { color: blue }").unwrap();

        let result = AppService::default()
            .extract(
                template.to_str().unwrap(),
                &[sheet.to_str().unwrap().to_string()],
                None,
            )
            .unwrap();
        assert_eq!(result.component, "nav-bar");
        assert_eq!(result.instances.len(), 2);
        assert_eq!(result.instances[0].associated_styles()[".link"], "color: blue");
    }
}
