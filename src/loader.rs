//! Component discovery for Angular projects.
//!
//! A component is a `*.component.ts` file containing `@Component`. Its template
//! comes from the sibling `.component.html` or, failing that, an inline
//! backtick `template:`; its styles from sibling `.scss` and `.css` files.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::{ErrorCode, SightError};
use crate::models::component::{ComponentRecord, parse_records};

const COMPONENT_SUFFIX: &str = ".component.ts";
const STYLE_EXTENSIONS: [&str; 2] = ["scss", "css"];
const PROJECT_MARKERS: [&str; 2] = ["package.json", "angular.json"];

static CLASS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+(?:default\s+)?class\s+(\w+)").unwrap());

static INLINE_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\btemplate\s*:\s*`([^`]*)`").unwrap());

static DECORATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)@Component\s*\(\s*\{(.*?)\}\s*\)").unwrap());

/// String-valued decorator properties kept as metadata.
static METADATA_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(selector|templateUrl)\s*:\s*(?:'([^']*)'|"([^"]*)")"#).unwrap()
});

/// Project markers that are missing from `dir`.
pub fn missing_markers(dir: &Utf8Path) -> Vec<&'static str> {
    PROJECT_MARKERS
        .into_iter()
        .filter(|marker| !dir.join(marker).is_file())
        .collect()
}

/// Every component source file under `dir`, sorted by path.
pub fn discover(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut builder = WalkBuilder::new(dir);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .filter_entry(|entry| entry.file_name() != "node_modules");

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            continue;
        };
        if !path.as_str().ends_with(COMPONENT_SUFFIX) {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(source) if source.contains("@Component") => files.push(path),
            Ok(_) => debug!(path = %path, "no @Component decorator, skipping"),
            Err(e) => warn!(path = %path, error = %e, "unreadable component file, skipping"),
        }
    }

    files.sort();
    Ok(files)
}

/// `dir/name.component` for `dir/name.component.ts`.
fn component_stem(path: &Utf8Path) -> Option<Utf8PathBuf> {
    let name = path.file_name()?.strip_suffix(".ts")?;
    Some(path.with_file_name(name))
}

fn read_optional(path: &Utf8Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    Ok(Some(content))
}

/// `selector` and `templateUrl` of the `@Component` decorator.
fn decorator_metadata(source: &str) -> BTreeMap<String, String> {
    let Some(body) = DECORATOR.captures(source) else {
        return BTreeMap::new();
    };
    METADATA_PROPERTY
        .captures_iter(&body[1])
        .filter_map(|caps| {
            let value = caps.get(2).or_else(|| caps.get(3))?;
            Some((caps[1].to_string(), value.as_str().to_string()))
        })
        .collect()
}

/// Build the record for one component file. Files without an exported class
/// yield `None`.
pub fn load_component(path: &Utf8Path) -> Result<Option<ComponentRecord>> {
    let source =
        std::fs::read_to_string(path).map_err(|_| SightError::file_not_found(path.as_str()))?;

    let Some(class_name) = CLASS_NAME.captures(&source).map(|c| c[1].to_string()) else {
        warn!(path = %path, "no exported class found, skipping");
        return Ok(None);
    };

    let stem = component_stem(path)
        .ok_or_else(|| SightError::invalid_request(format!("not a component file: {path}")))?;

    let template = match read_optional(&stem.with_extension("component.html"))? {
        Some(template) => template,
        None => INLINE_TEMPLATE
            .captures(&source)
            .map(|c| c[1].to_string())
            .unwrap_or_default(),
    };

    let mut styles = Vec::new();
    for ext in STYLE_EXTENSIONS {
        if let Some(sheet) = read_optional(&stem.with_extension(format!("component.{ext}")))? {
            styles.push(sheet);
        }
    }

    let record = ComponentRecord::new(class_name, template, styles)
        .with_metadata(decorator_metadata(&source));
    debug!(
        path = %path,
        class_name = %record.class_name,
        selector = record.selector().unwrap_or("-"),
        template_bytes = record.template.len(),
        stylesheets = record.styles.len(),
        "component loaded"
    );
    Ok(Some(record))
}

/// Discover and load every component under `dir`, in path order.
pub fn load_project(dir: &Utf8Path) -> Result<Vec<ComponentRecord>> {
    let missing = missing_markers(dir);
    if !missing.is_empty() {
        warn!(dir = %dir, missing = ?missing, "directory does not look like an Angular project");
    }

    let mut records = Vec::new();
    for path in discover(dir)? {
        if let Some(record) = load_component(&path)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Read a JSON component manifest.
pub fn load_manifest(path: &Utf8Path) -> Result<Vec<ComponentRecord>> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SightError::file_not_found(path.as_str())
        } else {
            SightError::new(ErrorCode::IoError, format!("failed to read {path}: {e}"))
        }
    })?;
    Ok(parse_records(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn write(root: &Utf8Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const TS: &str = "@Component({ selector: 'app-x' })\nexport class XComponent {}\n";

    #[test]
    fn discovers_components_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        write(&root, "src/b/b.component.ts", TS);
        write(&root, "src/a/a.component.ts", TS);
        write(&root, "src/a/a.service.ts", "export class AService {}");
        write(&root, "src/c/c.component.ts", "export class NotDecorated {}");
        write(&root, "node_modules/lib/x.component.ts", TS);

        let found: Vec<_> = discover(&root)
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(&root).unwrap().to_string())
            .collect();
        assert_eq!(found, vec!["src/a/a.component.ts", "src/b/b.component.ts"]);
    }

    #[test]
    fn loads_sibling_template_and_styles() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        write(
            &root,
            "user-list.component.ts",
            "@Component({ templateUrl: './user-list.component.html' })\nexport class UserListComponent {}",
        );
        write(&root, "user-list.component.html", "<ul><li *ngFor=\"let u of users\">{{u}}</li></ul>");
        write(&root, "user-list.component.css", "li { color: red }");
        write(&root, "user-list.component.scss", ".row { margin: 0 }");

        let record = load_component(&root.join("user-list.component.ts"))
            .unwrap()
            .unwrap();
        assert_eq!(record.class_name, "UserListComponent");
        assert!(record.template.starts_with("<ul>"));
        assert_eq!(record.styles, vec![".row { margin: 0 }", "li { color: red }"]);
        assert_eq!(record.metadata["templateUrl"], "./user-list.component.html");
        assert_eq!(record.selector(), None);
    }

    #[test]
    fn falls_back_to_inline_template() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        write(
            &root,
            "badge.component.ts",
            "@Component({\n  selector: 'app-badge',\n  template: `\n    <span class=\"badge\">{{ count }}</span>\n  `\n})\nexport class BadgeComponent {}",
        );

        let record = load_component(&root.join("badge.component.ts")).unwrap().unwrap();
        assert_eq!(record.class_name, "BadgeComponent");
        assert!(record.template.contains("<span class=\"badge\">"));
        assert!(record.styles.is_empty());
        assert_eq!(record.selector(), Some("app-badge"));
    }

    #[test]
    fn decorator_metadata_accepts_both_quote_styles() {
        let metadata = decorator_metadata(
            "@Component({\n  selector: \"app-card\",\n  templateUrl: './card.component.html',\n  standalone: true\n})\nexport class CardComponent {}",
        );
        let pairs: Vec<_> = metadata.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("selector", "app-card"), ("templateUrl", "./card.component.html")]
        );
        assert!(decorator_metadata("export class Plain {}").is_empty());
    }

    #[test]
    fn component_without_class_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        write(&root, "odd.component.ts", "@Component({})\nconst x = 1;");
        assert!(load_component(&root.join("odd.component.ts")).unwrap().is_none());
    }

    #[test]
    fn project_markers_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        write(&root, "package.json", "{}");
        assert_eq!(missing_markers(&root), vec!["angular.json"]);
        assert!(load_project(&root).unwrap().is_empty());
    }

    #[test]
    fn manifest_errors_carry_codes() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        write(&root, "bad.json", r#"[{"template": "<b></b>"}]"#);

        let err = load_manifest(&root.join("bad.json")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SightError>().unwrap().code,
            ErrorCode::MalformedInput
        );
        let err = load_manifest(&root.join("missing.json")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SightError>().unwrap().code,
            ErrorCode::FileNotFound
        );
    }
}
