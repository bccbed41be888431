//! Dependency manifest parsing.
//!
//! Each recognised manifest yields a [`ManifestParse`]: either the typed data
//! the detector merges into the profile, or a `Malformed` marker that makes
//! the file contribute nothing.

use super::patterns::{DJANGO, EXPRESS, FASTAPI, FLASK, JAVA, LARAVEL, NEXTJS, PHP, PYTHON, REACT, SPRING_BOOT};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub labels: Vec<&'static str>,
    pub dependencies: Vec<String>,
    pub start_command: Option<String>,
    pub build_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestParse {
    Parsed(Manifest),
    Malformed { reason: String },
}

/// Parse `content` if `base_name` is a manifest we understand.
pub fn parse(base_name: &str, content: &str) -> Option<ManifestParse> {
    let parsed = match base_name {
        "package.json" => parse_package_json(content),
        "composer.json" => parse_composer_json(content),
        "requirements.txt" => ManifestParse::Parsed(parse_requirements(content)),
        "Pipfile" => parse_pipfile(content),
        "pom.xml" | "build.gradle" | "build.gradle.kts" => ManifestParse::Parsed(parse_jvm_build(content)),
        _ => return None,
    };
    Some(parsed)
}

fn push_label(labels: &mut Vec<&'static str>, label: &'static str) {
    if !labels.contains(&label) {
        labels.push(label);
    }
}

fn script(scripts: &Option<BTreeMap<String, Value>>, name: &str) -> Option<String> {
    scripts
        .as_ref()
        .and_then(|s| s.get(name))
        .and_then(|v| v.as_str())
        .map(String::from)
}

// ─── package.json ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    dev_dependencies: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    peer_dependencies: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    scripts: Option<BTreeMap<String, Value>>,
}

fn parse_package_json(content: &str) -> ManifestParse {
    let pkg: PackageJson = match serde_json::from_str(content) {
        Ok(p) => p,
        Err(e) => return ManifestParse::Malformed { reason: e.to_string() },
    };

    let mut manifest = Manifest::default();
    let all = [&pkg.dependencies, &pkg.dev_dependencies, &pkg.peer_dependencies];
    for dep in all.into_iter().flatten().flat_map(|m| m.keys()) {
        if dep.contains("react") {
            push_label(&mut manifest.labels, REACT);
        }
        if dep.contains("next") {
            push_label(&mut manifest.labels, NEXTJS);
        }
        if dep.contains("express") {
            push_label(&mut manifest.labels, EXPRESS);
        }
        manifest.dependencies.push(dep.clone());
    }

    manifest.start_command = script(&pkg.scripts, "start");
    manifest.build_command = script(&pkg.scripts, "build");
    ManifestParse::Parsed(manifest)
}

// ─── composer.json ────────────────────────────────────────────────

#[derive(Deserialize)]
struct ComposerJson {
    #[serde(default)]
    require: Option<BTreeMap<String, Value>>,
    #[serde(default, rename = "require-dev")]
    require_dev: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    scripts: Option<BTreeMap<String, Value>>,
}

fn parse_composer_json(content: &str) -> ManifestParse {
    let composer: ComposerJson = match serde_json::from_str(content) {
        Ok(c) => c,
        Err(e) => return ManifestParse::Malformed { reason: e.to_string() },
    };

    let mut manifest = Manifest {
        labels: vec![PHP],
        ..Default::default()
    };
    for dep in [&composer.require, &composer.require_dev]
        .into_iter()
        .flatten()
        .flat_map(|m| m.keys())
    {
        if dep == "laravel/framework" {
            push_label(&mut manifest.labels, LARAVEL);
        }
        manifest.dependencies.push(dep.clone());
    }

    manifest.start_command = script(&composer.scripts, "start");
    manifest.build_command = script(&composer.scripts, "build");
    ManifestParse::Parsed(manifest)
}

// ─── Python ───────────────────────────────────────────────────────

fn python_framework_labels(labels: &mut Vec<&'static str>, dep: &str) {
    match dep.to_lowercase().as_str() {
        "django" => push_label(labels, DJANGO),
        "flask" => push_label(labels, FLASK),
        "fastapi" => push_label(labels, FASTAPI),
        _ => {}
    }
}

/// Requirement name: everything before a version specifier, extra, or marker.
fn requirement_name(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
        return None;
    }
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(line.len());
    let name = &line[..end];
    (!name.is_empty()).then_some(name)
}

fn parse_requirements(content: &str) -> Manifest {
    let mut manifest = Manifest {
        labels: vec![PYTHON],
        ..Default::default()
    };
    for name in content.lines().filter_map(requirement_name) {
        python_framework_labels(&mut manifest.labels, name);
        manifest.dependencies.push(name.to_string());
    }
    manifest
}

fn parse_pipfile(content: &str) -> ManifestParse {
    let table: toml::Table = match toml::from_str(content) {
        Ok(t) => t,
        Err(e) => return ManifestParse::Malformed { reason: e.to_string() },
    };

    let mut manifest = Manifest {
        labels: vec![PYTHON],
        dependencies: vec!["pipenv".to_string()],
        ..Default::default()
    };
    for section in ["packages", "dev-packages"] {
        if let Some(packages) = table.get(section).and_then(|v| v.as_table()) {
            for name in packages.keys() {
                python_framework_labels(&mut manifest.labels, name);
                manifest.dependencies.push(name.clone());
            }
        }
    }
    ManifestParse::Parsed(manifest)
}

// ─── JVM builds ───────────────────────────────────────────────────

fn parse_jvm_build(content: &str) -> Manifest {
    let mut labels = vec![JAVA];
    if content.to_lowercase().contains("spring-boot") {
        labels.push(SPRING_BOOT);
    }
    Manifest {
        labels,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(name: &str, content: &str) -> Manifest {
        match parse(name, content) {
            Some(ManifestParse::Parsed(m)) => m,
            other => panic!("expected parsed manifest, got {:?}", other),
        }
    }

    #[test]
    fn test_package_json_combines_dependency_sections() {
        let m = parsed(
            "package.json",
            r#"{
                "dependencies": {"express": "^4.18.0"},
                "devDependencies": {"next": "14.0.0"},
                "peerDependencies": {"react-dom": "18.0.0"},
                "scripts": {"start": "node server.js", "build": "next build"}
            }"#,
        );
        assert_eq!(m.dependencies, vec!["express", "next", "react-dom"]);
        assert_eq!(m.labels, vec![EXPRESS, NEXTJS, REACT]);
        assert_eq!(m.start_command.as_deref(), Some("node server.js"));
        assert_eq!(m.build_command.as_deref(), Some("next build"));
    }

    #[test]
    fn test_package_json_malformed() {
        assert!(matches!(
            parse("package.json", "{ not json"),
            Some(ManifestParse::Malformed { .. })
        ));
    }

    #[test]
    fn test_package_json_non_string_script_ignored() {
        let m = parsed("package.json", r#"{"scripts": {"start": 42}}"#);
        assert!(m.start_command.is_none());
    }

    #[test]
    fn test_composer_laravel() {
        let m = parsed(
            "composer.json",
            r#"{"require": {"php": "^8.1", "laravel/framework": "^10.0"}}"#,
        );
        assert_eq!(m.labels, vec![PHP, LARAVEL]);
        assert_eq!(m.dependencies, vec!["laravel/framework", "php"]);
    }

    #[test]
    fn test_requirements_names_and_frameworks() {
        let m = parsed(
            "requirements.txt",
            "# web\nFlask==2.0\ngunicorn>=20\n-r base.txt\nuvicorn[standard]\n\n",
        );
        assert_eq!(m.dependencies, vec!["Flask", "gunicorn", "uvicorn"]);
        assert_eq!(m.labels, vec![PYTHON, FLASK]);
    }

    #[test]
    fn test_pipfile_adds_pipenv() {
        let m = parsed(
            "Pipfile",
            "[packages]\ndjango = \"*\"\n\n[dev-packages]\npytest = \"*\"\n",
        );
        assert_eq!(m.dependencies, vec!["pipenv", "django", "pytest"]);
        assert_eq!(m.labels, vec![PYTHON, DJANGO]);
    }

    #[test]
    fn test_pipfile_malformed() {
        assert!(matches!(
            parse("Pipfile", "[packages\n"),
            Some(ManifestParse::Malformed { .. })
        ));
    }

    #[test]
    fn test_pom_spring_boot() {
        let m = parsed(
            "pom.xml",
            "<parent><artifactId>spring-boot-starter-parent</artifactId></parent>",
        );
        assert_eq!(m.labels, vec![JAVA, SPRING_BOOT]);
    }

    #[test]
    fn test_not_a_manifest() {
        assert!(parse("index.js", "{}").is_none());
    }
}
