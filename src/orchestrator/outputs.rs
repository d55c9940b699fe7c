//! Values a release run hands back to the calling workflow

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Outputs of a release run, named as the workflow consumes them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseOutputs {
    pub released: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_prerelease: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_release_url: Option<String>,
}

impl ReleaseOutputs {
    /// `(name, value)` pairs for every output that is set
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![("released", self.released.to_string())];

        let optional = [
            ("version", self.version.clone()),
            ("previous-version", self.previous_version.clone()),
            ("release-type", self.release_type.clone()),
            ("is-prerelease", self.is_prerelease.map(|p| p.to_string())),
            ("release-url", self.release_url.clone()),
            ("release-id", self.release_id.map(|id| id.to_string())),
            ("tag-name", self.tag_name.clone()),
            ("major-version", self.major_version.clone()),
            ("major-release-url", self.major_release_url.clone()),
        ];
        entries.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| (name, value))),
        );

        entries
    }

    /// `name=value` lines, one per output
    pub fn render(&self) -> String {
        self.entries()
            .into_iter()
            .map(|(name, value)| format!("{}={}\n", name, value))
            .collect()
    }

    /// Append the rendered outputs to a `$GITHUB_OUTPUT`-style file
    pub fn append_to(&self, path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.render().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_released_renders_flag_only() {
        let outputs = ReleaseOutputs::default();
        assert_eq!(outputs.render(), "released=false\n");
    }

    #[test]
    fn test_render_uses_workflow_names() {
        let outputs = ReleaseOutputs {
            released: true,
            version: Some("v2.1.0".to_string()),
            previous_version: Some("v2.0.3".to_string()),
            release_type: Some("minor".to_string()),
            is_prerelease: Some(false),
            release_id: Some(12),
            tag_name: Some("v2.1.0".to_string()),
            major_version: Some("v2".to_string()),
            ..ReleaseOutputs::default()
        };

        let rendered = outputs.render();
        assert!(rendered.starts_with("released=true\n"));
        assert!(rendered.contains("previous-version=v2.0.3\n"));
        assert!(rendered.contains("is-prerelease=false\n"));
        assert!(rendered.contains("release-id=12\n"));
        assert!(rendered.contains("major-version=v2\n"));
        assert!(!rendered.contains("release-url"));
    }

    #[test]
    fn test_json_uses_kebab_case() {
        let outputs = ReleaseOutputs {
            released: true,
            tag_name: Some("v1.0.0".to_string()),
            ..ReleaseOutputs::default()
        };
        let json = serde_json::to_string(&outputs).unwrap();
        assert_eq!(json, r#"{"released":true,"tag-name":"v1.0.0"}"#);
    }

    #[test]
    fn test_append_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "existing=1\n").unwrap();

        ReleaseOutputs::default().append_to(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing=1\nreleased=false\n");
    }
}
