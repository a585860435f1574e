use mdpack_types::ArtifactPath;

use crate::{escape_xml, LINE_ENDING, METADATA_NAMESPACE, XML_DECLARATION};

/// Generates companion descriptors from static templates.
///
/// Templates exist for Apex classes, triggers, pages and components, aura
/// bundle definitions, and static resources. Every other extension yields
/// `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetadataSynthesizer {
    api_version: u32,
}

impl MetadataSynthesizer {
    pub fn new(api_version: u32) -> Self {
        Self { api_version }
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Returns `true` if a template exists for `extension`.
    pub fn has_template(extension: &str) -> bool {
        matches!(
            extension,
            "cls" | "trigger" | "page" | "component" | "resource" | "app" | "cmp" | "evt"
                | "intf" | "tokens"
        )
    }

    /// Render the descriptor for an artifact named `name` (file name without
    /// extension).
    ///
    /// `text_variant` only matters for static resources: it selects a
    /// `text/plain` content type instead of `application/zip`.
    pub fn synthesize(&self, name: &str, extension: &str, text_variant: bool) -> Option<String> {
        let version = format!("{}.0", self.api_version);
        let name = escape_xml(name);
        let body: Vec<String> = match extension {
            "cls" => vec![
                format!("    <apiVersion>{version}</apiVersion>"),
                "    <status>Active</status>".into(),
            ],
            "trigger" => vec![
                format!("    <apiVersion>{version}</apiVersion>"),
                "    <status>Active</status>".into(),
            ],
            "page" => vec![
                format!("    <apiVersion>{version}</apiVersion>"),
                "    <availableInTouch>false</availableInTouch>".into(),
                "    <confirmationTokenRequired>false</confirmationTokenRequired>".into(),
                format!("    <label>{name}</label>"),
            ],
            "component" => vec![
                format!("    <apiVersion>{version}</apiVersion>"),
                format!("    <label>{name}</label>"),
            ],
            "app" | "cmp" | "evt" | "intf" | "tokens" => vec![
                format!("    <apiVersion>{version}</apiVersion>"),
                format!("    <description>{name}</description>"),
            ],
            "resource" => vec![
                "    <cacheControl>Public</cacheControl>".into(),
                format!(
                    "    <contentType>{}</contentType>",
                    if text_variant {
                        "text/plain"
                    } else {
                        "application/zip"
                    }
                ),
            ],
            _ => return None,
        };

        let root = root_element(extension)?;
        let mut lines = Vec::with_capacity(body.len() + 3);
        lines.push(XML_DECLARATION.to_string());
        lines.push(format!("<{root} xmlns=\"{METADATA_NAMESPACE}\">"));
        lines.extend(body);
        lines.push(format!("</{root}>"));
        Some(lines.join(LINE_ENDING))
    }

    /// Descriptor for a planned artifact.
    pub fn synthesize_for(&self, artifact: &ArtifactPath, text_variant: bool) -> Option<String> {
        self.synthesize(artifact.stem(), artifact.extension()?, text_variant)
    }
}

fn root_element(extension: &str) -> Option<&'static str> {
    Some(match extension {
        "cls" => "ApexClass",
        "trigger" => "ApexTrigger",
        "page" => "ApexPage",
        "component" => "ApexComponent",
        "app" | "cmp" | "evt" | "intf" | "tokens" => "AuraDefinitionBundle",
        "resource" => "StaticResource",
        _ => return None,
    })
}
