//! The package manifest.
//!
//! Every package declares the same fixed category list with a `*` member
//! selector; only the target API version varies between runs.

use crate::{LINE_ENDING, METADATA_NAMESPACE, XML_DECLARATION};

/// File name of the manifest at the root of the assembled tree.
pub const MANIFEST_FILE_NAME: &str = "package.xml";

/// Metadata categories declared by every manifest, in declaration order.
pub const CATEGORIES: &[&str] = &[
    "AnalyticSnapshot",
    "ApexClass",
    "ApexComponent",
    "ApexPage",
    "ApexTrigger",
    "ApprovalProcess",
    "AssignmentRules",
    "AuraDefinitionBundle",
    "AuthProvider",
    "AutoResponseRules",
    "BusinessProcess",
    "CallCenter",
    "Community",
    "CompactLayout",
    "ConnectedApp",
    "CustomApplication",
    "CustomApplicationComponent",
    "CustomField",
    "CustomLabels",
    "CustomMetadata",
    "CustomObject",
    "CustomObjectTranslation",
    "CustomPageWebLink",
    "CustomSite",
    "CustomTab",
    "Dashboard",
    "DataCategoryGroup",
    "Document",
    "EmailTemplate",
    "EntitlementProcess",
    "EntitlementTemplate",
    "ExternalDataSource",
    "FieldSet",
    "Flow",
    "Group",
    "HomePageComponent",
    "HomePageLayout",
    "Layout",
    "Letterhead",
    "ListView",
    "LiveChatAgentConfig",
    "LiveChatButton",
    "LiveChatDeployment",
    "MilestoneType",
    "NamedFilter",
    "Network",
    "PermissionSet",
    "Portal",
    "PostTemplate",
    "Profile",
    "Queue",
    "QuickAction",
    "RecordType",
    "RemoteSiteSetting",
    "Report",
    "ReportType",
    "Role",
    "SamlSsoConfig",
    "Scontrol",
    "SharingReason",
    "Skill",
    "StaticResource",
    "Territory",
    "Translations",
    "ValidationRule",
];

/// Package-level descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Manifest {
    api_version: u32,
}

impl Manifest {
    pub fn new(api_version: u32) -> Self {
        Self { api_version }
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    pub fn categories(&self) -> &'static [&'static str] {
        CATEGORIES
    }

    /// Render `package.xml`.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(CATEGORIES.len() * 4 + 4);
        lines.push(XML_DECLARATION.to_string());
        lines.push(format!("<Package xmlns=\"{METADATA_NAMESPACE}\">"));
        for category in CATEGORIES {
            lines.push("    <types>".to_string());
            lines.push("        <members>*</members>".to_string());
            lines.push(format!("        <name>{category}</name>"));
            lines.push("    </types>".to_string());
        }
        lines.push(format!("    <version>{}</version>", self.api_version));
        lines.push("</Package>".to_string());
        lines.join(LINE_ENDING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_sorted_and_unique() {
        let mut sorted = CATEGORIES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, CATEGORIES);
    }

    #[test]
    fn render_declares_every_category_once() {
        let xml = Manifest::new(34).render();
        for category in CATEGORIES {
            let needle = format!("<name>{category}</name>");
            assert_eq!(xml.matches(&needle).count(), 1, "{category}");
        }
        assert_eq!(xml.matches("<members>*</members>").count(), CATEGORIES.len());
    }

    #[test]
    fn render_substitutes_version_only() {
        let v34 = Manifest::new(34).render();
        let v58 = Manifest::new(58).render();
        assert!(v34.ends_with("    <version>34</version>\r\n</Package>"));
        assert_eq!(v34.replace("<version>34</version>", "<version>58</version>"), v58);
    }

    #[test]
    fn render_header() {
        let xml = Manifest::new(34).render();
        let mut lines = xml.split("\r\n");
        assert_eq!(lines.next(), Some(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert_eq!(
            lines.next(),
            Some(r#"<Package xmlns="http://soap.sforce.com/2006/04/metadata">"#)
        );
    }
}
