//! Extension-driven classification into the package folder layout.

use std::fs;
use std::path::Path;

use crate::error::{ClassifyError, ClassifyResult};
use crate::rule::{Classification, ClassificationRule};

/// Bundle members that never carry their own descriptor.
const AURA_RESOURCES: &[&str] = &["auradoc", "css", "design", "js", "svg"];

/// Bundle definition files; each needs a companion descriptor.
const AURA_DEFINITIONS: &[&str] = &["cmp", "evt", "intf", "tokens"];

/// Marker selecting the aura application profile for `.app` files.
const AURA_APP_MARKER: &str = "<aura:application";

/// Marker selecting the classic custom application profile for `.app` files.
const CUSTOM_APP_MARKER: &str = "<CustomApplication";

/// Single-file artifacts: `(extension, folder, companion)`.
const STATIC_RULES: &[(&str, &str, bool)] = &[
    ("approvalProcess", "approvalProcesses", false),
    ("assignmentRules", "assignmentRules", false),
    ("authproviders", "authprovider", false),
    ("autoResponseRules", "autoResponseRules", false),
    ("cls", "classes", true),
    ("community", "communities", false),
    ("component", "components", true),
    ("group", "group", false),
    ("homePageLayout", "homePageLayouts", false),
    ("labels", "labels", false),
    ("layout", "layouts", false),
    ("letter", "letterhead", false),
    ("md", "customMetadata", false),
    ("object", "objects", false),
    ("objectTranslation", "objectTranslations", false),
    ("page", "pages", true),
    ("permissionset", "permissionsets", false),
    ("profile", "profiles", false),
    ("queue", "queues", false),
    ("quickAction", "quickActions", false),
    ("remoteSite", "remoteSiteSettings", false),
    ("reportType", "reportTypes", false),
    ("role", "role", false),
    ("resource", "staticresources", true),
    ("tab", "tabs", false),
    ("translation", "translations", false),
    ("trigger", "triggers", true),
];

/// Maps an artifact to its [`ClassificationRule`].
///
/// Lookups are pure except for `.app`, whose meaning depends on content: an
/// aura application and a classic custom application share the extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify an artifact.
    ///
    /// `dir_name` is the name of the directory containing the artifact (used
    /// for aura bundle folders), `extension` has no leading dot and is
    /// matched case-sensitively, and `full_path` is read only for `.app`.
    pub fn classify(
        &self,
        dir_name: &str,
        extension: &str,
        full_path: &Path,
    ) -> ClassifyResult<Classification> {
        if AURA_RESOURCES.contains(&extension) {
            return Ok(aura(dir_name, false));
        }
        if AURA_DEFINITIONS.contains(&extension) {
            return Ok(aura(dir_name, true));
        }
        if extension == "app" {
            return sniff_app(dir_name, full_path);
        }

        Ok(STATIC_RULES
            .iter()
            .find(|(ext, _, _)| *ext == extension)
            .map(|(_, folder, companion)| {
                Classification::Rule(ClassificationRule::new(*folder, false, *companion))
            })
            .unwrap_or(Classification::NoRule))
    }

    /// Every extension with a rule, `.app` included.
    pub fn known_extensions() -> impl Iterator<Item = &'static str> {
        AURA_RESOURCES
            .iter()
            .chain(AURA_DEFINITIONS)
            .copied()
            .chain(std::iter::once("app"))
            .chain(STATIC_RULES.iter().map(|(ext, _, _)| *ext))
    }
}

fn aura(dir_name: &str, companion: bool) -> Classification {
    Classification::Rule(ClassificationRule::new(
        format!("aura/{dir_name}"),
        true,
        companion,
    ))
}

/// `.app` content without either marker has no rule.
fn sniff_app(dir_name: &str, full_path: &Path) -> ClassifyResult<Classification> {
    let bytes = fs::read(full_path).map_err(|source| ClassifyError::Sniff {
        path: full_path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);

    if content.contains(AURA_APP_MARKER) {
        Ok(aura(dir_name, true))
    } else if content.contains(CUSTOM_APP_MARKER) {
        Ok(Classification::Rule(ClassificationRule::new(
            "applications",
            false,
            false,
        )))
    } else {
        Ok(Classification::NoRule)
    }
}
