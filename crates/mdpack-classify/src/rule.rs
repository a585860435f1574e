/// Where an artifact lands in the package and how it is treated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Destination folder relative to the staging root, e.g. `classes` or
    /// `aura/Widget`.
    pub folder: String,
    /// Member of a multi-file bundle: a change to any member pulls in every
    /// bundle sibling.
    pub bundle: bool,
    /// Requires a companion descriptor next to it in the package.
    pub companion: bool,
}

impl ClassificationRule {
    pub fn new(folder: impl Into<String>, bundle: bool, companion: bool) -> Self {
        Self {
            folder: folder.into(),
            bundle,
            companion,
        }
    }
}

/// Result of classifying one artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Rule(ClassificationRule),
    /// The extension (or sniffed content) is not supported. The caller
    /// reports and skips the artifact.
    NoRule,
}

impl Classification {
    pub fn rule(&self) -> Option<&ClassificationRule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::NoRule => None,
        }
    }

    pub fn is_bundle(&self) -> bool {
        self.rule().map(|r| r.bundle).unwrap_or(false)
    }
}
