use serde::{Deserialize, Serialize};

/// Category assigned to a detected layout region.
///
/// The set mirrors what the layout-detection collaborator emits. Anything it
/// reports outside this set deserializes to `Unknown` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    DocTitle,
    ParagraphTitle,
    Text,
    Paragraph,
    Image,
    Table,
    Formula,
    #[serde(other)]
    Unknown,
}

impl Label {
    pub const fn name(&self) -> &str {
        match self {
            Label::DocTitle => "doc_title",
            Label::ParagraphTitle => "paragraph_title",
            Label::Text => "text",
            Label::Paragraph => "paragraph",
            Label::Image => "image",
            Label::Table => "table",
            Label::Formula => "formula",
            Label::Unknown => "unknown",
        }
    }

    /// Overlay color for this label. Unrecognized regions get a neutral gray
    /// so they stay visible without suggesting a category.
    pub const fn color(&self) -> [u8; 3] {
        match self {
            Label::DocTitle => [255, 0, 0],        // Red
            Label::ParagraphTitle => [0, 0, 255],  // Blue
            Label::Text => [0, 200, 0],            // Green
            Label::Paragraph => [0, 128, 0],       // Dark Green
            Label::Image => [0, 255, 255],         // Cyan
            Label::Table => [255, 165, 0],         // Orange
            Label::Formula => [128, 0, 128],       // Purple
            Label::Unknown => [200, 200, 200],     // Gray
        }
    }

    /// Whether this label marks running text that may be merged with an
    /// adjacent block into a single paragraph.
    pub const fn is_prose(&self) -> bool {
        matches!(self, Label::Text | Label::Paragraph)
    }
}

impl Default for Label {
    fn default() -> Self {
        Label::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_deserialize_known() {
        let label: Label = serde_json::from_str("\"paragraph_title\"").unwrap();
        assert_eq!(label, Label::ParagraphTitle);
    }

    #[test]
    fn test_label_deserialize_unknown_never_fails() {
        let label: Label = serde_json::from_str("\"footer_widget\"").unwrap();
        assert_eq!(label, Label::Unknown);
    }

    #[test]
    fn test_prose_labels() {
        assert!(Label::Text.is_prose());
        assert!(Label::Paragraph.is_prose());
        assert!(!Label::Table.is_prose());
        assert!(!Label::Unknown.is_prose());
    }
}
