use crate::types::{JsonMap, JsonValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationType {
    #[default]
    None,
    FormatPhone,
    FormatDate,
    FormatCurrency,
    SplitName,
    ObjectMapping,
    ArrayFormat,
    Conditional,
    Custom,
}

impl TransformationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationType::None => "none",
            TransformationType::FormatPhone => "format_phone",
            TransformationType::FormatDate => "format_date",
            TransformationType::FormatCurrency => "format_currency",
            TransformationType::SplitName => "split_name",
            TransformationType::ObjectMapping => "object_mapping",
            TransformationType::ArrayFormat => "array_format",
            TransformationType::Conditional => "conditional",
            TransformationType::Custom => "custom",
        }
    }
}

/// Converts one named applicant field into one (possibly nested) request field.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldMapping {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    pub source_field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field_path: Option<String>,

    pub target_field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field_path: Option<String>,

    #[serde(default)]
    pub transformation_type: TransformationType,

    #[serde(default, skip_serializing_if = "JsonMap::is_empty")]
    pub transformation_config: JsonMap,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_value: Option<JsonValue>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl FieldMapping {
    pub fn source_path(&self) -> &str {
        self.source_field_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.source_field)
    }

    pub fn target_path(&self) -> &str {
        self.target_field_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.target_field)
    }
}

fn default_true() -> bool {
    true
}
