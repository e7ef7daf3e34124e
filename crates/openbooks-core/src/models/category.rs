use serde::{Deserialize, Serialize};

/// A browseable book category shown by the front end.
///
/// Field names on the wire follow the front end's Portuguese schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: i64,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "cor", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(rename = "adulto", default)]
    pub adult: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>, adult: bool) -> Self {
        Self {
            id: 0,
            name: name.into(),
            color: Some(color.into()),
            adult,
        }
    }

    /// Categories seeded into an empty store.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Fantasia", "#8b5cf6", false),
            Self::new("Dark", "#1f2937", true),
            Self::new("Estudo", "#3b82f6", false),
        ]
    }
}

/// Response wrapper for the category listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(rename = "categorias")]
    pub categories: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_value(Category::new("Dark", "#1f2937", true)).unwrap();
        assert_eq!(json["nome"], "Dark");
        assert_eq!(json["cor"], "#1f2937");
        assert_eq!(json["adulto"], true);
    }

    #[test]
    fn test_defaults_include_one_adult_category() {
        let defaults = Category::defaults();
        assert_eq!(defaults.len(), 3);
        assert_eq!(defaults.iter().filter(|c| c.adult).count(), 1);
    }
}
