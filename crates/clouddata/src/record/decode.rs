//! Decoding of record fields into caller types.

use serde::de::DeserializeOwned;

use super::Fields;
use crate::error::BoxedError;

/// Capability of being built from a record's field mapping.
///
/// Every `serde` deserializable type gets this for free by treating the
/// fields as a JSON object. Types that do not use `serde` can implement it by
/// hand.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct Recipe {
///     name: String,
///     servings: u32,
/// }
///
/// let recipes: Vec<Recipe> = client.fetch_decoded("Recipe", None).await?;
/// ```
pub trait FromFields: Sized {
    /// Builds a value from the given fields.
    fn from_fields(fields: &Fields) -> Result<Self, BoxedError>;
}

impl<T> FromFields for T
where
    T: DeserializeOwned,
{
    fn from_fields(fields: &Fields) -> Result<Self, BoxedError> {
        let value = serde_json::Value::Object(fields.clone());
        serde_json::from_value(value).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Recipe {
        name: String,
        servings: u32,
        #[serde(default)]
        tags: Vec<String>,
    }

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_decode_matching_shape() {
        let recipe = Recipe::from_fields(&fields(json!({
            "name": "Pancakes",
            "servings": 4,
            "tags": ["breakfast"],
        })))
        .unwrap();

        assert_eq!(
            recipe,
            Recipe {
                name: "Pancakes".into(),
                servings: 4,
                tags: vec!["breakfast".into()],
            }
        );
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let recipe = Recipe::from_fields(&fields(json!({
            "name": "Soup",
            "servings": 2,
            "calories": 300,
        })))
        .unwrap();
        assert_eq!(recipe.name, "Soup");
    }

    #[test]
    fn test_decode_missing_required_field() {
        let result = Recipe::from_fields(&fields(json!({ "name": "Toast" })));
        assert!(result.unwrap_err().to_string().contains("servings"));
    }
}
