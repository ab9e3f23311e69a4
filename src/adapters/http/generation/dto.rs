//! Request types for the generation endpoint.

use serde::Deserialize;

/// Body of `POST /api/generate`.
///
/// A missing list deserializes as empty and is reported as too short.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_ingredients() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"ingredients":["tomato","basil","olive oil"]}"#).unwrap();
        assert_eq!(req.ingredients.len(), 3);
    }

    #[test]
    fn missing_list_is_empty() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(req.ingredients.is_empty());
    }
}
