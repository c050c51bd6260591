use serde::de::DeserializeOwned;

use crate::ApiError;

/// Normalize the three response shapes the API is known to produce into
/// a plain list: a bare array, `{ "data": [...] }`, or a single object
/// (wrapped into a one-element list). Only when all three fail to
/// type-check does this report a decode error; a recognized-but-empty
/// shape is just an empty list.
pub fn decode_items<T: DeserializeOwned>(value: serde_json::Value) -> Result<Vec<T>, ApiError> {
    if value.is_array() {
        return serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()));
    }

    if let Some(data) = value.get("data") {
        if data.is_array() {
            return serde_json::from_value(data.clone())
                .map_err(|e| ApiError::Decode(e.to_string()));
        }
    }

    match serde_json::from_value::<T>(value) {
        Ok(item) => Ok(vec![item]),
        Err(e) => Err(ApiError::Decode(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitetrack_core::step::StepDescriptor;

    #[test]
    fn bare_array_decodes() {
        let value = serde_json::json!([
            {"step_type": "design", "step_id": "s1", "_id": "a", "name": "Design", "type": "step", "order": 1},
            {"step_type": "finish", "step_id": "s2", "_id": "b", "name": "Finishes", "type": "multi-step", "order": 2}
        ]);
        let items: Vec<StepDescriptor> = decode_items(value).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].step_id, "s2");
    }

    #[test]
    fn data_envelope_decodes() {
        let value = serde_json::json!({
            "data": [
                {"step_type": "design", "step_id": "s1", "_id": "a", "name": "Design", "type": "step", "order": 1}
            ],
            "total": 1
        });
        let items: Vec<StepDescriptor> = decode_items(value).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].step_type, "design");
    }

    #[test]
    fn single_object_wraps_into_list() {
        let value = serde_json::json!(
            {"step_type": "design", "step_id": "s1", "_id": "a", "name": "Design", "type": "step", "order": 1}
        );
        let items: Vec<StepDescriptor> = decode_items(value).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn level_list_decodes_in_both_shapes() {
        use sitetrack_core::building::Level;

        let bare = serde_json::json!([
            {"_id": "l1", "name": "Level 1", "units": ["101", "102"]},
            {"_id": "l2", "name": "Level 2"}
        ]);
        let levels: Vec<Level> = decode_items(bare).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].units, vec!["101", "102"]);
        assert!(levels[1].units.is_empty());

        let wrapped = serde_json::json!({"data": [
            {"_id": "l1", "name": "Level 1", "units": []}
        ]});
        let levels: Vec<Level> = decode_items(wrapped).unwrap();
        assert_eq!(levels[0].id, "l1");
    }

    #[test]
    fn empty_array_is_empty_list_not_error() {
        let items: Vec<StepDescriptor> = decode_items(serde_json::json!([])).unwrap();
        assert!(items.is_empty());
        let items: Vec<StepDescriptor> =
            decode_items(serde_json::json!({"data": []})).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn unrecognized_shape_is_decode_error() {
        let result: Result<Vec<StepDescriptor>, _> = decode_items(serde_json::json!("nope"));
        assert!(matches!(result, Err(ApiError::Decode(_))));

        let result: Result<Vec<StepDescriptor>, _> = decode_items(serde_json::json!(42));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
