use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormImage {
    pub uri: String,
    #[serde(default)]
    pub file_name: String,
}

/// One design-form submission. At most one record per task is treated as
/// canonical, but the store never enforces uniqueness: `id` is its own
/// generated key and the task relationship is a lookup, not an ownership
/// key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignForm {
    pub id: String,
    pub task_id: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub images: Vec<FormImage>,
    #[serde(default)]
    pub captured_photo: Option<String>,
    #[serde(default)]
    pub photo_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDesignForm {
    pub task_id: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub images: Vec<FormImage>,
    #[serde(default)]
    pub captured_photo: Option<String>,
    #[serde(default)]
    pub photo_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDesignForm {
    pub details: Option<String>,
    pub comments: Option<String>,
    pub links: Option<Vec<String>>,
    pub images: Option<Vec<FormImage>>,
    pub captured_photo: Option<Option<String>>,
    pub photo_timestamp: Option<Option<DateTime<Utc>>>,
}

impl DesignForm {
    /// Build a new record from a submission, minting its id and creation
    /// timestamp.
    pub fn from_input(input: CreateDesignForm) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: input.task_id,
            details: input.details,
            comments: input.comments,
            links: input.links,
            images: input.images,
            captured_photo: input.captured_photo,
            photo_timestamp: input.photo_timestamp,
            created_at: Utc::now(),
        }
    }

    /// Merge a patch into this record. Absent fields are left untouched;
    /// the double-`Option` fields distinguish "leave alone" from "clear".
    pub fn apply(&mut self, patch: UpdateDesignForm) {
        if let Some(details) = patch.details {
            self.details = details;
        }
        if let Some(comments) = patch.comments {
            self.comments = comments;
        }
        if let Some(links) = patch.links {
            self.links = links;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(captured_photo) = patch.captured_photo {
            self.captured_photo = captured_photo;
        }
        if let Some(photo_timestamp) = patch.photo_timestamp {
            self.photo_timestamp = photo_timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_input_mints_distinct_ids() {
        let a = DesignForm::from_input(CreateDesignForm {
            task_id: "t1".into(),
            ..Default::default()
        });
        let b = DesignForm::from_input(CreateDesignForm {
            task_id: "t1".into(),
            ..Default::default()
        });
        assert_ne!(a.id, b.id);
        assert_eq!(a.task_id, b.task_id);
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut form = DesignForm::from_input(CreateDesignForm {
            task_id: "t1".into(),
            details: "original".into(),
            comments: "keep me".into(),
            ..Default::default()
        });
        form.apply(UpdateDesignForm {
            details: Some("patched".into()),
            ..Default::default()
        });
        assert_eq!(form.details, "patched");
        assert_eq!(form.comments, "keep me");
    }

    #[test]
    fn apply_can_clear_captured_photo() {
        let mut form = DesignForm::from_input(CreateDesignForm {
            task_id: "t1".into(),
            captured_photo: Some("file:///photo.jpg".into()),
            ..Default::default()
        });
        form.apply(UpdateDesignForm {
            captured_photo: Some(None),
            ..Default::default()
        });
        assert!(form.captured_photo.is_none());
    }
}
