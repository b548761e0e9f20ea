//! Submission form fields and validation.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::NewRecommendation;

/// Current text of the five form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub title: String,
    pub author: String,
    pub tags: String,
    pub notes: String,
    pub contributor: String,
}

/// A partial edit: only the fields present are replaced.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormEdit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub contributor: Option<String>,
}

impl FormFields {
    pub fn apply(&mut self, edit: FormEdit) {
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(author) = edit.author {
            self.author = author;
        }
        if let Some(tags) = edit.tags {
            self.tags = tags;
        }
        if let Some(notes) = edit.notes {
            self.notes = notes;
        }
        if let Some(contributor) = edit.contributor {
            self.contributor = contributor;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Build the insert payload, or fail if title or author is blank.
    pub fn validate(&self) -> Result<NewRecommendation, AppError> {
        if self.title.trim().is_empty() || self.author.trim().is_empty() {
            return Err(AppError::Validation(
                "Please fill in both the title and the author".to_string(),
            ));
        }

        Ok(NewRecommendation::from_fields(
            &self.title,
            &self.author,
            &self.tags,
            &self.notes,
            &self.contributor,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_edit_keeps_other_fields() {
        let mut form = FormFields {
            title: "Dune".into(),
            ..Default::default()
        };
        form.apply(FormEdit {
            author: Some("Frank Herbert".into()),
            ..Default::default()
        });
        assert_eq!(form.title, "Dune");
        assert_eq!(form.author, "Frank Herbert");
    }

    #[test]
    fn test_blank_title_or_author_is_rejected() {
        let form = FormFields {
            title: "   ".into(),
            author: "Frank Herbert".into(),
            ..Default::default()
        };
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));

        let form = FormFields {
            title: "Dune".into(),
            ..Default::default()
        };
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_valid_form_builds_payload() {
        let form = FormFields {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            tags: "Sci-Fi, Classic".into(),
            notes: String::new(),
            contributor: "Alia".into(),
        };
        let new = form.validate().unwrap();
        assert_eq!(new.tags.as_deref(), Some("Sci-Fi, Classic"));
        assert_eq!(new.notes, None);
    }
}
