use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a comment submission, as posted by the comment form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentSubmission {
    #[serde(rename = "_id", default)]
    pub post_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Comment,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Email, FormField::Comment];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Comment => "comment",
        }
    }

    pub fn required_message(&self) -> &'static str {
        match self {
            FormField::Name => "The name field is required",
            FormField::Email => "The email field is required",
            FormField::Comment => "The comment field is required",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CommentSubmission {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Comment => &self.comment,
        }
    }

    /// Required fields that are empty after trimming, in form order.
    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|f| self.field(*f).trim().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_underscore_id() {
        let s = CommentSubmission {
            post_id: "p1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            comment: "Nice".into(),
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["_id"], "p1");
        assert_eq!(v["comment"], "Nice");
    }

    #[test]
    fn missing_fields_reports_only_empty_ones() {
        let s = CommentSubmission {
            post_id: "p1".into(),
            name: "   ".into(),
            email: "ada@example.com".into(),
            comment: "Nice".into(),
        };
        assert_eq!(s.missing_fields(), vec![FormField::Name]);

        let empty = CommentSubmission::default();
        assert_eq!(empty.missing_fields(), FormField::ALL.to_vec());
    }
}
