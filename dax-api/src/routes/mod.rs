/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Login and token refresh
/// - `vaults`: Vault CRUD
/// - `entries`: Entry CRUD
/// - `contributors`: Vault contributor management

pub mod auth;
pub mod contributors;
pub mod entries;
pub mod health;
pub mod vaults;

use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Builds absolute resource links from the configured public URL
#[derive(Debug, Clone, Copy)]
pub struct Links<'a> {
    base: &'a str,
}

impl<'a> Links<'a> {
    pub fn new(base: &'a str) -> Self {
        Self { base }
    }

    pub fn vault(&self, id: Uuid) -> String {
        format!("{}/v1/vaults/{}/", self.base, id)
    }

    pub fn entry(&self, id: Uuid) -> String {
        format!("{}/v1/entries/{}/", self.base, id)
    }
}

/// How a field appeared in a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Missing,
    Null,
    Present,
}

impl Presence {
    pub(crate) fn of<T>(field: &Option<Option<T>>) -> Self {
        match field {
            None => Presence::Missing,
            Some(None) => Presence::Null,
            Some(Some(_)) => Presence::Present,
        }
    }
}

/// Runs the request's field validators, rejects explicit `null`s and
/// reports any `required` fields that are absent, all in one error.
pub(crate) fn validate_request<T: Validate>(
    req: &T,
    fields: &[(&'static str, Presence)],
    required: &[&str],
) -> ApiResult<()> {
    let mut details = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => match ApiError::from(errors) {
            ApiError::ValidationError(details) => details,
            other => return Err(other),
        },
    };

    details.extend(fields.iter().filter_map(|(field, presence)| match presence {
        Presence::Null => Some(ValidationErrorDetail::new(
            *field,
            "This field may not be null.",
        )),
        Presence::Missing if required.contains(field) => Some(ValidationErrorDetail::new(
            *field,
            "This field is required.",
        )),
        _ => None,
    }));

    if details.is_empty() {
        Ok(())
    } else {
        details.sort_by(|a, b| a.field.cmp(&b.field));
        Err(ApiError::ValidationError(details))
    }
}

/// Keeps an explicit `null` apart from an omitted field: omitted is `None`
/// (via `#[serde(default)]`), `null` is `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// [`nullable`] for text fields; surrounding whitespace is dropped.
pub(crate) fn nullable_trimmed<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(value.map(|text| text.trim().to_string())))
}

/// Text columns can't store NUL
pub(crate) fn validate_text(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        let mut error = ValidationError::new("null_character");
        error.message = Some("Null characters are not allowed.".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// `settings`/`attributes` must be JSON objects
pub(crate) fn validate_document(value: &serde_json::Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        let mut error = ValidationError::new("document");
        error.message = Some("Must be a JSON object".into());
        Err(error)
    }
}

/// Unwraps a value already checked by [`validate_document`].
pub(crate) fn into_document(value: serde_json::Value) -> dax_shared::models::Document {
    match value {
        serde_json::Value::Object(map) => map,
        _ => dax_shared::models::Document::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize, Validate)]
    struct Sample {
        #[serde(default, deserialize_with = "nullable")]
        owner: Option<Option<Uuid>>,

        #[serde(default, deserialize_with = "nullable_trimmed")]
        #[validate(length(min = 1, max = 3, message = "Too long"), custom(function = validate_text))]
        name: Option<Option<String>>,
    }

    impl Sample {
        fn fields(&self) -> [(&'static str, Presence); 2] {
            [
                ("owner", Presence::of(&self.owner)),
                ("name", Presence::of(&self.name)),
            ]
        }
    }

    fn parse(value: serde_json::Value) -> Sample {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_links_are_absolute_with_trailing_slash() {
        let links = Links::new("https://dax.example.com");
        let id = Uuid::nil();

        assert_eq!(
            links.vault(id),
            "https://dax.example.com/v1/vaults/00000000-0000-0000-0000-000000000000/"
        );
        assert_eq!(
            links.entry(id),
            "https://dax.example.com/v1/entries/00000000-0000-0000-0000-000000000000/"
        );
    }

    #[test]
    fn test_validate_request_merges_required_and_field_errors() {
        let req = parse(json!({"name": "too long"}));

        match validate_request(&req, &req.fields(), &["owner", "name"]) {
            Err(ApiError::ValidationError(details)) => {
                assert_eq!(
                    details,
                    vec![
                        ValidationErrorDetail::new("name", "Too long"),
                        ValidationErrorDetail::new("owner", "This field is required."),
                    ]
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_request_passes() {
        let req = parse(json!({}));
        assert!(validate_request(&req, &req.fields(), &[]).is_ok());
        assert!(req.name.is_none());
    }

    #[test]
    fn test_explicit_null_is_rejected() {
        let req = parse(json!({"owner": null, "name": null}));
        assert_eq!(req.owner, Some(None));

        match validate_request(&req, &req.fields(), &[]) {
            Err(ApiError::ValidationError(details)) => {
                assert_eq!(
                    details,
                    vec![
                        ValidationErrorDetail::new("name", "This field may not be null."),
                        ValidationErrorDetail::new("owner", "This field may not be null."),
                    ]
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_text_is_trimmed_before_validation() {
        let req = parse(json!({"name": "  ab \n"}));
        assert_eq!(req.name, Some(Some("ab".to_string())));
        assert!(validate_request(&req, &req.fields(), &[]).is_ok());

        // Whitespace only trims down to empty
        let req = parse(json!({"name": "   "}));
        assert!(validate_request(&req, &req.fields(), &[]).is_err());
    }

    #[test]
    fn test_validate_text_rejects_nul() {
        assert!(validate_text("plain text\nwith lines").is_ok());
        assert!(validate_text("").is_ok());

        let err = validate_text("a\0b").unwrap_err();
        assert_eq!(err.code, "null_character");

        let req = parse(json!({"name": "x\u{0}"}));
        match validate_request(&req, &req.fields(), &[]) {
            Err(ApiError::ValidationError(details)) => {
                assert_eq!(
                    details,
                    vec![ValidationErrorDetail::new("name", "Null characters are not allowed.")]
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_document() {
        assert!(validate_document(&json!({})).is_ok());
        assert!(validate_document(&json!({"theme": "dark", "n": [1, 2]})).is_ok());
        assert!(validate_document(&json!([1, 2])).is_err());
        assert!(validate_document(&json!("text")).is_err());
        assert!(validate_document(&json!(null)).is_err());
    }
}
