use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

// --- Domain Models (Mapped to DB) ---

#[derive(Debug, Serialize, FromRow, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub author_id: i64,
    pub author_name: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A to-do joined with its author.
#[derive(Debug, Serialize, FromRow, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(skip)] // never sent back to clients
    pub password: String,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub author_id: i64,
    pub author_name: String,
    pub email: Option<String>,
}

/// List row: the columns shown on a page of results.
#[derive(Debug, Serialize, FromRow, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoSummary {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub author_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// --- Request DTOs ---

pub const DEFAULT_AUTHOR_NAME: &str = "unknown";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    #[validate(custom(function = "password_format"))]
    pub password: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email)]
    pub email: Option<String>,
}

/// Partial update. `password` must match the stored one; absent fields keep
/// their current value. A present but empty `description` clears it.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordCheck {
    pub verified: bool,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuthorQuery {
    pub author_name: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("title must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// 8 to 20 ASCII letters and digits, with at least one of each.
fn password_format(value: &str) -> Result<(), ValidationError> {
    let valid = (8..=20).contains(&value.len())
        && value.chars().all(|c| c.is_ascii_alphanumeric())
        && value.chars().any(|c| c.is_ascii_alphabetic())
        && value.chars().any(|c| c.is_ascii_digit());
    if !valid {
        let mut err = ValidationError::new("password_format");
        err.message =
            Some("password must be 8-20 letters and digits, with at least one of each".into());
        return Err(err);
    }
    Ok(())
}

/// HTML forms submit untouched inputs as `""`; treat those as absent.
fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => T::from_str(s).map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(password: &str) -> CreateTodo {
        CreateTodo {
            title: "Buy milk".to_string(),
            description: None,
            password: password.to_string(),
            due_date: None,
            author_name: None,
            email: None,
        }
    }

    #[test]
    fn password_needs_letters_and_digits() {
        assert!(create("abcd1234").validate().is_ok());
        assert!(create("abcdefgh").validate().is_err());
        assert!(create("12345678").validate().is_err());
        assert!(create("ab12").validate().is_err());
        assert!(create("abcd1234!").validate().is_err());
        assert!(create("abcdefghij1234567890x").validate().is_err());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut dto = create("abcd1234");
        dto.title = "   ".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut dto = create("abcd1234");
        dto.email = Some("not-an-email".to_string());
        assert!(dto.validate().is_err());
    }

    #[test]
    fn empty_form_fields_deserialize_as_none() {
        let dto: CreateTodo = serde_json::from_str(
            r#"{"title":"t","password":"abcd1234","dueDate":"","email":"","authorName":""}"#,
        )
        .unwrap();
        assert!(dto.due_date.is_none());
        assert!(dto.email.is_none());
        assert!(dto.author_name.is_none());
    }

    #[test]
    fn due_date_parses_iso_dates() {
        let dto: UpdateTodo =
            serde_json::from_str(r#"{"password":"abcd1234","dueDate":"2025-03-01"}"#).unwrap();
        assert_eq!(dto.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(dto.title.is_none());
        assert!(dto.completed.is_none());
    }

    #[test]
    fn update_keeps_empty_description() {
        let dto: UpdateTodo =
            serde_json::from_str(r#"{"password":"abcd1234","description":""}"#).unwrap();
        assert_eq!(dto.description.as_deref(), Some(""));

        let dto: UpdateTodo = serde_json::from_str(r#"{"password":"abcd1234"}"#).unwrap();
        assert!(dto.description.is_none());
    }

    #[test]
    fn todo_serialization_omits_password() {
        let now = chrono::Utc::now().naive_utc();
        let todo = Todo {
            id: 1,
            title: "t".to_string(),
            description: None,
            password: "abcd1234".to_string(),
            completed: false,
            due_date: None,
            created_at: now,
            updated_at: now,
            author_id: 1,
            author_name: "kim".to_string(),
            email: None,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["authorName"], "kim");
    }
}
