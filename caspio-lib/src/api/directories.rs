//! Directory lookups and field schemas

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use serde_json::json;

use super::ApiRequest;
use super::RecordSource;
use super::Transport;
use crate::error::Error;
use crate::error::NotFoundError;
use crate::error::ValidationError;
use crate::model::Directory;
use crate::model::FieldSchema;

pub const DIRECTORIES_ENDPOINT: &str = "/v3/directories";

/// Lists every directory of the account.
pub async fn list_directories<T: Transport + ?Sized>(
    transport: &T,
) -> Result<Vec<Directory>, Error> {
    let response = transport.request(ApiRequest::get(DIRECTORIES_ENDPOINT)).await?;
    Ok(response.into_list::<Directory>()?.into_items())
}

/// Looks up the name of directory `id`, which is also the name of its user table.
pub async fn directory_name<T: Transport + ?Sized>(
    transport: &T,
    id: &str,
) -> Result<String, Error> {
    list_directories(transport)
        .await?
        .into_iter()
        .find(|dir| dir.id == id)
        .map(|dir| dir.name)
        .ok_or_else(|| NotFoundError::Directory { id: id.to_string() }.into())
}

/// Fetches the field schemas of a table, view or directory.
///
/// Directories are looked up first; their fields are those of the user
/// table with the directory's name.
pub async fn fetch_fields<T: Transport + ?Sized>(
    transport: &T,
    source: &RecordSource,
) -> Result<Vec<FieldSchema>, Error> {
    let path = match source {
        RecordSource::Table(name) => format!("/v3/tables/{}/fields", urlencoding::encode(name)),
        RecordSource::View(name) => format!("/v3/views/{}/fields", urlencoding::encode(name)),
        RecordSource::Directory(id) => {
            let name = directory_name(transport, id).await?;
            format!("/v3/tables/{}/fields", urlencoding::encode(&name))
        }
    };

    let response = transport.request(ApiRequest::get(path)).await?;
    Ok(response.into_list::<FieldSchema>()?.into_items())
}

/// Activates a pending directory user, optionally emailing them.
pub async fn activate_user<T: Transport + ?Sized>(
    transport: &T,
    directory_id: &str,
    user_guid: &str,
    send_email: bool,
) -> Result<Value, Error> {
    let user_guid = user_guid.trim();
    if user_guid.is_empty() {
        return Err(ValidationError::MissingIdentifier { what: "User GUID" }.into());
    }

    let path = format!(
        "{}/{}/users/activate",
        DIRECTORIES_ENDPOINT,
        urlencoding::encode(directory_id)
    );
    let request = ApiRequest::post(path).body(json!({
        "UserGUID": user_guid,
        "SendEmail": send_email,
    }));
    log::debug!("activating user {user_guid} in directory {directory_id}");
    transport.request(request).await?.into_value()
}

/// `_`-prefixed identifiers such as `_status` or `_sign_in_method`.
static SYSTEM_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_[a-zA-Z0-9_]+\b").expect("valid system attribute pattern"));

/// Rejects WHERE clauses that mention `_`-prefixed system attributes
/// (`_status`, `_sign_in_method`, ...), which directory updates and deletes
/// do not accept.
///
/// A token counts when the `_` starts a word: `x_status` is a plain field name.
pub fn validate_directory_where(clause: &str) -> Result<(), ValidationError> {
    match SYSTEM_ATTRIBUTE.find(clause) {
        Some(found) => Err(ValidationError::SystemAttributeInWhere {
            attribute: found.as_str().to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::mock::list;
    use crate::response::ApiResponse;

    fn directories() -> MockTransport {
        MockTransport::new(|req| match req.path.as_str() {
            DIRECTORIES_ENDPOINT => list(
                vec![
                    json!({"Id": "d-1", "Name": "Members", "Description": "Site members"}),
                    json!({"Id": "d-2", "Name": "Staff Users"}),
                ],
                None,
            ),
            "/v3/tables/Staff%20Users/fields" => list(
                vec![json!({"Name": "Email", "Type": "STRING"})],
                None,
            ),
            other => panic!("unexpected path {other}"),
        })
    }

    #[tokio::test]
    async fn test_directory_name() {
        let transport = directories();
        assert_eq!(directory_name(&transport, "d-1").await.unwrap(), "Members");

        let err = directory_name(&transport, "d-9").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFoundError::Directory { .. })));
    }

    #[tokio::test]
    async fn test_directory_fields_use_the_user_table() {
        let transport = directories();
        let fields = fetch_fields(&transport, &RecordSource::Directory("d-2".into()))
            .await
            .unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Email");
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_validate_directory_where() {
        assert!(validate_directory_where("Email = 'a@b.c'").is_ok());
        assert!(validate_directory_where("user_status = 1").is_ok());
        assert!(validate_directory_where("Name = '_'").is_ok());

        let err = validate_directory_where("Email = 'x' AND _status = 'Active'").unwrap_err();
        assert_eq!(
            err,
            ValidationError::SystemAttributeInWhere {
                attribute: "_status".to_string()
            }
        );
        assert!(validate_directory_where("(_sign_in_method = 1)").is_err());
    }

    #[test]
    fn test_first_system_attribute_is_reported() {
        assert!(validate_directory_where("Notes LIKE '%a_b%'").is_ok());
        assert_eq!(
            validate_directory_where("_role = 2 OR _status = 1"),
            Err(ValidationError::SystemAttributeInWhere {
                attribute: "_role".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_activate_user() {
        let transport =
            MockTransport::new(|_| Ok(ApiResponse::Json(json!({"Result": "Activated"}))));

        let err = activate_user(&transport, "d-1", "  ", true).await.unwrap_err();
        assert_eq!(err.to_string(), "User GUID is required");
        assert_eq!(transport.call_count(), 0);

        let result = activate_user(&transport, "d 1", "g-42", false).await.unwrap();
        assert_eq!(result["Result"], "Activated");

        let call = &transport.calls()[0];
        assert_eq!(call.method, reqwest::Method::POST);
        assert_eq!(call.path, "/v3/directories/d%201/users/activate");
        assert_eq!(call.body, Some(json!({"UserGUID": "g-42", "SendEmail": false})));
    }
}
