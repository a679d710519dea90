//! Data import/export tasks.

use serde_json::Value;

use super::ApiRequest;
use super::Transport;
use crate::error::Error;
use crate::error::ValidationError;
use crate::model::Record;

pub const TASKS_ENDPOINT: &str = "/v3/dataImportExportTasks";

/// Lists the account's import/export tasks.
pub async fn list_tasks<T: Transport + ?Sized>(transport: &T) -> Result<Vec<Record>, Error> {
    let response = transport.request(ApiRequest::get(TASKS_ENDPOINT)).await?;
    Ok(response.into_list::<Record>()?.into_items())
}

/// Starts task `external_key` and returns the backend's reply.
pub async fn run_task<T: Transport + ?Sized>(
    transport: &T,
    external_key: &str,
) -> Result<Value, Error> {
    let external_key = external_key.trim();
    if external_key.is_empty() {
        return Err(ValidationError::MissingIdentifier {
            what: "Task external key",
        }
        .into());
    }

    let path = format!("{}/{}/run", TASKS_ENDPOINT, urlencoding::encode(external_key));
    log::debug!("running import/export task {external_key}");
    transport.request(ApiRequest::post(path)).await?.into_value()
}
