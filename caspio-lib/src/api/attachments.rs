//! Attachment fields of table and view records.

use super::ApiRequest;
use super::RecordSelector;
use super::RecordSource;
use super::Transport;
use super::query::QueryParams;
use super::query::keys;
use crate::error::Error;
use crate::error::NotFoundError;
use crate::error::ValidationError;
use crate::model::AttachmentInfo;
use crate::model::DownloadedAttachment;
use crate::response::WriteResponse;

/// One attachment field of a table or view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentField {
    source: RecordSource,
    field: String,
}

impl AttachmentField {
    pub fn table(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            source: RecordSource::Table(table.into()),
            field: field.into(),
        }
    }

    pub fn view(view: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            source: RecordSource::View(view.into()),
            field: field.into(),
        }
    }

    pub fn source(&self) -> &RecordSource {
        &self.source
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// `/v3/{tables|views}/{name}/attachments/{field}`
    pub fn path(&self) -> String {
        let collection = match self.source {
            RecordSource::View(_) => "views",
            _ => "tables",
        };
        format!(
            "/v3/{}/{}/attachments/{}",
            collection,
            urlencoding::encode(self.source.name()),
            urlencoding::encode(&self.field)
        )
    }
}

/// Lists attachment metadata of the records matching `selector`, or of every
/// record when there is none.
pub async fn list_attachments<T: Transport + ?Sized>(
    transport: &T,
    attachment: &AttachmentField,
    selector: Option<&RecordSelector>,
) -> Result<Vec<AttachmentInfo>, Error> {
    let mut query = QueryParams::new();
    if let Some(selector) = selector {
        query.set("where", selector.where_clause(&attachment.source, "list")?);
    }

    let request = ApiRequest::get(format!("{}/fileInfo", attachment.path())).query(query);
    Ok(transport
        .request(request)
        .await?
        .into_list::<AttachmentInfo>()?
        .into_items())
}

/// Downloads the attachment stored in record `record_id` (its `PK_ID`).
pub async fn download_attachment<T: Transport + ?Sized>(
    transport: &T,
    attachment: &AttachmentField,
    record_id: &str,
) -> Result<DownloadedAttachment, Error> {
    let record_id = record_id.trim();
    if record_id.is_empty() {
        return Err(ValidationError::MissingIdentifier { what: "Record ID" }.into());
    }
    let base = attachment.path();

    let metadata = ApiRequest::get(format!("{base}/fileInfo"))
        .query(QueryParams::new().with(keys::WHERE, format!("PK_ID={record_id}")));
    let info = transport
        .request(metadata)
        .await?
        .into_list::<AttachmentInfo>()?
        .into_items()
        .into_iter()
        .next()
        .ok_or_else(|| NotFoundError::Attachment {
            record_id: record_id.to_string(),
        })?;

    let content = ApiRequest::get(format!("{base}/{}", urlencoding::encode(record_id))).binary();
    let data = transport.request(content).await?.into_bytes()?;

    log::debug!(
        "downloaded attachment {} of record {} ({} bytes)",
        info.display_name(),
        record_id,
        data.len()
    );
    Ok(DownloadedAttachment {
        record_id: record_id.to_string(),
        info,
        data,
    })
}

/// Clears the attachment field of every table record matching `selector`.
pub async fn delete_attachments<T: Transport + ?Sized>(
    transport: &T,
    attachment: &AttachmentField,
    selector: &RecordSelector,
) -> Result<WriteResponse, Error> {
    if let RecordSource::View(view) = &attachment.source {
        return Err(ValidationError::ReadOnlyAttachments { view: view.clone() }.into());
    }
    let clause = selector.where_clause(&attachment.source, "delete")?;

    let request = ApiRequest::delete(attachment.path())
        .query(QueryParams::new().with("where", clause));
    transport.request(request).await?.into_write()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::mock::list;
    use crate::api::query::FilterCondition;
    use crate::response::ApiResponse;

    #[test]
    fn test_paths_are_encoded() {
        assert_eq!(
            AttachmentField::table("Job Files", "Résumé").path(),
            "/v3/tables/Job%20Files/attachments/R%C3%A9sum%C3%A9"
        );
        assert_eq!(
            AttachmentField::view("Open", "Doc").path(),
            "/v3/views/Open/attachments/Doc"
        );
    }

    #[tokio::test]
    async fn test_list_with_and_without_selector() {
        let transport = MockTransport::new(|_| {
            list(vec![json!({"FileName": "a", "FileType": "pdf", "PK_ID": 1})], None)
        });
        let field = AttachmentField::view("Open", "Doc");

        let all = list_attachments(&transport, &field, None).await.unwrap();
        assert_eq!(all[0].display_name(), "a.pdf");
        assert_eq!(all[0].extra["PK_ID"], json!(1));

        let selector =
            RecordSelector::Filters(vec![FilterCondition::new("PK_ID", "equals", "1")]);
        list_attachments(&transport, &field, Some(&selector)).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].path, "/v3/views/Open/attachments/Doc/fileInfo");
        assert!(calls[0].query.is_empty());
        assert_eq!(calls[1].query.get("where"), Some("PK_ID = '1'"));
    }

    #[tokio::test]
    async fn test_download() {
        let transport = MockTransport::new(|req| {
            if req.path.ends_with("/fileInfo") {
                list(vec![json!({"FileName": "cv", "FileType": "pdf", "Size": 2})], None)
            } else {
                assert!(req.binary);
                Ok(ApiResponse::Binary(vec![7, 8]))
            }
        });

        let file = download_attachment(&transport, &AttachmentField::table("Jobs", "CV"), "15")
            .await
            .unwrap();
        assert_eq!(file.info.display_name(), "cv.pdf");
        assert_eq!(file.data, vec![7, 8]);

        let calls = transport.calls();
        assert_eq!(calls[0].query.get(keys::WHERE), Some("PK_ID=15"));
        assert_eq!(calls[1].path, "/v3/tables/Jobs/attachments/CV/15");
    }

    #[tokio::test]
    async fn test_download_without_metadata() {
        let transport = MockTransport::new(|_| list(vec![], None));

        let err = download_attachment(&transport, &AttachmentField::table("Jobs", "CV"), "9")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No attachment found for record 9");
        assert_eq!(transport.call_count(), 1);

        let err = download_attachment(&transport, &AttachmentField::table("Jobs", "CV"), " ")
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_delete() {
        let transport =
            MockTransport::new(|_| Ok(ApiResponse::Json(json!({"RecordsAffected": 2}))));
        let field = AttachmentField::table("Jobs", "CV");

        let err = delete_attachments(&transport, &field, &RecordSelector::Where("  ".into()))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = delete_attachments(
            &transport,
            &AttachmentField::view("Open", "Doc"),
            &RecordSelector::Where("PK_ID = 1".into()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Attachments of view \"Open\" are read-only");
        assert_eq!(transport.call_count(), 0);

        let selector = RecordSelector::Where("PK_ID < 3".into());
        let deleted = delete_attachments(&transport, &field, &selector).await.unwrap();
        assert_eq!(deleted.records_affected, Some(2));

        let call = &transport.calls()[0];
        assert_eq!(call.method, reqwest::Method::DELETE);
        assert_eq!(call.query.get("where"), Some("PK_ID < 3"));
    }
}
