//! File and folder listings, and file download.

use super::ApiRequest;
use super::FolderRef;
use super::FolderResolver;
use super::ListingSort;
use super::SubtreeKind;
use super::Transport;
use super::TraversalLimits;
use super::fetch_list;
use super::folders::FILES_ENDPOINT;
use super::query::MAX_PAGE_SIZE;
use super::query::MIN_PAGE_SIZE;
use super::query::QueryParams;
use super::query::keys;
use crate::error::Error;
use crate::error::NotFoundError;
use crate::model::DownloadedFile;
use crate::model::FileInfo;
use crate::model::Record;

/// How a basic listing walks the folder tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Direct children only, optionally sorted by the backend.
    Flat(Option<ListingSort>),
    /// The whole subtree, unsorted.
    Recursive(TraversalLimits),
}

impl Default for Listing {
    fn default() -> Self {
        Self::Flat(Some(ListingSort::asc("Name")))
    }
}

/// A listing written directly in the file endpoints' parameters.
///
/// Blank values are omitted. A page size below 5 is ignored; above 1000 it
/// is capped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedListing {
    pub external_key: String,
    pub sort_field: String,
    pub sort_descending: bool,
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

impl AdvancedListing {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .set_trimmed(keys::EXTERNAL_KEY, &self.external_key)
            .set_trimmed(keys::SORT_FIELD, &self.sort_field);

        if self.sort_descending {
            params.set(keys::SORT_DESCENDING, true);
        }
        if let Some(n) = self.page_number.filter(|n| *n > 0) {
            params.set(keys::PLAIN_PAGE_NUMBER, n);
        }
        if let Some(size) = self.page_size.filter(|n| *n >= MIN_PAGE_SIZE) {
            params.set(keys::PLAIN_PAGE_SIZE, size.min(MAX_PAGE_SIZE));
        }
        params
    }
}

/// Lists files in `folder`.
pub async fn list_files<T: Transport + ?Sized>(
    transport: &T,
    folder: &FolderRef,
    listing: &Listing,
) -> Result<Vec<Record>, Error> {
    list_entries(transport, SubtreeKind::Files, folder, listing).await
}

/// Lists folders in `folder`.
pub async fn list_folders<T: Transport + ?Sized>(
    transport: &T,
    folder: &FolderRef,
    listing: &Listing,
) -> Result<Vec<Record>, Error> {
    list_entries(transport, SubtreeKind::Folders, folder, listing).await
}

async fn list_entries<T: Transport + ?Sized>(
    transport: &T,
    kind: SubtreeKind,
    folder: &FolderRef,
    listing: &Listing,
) -> Result<Vec<Record>, Error> {
    let resolver = FolderResolver::new(transport);
    // Path errors keep their own message; only listing failures are described.
    let key = resolver.resolve(folder).await?;

    let result = match listing {
        Listing::Flat(sort) => resolver.list_flat(key.as_deref(), kind, sort.as_ref()).await,
        Listing::Recursive(limits) => resolver.list_subtree(key.as_deref(), kind, *limits).await,
    };
    result.map_err(|e| describe_listing_error(e, kind))
}

/// Sends one listing request with caller-supplied parameters.
pub async fn list_advanced<T: Transport + ?Sized>(
    transport: &T,
    kind: SubtreeKind,
    listing: &AdvancedListing,
) -> Result<Vec<Record>, Error> {
    fetch_list(transport, kind.endpoint(), &listing.to_params())
        .await
        .map_err(|e| describe_listing_error(e, kind))
}

fn describe_listing_error(error: Error, kind: SubtreeKind) -> Error {
    let description = match (kind, error.status_code()) {
        (SubtreeKind::Files, Some(404)) => concat!(
            "The specified folder was not found. ",
            "Please check the folder selection and try again."
        ),
        (SubtreeKind::Folders, Some(404)) => concat!(
            "The specified parent folder was not found. ",
            "Please check the folder selection and try again."
        ),
        (SubtreeKind::Files, Some(400)) => concat!(
            "Invalid query parameters. ",
            "Please check your folder selection, sorting options, and syntax."
        ),
        (SubtreeKind::Folders, Some(400)) => concat!(
            "Invalid query parameters. ",
            "Please check your parent folder selection, sorting options, and syntax."
        ),
        (SubtreeKind::Files, Some(401 | 403)) => {
            "Authentication failed or insufficient permissions to access files."
        }
        (SubtreeKind::Folders, Some(401 | 403)) => {
            "Authentication failed or insufficient permissions to access folders."
        }
        _ => return error,
    };
    error.describe(description)
}

/// A stored file, by external key or by full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    Key(String),
    Path(String),
}

impl FileRef {
    /// Content path and query addressing this file.
    fn locate(&self) -> (String, QueryParams) {
        match self {
            Self::Key(key) => (
                format!("{}/{}", FILES_ENDPOINT, urlencoding::encode(key)),
                QueryParams::new(),
            ),
            Self::Path(path) => (
                format!("{}/path", FILES_ENDPOINT),
                QueryParams::new().with("filePath", path),
            ),
        }
    }

    fn reference(&self) -> &str {
        match self {
            Self::Key(reference) | Self::Path(reference) => reference,
        }
    }
}

/// Fetches a file's metadata and then its content.
pub async fn download_file<T: Transport + ?Sized>(
    transport: &T,
    file: &FileRef,
) -> Result<DownloadedFile, Error> {
    let (content_path, query) = file.locate();

    let info: FileInfo = transport
        .request(ApiRequest::get(format!("{content_path}/fileInfo")).query(query.clone()))
        .await?
        .into_single()?
        .ok_or_else(|| NotFoundError::File {
            reference: file.reference().to_string(),
        })?;

    let data = transport
        .request(ApiRequest::get(content_path).query(query).binary())
        .await?
        .into_bytes()?;

    log::debug!("downloaded {} ({} bytes)", info.name, data.len());
    Ok(DownloadedFile { info, data })
}

/// Deletes a stored file.
pub async fn delete_file<T: Transport + ?Sized>(
    transport: &T,
    file: &FileRef,
) -> Result<(), Error> {
    let (path, query) = file.locate();
    transport.request(ApiRequest::delete(path).query(query)).await?;

    log::debug!("deleted file {}", file.reference());
    Ok(())
}
