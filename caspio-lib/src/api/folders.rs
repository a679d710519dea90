//! Folder path resolution and subtree listing over the file storage API.

use super::Paginator;
use super::Transport;
use super::query::PageKeys;
use super::query::QueryParams;
use super::query::keys;
use crate::error::Error;
use crate::error::LimitExceededError;
use crate::error::NotFoundError;
use crate::model::FolderNode;
use crate::model::Record;

pub const FILES_ENDPOINT: &str = "/v3/files";
pub const FOLDERS_ENDPOINT: &str = "/v3/files/folders";

/// A folder given either by `/`-separated name path or by external key.
///
/// Empty values (and the path `/`) mean the root folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderRef {
    Path(String),
    Key(String),
}

impl FolderRef {
    pub fn root() -> Self {
        Self::Key(String::new())
    }
}

impl Default for FolderRef {
    fn default() -> Self {
        Self::root()
    }
}

/// What a listing collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtreeKind {
    Files,
    Folders,
}

impl SubtreeKind {
    pub(crate) fn endpoint(self) -> &'static str {
        match self {
            Self::Files => FILES_ENDPOINT,
            Self::Folders => FOLDERS_ENDPOINT,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::Folders => "folders",
        }
    }
}

/// Server-side ordering for a flat listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSort {
    /// e.g. `Name`, `Size`, `DateCreated`, `LastModified`, `ContentType`.
    pub field: String,
    pub descending: bool,
}

impl ListingSort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Safety bounds of a recursive listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Folders at this depth below the start folder are not visited.
    pub max_depth: usize,
    /// Collecting this many entries aborts the listing.
    pub max_count: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_count: 50_000,
        }
    }
}

impl TraversalLimits {
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_count(mut self, count: usize) -> Self {
        self.max_count = count;
        self
    }
}

/// Resolves folder paths to keys and enumerates folder contents.
///
/// # Example
///
/// ```ignore
/// let resolver = FolderResolver::new(&client);
/// let key = resolver.resolve_path("Documents/2024/Reports").await?;
/// let files = resolver
///     .list_subtree(key.as_deref(), SubtreeKind::Files, TraversalLimits::default())
///     .await?;
/// ```
pub struct FolderResolver<'a, T: ?Sized> {
    transport: &'a T,
    paginator: Paginator,
}

impl<'a, T: Transport + ?Sized> FolderResolver<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            paginator: Paginator::new().keys(PageKeys::Plain),
        }
    }

    /// Replaces the paginator used for folder and file listings.
    ///
    /// The page keys are always the plain file-endpoint keys.
    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator.keys(PageKeys::Plain);
        self
    }

    /// Resolves `path` to the external key of the folder it names.
    ///
    /// Returns `None` for the root (empty, whitespace or `/`). Segments are
    /// trimmed and empty segments are skipped, so `" A//B/ "` is `A/B`.
    pub async fn resolve_path(&self, path: &str) -> Result<Option<String>, Error> {
        let path = path.trim();
        if path.is_empty() || path == "/" {
            return Ok(None);
        }

        let mut current: Option<String> = None;
        let mut traversed: Vec<&str> = Vec::new();

        for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            let Some(found) = self.find_child(current.as_deref(), segment).await? else {
                let prefix = if traversed.is_empty() {
                    "(root)".to_string()
                } else {
                    traversed.join("/")
                };
                return Err(NotFoundError::PathSegment {
                    segment: segment.to_string(),
                    prefix,
                }
                .into());
            };

            log::debug!("resolved folder segment {:?} to {}", segment, found.external_key);
            current = Some(found.external_key);
            traversed.push(segment);
        }

        Ok(current)
    }

    /// Resolves a [`FolderRef`] to an external key; `None` is the root.
    pub async fn resolve(&self, folder: &FolderRef) -> Result<Option<String>, Error> {
        match folder {
            FolderRef::Path(path) => self.resolve_path(path).await,
            FolderRef::Key(key) => {
                let key = key.trim();
                Ok((!key.is_empty()).then(|| key.to_string()))
            }
        }
    }

    /// Lists the direct files or subfolders of one folder.
    pub async fn list_flat(
        &self,
        folder_key: Option<&str>,
        kind: SubtreeKind,
        sort: Option<&ListingSort>,
    ) -> Result<Vec<Record>, Error> {
        let mut query = folder_query(folder_key);
        if let Some(sort) = sort {
            query.set_trimmed(keys::SORT_FIELD, &sort.field);
            query.set(keys::SORT_DESCENDING, sort.descending);
        }
        self.paginator
            .fetch_all(self.transport, kind.endpoint(), &query)
            .await
    }

    /// Lists every file or folder below `root_key`, depth first.
    ///
    /// A folder's entries always come before the entries of its subfolders,
    /// and a subfolder's whole subtree comes before its next sibling's.
    pub async fn list_subtree(
        &self,
        root_key: Option<&str>,
        kind: SubtreeKind,
        limits: TraversalLimits,
    ) -> Result<Vec<Record>, Error> {
        let mut stack: Vec<(Option<String>, usize)> = vec![(root_key.map(str::to_string), 0)];
        let mut collected: Vec<Record> = Vec::new();

        while let Some((key, depth)) = stack.pop() {
            if depth >= limits.max_depth {
                return Err(LimitExceededError::Depth {
                    max_depth: limits.max_depth,
                }
                .into());
            }

            if kind == SubtreeKind::Files {
                let files = self.list_flat(key.as_deref(), SubtreeKind::Files, None).await?;
                append_bounded(&mut collected, files, limits.max_count)?;
            }

            let folders = self
                .list_flat(key.as_deref(), SubtreeKind::Folders, None)
                .await?;
            let children = folders
                .iter()
                .map(|record| FolderNode::from_record(record).map(|node| node.external_key))
                .collect::<Result<Vec<_>, _>>()?;

            if kind == SubtreeKind::Folders {
                append_bounded(&mut collected, folders, limits.max_count)?;
            }

            log::debug!(
                "listed folder {} at depth {}: {} {} so far, {} subfolders",
                key.as_deref().unwrap_or("(root)"),
                depth,
                collected.len(),
                kind.noun(),
                children.len()
            );

            stack.extend(children.into_iter().rev().map(|child| (Some(child), depth + 1)));
        }

        Ok(collected)
    }

    /// Scans `parent`'s subfolders page by page for an exact name match.
    async fn find_child(
        &self,
        parent: Option<&str>,
        name: &str,
    ) -> Result<Option<FolderNode>, Error> {
        let query = folder_query(parent);
        let mut pages = self.paginator.pages(self.transport, FOLDERS_ENDPOINT, &query);

        while let Some(page) = pages.next().await {
            for record in page?.records() {
                let node = FolderNode::from_record(record)?;
                if node.name == name {
                    return Ok(Some(node));
                }
            }
        }

        Ok(None)
    }
}

fn folder_query(folder_key: Option<&str>) -> QueryParams {
    let mut query = QueryParams::new();
    if let Some(key) = folder_key {
        query.set_trimmed(keys::EXTERNAL_KEY, key);
    }
    query
}

fn append_bounded(
    collected: &mut Vec<Record>,
    entries: Vec<Record>,
    max_count: usize,
) -> Result<(), Error> {
    collected.extend(entries);
    if collected.len() >= max_count {
        return Err(LimitExceededError::Count { max_count }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::Value;
    use serde_json::json;

    use super::*;
    use crate::api::ApiRequest;
    use crate::api::mock::MockTransport;
    use crate::api::mock::list;
    use crate::error::ApiError;
    use crate::response::ApiResponse;

    fn folder(name: &str, key: &str) -> Value {
        json!({ "Name": name, "ExternalKey": key })
    }

    fn file(name: &str) -> Value {
        json!({ "Name": name })
    }

    /// A file tree keyed by parent folder key (`""` is the root).
    struct Tree {
        folders: HashMap<String, Vec<Value>>,
        files: HashMap<String, Vec<Value>>,
    }

    impl Tree {
        fn respond(&self, req: &ApiRequest) -> Result<ApiResponse, Error> {
            let parent = req.query.get(keys::EXTERNAL_KEY).unwrap_or("").to_string();
            let source = if req.path == FOLDERS_ENDPOINT {
                &self.folders
            } else {
                &self.files
            };
            list(source.get(&parent).cloned().unwrap_or_default(), None)
        }
    }

    fn sample_tree() -> Tree {
        let folders = HashMap::from([
            ("".to_string(), vec![folder("A", "ka"), folder("Z", "kz")]),
            ("ka".to_string(), vec![folder("B", "kb")]),
            ("kb".to_string(), vec![folder("C", "kc")]),
        ]);
        let files = HashMap::from([
            ("".to_string(), vec![file("root.txt")]),
            ("ka".to_string(), vec![file("a1.txt"), file("a2.txt")]),
            ("kc".to_string(), vec![file("c.txt")]),
            ("kz".to_string(), vec![file("z.txt")]),
        ]);
        Tree { folders, files }
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r["Name"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_resolve_path() {
        let tree = sample_tree();
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        assert_eq!(resolver.resolve_path("A/B/C").await.unwrap().as_deref(), Some("kc"));
        assert_eq!(resolver.resolve_path(" A // B ").await.unwrap().as_deref(), Some("kb"));
        assert_eq!(resolver.resolve_path("/").await.unwrap(), None);
        assert_eq!(resolver.resolve_path("   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_path_names_missing_segment() {
        let tree = Tree {
            folders: HashMap::from([("".to_string(), vec![folder("A", "ka")])]),
            files: HashMap::new(),
        };
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        let err = resolver.resolve_path("A/B/C").await.unwrap_err();
        match err {
            Error::NotFound(NotFoundError::PathSegment { segment, prefix }) => {
                assert_eq!(segment, "B");
                assert_eq!(prefix, "A");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = resolver.resolve_path("Q").await.unwrap_err();
        assert_eq!(err.to_string(), "Segment \"Q\" not found under (root)");
    }

    #[tokio::test]
    async fn test_resolve_stops_scanning_at_first_match() {
        let transport = MockTransport::new(|req| {
            let page: usize = req.query.get("pageNumber").unwrap().parse().unwrap();
            let entries = (0..5)
                .map(|i| folder(&format!("F{}", (page - 1) * 5 + i), &format!("k{page}{i}")))
                .collect();
            list(entries, Some(100))
        });
        let resolver =
            FolderResolver::new(&transport).with_paginator(Paginator::new().page_size(5));

        let key = resolver.resolve_path("F7").await.unwrap();
        assert_eq!(key.as_deref(), Some("k22"));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_resolve_ref() {
        let transport = MockTransport::new(|_| list(vec![], None));
        let resolver = FolderResolver::new(&transport);

        let key = resolver.resolve(&FolderRef::Key(" k1 ".into())).await.unwrap();
        assert_eq!(key.as_deref(), Some("k1"));
        assert_eq!(resolver.resolve(&FolderRef::root()).await.unwrap(), None);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_list_subtree_files_order() {
        let tree = sample_tree();
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        let files = resolver
            .list_subtree(None, SubtreeKind::Files, TraversalLimits::default())
            .await
            .unwrap();
        assert_eq!(
            names(&files),
            vec!["root.txt", "a1.txt", "a2.txt", "c.txt", "z.txt"]
        );
    }

    #[tokio::test]
    async fn test_list_subtree_folders_order() {
        let tree = sample_tree();
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        let folders = resolver
            .list_subtree(None, SubtreeKind::Folders, TraversalLimits::default())
            .await
            .unwrap();
        assert_eq!(names(&folders), vec!["A", "Z", "B", "C"]);

        let below_a = resolver
            .list_subtree(Some("ka"), SubtreeKind::Folders, TraversalLimits::default())
            .await
            .unwrap();
        assert_eq!(names(&below_a), vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_list_subtree_depth_limit() {
        // root -> k1 -> ... -> k11
        let folders: HashMap<String, Vec<Value>> = (0..11)
            .map(|i| {
                let parent = if i == 0 { String::new() } else { format!("k{i}") };
                (parent, vec![folder(&format!("L{}", i + 1), &format!("k{}", i + 1))])
            })
            .collect();
        let tree = Tree {
            folders,
            files: HashMap::new(),
        };
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        let err = resolver
            .list_subtree(None, SubtreeKind::Files, TraversalLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::LimitExceeded(LimitExceededError::Depth { max_depth: 10 })
        ));

        let shallow = resolver
            .list_subtree(None, SubtreeKind::Folders, TraversalLimits::default().max_depth(20))
            .await
            .unwrap();
        assert_eq!(shallow.len(), 11);
    }

    #[tokio::test]
    async fn test_list_subtree_count_limit() {
        let tree = sample_tree();
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        let err = resolver
            .list_subtree(None, SubtreeKind::Files, TraversalLimits::default().max_count(3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::LimitExceeded(LimitExceededError::Count { max_count: 3 })
        ));
    }

    #[tokio::test]
    async fn test_numeric_folder_keys_are_followed() {
        let tree = Tree {
            folders: HashMap::from([(
                "".to_string(),
                vec![json!({ "Name": "A", "ExternalKey": 42 })],
            )]),
            files: HashMap::from([("42".to_string(), vec![file("inside.txt")])]),
        };
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        assert_eq!(resolver.resolve_path("A").await.unwrap().as_deref(), Some("42"));

        let files = resolver
            .list_subtree(None, SubtreeKind::Files, TraversalLimits::default())
            .await
            .unwrap();
        assert_eq!(names(&files), vec!["inside.txt"]);
    }

    #[tokio::test]
    async fn test_folder_without_key_fails_the_listing() {
        let tree = Tree {
            folders: HashMap::from([("".to_string(), vec![json!({ "Name": "A" })])]),
            files: HashMap::new(),
        };
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        let err = resolver
            .list_subtree(None, SubtreeKind::Folders, TraversalLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Parse { .. })));

        let err = resolver.resolve_path("A").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_list_flat_sorts() {
        let tree = sample_tree();
        let transport = MockTransport::new(move |req| tree.respond(req));
        let resolver = FolderResolver::new(&transport);

        let files = resolver
            .list_flat(Some("ka"), SubtreeKind::Files, Some(&ListingSort::desc("Size")))
            .await
            .unwrap();
        assert_eq!(files.len(), 2);

        let call = &transport.calls()[0];
        assert_eq!(call.path, FILES_ENDPOINT);
        assert_eq!(call.query.get(keys::EXTERNAL_KEY), Some("ka"));
        assert_eq!(call.query.get(keys::SORT_FIELD), Some("Size"));
        assert_eq!(call.query.get(keys::SORT_DESCENDING), Some("true"));
        assert_eq!(call.query.get("pageSize"), Some("1000"));
    }
}
