//! Where mesh and scene text comes from.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    path::PathBuf,
    rc::Rc,
};

use futures::{future::LocalBoxFuture, FutureExt};

use crate::{
    error::LoadError,
    gfx::mesh::{Mesh, MeshFormat, OffOptions},
};

/// Asynchronous text fetcher.
///
/// The returned future must not borrow `self`, so fetches can outlive the
/// call that started them.
pub trait AssetSource {
    fn fetch(&self, path: &str) -> LocalBoxFuture<'static, Result<String, LoadError>>;
}

/// Reads files below a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FileSource {
    fn fetch(&self, path: &str) -> LocalBoxFuture<'static, Result<String, LoadError>> {
        let full = self.root.join(path);
        let path = path.to_string();
        async move {
            std::fs::read_to_string(&full).map_err(|e| LoadError::Fetch {
                path,
                reason: e.to_string(),
            })
        }
        .boxed_local()
    }
}

/// Serves text from an in-memory map and counts fetches.
///
/// Clones share the same files and counter.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Rc<RefCell<HashMap<String, String>>>,
    fetches: Rc<Cell<usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, text: impl Into<String>) {
        self.files.borrow_mut().insert(path.to_string(), text.into());
    }

    pub fn with_file(self, path: &str, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> LocalBoxFuture<'static, Result<String, LoadError>> {
        self.fetches.set(self.fetches.get() + 1);
        let result = self
            .files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::Fetch {
                path: path.to_string(),
                reason: "no such file".to_string(),
            });
        async move { result }.boxed_local()
    }
}

/// Fetches `path` and parses it according to its extension.
pub fn load_mesh_file(
    source: &dyn AssetSource,
    path: &str,
    options: OffOptions,
) -> LocalBoxFuture<'static, Result<Mesh, LoadError>> {
    let path = path.to_string();
    let format = match MeshFormat::from_path(&path) {
        Ok(format) => format,
        Err(source) => return async move { Err(LoadError::Parse { path, source }) }.boxed_local(),
    };
    let fetch = source.fetch(&path);
    async move {
        let text = fetch.await?;
        format
            .parse(&text, options)
            .map_err(|source| LoadError::Parse { path, source })
    }
    .boxed_local()
}
