//! Deduplicating mesh cache.
//!
//! A key is either resolved (the mesh is stored and handed out by
//! reference) or in flight (a shared future every requester awaits). A load
//! for a key is started at most once while another is in flight. Failures
//! reach every waiter and are not cached, so a later request retries.
//!
//! The procedural base meshes are built when the cache is created and live
//! outside the keyed map.

use std::{
    cell::RefCell,
    collections::HashMap,
    future::Future,
    rc::{Rc, Weak},
};

use futures::{
    future::{LocalBoxFuture, Shared},
    FutureExt,
};

use crate::{
    config::ViewerConfig,
    error::LoadError,
    gfx::{
        geometry::{
            generate_beacon, generate_cone, generate_cube, generate_cylinder, generate_sphere,
            ROUND_SEGMENTS, SPHERE_LATITUDE_SEGMENTS, SPHERE_LONGITUDE_SEGMENTS,
        },
        mesh::{into_handle, Mesh, MeshHandle},
    },
};

/// A load every requester of the same key awaits.
pub type SharedLoad = Shared<LocalBoxFuture<'static, Result<MeshHandle, LoadError>>>;

/// Result of [`MeshCache::get_or_load`].
#[derive(Clone)]
pub enum CacheLookup {
    /// The mesh was already loaded.
    Hit(MeshHandle),
    /// A load is in flight; await it for the mesh.
    Pending(SharedLoad),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub async fn resolve(self) -> Result<MeshHandle, LoadError> {
        match self {
            CacheLookup::Hit(mesh) => Ok(mesh),
            CacheLookup::Pending(load) => load.await,
        }
    }
}

/// The procedural base meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Sphere,
    Box,
    Cylinder,
    Cone,
    Beacon,
}

struct PrimitiveMeshes {
    sphere: MeshHandle,
    cube: MeshHandle,
    cylinder: MeshHandle,
    cone: MeshHandle,
    beacon: MeshHandle,
}

impl PrimitiveMeshes {
    fn build(beacon_size: f32) -> Self {
        Self {
            sphere: into_handle(generate_sphere(
                SPHERE_LONGITUDE_SEGMENTS,
                SPHERE_LATITUDE_SEGMENTS,
            )),
            cube: into_handle(generate_cube()),
            cylinder: into_handle(generate_cylinder(ROUND_SEGMENTS)),
            cone: into_handle(generate_cone(ROUND_SEGMENTS)),
            beacon: into_handle(generate_beacon(beacon_size)),
        }
    }

    fn all(&self) -> [&MeshHandle; 5] {
        [&self.sphere, &self.cube, &self.cylinder, &self.cone, &self.beacon]
    }
}

#[derive(Default)]
struct CacheState {
    meshes: HashMap<String, MeshHandle>,
    pending: HashMap<String, SharedLoad>,
    loads_started: usize,
}

/// Shared, cheaply cloneable mesh cache.
#[derive(Clone)]
pub struct MeshCache {
    state: Rc<RefCell<CacheState>>,
    primitives: Rc<PrimitiveMeshes>,
    keep_meshes: bool,
    verbose: bool,
}

impl MeshCache {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(CacheState::default())),
            primitives: Rc::new(PrimitiveMeshes::build(config.beacon_size)),
            keep_meshes: config.cache_meshes,
            verbose: config.verbose,
        }
    }

    /// Looks `key` up, starting `loader` only when the key is neither
    /// resolved nor in flight.
    ///
    /// `loader` is called outside of any borrow of the cache, so it may use
    /// the cache itself. All waiters of a successful load get the identical
    /// handle.
    pub fn get_or_load<F, Fut>(&self, key: &str, loader: F) -> CacheLookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Mesh, LoadError>> + 'static,
    {
        {
            let state = self.state.borrow();
            if let Some(mesh) = state.meshes.get(key) {
                if self.verbose {
                    log::debug!("mesh cache hit for `{key}`");
                }
                return CacheLookup::Hit(mesh.clone());
            }
            if let Some(load) = state.pending.get(key) {
                if self.verbose {
                    log::debug!("joining in-flight load of `{key}`");
                }
                return CacheLookup::Pending(load.clone());
            }
        }

        if self.verbose {
            log::debug!("loading `{key}`");
        }
        let fut = loader();
        let load = settle(Rc::downgrade(&self.state), key.to_string(), self.keep_meshes, fut)
            .boxed_local()
            .shared();

        let mut state = self.state.borrow_mut();
        state.loads_started += 1;
        state.pending.insert(key.to_string(), load.clone());
        CacheLookup::Pending(load)
    }

    /// Drives a lookup to completion on the current thread.
    pub fn load_blocking(&self, lookup: CacheLookup) -> Result<MeshHandle, LoadError> {
        pollster::block_on(lookup.resolve())
    }

    /// One of the eagerly built base meshes.
    pub fn primitive(&self, kind: Primitive) -> MeshHandle {
        let p = &self.primitives;
        match kind {
            Primitive::Sphere => p.sphere.clone(),
            Primitive::Box => p.cube.clone(),
            Primitive::Cylinder => p.cylinder.clone(),
            Primitive::Cone => p.cone.clone(),
            Primitive::Beacon => p.beacon.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<MeshHandle> {
        self.state.borrow().meshes.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.borrow().meshes.contains_key(key)
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.state.borrow().pending.contains_key(key)
    }

    /// Number of resolved keyed meshes.
    pub fn len(&self) -> usize {
        self.state.borrow().meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of loads started over the cache's lifetime.
    pub fn loads_started(&self) -> usize {
        self.state.borrow().loads_started
    }

    /// Marks every cached and base mesh for a buffer update.
    pub fn mark_all_dirty(&self) {
        for mesh in self.state.borrow().meshes.values() {
            mesh.borrow_mut().mark_dirty();
        }
        for mesh in self.primitives.all() {
            mesh.borrow_mut().mark_dirty();
        }
    }

    /// Drops every resolved keyed mesh. In-flight loads are unaffected.
    pub fn clear(&self) {
        self.state.borrow_mut().meshes.clear();
    }
}

/// Awaits the load, then records its outcome in the cache (if it still
/// exists) before handing the result to the waiters.
async fn settle<Fut>(
    state: Weak<RefCell<CacheState>>,
    key: String,
    keep: bool,
    fut: Fut,
) -> Result<MeshHandle, LoadError>
where
    Fut: Future<Output = Result<Mesh, LoadError>>,
{
    let result = fut.await.map(into_handle);
    if let Some(state) = state.upgrade() {
        let mut state = state.borrow_mut();
        state.pending.remove(&key);
        if let (true, Ok(mesh)) = (keep, &result) {
            state.meshes.insert(key, mesh.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use futures::{
        executor::{block_on, LocalPool},
        future,
        task::LocalSpawnExt,
    };

    const TRIANGLE: &str = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";

    fn triangle() -> Result<Mesh, LoadError> {
        crate::gfx::mesh::parse_off(TRIANGLE, Default::default()).map_err(|source| {
            LoadError::Parse {
                path: "tri.off".to_string(),
                source,
            }
        })
    }

    #[test]
    fn test_concurrent_requests_load_once() {
        let cache = MeshCache::new(&ViewerConfig::default());
        let counter = Rc::new(Cell::new(0));

        let lookups: Vec<CacheLookup> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                cache.get_or_load("tri.off", move || {
                    counter.set(counter.get() + 1);
                    future::ready(triangle())
                })
            })
            .collect();
        assert!(cache.is_pending("tri.off"));

        let meshes: Vec<MeshHandle> = lookups
            .into_iter()
            .map(|l| block_on(l.resolve()).unwrap())
            .collect();

        assert_eq!(counter.get(), 1);
        assert_eq!(cache.loads_started(), 1);
        assert!(meshes.iter().all(|m| Rc::ptr_eq(m, &meshes[0])));
        assert!(!cache.is_pending("tri.off"));

        // Resolved keys are now hits on the same mesh
        let hit = cache.get_or_load("tri.off", || future::ready(triangle()));
        assert!(hit.is_hit());
        assert!(Rc::ptr_eq(&block_on(hit.resolve()).unwrap(), &meshes[0]));
    }

    #[test]
    fn test_waiters_on_a_local_pool_share_one_mesh() {
        let cache = MeshCache::new(&ViewerConfig::default());
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let results: Rc<RefCell<Vec<MeshHandle>>> = Rc::default();

        for _ in 0..4 {
            let lookup = cache.get_or_load("tri.off", || async { triangle() });
            let results = results.clone();
            spawner
                .spawn_local(async move {
                    results.borrow_mut().push(lookup.resolve().await.unwrap());
                })
                .unwrap();
        }
        pool.run();

        let results = results.borrow();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|m| Rc::ptr_eq(m, &results[0])));
        assert_eq!(cache.loads_started(), 1);
    }

    #[test]
    fn test_failure_is_broadcast_and_not_cached() {
        let cache = MeshCache::new(&ViewerConfig::default());
        let fail = || {
            future::ready(Err(LoadError::Fetch {
                path: "bad.off".to_string(),
                reason: "offline".to_string(),
            }))
        };
        let a = cache.get_or_load("bad.off", fail);
        let b = cache.get_or_load("bad.off", fail);
        assert!(block_on(a.resolve()).is_err());
        assert!(block_on(b.resolve()).is_err());
        assert_eq!(cache.loads_started(), 1);
        assert!(!cache.contains("bad.off"));

        // A later request retries
        let retry = cache.get_or_load("bad.off", || future::ready(triangle()));
        assert!(cache.load_blocking(retry).is_ok());
        assert_eq!(cache.loads_started(), 2);
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        let cache = MeshCache::new(&ViewerConfig::default());
        let a = cache.get_or_load("a.off", || future::ready(triangle()));
        let b = cache.get_or_load("b.off", || future::ready(triangle()));
        let (a, b) = block_on(future::join(a.resolve(), b.resolve()));
        assert!(!Rc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_disabled_cache_still_dedups_in_flight() {
        let cache = MeshCache::new(&ViewerConfig::default().with_mesh_cache(false));
        let a = cache.get_or_load("tri.off", || future::ready(triangle()));
        let b = cache.get_or_load("tri.off", || future::ready(triangle()));
        assert_eq!(cache.loads_started(), 1);
        assert!(Rc::ptr_eq(&block_on(a.resolve()).unwrap(), &block_on(b.resolve()).unwrap()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_primitives_are_shared() {
        let cache = MeshCache::new(&ViewerConfig::default().with_beacon_size(0.5));
        assert!(Rc::ptr_eq(
            &cache.primitive(Primitive::Sphere),
            &cache.clone().primitive(Primitive::Sphere)
        ));
        let beacon = cache.primitive(Primitive::Beacon);
        let radius = beacon.borrow().get_bbox().max.y;
        assert!(radius <= 0.5 && radius > 0.4);
    }
}
