use std::{
    cell::{Cell, RefCell},
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    rc::{Rc, Weak},
};

use cgmath::{Matrix4, Quaternion, SquareMatrix, Vector3};
use futures::{
    executor::LocalSpawner,
    future::{self, LocalBoxFuture},
    task::LocalSpawnExt,
};

use crate::{
    config::ViewerConfig,
    error::{LoadError, RenderError, SpecError},
    gfx::{
        camera::{matrix4_from_row_major, Camera},
        mesh::{into_handle, parse_off, Mesh, OffOptions},
        rendering::{Canvas, RenderBackend},
        resources::material::{MaterialManager, DEFAULT_MATERIAL},
    },
    loader::{load_mesh_file, AssetSource, CacheLookup, MeshCache, Primitive},
};

use super::{
    light::Light,
    node::{
        corrective_matrix, mark_meshes_dirty, render_tree, scene_string, AttachedChildren,
        MeshSlot, SceneNode, Shape, ShapeKind,
    },
    spec::{NodeSpec, SceneSpec, ShapeKindSpec, ShapeSpec},
};

pub const UNTITLED_SCENE: &str = "Untitled Scene";

/// Shared flag asking the viewer to draw another frame.
#[derive(Debug, Clone, Default)]
pub struct RepaintSignal(Rc<Cell<bool>>);

impl RepaintSignal {
    pub fn request(&self) {
        self.0.set(true);
    }

    /// Returns whether a repaint was requested and clears the request.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Everything shape resolution needs: where meshes come from, where loads
/// run and whom to tell when they finish.
#[derive(Clone)]
pub struct SceneContext {
    pub cache: MeshCache,
    pub source: Rc<dyn AssetSource>,
    pub spawner: LocalSpawner,
    pub repaint: RepaintSignal,
    pub off_options: OffOptions,
    /// Material table of the scene being built
    pub materials: Rc<RefCell<MaterialManager>>,
    meshes_path: String,
    verbose: bool,
}

impl SceneContext {
    pub fn new(
        config: &ViewerConfig,
        cache: MeshCache,
        source: Rc<dyn AssetSource>,
        spawner: LocalSpawner,
        repaint: RepaintSignal,
    ) -> Self {
        Self {
            cache,
            source,
            spawner,
            repaint,
            off_options: config.off_options(),
            materials: Rc::default(),
            meshes_path: config.meshes_path.to_string_lossy().into_owned(),
            verbose: config.verbose,
        }
    }

    fn with_materials(&self, materials: Rc<RefCell<MaterialManager>>) -> Self {
        Self {
            materials,
            ..self.clone()
        }
    }

    /// Path of a mesh file below the configured meshes directory.
    pub fn mesh_path(&self, filename: &str) -> String {
        let dir = self.meshes_path.trim_end_matches('/');
        if dir.is_empty() {
            filename.to_string()
        } else {
            format!("{dir}/{filename}")
        }
    }

    fn spawn(&self, task: impl std::future::Future<Output = ()> + 'static) -> bool {
        match self.spawner.spawn_local(task) {
            Ok(()) => true,
            Err(err) => {
                log::error!("could not schedule load: {err}");
                false
            }
        }
    }
}

/// A parsed scene: its lights, cameras, materials and node tree.
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    pub lights: Vec<Light>,
    pub cameras: Vec<Camera>,
    pub materials: Rc<RefCell<MaterialManager>>,
    /// Identity-transform node holding the top level nodes
    pub root: SceneNode,
}

impl Scene {
    /// Builds the scene, filling in a light, a camera and the `default`
    /// material when the description has none, then parses every top
    /// level node.
    pub fn from_spec(spec: &SceneSpec, ctx: &SceneContext) -> Result<Self, SpecError> {
        let mut lights: Vec<Light> = spec.lights.iter().map(|l| l.to_light()).collect();
        if lights.is_empty() {
            lights.push(Light::default());
        }

        let mut cameras: Vec<Camera> = spec.cameras.iter().map(|c| c.to_camera()).collect();
        if cameras.is_empty() {
            cameras.push(default_scene_camera());
        }

        let mut manager = MaterialManager::new();
        for (name, material) in &spec.materials {
            manager.add_material(name, material.to_material());
        }
        let materials = Rc::new(RefCell::new(manager));
        let ctx = ctx.with_materials(materials.clone());

        let mut root = SceneNode::new(Matrix4::identity());
        for child in &spec.children {
            root.children.push(parse_tree(child, &ctx)?);
        }

        let scene = Self {
            name: spec
                .name
                .clone()
                .unwrap_or_else(|| UNTITLED_SCENE.to_string()),
            lights,
            cameras,
            materials,
            root,
        };
        if ctx.verbose {
            log::debug!("scene `{}`:\n{}", scene.name, scene.scene_string());
        }
        Ok(scene)
    }

    /// Renders every node from the identity transform.
    pub fn render<B: RenderBackend>(&self, canvas: &mut Canvas<B>) -> Result<(), RenderError> {
        render_tree(&self.root, &Matrix4::identity(), canvas)
    }

    pub fn mark_meshes_dirty(&self) {
        mark_meshes_dirty(&self.root);
    }

    pub fn scene_string(&self) -> String {
        scene_string(&self.root, "")
    }
}

/// Camera used when a scene names none.
pub fn default_scene_camera() -> Camera {
    Camera {
        pos: Vector3::new(0.0, 1.5, 5.0),
        rot: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        fovx: 1.3,
        fovy: 1.3,
        ..Camera::default()
    }
}

/// Builds the node for `spec` and its subtree.
///
/// Mesh loads are dispatched through the cache; shapes whose mesh is not
/// ready yet hold an empty placeholder until a continuation on the
/// context's executor swaps the mesh in.
pub fn parse_tree(spec: &NodeSpec, ctx: &SceneContext) -> Result<SceneNode, SpecError> {
    let transform = match &spec.transform {
        None => Matrix4::identity(),
        Some(entries) => {
            let entries: &[f32; 16] = entries
                .as_slice()
                .try_into()
                .map_err(|_| SpecError::TransformLength(entries.len()))?;
            matrix4_from_row_major(entries)
        }
    };

    let mut node = SceneNode::new(transform);
    for shape in &spec.shapes {
        let shape = parse_shape(shape, &node.attached, ctx)?;
        node.shapes.push(shape);
    }
    for child in &spec.children {
        node.children.push(parse_tree(child, ctx)?);
    }
    Ok(node)
}

fn parse_shape(
    spec: &ShapeSpec,
    attached: &AttachedChildren,
    ctx: &SceneContext,
) -> Result<Shape, SpecError> {
    let material_name = spec
        .material
        .clone()
        .unwrap_or_else(|| DEFAULT_MATERIAL.to_string());
    let material = ctx
        .materials
        .borrow()
        .get_material(&material_name)
        .ok_or_else(|| SpecError::UnknownMaterial(material_name.clone()))?;

    let identity = Matrix4::identity();
    let origin = [0.0, 0.0, 0.0];
    let primitive = |kind| Some(Rc::new(MeshSlot::resolved(ctx.cache.primitive(kind))));

    let (kind, shape_matrix, slot) = match &spec.kind {
        ShapeKindSpec::Mesh { filename, src } => {
            let slot = resolve_mesh(filename.as_deref(), src.as_deref(), ctx)?;
            (ShapeKind::Mesh, identity, Some(slot))
        }
        ShapeKindSpec::Polygon { vertices } => {
            let corners: Vec<Vector3<f32>> = vertices.iter().copied().map(Vector3::from).collect();
            let mesh = into_handle(Mesh::from_polygon(&corners));
            (
                ShapeKind::Polygon,
                identity,
                Some(Rc::new(MeshSlot::resolved(mesh))),
            )
        }
        ShapeKindSpec::Sphere { radius, center } => {
            let r = radius.unwrap_or(1.0);
            (
                ShapeKind::Sphere,
                corrective_matrix(center.unwrap_or(origin), [r, r, r]),
                primitive(Primitive::Sphere),
            )
        }
        ShapeKindSpec::Cuboid {
            width,
            height,
            length,
            center,
        } => (
            ShapeKind::Box,
            corrective_matrix(
                center.unwrap_or(origin),
                [
                    width.unwrap_or(1.0),
                    height.unwrap_or(1.0),
                    length.unwrap_or(1.0),
                ],
            ),
            primitive(Primitive::Box),
        ),
        ShapeKindSpec::Cylinder {
            radius,
            height,
            center,
        } => {
            let r = radius.unwrap_or(1.0);
            (
                ShapeKind::Cylinder,
                corrective_matrix(center.unwrap_or(origin), [r, height.unwrap_or(1.0), r]),
                primitive(Primitive::Cylinder),
            )
        }
        ShapeKindSpec::Cone {
            radius,
            height,
            center,
        } => {
            let r = radius.unwrap_or(1.0);
            (
                ShapeKind::Cone,
                corrective_matrix(center.unwrap_or(origin), [r, height.unwrap_or(1.0), r]),
                primitive(Primitive::Cone),
            )
        }
        ShapeKindSpec::Scene { filename } => {
            load_sub_scene(filename.trim(), attached, ctx);
            (ShapeKind::Scene, identity, None)
        }
    };

    Ok(Shape {
        kind,
        shape_matrix,
        material,
        material_name,
        hidden: spec.hidden,
        slot,
    })
}

/// Key under which inline mesh text is cached.
fn inline_key(src: &str) -> String {
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    format!("src:{:016x}", hasher.finish())
}

fn resolve_mesh(
    filename: Option<&str>,
    src: Option<&str>,
    ctx: &SceneContext,
) -> Result<Rc<MeshSlot>, SpecError> {
    let options = ctx.off_options;
    let lookup = match (src, filename) {
        (Some(src), _) => {
            let key = inline_key(src);
            ctx.cache.get_or_load(&key, || {
                future::ready(parse_off(src, options).map_err(|source| LoadError::Parse {
                    path: key.clone(),
                    source,
                }))
            })
        }
        (None, Some(filename)) => {
            let path = ctx.mesh_path(filename.trim());
            ctx.cache
                .get_or_load(&path, || load_mesh_file(ctx.source.as_ref(), &path, options))
        }
        (None, None) => return Err(SpecError::MissingMeshSource),
    };
    Ok(attach_lookup(lookup, ctx))
}

/// Wraps a cache lookup into a slot, spawning the continuation that fills
/// it in when the lookup is still pending.
fn attach_lookup(lookup: CacheLookup, ctx: &SceneContext) -> Rc<MeshSlot> {
    let load = match lookup {
        CacheLookup::Hit(mesh) => return Rc::new(MeshSlot::resolved(mesh)),
        CacheLookup::Pending(load) => load,
    };

    let slot = Rc::new(MeshSlot::unresolved());
    slot.set_loading();

    let weak: Weak<MeshSlot> = Rc::downgrade(&slot);
    let repaint = ctx.repaint.clone();
    let scheduled = ctx.spawn(async move {
        let result = load.await;
        if let Err(err) = &result {
            log::error!("{err}");
        }
        // The shape may have been dropped while loading
        let Some(slot) = weak.upgrade() else {
            return;
        };
        match result {
            Ok(mesh) => {
                slot.resolve(mesh);
                repaint.request();
            }
            Err(_) => slot.fail(),
        }
    });
    if !scheduled {
        slot.fail();
    }
    slot
}

/// Fetches another scene file and, once it arrives, merges its materials
/// into this scene and attaches its top level nodes under the owning node.
fn load_sub_scene(filename: &str, attached: &AttachedChildren, ctx: &SceneContext) {
    let fetch: LocalBoxFuture<'static, Result<String, LoadError>> = ctx.source.fetch(filename);
    let path = filename.to_string();
    let weak = Rc::downgrade(attached);
    let scene_ctx = ctx.clone();

    ctx.spawn(async move {
        let ctx = scene_ctx;
        let spec = match fetch.await.and_then(|text| {
            SceneSpec::from_json(&text).map_err(|source| LoadError::Scene {
                path: path.clone(),
                source,
            })
        }) {
            Ok(spec) => spec,
            Err(err) => {
                log::error!("{err}");
                return;
            }
        };
        let Some(attached) = weak.upgrade() else {
            return;
        };

        ctx.materials.borrow_mut().merge(
            spec.materials
                .iter()
                .map(|(name, material)| (name.clone(), material.to_material())),
        );

        let nodes: Result<Vec<SceneNode>, SpecError> =
            spec.children.iter().map(|child| parse_tree(child, &ctx)).collect();
        match nodes {
            Ok(nodes) => {
                log::debug!("attached {} nodes from `{path}`", nodes.len());
                attached.borrow_mut().extend(nodes);
                ctx.repaint.request();
            }
            Err(source) => log::error!("{}", LoadError::Scene { path, source }),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gfx::{
            geometry::generate_sphere,
            mesh::MeshHandle,
            rendering::{shader::LIT_SLOTS, RecordingBackend},
            scene::node::ResolveState,
        },
        loader::MemorySource,
    };
    use cgmath::{InnerSpace, Vector4};
    use futures::executor::LocalPool;

    const TRIANGLE: &str = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";

    struct Fixture {
        pool: LocalPool,
        source: MemorySource,
        ctx: SceneContext,
    }

    fn fixture(config: ViewerConfig) -> Fixture {
        let pool = LocalPool::new();
        let source = MemorySource::new();
        let ctx = SceneContext::new(
            &config,
            MeshCache::new(&config),
            Rc::new(source.clone()),
            pool.spawner(),
            RepaintSignal::default(),
        );
        Fixture { pool, source, ctx }
    }

    fn canvas() -> Canvas<RecordingBackend> {
        let mut canvas = Canvas::with_backend(RecordingBackend::new());
        canvas.register_shader("blinnPhong", LIT_SLOTS.iter().copied());
        canvas.use_shader("blinnPhong");
        canvas
    }

    fn scene(json: &str, ctx: &SceneContext) -> Result<Scene, SpecError> {
        Scene::from_spec(&SceneSpec::from_json(json)?, ctx)
    }

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_defaults_are_filled_in() {
        let f = fixture(ViewerConfig::default());
        let scene = scene("{}", &f.ctx).unwrap();
        assert_eq!(scene.name, UNTITLED_SCENE);
        assert_eq!(scene.lights, vec![Light::default()]);
        assert_eq!(scene.cameras, vec![default_scene_camera()]);
        assert!(scene.materials.borrow().get_material(DEFAULT_MATERIAL).is_some());
    }

    #[test]
    fn test_transform_composition_through_three_levels() {
        let f = fixture(ViewerConfig::default());
        // A translates by +x, B turns 90 degrees about z, C doubles
        let scene = scene(
            r#"{"children": [{
                "transform": [1,0,0,1, 0,1,0,0, 0,0,1,0, 0,0,0,1],
                "children": [{
                    "transform": [0,-1,0,0, 1,0,0,0, 0,0,1,0, 0,0,0,1],
                    "children": [{
                        "transform": [2,0,0,0, 0,2,0,0, 0,0,2,0, 0,0,0,1],
                        "shapes": [{"type": "sphere", "radius": 0.5}]
                    }]
                }]
            }]}"#,
            &f.ctx,
        )
        .unwrap();

        let mut canvas = canvas();
        scene.render(&mut canvas).unwrap();
        let draws = canvas.backend().unwrap().draws();
        assert_eq!(draws.len(), 1);

        let m = draws[0].uniforms.transform.unwrap();
        let p = m * Vector4::new(2.0, 0.0, 0.0, 1.0);
        assert!(close(p.truncate(), Vector3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_sphere_corrective_matrix() {
        let f = fixture(ViewerConfig::default());
        let scene = scene(
            r#"{"children": [{"shapes": [{"type": "sphere", "radius": 2, "center": [1, 0, 0]}]}]}"#,
            &f.ctx,
        )
        .unwrap();

        let shape = &scene.root.children[0].shapes[0];
        let unit = generate_sphere(32, 16);
        let bbox = unit.get_bbox_transformed(&shape.shape_matrix);
        assert!(close(bbox.min, Vector3::new(-1.0, -2.0, -2.0)));
        assert!(close(bbox.max, Vector3::new(3.0, 2.0, 2.0)));
    }

    #[test]
    fn test_primitive_defaults() {
        let f = fixture(ViewerConfig::default());
        let scene = scene(
            r#"{"children": [{"shapes": [
                {"type": "box", "width": 2, "center": [0, 1, 0]},
                {"type": "cylinder", "height": 3},
                {"type": "cone"}
            ]}]}"#,
            &f.ctx,
        )
        .unwrap();

        let shapes = &scene.root.children[0].shapes;
        assert_eq!(
            shapes[0].shape_matrix,
            Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0))
                * Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0)
        );
        assert_eq!(
            shapes[1].shape_matrix,
            Matrix4::from_nonuniform_scale(1.0, 3.0, 1.0)
        );
        assert_eq!(shapes[2].shape_matrix, Matrix4::identity());
        assert!(Rc::ptr_eq(
            &shapes[2].mesh().unwrap(),
            &f.ctx.cache.primitive(Primitive::Cone)
        ));
    }

    #[test]
    fn test_materials_resolve_by_name() {
        let f = fixture(ViewerConfig::default());
        let scene = scene(
            r#"{
                "materials": {"red": {"kd": [1, 0, 0]}},
                "children": [{"shapes": [
                    {"type": "sphere", "material": "red"},
                    {"type": "sphere"}
                ]}]
            }"#,
            &f.ctx,
        )
        .unwrap();

        let shapes = &scene.root.children[0].shapes;
        assert_eq!(shapes[0].material.kd, [1.0, 0.0, 0.0]);
        assert_eq!(shapes[1].material_name, DEFAULT_MATERIAL);
        assert_eq!(shapes[1].material.kd, [0.5, 0.55, 0.5]);
    }

    #[test]
    fn test_unknown_material_is_fatal() {
        let f = fixture(ViewerConfig::default());
        let err = scene(
            r#"{"children": [{"shapes": [{"type": "sphere", "material": "gold"}]}]}"#,
            &f.ctx,
        )
        .unwrap_err();
        assert_eq!(err, SpecError::UnknownMaterial("gold".to_string()));
    }

    #[test]
    fn test_bad_transform_length_is_fatal() {
        let f = fixture(ViewerConfig::default());
        let err = scene(r#"{"children": [{"transform": [1, 0, 0]}]}"#, &f.ctx).unwrap_err();
        assert_eq!(err, SpecError::TransformLength(3));
    }

    #[test]
    fn test_mesh_without_source_is_fatal() {
        let f = fixture(ViewerConfig::default());
        let err = scene(r#"{"children": [{"shapes": [{"type": "mesh"}]}]}"#, &f.ctx).unwrap_err();
        assert_eq!(err, SpecError::MissingMeshSource);
    }

    #[test]
    fn test_mesh_loads_resolve_and_request_repaint() {
        let mut f = fixture(ViewerConfig::default().with_meshes_path("meshes"));
        f.source.insert("meshes/tri.off", TRIANGLE);
        let scene = scene(
            r#"{"children": [{"shapes": [
                {"type": "mesh", "filename": "tri.off"},
                {"type": "mesh", "filename": " tri.off "}
            ]}]}"#,
            &f.ctx,
        )
        .unwrap();

        let shapes = &scene.root.children[0].shapes;
        assert_eq!(shapes[0].state(), Some(ResolveState::Loading));
        assert!(shapes[0].mesh().unwrap().borrow().is_empty());

        f.pool.run_until_stalled();

        assert!(f.ctx.repaint.take());
        assert_eq!(f.source.fetch_count(), 1);
        let meshes: Vec<MeshHandle> = shapes.iter().map(|s| s.mesh().unwrap()).collect();
        assert!(shapes.iter().all(|s| s.state() == Some(ResolveState::Resolved)));
        assert!(Rc::ptr_eq(&meshes[0], &meshes[1]));
        assert_eq!(meshes[0].borrow().vertex_count(), 3);
    }

    #[test]
    fn test_failed_load_draws_nothing_and_spares_siblings() {
        let mut f = fixture(ViewerConfig::default());
        let scene = scene(
            r#"{"children": [{"shapes": [
                {"type": "mesh", "filename": "missing.off"},
                {"type": "sphere"}
            ]}]}"#,
            &f.ctx,
        )
        .unwrap();
        f.pool.run_until_stalled();

        let shapes = &scene.root.children[0].shapes;
        assert_eq!(shapes[0].state(), Some(ResolveState::Failed));

        let mut canvas = canvas();
        scene.render(&mut canvas).unwrap();
        let backend = canvas.backend().unwrap();
        assert_eq!(backend.draws().len(), 1);
        let sphere_triangles = shapes[1].mesh().unwrap().borrow().triangle_indices().len() / 3;
        assert_eq!(backend.triangle_count() as usize, sphere_triangles);
    }

    #[test]
    fn test_inline_source_is_keyed_by_content() {
        let mut f = fixture(ViewerConfig::default());
        let json = serde_json::json!({
            "children": [{"shapes": [
                {"type": "mesh", "src": TRIANGLE},
                {"type": "mesh", "src": TRIANGLE}
            ]}]
        })
        .to_string();
        let scene = scene(&json, &f.ctx).unwrap();
        f.pool.run_until_stalled();

        assert_eq!(f.ctx.cache.loads_started(), 1);
        assert_eq!(f.source.fetch_count(), 0);
        let shapes = &scene.root.children[0].shapes;
        assert!(Rc::ptr_eq(
            &shapes[0].mesh().unwrap(),
            &shapes[1].mesh().unwrap()
        ));
    }

    #[test]
    fn test_dropped_scene_ignores_late_loads() {
        let mut f = fixture(ViewerConfig::default());
        f.source.insert("tri.off", TRIANGLE);
        let scene = scene(
            r#"{"children": [{"shapes": [{"type": "mesh", "filename": "tri.off"}]}]}"#,
            &f.ctx,
        )
        .unwrap();
        drop(scene);

        f.pool.run_until_stalled();
        assert!(!f.ctx.repaint.take());
        assert!(f.ctx.cache.contains("tri.off"));
    }

    #[test]
    fn test_sub_scene_attaches_children_and_merges_materials() {
        let mut f = fixture(ViewerConfig::default());
        f.source.insert(
            "room.json",
            r#"{
                "materials": {"wall": {"kd": [0.9, 0.9, 0.9]}},
                "cameras": [{"pos": [9, 9, 9]}],
                "children": [{"shapes": [{"type": "box", "material": "wall"}]}]
            }"#,
        );
        let scene = scene(
            r#"{"children": [{
                "transform": [1,0,0,5, 0,1,0,0, 0,0,1,0, 0,0,0,1],
                "shapes": [{"type": "scene", "filename": "room.json"}]
            }]}"#,
            &f.ctx,
        )
        .unwrap();

        let node = &scene.root.children[0];
        assert_eq!(node.attached_count(), 0);
        f.pool.run_until_stalled();

        assert_eq!(node.attached_count(), 1);
        assert!(f.ctx.repaint.take());
        assert!(scene.materials.borrow().get_material("wall").is_some());
        assert_eq!(scene.cameras.len(), 1);

        let mut canvas = canvas();
        scene.render(&mut canvas).unwrap();
        let draws = canvas.backend().unwrap().draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(
            draws[0].uniforms.transform,
            Some(Matrix4::from_translation(Vector3::new(5.0, 0.0, 0.0)))
        );
        assert_eq!(scene.scene_string(), "\tscene\n\t\tbox\n");
    }

    #[test]
    fn test_broken_sub_scenes_attach_nothing() {
        let mut f = fixture(ViewerConfig::default());
        f.source.insert("garbled.json", "{ \"children\": [");
        f.source.insert(
            "half.json",
            r#"{"children": [
                {"shapes": [{"type": "sphere"}]},
                {"shapes": [{"type": "box", "material": "nowhere"}]}
            ]}"#,
        );
        let scene = scene(
            r#"{"children": [
                {"shapes": [{"type": "scene", "filename": "garbled.json"}]},
                {"shapes": [{"type": "scene", "filename": "missing.json"}]},
                {"shapes": [{"type": "scene", "filename": "half.json"}, {"type": "cone"}]}
            ]}"#,
            &f.ctx,
        )
        .unwrap();
        f.pool.run_until_stalled();

        for node in &scene.root.children {
            assert_eq!(node.attached_count(), 0);
        }
        assert!(!f.ctx.repaint.take());

        let mut canvas = canvas();
        scene.render(&mut canvas).unwrap();
        assert_eq!(canvas.backend().unwrap().draws().len(), 1);
    }

    #[test]
    fn test_mark_meshes_dirty_reaches_every_mesh() {
        let f = fixture(ViewerConfig::default());
        let scene = scene(
            r#"{"children": [{"children": [{"shapes": [{"type": "cone"}]}]}]}"#,
            &f.ctx,
        )
        .unwrap();

        let mut canvas = canvas();
        scene.render(&mut canvas).unwrap();
        let cone = f.ctx.cache.primitive(Primitive::Cone);
        assert!(!cone.borrow().needs_display_update());

        scene.mark_meshes_dirty();
        assert!(cone.borrow().needs_display_update());
    }
}
