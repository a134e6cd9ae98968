//! Scene nodes and the shapes they hold.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::{
    error::RenderError,
    gfx::{
        mesh::{into_handle, Mesh, MeshHandle},
        rendering::{Canvas, RenderBackend},
        resources::material::Material,
    },
};

/// Where a shape's mesh is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    /// Holds an empty placeholder, no load requested yet
    Unresolved,
    /// Holds an empty placeholder while a load is in flight
    Loading,
    Resolved,
    /// The load failed; the placeholder stays for good
    Failed,
}

/// The mesh a shape draws, swapped in place when a load completes.
#[derive(Debug)]
pub struct MeshSlot {
    state: Cell<ResolveState>,
    mesh: RefCell<MeshHandle>,
}

impl MeshSlot {
    pub fn resolved(mesh: MeshHandle) -> Self {
        Self {
            state: Cell::new(ResolveState::Resolved),
            mesh: RefCell::new(mesh),
        }
    }

    /// An empty placeholder.
    pub fn unresolved() -> Self {
        Self {
            state: Cell::new(ResolveState::Unresolved),
            mesh: RefCell::new(into_handle(Mesh::new())),
        }
    }

    pub fn state(&self) -> ResolveState {
        self.state.get()
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh.borrow().clone()
    }

    pub(crate) fn set_loading(&self) {
        self.state.set(ResolveState::Loading);
    }

    pub(crate) fn resolve(&self, mesh: MeshHandle) {
        *self.mesh.borrow_mut() = mesh;
        self.state.set(ResolveState::Resolved);
    }

    pub(crate) fn fail(&self) {
        self.state.set(ResolveState::Failed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Mesh,
    Polygon,
    Sphere,
    Box,
    Cylinder,
    Cone,
    Scene,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Mesh => "mesh",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Box => "box",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Cone => "cone",
            ShapeKind::Scene => "scene",
        };
        f.write_str(name)
    }
}

/// A drawable leaf of the scene tree.
///
/// `shape_matrix` maps the shared unit mesh of a primitive into the size
/// and position the shape declares; it is the identity for meshes and
/// polygons. Sub-scene shapes have no mesh slot.
#[derive(Debug)]
pub struct Shape {
    pub kind: ShapeKind,
    pub shape_matrix: Matrix4<f32>,
    pub material: Rc<Material>,
    pub material_name: String,
    pub hidden: bool,
    pub(crate) slot: Option<Rc<MeshSlot>>,
}

impl Shape {
    pub fn state(&self) -> Option<ResolveState> {
        self.slot.as_ref().map(|slot| slot.state())
    }

    pub fn mesh(&self) -> Option<MeshHandle> {
        self.slot.as_ref().map(|slot| slot.mesh())
    }

    /// Draws the shape's mesh under `transform * shape_matrix`.
    pub fn render<B: RenderBackend>(
        &self,
        canvas: &mut Canvas<B>,
        transform: &Matrix4<f32>,
    ) -> Result<(), RenderError> {
        if self.hidden {
            return Ok(());
        }
        let Some(mesh) = self.mesh() else {
            return Ok(());
        };
        canvas.material = self.material.clone();
        let full = *transform * self.shape_matrix;
        let result = mesh.borrow_mut().render(canvas, &full);
        result
    }
}

/// Builds the corrective matrix `T(center) * S(scale)`.
pub(crate) fn corrective_matrix(center: [f32; 3], scale: [f32; 3]) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::from(center))
        * Matrix4::from_nonuniform_scale(scale[0], scale[1], scale[2])
}

/// Children attached by sub-scenes once they finish loading.
pub(crate) type AttachedChildren = Rc<RefCell<Vec<SceneNode>>>;

/// A node of the scene tree.
#[derive(Debug)]
pub struct SceneNode {
    pub transform: Matrix4<f32>,
    pub shapes: Vec<Shape>,
    pub children: Vec<SceneNode>,
    pub(crate) attached: AttachedChildren,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new(Matrix4::identity())
    }
}

impl SceneNode {
    pub fn new(transform: Matrix4<f32>) -> Self {
        Self {
            transform,
            shapes: Vec::new(),
            children: Vec::new(),
            attached: Rc::default(),
        }
    }

    /// Number of nodes attached by loaded sub-scenes.
    pub fn attached_count(&self) -> usize {
        self.attached.borrow().len()
    }
}

/// Renders `node` and its subtree, with `acc` the product of all ancestor
/// transforms.
pub fn render_tree<B: RenderBackend>(
    node: &SceneNode,
    acc: &Matrix4<f32>,
    canvas: &mut Canvas<B>,
) -> Result<(), RenderError> {
    let next = *acc * node.transform;
    for shape in &node.shapes {
        shape.render(canvas, &next)?;
    }
    for child in &node.children {
        render_tree(child, &next, canvas)?;
    }
    for child in node.attached.borrow().iter() {
        render_tree(child, &next, canvas)?;
    }
    Ok(())
}

/// Marks every mesh reachable from `node` for a buffer update.
pub fn mark_meshes_dirty(node: &SceneNode) {
    for shape in &node.shapes {
        if let Some(mesh) = shape.mesh() {
            mesh.borrow_mut().mark_dirty();
        }
    }
    for child in &node.children {
        mark_meshes_dirty(child);
    }
    for child in node.attached.borrow().iter() {
        mark_meshes_dirty(child);
    }
}

/// Indented outline of the shapes below `node`, one shape per line.
pub fn scene_string(node: &SceneNode, indent: &str) -> String {
    let mut s = String::new();
    for shape in &node.shapes {
        s.push_str(indent);
        s.push_str(&shape.kind.to_string());
        if shape.hidden {
            s.push_str(" (hidden)");
        }
        s.push('\n');
    }
    let deeper = format!("{indent}\t");
    for child in &node.children {
        s.push_str(&scene_string(child, &deeper));
    }
    for child in node.attached.borrow().iter() {
        s.push_str(&scene_string(child, &deeper));
    }
    s
}
