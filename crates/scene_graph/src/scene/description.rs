//! Serializable scene description
//!
//! A plain data mirror of the node tree used for persistence. Export walks
//! the scene in draw order; import rebuilds it through the ordinary
//! mutation API, so every back-reference and registry index is
//! reestablished by the same code paths as hand-built scenes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::foundation::collections::{ElementKey, NodeKey};
use crate::foundation::math::{Affine, Mat4, Transform, Vec3};
use crate::scene::traversal::SceneVisitor;
use crate::scene::{Scene, SceneElement, SceneError, SceneNode};
use crate::shapes::{Cuboid, Shape, Sphere};

/// Whole scene, starting at the root node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Root node
    pub root: NodeDescription,
}

/// One node and its subtree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDescription {
    /// Display label
    pub name: Option<String>,
    /// Local-to-parent transform
    pub transform: TransformDescription,
    /// Attached elements in order
    pub elements: Vec<ElementDescription>,
    /// Children in order
    pub children: Vec<NodeDescription>,
}

/// One element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementDescription {
    /// Display label
    pub name: Option<String>,
    /// Shapes in order
    pub shapes: Vec<ShapeDescription>,
}

/// One shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeDescription {
    /// Solid axis-aligned box
    Cuboid {
        /// Minimum corner
        min: [f32; 3],
        /// Maximum corner
        max: [f32; 3],
    },
    /// Solid sphere
    Sphere {
        /// Center
        center: [f32; 3],
        /// Radius
        radius: f32,
    },
}

/// Local-to-parent transform
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum TransformDescription {
    /// No transform
    #[default]
    Identity,
    /// Translation * rotation * scale
    Trs {
        /// Translation
        #[serde(default)]
        translation: [f32; 3],
        /// Euler angles in radians, XYZ order
        #[serde(default)]
        rotation: [f32; 3],
        /// Per-axis scale
        #[serde(default = "unit_scale")]
        scale: [f32; 3],
    },
    /// Full matrix, row-major
    Matrix([[f32; 4]; 4]),
}

const fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

const AFFINE_BOTTOM_ROW: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

impl TransformDescription {
    /// The described affine transform
    ///
    /// A matrix whose bottom row is not `[0, 0, 0, 1]` is projective and
    /// is rejected with [`SceneError::Parse`].
    pub fn to_affine(&self) -> Result<Affine, SceneError> {
        match *self {
            Self::Identity => Ok(Affine::identity()),
            Self::Trs {
                translation,
                rotation,
                scale,
            } => Ok(Transform::from_euler(Vec3::from(translation), Vec3::from(rotation), Vec3::from(scale)).to_affine()),
            Self::Matrix(rows) => {
                if rows[3] != AFFINE_BOTTOM_ROW {
                    return Err(SceneError::Parse(format!(
                        "matrix bottom row must be {AFFINE_BOTTOM_ROW:?}, got {:?}",
                        rows[3]
                    )));
                }
                Ok(Affine::from_matrix_unchecked(Mat4::from_fn(|row, column| rows[row][column])))
            }
        }
    }

    /// Describe `transformation` exactly
    pub fn from_affine(transformation: &Affine) -> Self {
        let matrix = transformation.matrix();
        if *matrix == Mat4::identity() {
            return Self::Identity;
        }
        let mut rows = [[0.0; 4]; 4];
        for (row, values) in rows.iter_mut().enumerate() {
            for (column, value) in values.iter_mut().enumerate() {
                *value = matrix[(row, column)];
            }
        }
        Self::Matrix(rows)
    }
}

impl From<&ShapeDescription> for Shape {
    fn from(description: &ShapeDescription) -> Self {
        match *description {
            ShapeDescription::Cuboid { min, max } => Cuboid::new(Vec3::from(min), Vec3::from(max)).into(),
            ShapeDescription::Sphere { center, radius } => Sphere::new(Vec3::from(center), radius).into(),
        }
    }
}

impl From<&Shape> for ShapeDescription {
    fn from(shape: &Shape) -> Self {
        match shape {
            Shape::Cuboid(cuboid) => Self::Cuboid {
                min: cuboid.bounds.min.into(),
                max: cuboid.bounds.max.into(),
            },
            Shape::Sphere(sphere) => Self::Sphere {
                center: sphere.center.into(),
                radius: sphere.radius,
            },
        }
    }
}

impl SceneDescription {
    /// Parse RON text
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::from_str(text).map_err(|e| SceneError::Parse(e.to_string()))
    }

    /// Pretty-printed RON text
    pub fn to_ron_string(&self) -> Result<String, SceneError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))
    }

    /// Read a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded scene description from {}", path.display());
        Self::from_ron_str(&text)
    }

    /// Write a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_ron_string()?)?;
        log::debug!("Saved scene description to {}", path.display());
        Ok(())
    }
}

impl Scene {
    /// Build a scene from its description
    pub fn from_description(description: &SceneDescription, config: SceneConfig) -> Result<Self, SceneError> {
        let check = config.check_invariants_on_load;
        let mut scene = Self::with_config(config);
        let root = scene.root();
        scene.apply_node_description(root, &description.root)?;

        // Depth-first with siblings pushed in reverse so they are inserted in order
        let mut pending: Vec<(NodeKey, &NodeDescription)> =
            description.root.children.iter().rev().map(|child| (root, child)).collect();
        while let Some((parent, child_description)) = pending.pop() {
            let child = scene.create_node();
            scene.apply_node_description(child, child_description)?;
            scene.insert_child(parent, child)?;
            pending.extend(child_description.children.iter().rev().map(|grandchild| (child, grandchild)));
        }

        log::debug!(
            "Built scene with {} nodes and {} elements from description",
            scene.node_count(),
            scene.element_count()
        );
        if check {
            scene.check_invariants()?;
        }
        Ok(scene)
    }

    fn apply_node_description(&mut self, node: NodeKey, description: &NodeDescription) -> Result<(), SceneError> {
        self.set_name(node, description.name.as_deref())?;
        self.set_transformation(node, description.transform.to_affine()?)?;
        for element_description in &description.elements {
            let mut element = SceneElement::new(element_description.shapes.iter().map(Shape::from).collect());
            element.name.clone_from(&element_description.name);
            let element = self.create_element(element);
            self.insert_element(node, element)?;
        }
        Ok(())
    }

    /// Describe the tree under the root, children in current list order
    pub fn to_description(&self) -> SceneDescription {
        let mut builder = DescriptionBuilder::default();
        if let Some(root) = self.nodes.get(self.root) {
            self.walk_node(self.root, root, &mut builder);
        }
        SceneDescription {
            root: builder.finished.unwrap_or_default(),
        }
    }
}

#[derive(Default)]
struct DescriptionBuilder {
    open: Vec<NodeDescription>,
    finished: Option<NodeDescription>,
}

impl SceneVisitor for DescriptionBuilder {
    fn enter_node(&mut self, _key: NodeKey, node: &SceneNode) -> bool {
        self.open.push(NodeDescription {
            name: node.name.clone(),
            transform: TransformDescription::from_affine(&node.transformation),
            elements: Vec::new(),
            children: Vec::new(),
        });
        true
    }

    fn visit_element(&mut self, _key: ElementKey, element: &SceneElement) {
        if let Some(node) = self.open.last_mut() {
            node.elements.push(ElementDescription {
                name: element.name.clone(),
                shapes: element.shapes.iter().map(ShapeDescription::from).collect(),
            });
        }
    }

    fn exit_node(&mut self, _key: NodeKey, _node: &SceneNode) {
        let Some(done) = self.open.pop() else {
            return;
        };
        match self.open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => self.finished = Some(done),
        }
    }
}
