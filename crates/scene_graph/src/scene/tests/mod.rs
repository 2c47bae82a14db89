//! Scenario tests for the scene graph
//!
//! Each file drives a whole scene through the public API and checks the
//! structural, bounding box and query behavior end to end.

mod ray_queries;

use crate::foundation::collections::{ElementKey, NodeKey};
use crate::foundation::math::{Affine, AffineExt, Vec3};
use crate::scene::{Scene, SceneElement};
use crate::shapes::{Cuboid, Shape};

/// Cube spanning [-1, 1] on every axis
fn unit_cube() -> Shape {
    Cuboid::new(Vec3::repeat(-1.0), Vec3::repeat(1.0)).into()
}

/// Attach a new element holding `shapes` to `node`
fn attach(scene: &mut Scene, node: NodeKey, shapes: Vec<Shape>) -> ElementKey {
    let element = scene.create_element(SceneElement::new(shapes));
    scene.insert_element(node, element).expect("node exists");
    element
}

/// Root R with child A translated +5 on X carrying a unit cube
fn translated_cube_scene() -> (Scene, NodeKey, ElementKey) {
    let mut scene = Scene::new();
    let a = scene.create_named_node("A");
    scene
        .set_transformation(a, Affine::from_translation(Vec3::new(5.0, 0.0, 0.0)))
        .expect("invertible");
    scene.insert_child(scene.root(), a).expect("insert A");
    let element = attach(&mut scene, a, vec![unit_cube()]);
    (scene, a, element)
}
