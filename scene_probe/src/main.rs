//! Scene probe
//!
//! Loads a scene description, casts the configured rays through it and
//! reports the closest hit of each one.
//!
//! Usage: `scene_probe [config.toml|config.ron]`

use std::path::{Path, PathBuf};

use scene_graph::foundation::logging;
use scene_graph::prelude::*;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/probe.toml");

/// Probe errors
#[derive(thiserror::Error, Debug)]
enum ProbeError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Ray {index} is not castable: origin {origin:?}, direction {direction:?}")]
    InvalidRay {
        index: usize,
        origin: [f32; 3],
        direction: [f32; 3],
    },
}

/// One ray to cast, in the scene's world frame
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProbeRay {
    origin: [f32; 3],
    direction: [f32; 3],
}

impl ProbeRay {
    fn to_ray(&self, index: usize) -> Result<Ray, ProbeError> {
        Ray::try_new(Point3::from(self.origin), Vec3::from(self.direction)).ok_or(ProbeError::InvalidRay {
            index,
            origin: self.origin,
            direction: self.direction,
        })
    }
}

/// Probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ProbeConfig {
    /// Scene description, relative to the config file
    scene: String,
    scene_config: SceneConfig,
    rays: Vec<ProbeRay>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            scene: "scene.ron".to_owned(),
            scene_config: SceneConfig::default(),
            rays: vec![ProbeRay {
                origin: [0.0, 0.0, -10.0],
                direction: [0.0, 0.0, 1.0],
            }],
        }
    }
}

impl Config for ProbeConfig {}

fn scene_path(config_path: &Path, scene: &str) -> PathBuf {
    config_path
        .parent()
        .map_or_else(|| PathBuf::from(scene), |dir| dir.join(scene))
}

fn run(config_path: &Path) -> Result<(), ProbeError> {
    let config = ProbeConfig::load_from_file(config_path)?;
    log::info!("Loaded probe config from {}", config_path.display());

    let path = scene_path(config_path, &config.scene);
    let description = SceneDescription::load(&path)?;
    let scene = Scene::from_description(&description, config.scene_config.clone())?;
    log::info!(
        "Scene {} has {} nodes and {} elements",
        path.display(),
        scene.node_count(),
        scene.element_count()
    );

    let bounds = scene.bbox(scene.root())?;
    println!("scene bounds: {:?} .. {:?}", bounds.min, bounds.max);

    for (index, probe) in config.rays.iter().enumerate() {
        let ray = probe.to_ray(index)?;
        let mut stats = RayQueryStats::default();
        match scene.intersect_ray_with_stats(&ray, &mut stats) {
            Some(hit) => {
                let name = scene.node(hit.node).and_then(SceneNode::name).unwrap_or("<unnamed>");
                println!(
                    "ray {index} {ray}: hit {name} shape {} at {:?} normal {:?} t = {:.4}",
                    hit.shape,
                    hit.point.coords.as_slice(),
                    hit.normal.as_slice(),
                    hit.t
                );
            }
            None => println!("ray {index} {ray}: miss"),
        }
        log::debug!(
            "ray {index}: visited {} nodes, pruned {}, tested {} elements",
            stats.nodes_visited,
            stats.nodes_pruned,
            stats.elements_tested
        );
    }
    Ok(())
}

fn main() -> Result<(), ProbeError> {
    logging::init();

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);

    log::info!("Starting scene probe");
    let result = run(&config_path);
    if let Err(error) = &result {
        log::error!("Probe failed: {error}");
    }
    result
}
