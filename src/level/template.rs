//! Level files
//!
//! A [`LevelTemplate`] describes a level as data: spawn, light and a list of
//! object templates, each mapping onto one [`LevelBuilder`] constructor.
//! Templates are stored as RON.

use std::fs;
use std::path::Path;

use gauntlet_math::Vec3;
use serde::{Deserialize, Serialize};

use super::behavior::UpdateBehavior;
use super::builder::{LevelBuilder, LevelMaterial, ObjectId, DEFAULT_LIGHT, DEFAULT_SPAWN};
use super::{LevelError, PowerupKind};

fn default_spawn() -> Vec3 {
    DEFAULT_SPAWN
}

fn default_light() -> Vec3 {
    DEFAULT_LIGHT
}

fn default_axis() -> Vec3 {
    Vec3::Y
}

fn default_material() -> LevelMaterial {
    LevelMaterial::Solid
}

fn default_saw_size() -> f32 {
    3.0
}

fn default_spike_speed() -> f32 {
    2.0
}

/// A serializable level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelTemplate {
    pub name: String,
    #[serde(default = "default_spawn")]
    pub spawn: Vec3,
    /// Spawn yaw in radians
    #[serde(default)]
    pub yaw: f32,
    #[serde(default = "default_light")]
    pub light: Vec3,
    #[serde(default)]
    pub objects: Vec<ObjectTemplate>,
}

/// One level object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectTemplate {
    Box {
        size: Vec3,
        position: Vec3,
        #[serde(default = "default_axis")]
        axis: Vec3,
        #[serde(default)]
        angle: f32,
        #[serde(default = "default_material")]
        material: LevelMaterial,
        #[serde(default)]
        behaviors: Vec<UpdateBehavior>,
    },
    Sphere {
        radius: f32,
        position: Vec3,
        #[serde(default = "default_material")]
        material: LevelMaterial,
        #[serde(default)]
        behaviors: Vec<UpdateBehavior>,
    },
    Saw {
        #[serde(default = "default_saw_size")]
        size: f32,
        position: Vec3,
        #[serde(default)]
        angle: f32,
        #[serde(default)]
        behaviors: Vec<UpdateBehavior>,
    },
    Spikes {
        count_x: u32,
        count_z: u32,
        position: Vec3,
        #[serde(default = "default_spike_speed")]
        speed: f32,
        #[serde(default)]
        time_offset: f32,
    },
    Trampoline {
        size: Vec3,
        position: Vec3,
        #[serde(default)]
        material: Option<LevelMaterial>,
    },
    Powerup {
        kind: PowerupKind,
        position: Vec3,
    },
    Finish {
        position: Vec3,
        #[serde(default)]
        angle: f32,
    },
}

impl ObjectTemplate {
    /// Create the object through the builder
    pub fn build(&self, builder: &mut LevelBuilder<'_>) -> ObjectId {
        let (id, behaviors): (ObjectId, &[UpdateBehavior]) = match self {
            ObjectTemplate::Box {
                size,
                position,
                axis,
                angle,
                material,
                behaviors,
            } => (builder.rotated_box(*size, *position, *axis, *angle, *material), behaviors.as_slice()),
            ObjectTemplate::Sphere {
                radius,
                position,
                material,
                behaviors,
            } => (builder.collidable_sphere(*radius, *position, *material), behaviors.as_slice()),
            ObjectTemplate::Saw {
                size,
                position,
                angle,
                behaviors,
            } => (builder.saw_blade(*size, *position, *angle), behaviors.as_slice()),
            ObjectTemplate::Spikes {
                count_x,
                count_z,
                position,
                speed,
                time_offset,
            } => (builder.spikes(*count_x, *count_z, *position, *speed, *time_offset), &[]),
            ObjectTemplate::Trampoline { size, position, material } => {
                (builder.trampoline(*size, *position, *material), &[])
            }
            ObjectTemplate::Powerup { kind, position } => (builder.powerup(*kind, *position), &[]),
            ObjectTemplate::Finish { position, angle } => (builder.finish_object(*position, *angle), &[]),
        };
        for behavior in behaviors {
            builder.add_behavior(id, behavior.clone());
        }
        id
    }
}

impl LevelTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spawn: DEFAULT_SPAWN,
            yaw: 0.0,
            light: DEFAULT_LIGHT,
            objects: Vec::new(),
        }
    }

    /// Load a level from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(text: &str) -> Result<Self, LevelError> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron(&self) -> Result<String, LevelError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Save the level to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LevelError> {
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Load every `.ron` file of a directory, ordered by file name
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Self>, LevelError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(LevelError::Empty);
        }
        paths.iter().map(Self::load).collect()
    }

    /// Place the whole level through the builder
    pub fn build(&self, builder: &mut LevelBuilder<'_>) {
        builder.set_spawn(self.spawn, self.yaw);
        builder.set_light(self.light);
        for object in &self.objects {
            object.build(builder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Level, LevelAssets, TriggerAction};
    use gauntlet_core::SceneGraph;
    use gauntlet_physics::{ColliderSet, TriggerSet};

    const SANDBOX: &str = include_str!("../../levels/01-warmup.ron");

    fn build(template: &LevelTemplate) -> (ColliderSet, TriggerSet<TriggerAction>, Level) {
        let mut graph = SceneGraph::new();
        let mut colliders = ColliderSet::new();
        let mut triggers = TriggerSet::new();
        let assets = LevelAssets::default();
        let mut builder = LevelBuilder::new(template.name.clone(), &mut graph, &mut colliders, &mut triggers, &assets);
        template.build(&mut builder);
        let level = builder.build();
        (colliders, triggers, level)
    }

    #[test]
    fn test_parse_level_file() {
        let template = LevelTemplate::from_ron(SANDBOX).unwrap();
        assert_eq!(template.name, "Warmup");
        assert!(!template.objects.is_empty());

        let (colliders, triggers, level) = build(&template);
        assert_eq!(level.spawn_position, template.spawn);
        assert!(colliders.obstacle_count() > 0);
        assert!(triggers.iter().any(|t| t.action == TriggerAction::Finish));
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let text = r#"
LevelTemplate(
    name: "Tiny",
    objects: [
        Box(size: (x: 4.0, y: 1.0, z: 4.0), position: (x: 0.0, y: 0.0, z: 0.0)),
        Spikes(count_x: 2, count_z: 2, position: (x: 0.0, y: 1.0, z: 3.0)),
    ],
)
"#;
        let template = LevelTemplate::from_ron(text).unwrap();
        assert_eq!(template.spawn, DEFAULT_SPAWN);
        assert_eq!(template.light, DEFAULT_LIGHT);
        match &template.objects[0] {
            ObjectTemplate::Box { axis, angle, material, behaviors, .. } => {
                assert_eq!(*axis, Vec3::Y);
                assert_eq!(*angle, 0.0);
                assert_eq!(*material, LevelMaterial::Solid);
                assert!(behaviors.is_empty());
            }
            other => panic!("expected box, got {:?}", other),
        }
        match &template.objects[1] {
            ObjectTemplate::Spikes { speed, time_offset, .. } => {
                assert_eq!(*speed, 2.0);
                assert_eq!(*time_offset, 0.0);
            }
            other => panic!("expected spikes, got {:?}", other),
        }
    }

    #[test]
    fn test_behaviors_attach_to_objects() {
        let mut template = LevelTemplate::new("Moving");
        template.objects.push(ObjectTemplate::Box {
            size: Vec3::new(3.0, 20.0, 3.0),
            position: Vec3::new(8.0, 0.0, -16.0),
            axis: Vec3::Y,
            angle: 0.0,
            material: LevelMaterial::Elevator,
            behaviors: vec![UpdateBehavior::elevator(-5.0, 0.0, 1.0)],
        });
        let (_, _, level) = build(&template);
        assert!(level.objects[0].is_dynamic());
    }

    #[test]
    fn test_ron_text_reloads() {
        let mut template = LevelTemplate::new("Saved");
        template.objects.push(ObjectTemplate::Powerup {
            kind: PowerupKind::HighJump,
            position: Vec3::new(1.0, 2.0, 3.0),
        });
        let text = template.to_ron().unwrap();
        assert!(text.contains("HighJump"));
        let reloaded = LevelTemplate::from_ron(&text).unwrap();
        assert_eq!(reloaded.objects.len(), 1);
    }

    #[test]
    fn test_load_dir_requires_levels() {
        let dir = std::env::temp_dir().join(format!("gauntlet-empty-levels-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        assert!(matches!(LevelTemplate::load_dir(&dir), Err(LevelError::Empty)));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_dir_reads_shipped_levels() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("levels");
        let levels = LevelTemplate::load_dir(dir).unwrap();
        assert_eq!(levels[0].name, "Warmup");
    }
}
