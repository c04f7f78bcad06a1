use serde::{Deserialize, Serialize};

/// Unique key of an object in the scene
pub type ObjectName = String;

/// Drop height used when a scene file does not give one
pub const DEFAULT_DROP_OFFSET: f64 = 300.0;

/// Printable region of the machine: platform size plus the position of its corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildVolume {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    /// Location of the platform corner (X, Y, Z)
    pub origin_offset: [f64; 3],
}

impl Default for BuildVolume {
    fn default() -> Self {
        Self::from_params([200.0, 200.0, 100.0, 0.0, 0.0, 0.0])
    }
}

impl BuildVolume {
    /// Build from the flat `[width, depth, height, x, y, z]` form used on the command line
    pub fn from_params(p: [f64; 6]) -> Self {
        Self {
            width: p[0],
            depth: p[1],
            height: p[2],
            origin_offset: [p[3], p[4], p[5]],
        }
    }

    pub fn to_params(&self) -> [f64; 6] {
        [
            self.width,
            self.depth,
            self.height,
            self.origin_offset[0],
            self.origin_offset[1],
            self.origin_offset[2],
        ]
    }

    /// Parse `w,d,h,x,y,z`. Missing trailing offsets default to zero.
    pub fn parse(text: &str) -> Result<Self, String> {
        let values: Vec<f64> = text
            .split(',')
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid build volume `{text}`: {e}"))?;
        if values.len() < 3 || values.len() > 6 {
            return Err(format!(
                "build volume needs 3 to 6 values, got {}",
                values.len()
            ));
        }
        let mut params = [0.0; 6];
        params[..values.len()].copy_from_slice(&values);
        let volume = Self::from_params(params);
        if !volume.is_valid() {
            return Err(format!("build volume dimensions must be positive: `{text}`"));
        }
        Ok(volume)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.depth > 0.0 && self.height > 0.0
    }

    /// Center of the platform surface
    pub fn platform_center(&self) -> [f64; 3] {
        [
            self.origin_offset[0] + self.width / 2.0,
            self.origin_offset[1] + self.depth / 2.0,
            self.origin_offset[2],
        ]
    }

    /// Length of the volume's space diagonal
    pub fn diagonal(&self) -> f64 {
        (self.width * self.width + self.depth * self.depth + self.height * self.height).sqrt()
    }
}

/// Procedural shape used in place of a loaded mesh file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Cube {
        width: f64,
        depth: f64,
        height: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
    },
    Sphere {
        radius: f64,
    },
    Cone {
        radius: f64,
        height: f64,
    },
}

impl Primitive {
    pub fn label(&self) -> &'static str {
        match self {
            Primitive::Cube { .. } => "cube",
            Primitive::Cylinder { .. } => "cylinder",
            Primitive::Sphere { .. } => "sphere",
            Primitive::Cone { .. } => "cone",
        }
    }
}

fn default_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn default_drop_offset() -> f64 {
    DEFAULT_DROP_OFFSET
}

/// One object as listed in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: ObjectName,
    pub primitive: Primitive,
    #[serde(default)]
    pub position: [f64; 3],
    /// Rotation about the local Z axis, degrees
    #[serde(default)]
    pub rotation_z: f64,
    #[serde(default = "default_scale")]
    pub scale: [f64; 3],
    #[serde(default = "default_drop_offset")]
    pub drop_offset: f64,
}

impl ObjectSpec {
    pub fn new(name: impl Into<ObjectName>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            primitive,
            position: [0.0; 3],
            rotation_z: 0.0,
            scale: default_scale(),
            drop_offset: DEFAULT_DROP_OFFSET,
        }
    }

    pub fn at(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }
}

/// Scene file: an optional build volume override plus the objects to place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_volume: Option<BuildVolume>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
