use crate::gfx::math::{Color, GeoPoint};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid roster file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Roster has no entities")]
    EmptyRoster,

    #[error("Entity id must not be empty")]
    EmptyId,

    #[error("Entity '{0}' is defined more than once")]
    DuplicateId(String),

    #[error("Entity '{id}' has an empty path")]
    EmptyPath { id: String },

    #[error("Entity '{id}' has invalid color '{color}', expected #rrggbb")]
    InvalidColor { id: String, color: String },
}

/// One moving marker on the map. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: String,
    display_name: String,
    color: Color,
    path: Vec<GeoPoint>,
}

impl Entity {
    /// Fails when `id` is blank or `path` has no points, so interpolation
    /// never sees an empty path.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        color: Color,
        path: Vec<GeoPoint>,
    ) -> Result<Self, RosterError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RosterError::EmptyId);
        }
        if path.is_empty() {
            return Err(RosterError::EmptyPath { id });
        }
        Ok(Self {
            id,
            display_name: display_name.into(),
            color,
            path,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default, rename = "entity")]
    entities: Vec<EntityRecord>,
}

#[derive(Debug, Deserialize)]
struct EntityRecord {
    id: String,
    display_name: Option<String>,
    color: String,
    #[serde(default)]
    path: Vec<GeoPoint>,
}

impl TryFrom<EntityRecord> for Entity {
    type Error = RosterError;

    fn try_from(record: EntityRecord) -> Result<Self, Self::Error> {
        let color = Color::from_hex(&record.color).ok_or_else(|| RosterError::InvalidColor {
            id: record.id.clone(),
            color: record.color.clone(),
        })?;
        let display_name = record.display_name.unwrap_or_else(|| record.id.clone());
        Entity::new(record.id, display_name, color, record.path)
    }
}

/// The static set of entities, read once at startup.
#[derive(Debug, Clone)]
pub struct Roster {
    entities: Vec<Entity>,
}

impl Roster {
    pub fn new(entities: Vec<Entity>) -> Result<Self, RosterError> {
        if entities.is_empty() {
            return Err(RosterError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        for entity in &entities {
            if !seen.insert(entity.id()) {
                return Err(RosterError::DuplicateId(entity.id().to_string()));
            }
        }
        Ok(Self { entities })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, RosterError> {
        let file: RosterFile = toml::from_str(contents)?;
        let entities = file
            .entities
            .into_iter()
            .map(Entity::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entities)
    }

    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// A handful of early modern voyages. Waypoints are rough.
    pub fn builtin() -> Result<Self, RosterError> {
        Self::from_toml_str(BUILTIN_ROSTER)
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }
}

const BUILTIN_ROSTER: &str = r##"
[[entity]]
id = "columbus"
display_name = "Columbus, first voyage (1492)"
color = "#e6194b"
path = [[37.2, -6.9], [28.1, -17.1], [24.5, -45.0], [24.1, -74.5], [21.8, -79.0], [19.8, -72.2]]

[[entity]]
id = "da-gama"
display_name = "Vasco da Gama (1497-1498)"
color = "#3cb44b"
path = [[38.7, -9.1], [14.9, -23.5], [-32.7, 18.0], [-34.4, 20.0], [-25.9, 32.6], [-4.0, 39.7], [-3.2, 40.1], [11.2, 75.8]]

[[entity]]
id = "magellan"
display_name = "Magellan-Elcano expedition (1519-1522)"
color = "#4363d8"
path = [[36.8, -6.4], [28.1, -15.4], [-22.9, -43.2], [-49.3, -67.7], [-52.5, -69.5], [-33.0, -80.0], [13.4, 144.7], [10.3, 123.9], [-8.5, 125.6], [-34.4, 20.0], [14.9, -23.5], [36.8, -6.4]]

[[entity]]
id = "zheng-he"
display_name = "Zheng He, seventh voyage (1431-1433)"
color = "#f58231"
path = [[32.0, 118.8], [26.1, 119.3], [10.8, 106.7], [2.2, 102.2], [6.0, 80.2], [11.2, 75.8], [27.1, 56.3], [-4.0, 39.7]]
"##;
