//! Parse-then-build pipeline: a map file in, entities with built brushes
//! out, along with everything that went wrong on the way.

use std::fmt;
use std::io::Read;

#[cfg(feature = "hashbrown")]
use hashbrown::HashSet;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashSet;

use log::{debug, warn};

use crate::geometry::{GeometryError, MapBrush};
use crate::qmap::{
    self, attributes, Attribute, EntityRole, ExtraAttributes, ParseOptions,
    ParsedMap, Warning,
};

/// A map with every brush rebuilt as a polytope.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub entities: Vec<SceneEntity>,
    /// Index into `entities` of the world entity.
    pub world: usize,
    pub warnings: Vec<Warning>,
    /// Brushes left out of `entities` because they could not be built.
    pub failures: Vec<BrushFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub attributes: Vec<Attribute>,
    pub extra_attributes: ExtraAttributes,
    pub role: EntityRole,
    pub brushes: Vec<MapBrush>,
    pub start_line: usize,
    pub line_count: usize,
}

impl SceneEntity {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn classname(&self) -> &str {
        attributes::find_attribute(
            &self.attributes,
            attributes::names::CLASSNAME,
        )
    }
}

/// A brush that was skipped, addressed by its position in the parsed map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrushFailure {
    pub entity: usize,
    pub brush: usize,
    /// First line of the brush in the map text.
    pub line: usize,
    pub error: GeometryError,
}

impl fmt::Display for BrushFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Entity {}, brush {} (line {}): {}",
            self.entity, self.brush, self.line, self.error
        )
    }
}

/// Parse `text` and build every brush. Parse errors fail the whole load;
/// brushes that don't build are skipped and reported in `failures`.
pub fn load(text: &str, options: &ParseOptions) -> qmap::Result<Scene> {
    Ok(Scene::build(qmap::parse(text, options)?))
}

/// [`load`] from a reader.
pub fn load_reader<R: Read>(
    reader: R,
    options: &ParseOptions,
) -> qmap::Result<Scene> {
    Ok(Scene::build(qmap::parse_reader(reader, options)?))
}

impl Scene {
    /// Build geometry for an already parsed map.
    pub fn build(parsed: ParsedMap) -> Scene {
        let ParsedMap {
            map,
            warnings,
            point_scale,
        } = parsed;
        let mut failures = Vec::new();

        let entities = map
            .entities
            .into_iter()
            .enumerate()
            .map(|(entity_index, entity)| {
                let role = entity.role();
                let mut brushes = Vec::with_capacity(entity.brushes.len());

                for (brush_index, brush) in entity.brushes.iter().enumerate()
                {
                    match MapBrush::build_scaled(brush, point_scale) {
                        Ok(built) => brushes.push(built),
                        Err(error) => {
                            let failure = BrushFailure {
                                entity: entity_index,
                                brush: brush_index,
                                line: brush.start_line,
                                error,
                            };
                            warn!("Skipping brush: {failure}");
                            failures.push(failure);
                        }
                    }
                }

                SceneEntity {
                    attributes: entity.attributes,
                    extra_attributes: entity.extra_attributes,
                    role,
                    brushes,
                    start_line: entity.start_line,
                    line_count: entity.line_count,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Built {} entities, {} brushes skipped",
            entities.len(),
            failures.len()
        );

        Scene {
            entities,
            world: map.world,
            warnings,
            failures,
        }
    }

    pub fn world(&self) -> Option<&SceneEntity> {
        self.entities.get(self.world)
    }

    /// Distinct non-empty texture names in order of first use.
    pub fn texture_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();

        self.entities
            .iter()
            .flat_map(|entity| &entity.brushes)
            .flat_map(|brush| &brush.faces)
            .map(|face| face.texture.as_str())
            .filter(|name| !name.is_empty() && seen.insert(*name))
            .collect()
    }
}

#[cfg(test)]
mod scene_test;
