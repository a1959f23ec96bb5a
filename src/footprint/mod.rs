pub mod record;
pub mod ring;

pub use record::{BuildingCategory, Footprint, FootprintRecord, Polygon, Tags, LEVELS_TAG};
pub use ring::{CapSide, Ring, RingRole};

use std::collections::HashSet;

use crate::error::{AssemblyError, AttributeError, GeocityError};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Unique identifier for a footprint in the store.
    pub struct FootprintId;
}

/// A footprint rejected during ingestion, with the reason.
#[derive(Debug)]
pub struct Skipped {
    pub id: String,
    pub error: GeocityError,
}

/// Arena owning every ingested footprint and the area-of-interest boundary.
///
/// Footprints are never removed, so iteration follows insertion order.
#[derive(Debug, Default)]
pub struct FootprintStore {
    footprints: SlotMap<FootprintId, Footprint>,
    ids: HashSet<String>,
    boundary: Vec<Polygon>,
}

impl FootprintStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts records, skipping the ones that cannot be modelled.
    ///
    /// Malformed rings, a missing `building:levels` tag and repeated
    /// identifiers skip the record; every skip is logged and returned.
    pub fn ingest(&mut self, records: impl IntoIterator<Item = FootprintRecord>) -> Vec<Skipped> {
        let mut skipped = Vec::new();
        for record in records {
            let id = record.id.clone();
            let result = if self.ids.contains(&id) {
                Err(AttributeError::DuplicateId {
                    footprint: id.clone(),
                }
                .into())
            } else {
                Footprint::try_from_record(record)
            };
            match result {
                Ok(footprint) => {
                    self.add(footprint);
                }
                Err(error) => {
                    tracing::warn!(footprint = %id, %error, "skipping footprint");
                    skipped.push(Skipped { id, error });
                }
            }
        }
        tracing::debug!(
            ingested = self.footprints.len(),
            skipped = skipped.len(),
            "footprints ingested"
        );
        skipped
    }

    /// Inserts a footprint and returns its ID.
    pub fn add(&mut self, footprint: Footprint) -> FootprintId {
        self.ids.insert(footprint.id.clone());
        self.footprints.insert(footprint)
    }

    /// Adds an area-of-interest boundary polygon.
    pub fn add_boundary(&mut self, polygon: Polygon) {
        self.boundary.push(polygon);
    }

    /// Returns a reference to the footprint, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::UnknownFootprint`] if the ID is stale.
    pub fn footprint(&self, id: FootprintId) -> Result<&Footprint, AssemblyError> {
        self.footprints
            .get(id)
            .ok_or_else(|| AssemblyError::UnknownFootprint(format!("{id:?}")))
    }

    /// Iterates footprints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FootprintId, &Footprint)> {
        self.footprints.iter()
    }

    /// The area-of-interest boundary polygons.
    #[must_use]
    pub fn boundary(&self) -> &[Polygon] {
        &self.boundary
    }

    /// Number of stored footprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    /// Returns `true` if no footprint is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}
