//! Metadata models and the transformations built on them

pub mod definitions;
pub mod entity_sets;
pub mod labels;
pub mod models;
pub mod status_map;

pub use entity_sets::{EntityDescriptor, EntitySetEntry, EntitySetFile, EntitySets};
pub use labels::select_label;
pub use status_map::{OptionDescriptor, StateStatusMap, StatusMap, StatusMapReport};
