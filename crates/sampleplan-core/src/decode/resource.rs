//! Resource lookup by identifier.
//!
//! Bundled resources are addressed by a numeric id or a name and resolve to
//! their bytes plus the declared file name. Vector/XML resources share the
//! same namespace but are not raster images, so they are rejected before any
//! decode planning happens.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::DecodeError;

/// Identifier of a bundled resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Numeric(u32),
    Named(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Numeric(id) => write!(f, "#{id:08x}"),
            ResourceId::Named(name) => f.write_str(name),
        }
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        ResourceId::Numeric(id)
    }
}

impl From<&str> for ResourceId {
    fn from(name: &str) -> Self {
        ResourceId::Named(name.to_string())
    }
}

/// A resource resolved to its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub id: ResourceId,
    /// File name the resource was declared with (e.g. `drawable/logo.png`).
    pub declared_name: String,
    pub bytes: Vec<u8>,
}

/// Resolves resource identifiers.
pub trait ResourceLookup {
    /// Fails with [`DecodeError::ResourceNotFound`] for unknown ids.
    fn resolve(&self, id: &ResourceId) -> Result<ResolvedResource, DecodeError>;
}

/// True for resources described as vector/XML rather than raster data.
pub fn is_vector_or_xml_resource(resource: &ResolvedResource) -> bool {
    let name = resource.declared_name.to_ascii_lowercase();
    name.ends_with(".xml") || name.ends_with(".svg")
}

/// In-memory resource table.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    entries: HashMap<ResourceId, (String, Vec<u8>)>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource, replacing any previous entry with the same id.
    pub fn insert(
        &mut self,
        id: impl Into<ResourceId>,
        declared_name: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.entries.insert(id.into(), (declared_name.into(), bytes));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceLookup for ResourceTable {
    fn resolve(&self, id: &ResourceId) -> Result<ResolvedResource, DecodeError> {
        let (declared_name, bytes) = self
            .entries
            .get(id)
            .ok_or_else(|| DecodeError::ResourceNotFound(id.to_string()))?;
        Ok(ResolvedResource {
            id: id.clone(),
            declared_name: declared_name.clone(),
            bytes: bytes.clone(),
        })
    }
}
