//! The fixed resource table.
//!
//! Resources are registered once at startup through [`RegistryBuilder`];
//! the built [`ResourceRegistry`] is immutable. Lookup is an exact string
//! match on the path, in registration order, so the first resource
//! registered for a path wins.

use tracing::warn;

use crate::error::{RegistryError, ResourceError};
use crate::http::request::{Method, MethodSet};
use crate::resource::buffer::MAX_ACCUMULATION_CAPACITY;
use crate::resource::dynamic::DynamicResource;
use crate::resource::static_file::StaticResource;
use crate::resource::upgrade::UpgradeResource;

pub enum ResourceKind {
    Static(StaticResource),
    Dynamic(DynamicResource),
    Upgrade(UpgradeResource),
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Static(_) => "static",
            ResourceKind::Dynamic(_) => "dynamic",
            ResourceKind::Upgrade(_) => "upgrade",
        }
    }
}

pub struct ResourceDescriptor {
    pub path: String,
    pub methods: MethodSet,
    pub kind: ResourceKind,
}

impl ResourceDescriptor {
    pub fn allows(&self, method: Method) -> Result<(), ResourceError> {
        if self.methods.contains(method) {
            Ok(())
        } else {
            Err(ResourceError::MethodNotAllowed {
                path: self.path.clone(),
                method,
                allowed: self.methods,
            })
        }
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    resources: Vec<ResourceDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        path: impl Into<String>,
        methods: MethodSet,
        kind: ResourceKind,
    ) -> Result<Self, RegistryError> {
        let path = path.into();

        if !path.starts_with('/') {
            return Err(RegistryError::InvalidPath(path));
        }
        if methods.is_empty() {
            return Err(RegistryError::EmptyMethodSet(path));
        }

        let capacity = match &kind {
            ResourceKind::Dynamic(res) => res.capacity(),
            ResourceKind::Upgrade(res) => Some(res.scratch_capacity()),
            ResourceKind::Static(_) => None,
        };
        if let Some(capacity) = capacity {
            if capacity == 0 || capacity > MAX_ACCUMULATION_CAPACITY {
                return Err(RegistryError::InvalidCapacity {
                    path,
                    capacity,
                    max: MAX_ACCUMULATION_CAPACITY,
                });
            }
        }

        if self.resources.iter().any(|r| r.path == path) {
            warn!(path = %path, kind = kind.name(), "path already registered, resource is shadowed");
        }

        self.resources.push(ResourceDescriptor {
            path,
            methods,
            kind,
        });
        Ok(self)
    }

    pub fn build(self) -> ResourceRegistry {
        ResourceRegistry {
            resources: self.resources,
        }
    }
}

pub struct ResourceRegistry {
    resources: Vec<ResourceDescriptor>,
}

impl ResourceRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn resolve(&self, path: &str, method: Method) -> Result<&ResourceDescriptor, ResourceError> {
        let descriptor = self
            .resources
            .iter()
            .find(|r| r.path == path)
            .ok_or_else(|| ResourceError::NotFound {
                path: path.to_string(),
            })?;

        descriptor.allows(method)?;
        Ok(descriptor)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter()
    }
}
