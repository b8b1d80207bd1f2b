//! Container and per-partition database handles.

use serde::Serialize;

use crate::Partition;

/// Handle to one partition of a container.
///
/// Handles are descriptors: they carry no connection state and are passed to a
/// [`RecordProvider`](crate::provider::RecordProvider) to scope each call.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Database {
    container_identifier: String,
    partition: Partition,
}

impl Database {
    fn new(container_identifier: &str, partition: Partition) -> Self {
        Self {
            container_identifier: container_identifier.to_owned(),
            partition,
        }
    }

    /// Returns the container this database belongs to.
    #[inline]
    pub fn container_identifier(&self) -> &str {
        &self.container_identifier
    }

    /// Returns the partition this database exposes.
    #[inline]
    pub fn partition(&self) -> Partition {
        self.partition
    }
}

/// A remote container exposing one database per partition.
#[derive(Debug)]
pub struct Container {
    identifier: String,
    private: Database,
    public: Database,
    shared: Database,
}

impl Container {
    /// Creates a container with its three database handles.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            private: Database::new(&identifier, Partition::Private),
            public: Database::new(&identifier, Partition::Public),
            shared: Database::new(&identifier, Partition::Shared),
            identifier,
        }
    }

    /// Returns the container identifier.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the database handle of `partition`.
    pub fn database(&self, partition: Partition) -> &Database {
        match partition {
            Partition::Private => &self.private,
            Partition::Public => &self.public,
            Partition::Shared => &self.shared,
        }
    }
}
