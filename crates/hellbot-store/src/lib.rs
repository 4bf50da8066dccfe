//! MongoDB-backed implementation of the document-store capability.

pub mod mongo;

pub use mongo::MongoRegistryStore;
