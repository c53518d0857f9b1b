// src/repositories/memory/mod.rs
//
// In-memory backend with the same conditional-update semantics as the
// Postgres one. Used by the test suite and local demos; never by the
// production server.

pub mod members;
pub mod redemptions;
pub mod stores;

pub use members::MemoryMemberRepository;
pub use redemptions::MemoryRedemptionStore;
pub use stores::MemoryStoreRepository;
