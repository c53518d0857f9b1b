// src/repositories/postgres/mod.rs

pub mod members;
pub mod redemptions;
pub mod stores;

pub use members::PostgresMemberRepository;
pub use redemptions::PostgresRedemptionStore;
pub use stores::PostgresStoreRepository;
