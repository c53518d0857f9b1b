// File: src/services/mod.rs

pub mod member_service;
pub mod redemption_service;

pub use member_service::MemberService;
pub use redemption_service::{RedeemError, RedemptionReceipt, RedemptionService};
