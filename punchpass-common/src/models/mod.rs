// File: punchpass-common/src/models/mod.rs
pub mod actor;
pub mod member;
pub mod redemption;
pub mod store;
pub mod ticket;

pub use actor::Actor;
pub use member::Member;
pub use redemption::{Page, RedemptionEvent};
pub use store::Store;
pub use ticket::{Eligibility, MemberTicketSummary, Ticket, TicketStatus};
