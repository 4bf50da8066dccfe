//! Membership lifecycle handlers.

pub mod arrival;
pub mod departure;
pub mod nickname;
pub mod promotion;
pub mod reconcile;

pub use arrival::ArrivalHandler;
pub use departure::DepartureHandler;
pub use nickname::NicknameHandler;
pub use promotion::PromotionHandler;
pub use reconcile::{GuildBackfillSummary, ReconcileHandler};
