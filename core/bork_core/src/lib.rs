//! # BorkChain core rules
//!
//! Pure domain logic shared by the server and the client. Nothing in this crate
//! performs I/O.
//!
//! | Area         | Module                                   |
//! |--------------|------------------------------------------|
//! | Data model   | [`types`]                                |
//! | Badges       | [`badge::classify`], [`badge::BADGE_TIERS`] |
//! | Referrals    | [`referral`]                             |
//! | Streaks      | [`streak::advance_streak`]               |
//! | Validation   | [`validation`]                           |
//! | Admin        | [`admin::AdminSession`]                  |
//! | Wire shapes  | [`wire`]                                 |

pub mod admin;
pub mod badge;
pub mod errors;
pub mod format;
pub mod referral;
pub mod streak;
pub mod types;
pub mod validation;
pub mod wire;

pub use badge::{classify, BadgeInfo, BadgeTier, BADGE_TIERS};
pub use errors::{CoreError, Result};
pub use types::{
    Address, AirdropClaim, Contribution, Difficulty, Referral, Task, TaskCompletion, TaskType,
    User,
};
