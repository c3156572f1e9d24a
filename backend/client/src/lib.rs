//! BorkChain client.
//!
//! | Module      | Role                                                  |
//! |-------------|-------------------------------------------------------|
//! | [`store`]   | Session store: state, actions, two-phase completion   |
//! | [`wallet`]  | Wallet provider trait and a static wallet             |
//! | [`backend`] | Backend trait and the reqwest-based HTTP client       |
//! | [`storage`] | Local persisted key-value state                       |

pub mod backend;
pub mod config;
pub mod errors;
pub mod storage;
pub mod store;
pub mod wallet;

pub use backend::{Backend, HttpBackend};
pub use errors::{ClientError, Result, WalletError};
pub use store::{Action, Notice, NoticeLevel, SessionState, SessionStore};
pub use wallet::{AccountEvent, StaticWallet, WalletProvider};
