//! Identity providers and the unified signed-in user
//!
//! Two independent providers authenticate users: [`PasswordProvider`]
//! (e-mail and password) and [`PhoneProvider`] (SMS one-time codes).
//! [`AuthContext`] merges their sessions into one [`UnifiedUser`].

pub mod outbox;
pub mod password;
pub mod password_provider;
pub mod phone_provider;
pub mod session;
pub mod store;
pub mod unified;

pub use outbox::{Channel, FileOutbox, MessageSender, OutboxMessage};
pub use password_provider::PasswordProvider;
pub use phone_provider::{normalize_phone, PhoneProvider};
pub use session::{PasswordSession, PhoneSession, SessionState};
pub use store::IdentityStore;
pub use unified::{
    merge_user_data, sync_phone_identity, AuthContext, AuthDebug, PhoneSignIn, SyncOutcome,
    UnifiedUser,
};
