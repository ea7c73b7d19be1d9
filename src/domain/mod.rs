//! Domain types shared between the HTTP layer, the services and the store.

pub mod admin;

pub use admin::{AdminAccount, AdminStore, MAX_USERNAME_LEN, NewAdmin, StoreError};
