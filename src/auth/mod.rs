//! Authentication module for Mailroom.
//!
//! This module provides password hashing, account registration, login and
//! profile access.

mod password;
mod profile;
mod registration;
pub mod validation;

pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use profile::{
    get_profile, update_profile_picture, validate_picture, AccountProfile, MAX_PICTURE_BYTES,
};
pub use registration::{
    authenticate, register, RegistrationError, RegistrationRequest, INVALID_CREDENTIALS,
};
pub use validation::ValidationError;
