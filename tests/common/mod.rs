pub mod database;

pub use helpers::{
    bearer, create_partner, jpeg_part, participant_form, quote_form, submit_participant,
};
pub use test_app::{ADMIN_PASSWORD, TEST_JWT_SECRET, TestApp};
