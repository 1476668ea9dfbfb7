pub mod admins;
pub mod jwt;
pub mod mail;
pub mod media;
pub mod notifications;
pub mod participants;
pub mod partners;
pub mod quotes;
