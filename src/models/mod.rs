pub mod admins;
pub mod forms;
pub mod media;
pub mod pagination;
pub mod participants;
pub mod partners;
pub mod quotes;
