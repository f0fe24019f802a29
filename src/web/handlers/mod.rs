pub mod auth;
pub mod contact;
pub mod media;
pub mod posts;
pub mod site;
