pub mod apps;
pub mod messages;
pub mod projects;
pub mod signature;
pub mod webhooks;
