//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod bucket;
pub mod card;
pub mod intake_session;

// Re-export specific types to avoid conflicts
pub use bucket::{Column as BucketColumn, Entity as Bucket, Model as BucketModel};
pub use card::{Column as CardColumn, Entity as Card, Model as CardModel};
pub use intake_session::{
    Column as IntakeSessionColumn, Entity as IntakeSession, Model as IntakeSessionModel,
};
