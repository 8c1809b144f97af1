use serde::{Deserialize, Serialize};

pub mod discussion;
pub mod interactions;
pub mod question;
pub mod reputation;
pub mod resource;
pub mod user;

pub use discussion::*;
pub use interactions::*;
pub use question::*;
pub use reputation::*;
pub use resource::*;
pub use user::*;

/// Academic category shared by resources and questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Computer Science")]
    ComputerScience,
    Mathematics,
    Physics,
    Chemistry,
    Biology,
    Engineering,
    Business,
    Arts,
    Languages,
    Other,
}
