mod download;
mod health_check;
mod landing;
mod signups;

pub use download::download;
pub use health_check::health_check;
pub use landing::landing;
pub use signups::{signup, signup_status};
