mod device_kind;
mod new_signup;
mod signup_email;

pub use device_kind::DeviceKind;
pub use new_signup::NewSignup;
pub use signup_email::{SignupEmail, is_valid_email};
