mod authcontroller;
mod dummyauthcontroller;

pub use authcontroller::AuthController;
pub use authcontroller::AuthControllerPointer;
pub use authcontroller::AuthError;

pub use dummyauthcontroller::DummyAuthController;

#[cfg(feature = "backend")]
mod httpauthcontroller;

#[cfg(feature = "backend")]
pub use httpauthcontroller::HttpAuthController;
