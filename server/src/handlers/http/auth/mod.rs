pub mod login;
pub mod logout;
pub mod payment;
pub mod session;
pub mod signup;

pub use login::handle_login;
pub use logout::handle_logout;
pub use payment::handle_payment;
pub use session::handle_session_view;
pub use signup::handle_signup;
