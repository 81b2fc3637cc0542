mod password;
mod request_context;

pub use password::login_handler;
