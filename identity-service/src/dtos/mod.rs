pub mod identity;

pub use identity::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, VerifyRequest,
};
