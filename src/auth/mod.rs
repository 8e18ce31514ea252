mod jwt;

pub use jwt::SessionClaims;
