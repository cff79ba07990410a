/// Secret used to sign and verify test tokens.
pub static TEST_JWT_SECRET: &str = "chronicle-test-secret";
