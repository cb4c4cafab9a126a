use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub email_from: String,
    pub frontend_url: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString, email_from: String, frontend_url: String) -> Self {
        Self {
            jwt_secret,
            email_from,
            frontend_url,
        }
    }
}
