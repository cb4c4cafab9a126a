//! OpenAPI document served at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth, qa};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register::register,
        auth::send_otp::send_otp,
        auth::verify_otp::verify_otp,
        auth::logout::logout,
        auth::refresh::token_refresh,
        qa::questions::questions_list,
        qa::questions::questions_create,
        qa::questions::question_detail,
        qa::answers::answers_create,
    ),
    components(schemas(
        auth::types::Detail,
        auth::types::RegisterRequest,
        auth::types::SendOtpRequest,
        auth::types::VerifyOtpRequest,
        auth::types::VerifyOtpResponse,
        auth::types::UserProfile,
        auth::types::LogoutRequest,
        auth::types::TokenRefreshRequest,
        auth::types::TokenRefreshResponse,
        qa::types::CreateQuestionRequest,
        qa::types::QuestionSummary,
        qa::types::QuestionDetail,
        qa::types::QuestionAuthor,
        qa::types::AnswerDetail,
        qa::types::CreateAnswerRequest,
        qa::types::AnswerOut,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, OTP login, and token lifecycle"),
        (name = "questions", description = "Question list/create/detail"),
        (name = "answers", description = "Answer creation")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/send-otp/"));
        assert!(paths.contains_key("/verify-otp/"));
        assert!(paths.contains_key("/register/"));
        assert!(paths.contains_key("/logout/"));
        assert!(paths.contains_key("/token/refresh/"));
        assert!(paths.contains_key("/questions/"));
    }
}
