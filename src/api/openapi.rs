//! OpenAPI document served next to the API for the Swagger UI.

use utoipa::OpenApi;

use super::handlers::auth::types::{
    IssueOtpRequest, IssueOtpResponse, SessionResponse, VerifyOtpRequest, VerifyOtpResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::issue::issue_otp,
        crate::api::handlers::auth::verify::verify_otp,
        crate::api::handlers::auth::session::session,
    ),
    components(schemas(
        IssueOtpRequest,
        IssueOtpResponse,
        VerifyOtpRequest,
        VerifyOtpResponse,
        SessionResponse,
    )),
    tags(
        (name = "auth", description = "OTP issuance, verification, and session validation"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
