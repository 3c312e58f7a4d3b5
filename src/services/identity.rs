use std::future::{Ready, ready};

use actix_web::{
    Error as ActixError, FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized,
};

/// The opaque, stable member id the external identity provider attaches to
/// every request. The core never issues or validates credentials; it only
/// requires the id to be present.
#[derive(Debug, Clone)]
pub struct MemberIdentity {
    pub member_id: String,
}

impl FromRequest for MemberIdentity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let member_id = req
            .headers()
            .get("X-Member-Id")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match member_id {
            Some(member_id) => ready(Ok(MemberIdentity { member_id })),
            None => ready(Err(ErrorUnauthorized("Missing X-Member-Id header"))),
        }
    }
}
