use actix_web::{
    Error as ActixError, FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized,
    web::Data,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::config::Config;

/// Token claims issued by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub name: String,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            sub: user_id.into(),
            name: name.into(),
            exp: (Utc::now() + ttl).timestamp() as usize,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub.clone(),
            display_name: self.name.clone(),
        }
    }

    pub fn encode(&self, secret: &str) -> jsonwebtoken::errors::Result<String> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_ref()),
        )
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "));

        let (Some(token), Some(config)) = (token, req.app_data::<Data<Config>>()) else {
            return ready(Err(ErrorUnauthorized(
                "Missing or invalid authorization header",
            )));
        };

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(token_data) => ready(Ok(token_data.claims)),
            Err(e) => {
                log::debug!("Rejected bearer token: {}", e);
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}

/// Who is acting, independent of any workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}
