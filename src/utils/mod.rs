use actix_web::{web, FromRequest};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::error;

/// Claims carried by the identity provider's session token. The provider
/// signs these with the shared HS256 secret; `sub` is the stable external
/// user identifier, the profile fields mirror what the provider knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub iat: u64,
    pub exp: u64,
}

impl IdentityClaims {
    pub fn new(sub: &str, name: &str, email: &str, picture: Option<String>, exp: u64) -> Self {
        let now = chrono::Utc::now().timestamp() as u64;
        IdentityClaims {
            sub: sub.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            picture,
            iat: now,
            exp: now + exp,
        }
    }

    pub fn encode(&self, secret: &[u8]) -> Result<String, error::SystemError> {
        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, self, &EncodingKey::from_secret(secret))?;
        Ok(token)
    }

    pub fn decode(token: &str, secret: &[u8]) -> Result<Self, error::SystemError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        let token_data =
            decode::<Self>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(token_data.claims)
    }
}

/// Window inside which a fresh `last_seen` lets the stored online flag win.
/// A client that set `is_online = true` and never cleared it must not keep
/// a user "online" forever.
const ONLINE_THRESHOLD_MS: i64 = 2 * 60 * 1000;

/// Projects a user's presence fields into the label shown next to their
/// name. `now` is a parameter so callers render a consistent snapshot.
pub fn format_activity(
    is_online: bool,
    last_seen: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    if let Some(seen) = last_seen {
        if is_online && (now - seen).num_milliseconds() <= ONLINE_THRESHOLD_MS {
            return "online".to_string();
        }
    }

    let Some(seen) = last_seen else {
        return "offline".to_string();
    };

    let elapsed = now - seen;
    let seconds = elapsed.num_seconds();
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if seconds < 60 {
        return "active now".to_string();
    }
    if minutes < 60 {
        return format!("active {minutes}m ago");
    }
    if hours < 24 {
        return format!("active {hours}h ago");
    }
    if days < 7 {
        return format!("active {days}d ago");
    }

    format!("active {}", seen.format("%H:%M"))
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let json = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            let model = json.into_inner();
            model.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedJson(model))
        })
    }
}

pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Query::<T>::from_request(req, payload);

        Box::pin(async move {
            let query = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            query.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedQuery(query.into_inner()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn online_flag_with_recent_last_seen_is_online() {
        let now = at(0);
        assert_eq!(format_activity(true, Some(now - Duration::seconds(30)), now), "online");
    }

    #[test]
    fn online_flag_with_stale_last_seen_is_not_online() {
        // stale flag left behind by a client that never cleared it
        let now = at(0);
        let label = format_activity(true, Some(now - Duration::minutes(10)), now);
        assert_eq!(label, "active 10m ago");
    }

    #[test]
    fn never_seen_is_offline() {
        assert_eq!(format_activity(false, None, at(0)), "offline");
        assert_eq!(format_activity(true, None, at(0)), "offline");
    }

    #[test]
    fn under_a_minute_is_active_now() {
        let now = at(0);
        assert_eq!(format_activity(false, Some(now - Duration::seconds(59)), now), "active now");
    }

    #[test]
    fn ladder_minutes_hours_days() {
        let now = at(0);
        assert_eq!(format_activity(false, Some(now - Duration::minutes(5)), now), "active 5m ago");
        assert_eq!(format_activity(false, Some(now - Duration::hours(3)), now), "active 3h ago");
        assert_eq!(format_activity(false, Some(now - Duration::days(6)), now), "active 6d ago");
    }

    #[test]
    fn older_than_a_week_shows_wall_clock() {
        let now = at(0);
        let seen = now - Duration::days(10);
        let label = format_activity(false, Some(seen), now);
        assert_eq!(label, format!("active {}", seen.format("%H:%M")));
    }

    #[test]
    fn identity_claims_roundtrip() {
        let claims =
            IdentityClaims::new("ext_123", "Lan Tran", "lan@example.com", None, 900);
        let token = claims.encode(b"test-secret").unwrap();
        let decoded = IdentityClaims::decode(&token, b"test-secret").unwrap();
        assert_eq!(decoded.sub, "ext_123");
        assert_eq!(decoded.name, "Lan Tran");
    }

    #[test]
    fn identity_claims_wrong_secret_rejected() {
        let claims = IdentityClaims::new("ext_123", "Lan", "lan@example.com", None, 900);
        let token = claims.encode(b"test-secret").unwrap();
        assert!(IdentityClaims::decode(&token, b"other-secret").is_err());
    }
}
