use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use picstream_core::new_id;
use picstream_sql::Value;

use crate::model::{Claims, LoginResponse, Session, User};
use crate::service::{user::verify_password, SocialError, SocialService};

impl SocialService {
    /// Verify credentials and issue an access token.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, SocialError> {
        let user = self
            .find_user_by_username(username)?
            .ok_or_else(|| SocialError::Unauthorized("invalid credentials".into()))?;

        if !verify_password(password, &user.password_hash) {
            tracing::error!("failed login attempt for '{}'", username);
            return Err(SocialError::Unauthorized("invalid credentials".into()));
        }

        self.issue_token(&user)
    }

    /// Issue a signed JWT for a user, recording a session for revocation.
    pub fn issue_token(&self, user: &User) -> Result<LoginResponse, SocialError> {
        let session_id = new_id();
        let now = chrono::Utc::now();
        let expires = now + chrono::Duration::seconds(self.config.access_token_ttl);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| SocialError::Internal(format!("JWT encode failed: {}", e)))?;

        let session = Session {
            id: session_id,
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: expires.to_rfc3339(),
            revoked: false,
        };

        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::Integer(0)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Verify and decode a JWT access token.
    /// Returns the claims if valid and the session is not revoked.
    pub fn verify_token(&self, token: &str) -> Result<Claims, SocialError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| SocialError::Unauthorized(format!("invalid token: {}", e)))?;

        let claims = token_data.claims;

        if let Ok(session) = self.get_record::<Session>("sessions", &claims.sid) {
            if session.revoked {
                return Err(SocialError::Unauthorized("session has been revoked".into()));
            }
        }

        Ok(claims)
    }

    /// Revoke a session (its token becomes invalid).
    pub fn revoke_session(&self, session_id: &str) -> Result<(), SocialError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.revoked = true;

        self.update_record(
            "sessions",
            session_id,
            &session,
            &[("revoked", Value::Integer(1))],
        )?;

        Ok(())
    }
}
