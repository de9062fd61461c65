use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::Error as JwtError, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};

use serde::{Deserialize, Serialize};

const ACCESS_TOKEN_HOURS: i64 = 1;

/// 세션 토큰 발급/검증. 비밀키는 설정에서 주입받는다.
#[derive(Clone)]
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// 세션 토큰에 담기는 값. `sub` 은 사용자 ID 문자열이다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

pub enum TokenVerifyResult {
    Valid(Claims),
    Expired,
    Invalid,
}

impl JwtUtils {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// 토큰 발급은 외부 로그인 서비스가 맡는다. 여기서는 같은 비밀키로 토큰을 만들어야 하는 테스트와 도구용이다.
    pub fn generate_token(&self, user_id: i32, role: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(ACCESS_TOKEN_HOURS);

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn verify_token(&self, token: &str) -> TokenVerifyResult {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) => TokenVerifyResult::Valid(data.claims),
            Err(err) => match *err.kind() {
                ErrorKind::ExpiredSignature => TokenVerifyResult::Expired,
                _ => TokenVerifyResult::Invalid,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::{Claims, JwtUtils, TokenVerifyResult};

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let jwt = JwtUtils::new("test-secret");
        let token = jwt.generate_token(7, "user").unwrap();

        match jwt.verify_token(&token) {
            TokenVerifyResult::Valid(claims) => assert_eq!(claims.sub, "7"),
            _ => panic!("토큰이 유효해야 합니다"),
        }
        assert!(matches!(JwtUtils::new("other-secret").verify_token(&token), TokenVerifyResult::Invalid));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let issued = Utc::now() - Duration::hours(3);
        let claims = Claims {
            sub: "7".to_string(),
            role: "user".to_string(),
            exp: (issued + Duration::hours(1)).timestamp() as usize,
            iat: issued.timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap();

        assert!(matches!(JwtUtils::new("test-secret").verify_token(&token), TokenVerifyResult::Expired));
    }
}
