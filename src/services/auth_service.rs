use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::collections::HashSet;

use crate::{config::JwtSettings, middleware::auth::Claims};

// Tokens are minted by the hall's login gateway; this service only verifies them.
pub fn verify_token(token: &str, settings: &JwtSettings) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[settings.audience.as_str()]);

    let mut issuers = HashSet::new();
    issuers.insert(settings.issuer.clone());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}
