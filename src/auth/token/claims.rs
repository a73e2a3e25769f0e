//! Access-token expiry decoding.

// crates.io
use jsonwebtoken::{DecodingKey, Validation};
// self
use crate::_prelude::*;

/// Reads the absolute expiry embedded in an access token.
pub trait ExpiryDecoder
where
	Self: Send + Sync,
{
	/// Returns the expiry instant, or `None` when the token carries no readable claim.
	fn expires_at(&self, access_token: &str) -> Option<OffsetDateTime>;
}

/// Decodes the `exp` claim of a JWT access token.
///
/// The signature is not checked: the identity backend verifies tokens on every API call,
/// this side only needs the expiry to schedule refreshes.
#[derive(Clone, Copy, Debug, Default)]
pub struct JwtExpiryDecoder;
impl ExpiryDecoder for JwtExpiryDecoder {
	fn expires_at(&self, access_token: &str) -> Option<OffsetDateTime> {
		let mut validation = Validation::default();

		validation.insecure_disable_signature_validation();
		validation.validate_exp = false;
		validation.validate_aud = false;
		validation.required_spec_claims.clear();

		let data = jsonwebtoken::decode::<ExpiryClaim>(
			access_token,
			&DecodingKey::from_secret(&[]),
			&validation,
		)
		.ok()?;
		let exp = data.claims.exp.filter(|exp| exp.is_finite())?;

		OffsetDateTime::from_unix_timestamp(exp.trunc() as i64).ok()
	}
}

#[derive(Deserialize)]
struct ExpiryClaim {
	#[serde(default)]
	exp: Option<f64>,
}
