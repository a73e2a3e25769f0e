//! Role normalization shared by password and federated sign-ins.

// std
use std::{collections::BTreeSet, slice::Iter};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Errors emitted when validating roles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RoleValidationError {
	/// Empty role entries are not allowed.
	#[error("Role entries cannot be empty.")]
	Empty,
	/// Roles cannot contain embedded whitespace characters.
	#[error("Role contains whitespace: {role}.")]
	ContainsWhitespace {
		/// The offending role string.
		role: String,
	},
}

/// Normalized set of account roles.
///
/// Entries are trimmed, lowercased, deduplicated, and sorted so that a backend answering
/// `"INSTRUCTOR"` for one sign-in path and `["instructor"]` for another yields equal sets.
/// Deserialization accepts a single string, a list of strings, or `null`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(Arc<[String]>);
impl RoleSet {
	/// Creates a normalized role set from any iterator.
	pub fn new<I, S>(roles: I) -> Result<Self, RoleValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self(normalize(roles)?))
	}

	/// Number of distinct roles.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no roles are assigned.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the set contains the provided role (compared case-insensitively).
	pub fn contains(&self, role: &str) -> bool {
		let needle = role.trim().to_lowercase();

		self.0.binary_search_by(|candidate| candidate.as_str().cmp(needle.as_str())).is_ok()
	}

	/// Iterator over normalized roles.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|s| s.as_str())
	}

	/// Returns the underlying slice of role strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl Debug for RoleSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("RoleSet").field(&self.0).finish()
	}
}
impl Display for RoleSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join(","))
	}
}

/// Iterator over role strings.
pub struct RoleIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for RoleIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl<'a> IntoIterator for &'a RoleSet {
	type IntoIter = RoleIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		RoleIter { inner: self.0.iter() }
	}
}
impl TryFrom<Vec<String>> for RoleSet {
	type Error = RoleValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for RoleSet {
	type Err = RoleValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.trim().is_empty() {
			return Ok(Self::default());
		}

		Self::new(s.split(',').map(str::trim))
	}
}
impl Serialize for RoleSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.0.len()))?;

		for role in self.0.iter() {
			seq.serialize_element(role)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for RoleSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum RawRoles {
			One(String),
			Many(Vec<String>),
		}

		match <Option<RawRoles>>::deserialize(deserializer)? {
			None => Ok(Self::default()),
			Some(RawRoles::One(role)) => RoleSet::from_str(&role).map_err(DeError::custom),
			Some(RawRoles::Many(roles)) => RoleSet::new(roles).map_err(DeError::custom),
		}
	}
}

fn normalize<I, S>(roles: I) -> Result<Arc<[String]>, RoleValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for role in roles {
		let owned: String = role.into();
		let trimmed = owned.trim();

		if trimmed.is_empty() {
			return Err(RoleValidationError::Empty);
		}
		if trimmed.chars().any(char::is_whitespace) {
			return Err(RoleValidationError::ContainsWhitespace { role: owned });
		}

		set.insert(trimmed.to_lowercase());
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}
