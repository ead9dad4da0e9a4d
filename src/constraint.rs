//! Per-parameter value constraints
//!
//! Every parameter carries a [`Constraints`] set keyed by its primitive
//! type; the set is checked at the `set` boundary before any byte is
//! copied. The individual check classes can be compiled out through the
//! `min-value-check`, `max-value-check`, `allowed-values-check` and
//! `forbidden-values-check` features, in which case the registry behaves as
//! if the omitted checks had succeeded.

use crate::{error::Error, value::Type};

/// Range and exact-value constraints for a numeric parameter
///
/// All constraint kinds combine conjunctively. An empty `allowed` list
/// accepts every value.
#[derive(Clone, Debug, Default)]
pub struct NumericConstraints<T> {
	/// Smallest accepted value
	pub min: Option<T>,
	/// Largest accepted value
	pub max: Option<T>,
	/// Exact values accepted; empty means unrestricted
	pub allowed: Vec<T>,
	/// Exact values rejected
	pub forbidden: Vec<T>,
}

impl<T> NumericConstraints<T>
where
	T: bytemuck::AnyBitPattern + PartialOrd,
{
	#[allow(unused_variables)] // may be unused depending on which check features are enabled
	fn check(&self, candidate: &[u8]) -> Result<(), Error> {
		let value: T = crate::value::read_num(candidate)?;
		#[cfg(feature = "min-value-check")]
		if self.min.as_ref().is_some_and(|min| value < *min) {
			return Err(Error::Invalid);
		}
		#[cfg(feature = "max-value-check")]
		if self.max.as_ref().is_some_and(|max| value > *max) {
			return Err(Error::Invalid);
		}
		#[cfg(feature = "allowed-values-check")]
		if !self.allowed.is_empty() && !self.allowed.iter().any(|allowed| *allowed == value) {
			return Err(Error::Invalid);
		}
		#[cfg(feature = "forbidden-values-check")]
		if self.forbidden.iter().any(|forbidden| *forbidden == value) {
			return Err(Error::Invalid);
		}
		Ok(())
	}
}

/// Exact-value constraints for a string parameter
///
/// Candidates are compared up to their first NUL byte.
#[derive(Clone, Debug, Default)]
pub struct StringConstraints {
	/// Exact values accepted; empty means unrestricted
	pub allowed: Vec<String>,
	/// Exact values rejected
	pub forbidden: Vec<String>,
}

impl StringConstraints {
	#[allow(unused_variables)] // may be unused depending on which check features are enabled
	fn check(&self, candidate: &[u8]) -> Result<(), Error> {
		let end = candidate
			.iter()
			.position(|&b| b == 0)
			.unwrap_or(candidate.len());
		let candidate = &candidate[..end];
		#[cfg(feature = "allowed-values-check")]
		if !self.allowed.is_empty()
			&& !self
				.allowed
				.iter()
				.any(|allowed| allowed.as_bytes() == candidate)
		{
			return Err(Error::Invalid);
		}
		#[cfg(feature = "forbidden-values-check")]
		if self
			.forbidden
			.iter()
			.any(|forbidden| forbidden.as_bytes() == candidate)
		{
			return Err(Error::Invalid);
		}
		Ok(())
	}
}

/// Exact-value constraints for an opaque parameter
#[derive(Clone, Debug, Default)]
pub struct BytesConstraints {
	/// Exact values accepted; empty means unrestricted
	pub allowed: Vec<Vec<u8>>,
	/// Exact values rejected
	pub forbidden: Vec<Vec<u8>>,
}

impl BytesConstraints {
	#[allow(unused_variables)] // may be unused depending on which check features are enabled
	fn check(&self, candidate: &[u8]) -> Result<(), Error> {
		#[cfg(feature = "allowed-values-check")]
		if !self.allowed.is_empty()
			&& !self
				.allowed
				.iter()
				.any(|allowed| allowed.as_slice() == candidate)
		{
			return Err(Error::Invalid);
		}
		#[cfg(feature = "forbidden-values-check")]
		if self
			.forbidden
			.iter()
			.any(|forbidden| forbidden.as_slice() == candidate)
		{
			return Err(Error::Invalid);
		}
		Ok(())
	}
}

/// The constraint set of a parameter, keyed by its primitive type
///
/// The variant doubles as the parameter's type tag, which makes it
/// impossible to attach constraint data that is incompatible with the
/// declared type. Booleans carry no constraints.
#[derive(Clone, Debug)]
pub enum Constraints {
	Opaque(BytesConstraints),
	String(StringConstraints),
	Bool,
	U8(NumericConstraints<u8>),
	U16(NumericConstraints<u16>),
	U32(NumericConstraints<u32>),
	#[cfg(feature = "uint64")]
	U64(NumericConstraints<u64>),
	I8(NumericConstraints<i8>),
	I16(NumericConstraints<i16>),
	I32(NumericConstraints<i32>),
	#[cfg(feature = "int64")]
	I64(NumericConstraints<i64>),
	#[cfg(feature = "float32")]
	F32(NumericConstraints<f32>),
	#[cfg(feature = "float64")]
	F64(NumericConstraints<f64>),
}

impl Constraints {
	/// The type tag implied by this constraint set
	pub fn type_(&self) -> Type {
		match self {
			Constraints::Opaque(_) => Type::Opaque,
			Constraints::String(_) => Type::String,
			Constraints::Bool => Type::Bool,
			Constraints::U8(_) => Type::U8,
			Constraints::U16(_) => Type::U16,
			Constraints::U32(_) => Type::U32,
			#[cfg(feature = "uint64")]
			Constraints::U64(_) => Type::U64,
			Constraints::I8(_) => Type::I8,
			Constraints::I16(_) => Type::I16,
			Constraints::I32(_) => Type::I32,
			#[cfg(feature = "int64")]
			Constraints::I64(_) => Type::I64,
			#[cfg(feature = "float32")]
			Constraints::F32(_) => Type::F32,
			#[cfg(feature = "float64")]
			Constraints::F64(_) => Type::F64,
		}
	}

	pub(crate) fn check(&self, candidate: &[u8]) -> Result<(), Error> {
		match self {
			Constraints::Opaque(constraints) => constraints.check(candidate),
			Constraints::String(constraints) => constraints.check(candidate),
			Constraints::Bool => Ok(()),
			Constraints::U8(constraints) => constraints.check(candidate),
			Constraints::U16(constraints) => constraints.check(candidate),
			Constraints::U32(constraints) => constraints.check(candidate),
			#[cfg(feature = "uint64")]
			Constraints::U64(constraints) => constraints.check(candidate),
			Constraints::I8(constraints) => constraints.check(candidate),
			Constraints::I16(constraints) => constraints.check(candidate),
			Constraints::I32(constraints) => constraints.check(candidate),
			#[cfg(feature = "int64")]
			Constraints::I64(constraints) => constraints.check(candidate),
			#[cfg(feature = "float32")]
			Constraints::F32(constraints) => constraints.check(candidate),
			#[cfg(feature = "float64")]
			Constraints::F64(constraints) => constraints.check(candidate),
		}
	}

	/// Unconstrained opaque parameter
	pub fn opaque() -> Self {
		Constraints::Opaque(BytesConstraints::default())
	}
	/// Unconstrained string parameter
	pub fn string() -> Self {
		Constraints::String(StringConstraints::default())
	}
	/// Boolean parameter (booleans carry no constraints)
	pub fn bool() -> Self {
		Constraints::Bool
	}
	/// Unconstrained u8 parameter
	pub fn u8() -> Self {
		Constraints::U8(NumericConstraints::default())
	}
	/// Unconstrained u16 parameter
	pub fn u16() -> Self {
		Constraints::U16(NumericConstraints::default())
	}
	/// Unconstrained u32 parameter
	pub fn u32() -> Self {
		Constraints::U32(NumericConstraints::default())
	}
	/// Unconstrained u64 parameter
	#[cfg(feature = "uint64")]
	pub fn u64() -> Self {
		Constraints::U64(NumericConstraints::default())
	}
	/// Unconstrained i8 parameter
	pub fn i8() -> Self {
		Constraints::I8(NumericConstraints::default())
	}
	/// Unconstrained i16 parameter
	pub fn i16() -> Self {
		Constraints::I16(NumericConstraints::default())
	}
	/// Unconstrained i32 parameter
	pub fn i32() -> Self {
		Constraints::I32(NumericConstraints::default())
	}
	/// Unconstrained i64 parameter
	#[cfg(feature = "int64")]
	pub fn i64() -> Self {
		Constraints::I64(NumericConstraints::default())
	}
	/// Unconstrained f32 parameter
	#[cfg(feature = "float32")]
	pub fn f32() -> Self {
		Constraints::F32(NumericConstraints::default())
	}
	/// Unconstrained f64 parameter
	#[cfg(feature = "float64")]
	pub fn f64() -> Self {
		Constraints::F64(NumericConstraints::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn constrained_u8() -> Constraints {
		Constraints::U8(NumericConstraints {
			min: Some(7),
			max: Some(18),
			..Default::default()
		})
	}

	#[test]
	#[cfg(all(feature = "min-value-check", feature = "max-value-check"))]
	fn min_max_bounds_are_inclusive() {
		let constraints = constrained_u8();
		assert!(constraints.check(&[6]).is_err());
		assert!(constraints.check(&[7]).is_ok());
		assert!(constraints.check(&[18]).is_ok());
		assert!(constraints.check(&[19]).is_err());
	}

	#[test]
	#[cfg(feature = "allowed-values-check")]
	fn allow_list_restricts_strings() {
		let constraints = Constraints::String(StringConstraints {
			allowed: vec!["on".to_owned(), "off".to_owned()],
			..Default::default()
		});
		assert!(constraints.check(b"on\0").is_ok());
		assert!(constraints.check(b"off\0\0\0").is_ok());
		assert!(constraints.check(b"dim\0").is_err());
	}

	#[test]
	#[cfg(feature = "forbidden-values-check")]
	fn deny_list_wins_over_range() {
		let constraints = Constraints::U8(NumericConstraints {
			min: Some(0),
			max: Some(200),
			forbidden: vec![13],
			..Default::default()
		});
		assert!(constraints.check(&[12]).is_ok());
		assert!(constraints.check(&[13]).is_err());
	}

	#[test]
	fn undersized_candidates_are_invalid() {
		let constraints = Constraints::U32(NumericConstraints {
			min: Some(1),
			..Default::default()
		});
		assert!(matches!(constraints.check(&[1, 0]), Err(Error::Invalid)));
	}
}
