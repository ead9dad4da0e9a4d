//! Tagged value views and their string conversions

use base64::Engine as _;

use crate::error::Error;

/// Primitive type of a configuration parameter
///
/// This is a closed set. The 64-bit integer and the floating point variants
/// are compile-time options (`uint64`, `int64`, `float32`, `float64`
/// features); with a feature disabled the corresponding variant does not
/// exist, so no code path can pretend to support it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
	/// Raw bytes, rendered as base64
	Opaque,
	/// NUL-terminated UTF-8 in a fixed-capacity buffer
	String,
	/// 0 or 1, stored in one byte
	Bool,
	U8,
	U16,
	U32,
	#[cfg(feature = "uint64")]
	U64,
	I8,
	I16,
	I32,
	#[cfg(feature = "int64")]
	I64,
	#[cfg(feature = "float32")]
	F32,
	#[cfg(feature = "float64")]
	F64,
}

impl Type {
	/// Byte size of the backing field, or `None` for the variable-capacity
	/// types (string and opaque)
	pub fn size(self) -> Option<usize> {
		match self {
			Type::Opaque | Type::String => None,
			Type::Bool | Type::U8 | Type::I8 => Some(1),
			Type::U16 | Type::I16 => Some(2),
			Type::U32 | Type::I32 => Some(4),
			#[cfg(feature = "uint64")]
			Type::U64 => Some(8),
			#[cfg(feature = "int64")]
			Type::I64 => Some(8),
			#[cfg(feature = "float32")]
			Type::F32 => Some(4),
			#[cfg(feature = "float64")]
			Type::F64 => Some(8),
		}
	}
}

/// A typed view into value memory owned by an instance
///
/// A `Value` never owns the bytes it points to: the window is the full
/// backing field inside the instance's data struct (the type's size for the
/// fixed-size types, the buffer capacity for string and opaque). It is only
/// valid for as long as the instance is borrowed.
#[derive(Clone, Copy, Debug)]
pub struct Value<'a> {
	/// The type the bytes are to be interpreted as
	pub type_: Type,
	/// The backing byte window
	pub bytes: &'a [u8],
}

impl<'a> Value<'a> {
	pub fn new(type_: Type, bytes: &'a [u8]) -> Self {
		Self { type_, bytes }
	}

	/// Render the value as a string
	///
	/// Numbers render in decimal, booleans as `0`/`1`, opaque values as
	/// base64. Strings are read up to the first NUL byte and must be valid
	/// UTF-8. The result round-trips through [`parse_value`].
	pub fn to_str(&self) -> Result<String, Error> {
		match self.type_ {
			Type::Opaque => Ok(base64::engine::general_purpose::STANDARD.encode(self.bytes)),
			Type::String => {
				let end = self
					.bytes
					.iter()
					.position(|&b| b == 0)
					.unwrap_or(self.bytes.len());
				std::str::from_utf8(&self.bytes[..end])
					.map(str::to_owned)
					.map_err(|_| Error::Invalid)
			}
			Type::Bool => {
				let rendered = if read_num::<u8>(self.bytes)? != 0 { "1" } else { "0" };
				Ok(rendered.to_owned())
			}
			Type::U8 => Ok(read_num::<u8>(self.bytes)?.to_string()),
			Type::U16 => Ok(read_num::<u16>(self.bytes)?.to_string()),
			Type::U32 => Ok(read_num::<u32>(self.bytes)?.to_string()),
			#[cfg(feature = "uint64")]
			Type::U64 => Ok(read_num::<u64>(self.bytes)?.to_string()),
			Type::I8 => Ok(read_num::<i8>(self.bytes)?.to_string()),
			Type::I16 => Ok(read_num::<i16>(self.bytes)?.to_string()),
			Type::I32 => Ok(read_num::<i32>(self.bytes)?.to_string()),
			#[cfg(feature = "int64")]
			Type::I64 => Ok(read_num::<i64>(self.bytes)?.to_string()),
			#[cfg(feature = "float32")]
			Type::F32 => Ok(read_num::<f32>(self.bytes)?.to_string()),
			#[cfg(feature = "float64")]
			Type::F64 => Ok(read_num::<f64>(self.bytes)?.to_string()),
		}
	}
}

/// Parse `src` as a value of type `type_` into `dest`, returning the number
/// of bytes written
///
/// Integers accept base-0 notation (`0x` hex, leading `0` octal, decimal
/// otherwise) and reject trailing garbage. Booleans parse as integers, any
/// non-zero meaning true. Strings are copied verbatim and must fit together
/// with a terminating NUL. Opaque values are base64-decoded.
///
/// `dest` is typically the byte window of the target parameter, so that the
/// result can be handed to `set` directly.
pub fn parse_value(type_: Type, src: &str, dest: &mut [u8]) -> Result<usize, Error> {
	match type_ {
		Type::Opaque => {
			let decoded = base64::engine::general_purpose::STANDARD
				.decode(src)
				.map_err(|_| Error::Invalid)?;
			if decoded.len() > dest.len() {
				return Err(Error::Invalid);
			}
			dest[..decoded.len()].copy_from_slice(&decoded);
			Ok(decoded.len())
		}
		Type::String => {
			let bytes = src.as_bytes();
			if bytes.len() + 1 > dest.len() {
				return Err(Error::Invalid);
			}
			dest[..bytes.len()].copy_from_slice(bytes);
			dest[bytes.len()] = 0;
			Ok(bytes.len() + 1)
		}
		Type::Bool => write_num((parse_int::<i64>(src)? != 0) as u8, dest),
		Type::U8 => write_num(parse_int::<u8>(src)?, dest),
		Type::U16 => write_num(parse_int::<u16>(src)?, dest),
		Type::U32 => write_num(parse_int::<u32>(src)?, dest),
		#[cfg(feature = "uint64")]
		Type::U64 => write_num(parse_int::<u64>(src)?, dest),
		Type::I8 => write_num(parse_int::<i8>(src)?, dest),
		Type::I16 => write_num(parse_int::<i16>(src)?, dest),
		Type::I32 => write_num(parse_int::<i32>(src)?, dest),
		#[cfg(feature = "int64")]
		Type::I64 => write_num(parse_int::<i64>(src)?, dest),
		#[cfg(feature = "float32")]
		Type::F32 => write_num(src.parse::<f32>().map_err(|_| Error::Invalid)?, dest),
		#[cfg(feature = "float64")]
		Type::F64 => write_num(src.parse::<f64>().map_err(|_| Error::Invalid)?, dest),
	}
}

/// Decode a number from the prefix of a native-endian byte window
pub(crate) fn read_num<T: bytemuck::AnyBitPattern>(bytes: &[u8]) -> Result<T, Error> {
	let size = std::mem::size_of::<T>();
	if bytes.len() < size {
		return Err(Error::Invalid);
	}
	Ok(bytemuck::pod_read_unaligned(&bytes[..size]))
}

fn write_num<T: bytemuck::NoUninit>(value: T, dest: &mut [u8]) -> Result<usize, Error> {
	let bytes = bytemuck::bytes_of(&value);
	if bytes.len() > dest.len() {
		return Err(Error::Invalid);
	}
	dest[..bytes.len()].copy_from_slice(bytes);
	Ok(bytes.len())
}

/// Base-0 integer parsing: `0x` prefix is hex, a leading `0` is octal,
/// anything else is decimal
fn parse_int<T: num_traits::PrimInt>(src: &str) -> Result<T, Error> {
	let (negative, magnitude) = match src.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, src.strip_prefix('+').unwrap_or(src)),
	};
	let (radix, digits) = if let Some(hex) = magnitude
		.strip_prefix("0x")
		.or_else(|| magnitude.strip_prefix("0X"))
	{
		(16, hex)
	} else if magnitude.len() > 1 && magnitude.starts_with('0') {
		(8, &magnitude[1..])
	} else {
		(10, magnitude)
	};
	if digits.is_empty() {
		return Err(Error::Invalid);
	}
	if negative {
		T::from_str_radix(&format!("-{digits}"), radix).map_err(|_| Error::Invalid)
	} else {
		T::from_str_radix(digits, radix).map_err(|_| Error::Invalid)
	}
}
