//! Seed types and the values leaves hold.

use std::any::Any ;
use std::ffi::c_void ;
use std::fmt ;
use std::mem ;
use std::sync::Arc ;

use crate::{ FuncPtr, PlantId };



/// Type tag governing what kind of values a leaf holds.
///
/// Codes are stable and may cross the host/extension boundary as plain integers.
/// Codes from [`SeedType::FIRST_CUSTOM`] upward are free for extension-defined types.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum SeedType {
	Int,
	UInt,
	Int64,
	UInt64,
	Boolean,
	Float,
	Double,
	String,
	FuncPtr,
	VoidPtr,
	PlantPtr,
	Custom( u32 ),
}

impl SeedType {

	pub const FIRST_CUSTOM: u32 = 1024 ;

	pub const fn code( self ) -> u32 { match self {
		Self::Int => 1,
		Self::Double => 2,
		Self::Boolean => 3,
		Self::String => 4,
		Self::Int64 => 5,
		Self::UInt => 6,
		Self::UInt64 => 7,
		Self::Float => 8,
		Self::FuncPtr => 64,
		Self::VoidPtr => 65,
		Self::PlantPtr => 66,
		Self::Custom( code ) => code,
	}}

	pub const fn from_code( code: u32 ) -> Option<Self> { match code {
		1 => Some( Self::Int ),
		2 => Some( Self::Double ),
		3 => Some( Self::Boolean ),
		4 => Some( Self::String ),
		5 => Some( Self::Int64 ),
		6 => Some( Self::UInt ),
		7 => Some( Self::UInt64 ),
		8 => Some( Self::Float ),
		64 => Some( Self::FuncPtr ),
		65 => Some( Self::VoidPtr ),
		66 => Some( Self::PlantPtr ),
		code => Self::custom( code ),
	}}

	/// An extension-defined seed type. Returns `None` for codes in the reserved range.
	pub const fn custom( code: u32 ) -> Option<Self> {
		match code >= Self::FIRST_CUSTOM {
			true => Some( Self::Custom( code )),
			false => None,
		}
	}

	/// Whether this tag is one a store may hold. `Custom` codes in the reserved range are not.
	#[inline] pub const fn is_valid( self ) -> bool {
		match self {
			Self::Custom( code ) => code >= Self::FIRST_CUSTOM,
			_ => true,
		}
	}

	/// Pointer seeds are copied by reference: two leaves copied from one another alias the pointee.
	#[inline] pub const fn is_pointer( self ) -> bool {
		matches!( self, Self::FuncPtr | Self::VoidPtr | Self::PlantPtr | Self::Custom( _ ))
	}

	/// Size of one element, or `None` for strings whose elements each have their own length.
	pub const fn element_size( self ) -> Option<usize> { match self {
		Self::Int => Some( mem::size_of::<i32>() ),
		Self::UInt => Some( mem::size_of::<u32>() ),
		Self::Int64 => Some( mem::size_of::<i64>() ),
		Self::UInt64 => Some( mem::size_of::<u64>() ),
		Self::Boolean => Some( mem::size_of::<bool>() ),
		Self::Float => Some( mem::size_of::<f32>() ),
		Self::Double => Some( mem::size_of::<f64>() ),
		Self::String => None,
		Self::FuncPtr | Self::VoidPtr | Self::PlantPtr | Self::Custom( _ ) => Some( mem::size_of::<usize>() ),
	}}

}

impl fmt::Display for SeedType {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		match self {
			Self::Int => f.write_str( "int" ),
			Self::UInt => f.write_str( "uint" ),
			Self::Int64 => f.write_str( "int64" ),
			Self::UInt64 => f.write_str( "uint64" ),
			Self::Boolean => f.write_str( "boolean" ),
			Self::Float => f.write_str( "float" ),
			Self::Double => f.write_str( "double" ),
			Self::String => f.write_str( "string" ),
			Self::FuncPtr => f.write_str( "funcptr" ),
			Self::VoidPtr => f.write_str( "voidptr" ),
			Self::PlantPtr => f.write_str( "plantptr" ),
			Self::Custom( code ) => write!( f, "custom({})", code ),
		}
	}
}

/// An opaque data pointer. The store never dereferences it.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub struct VoidPtr( pub *mut c_void );

// SAFETY: the store only stores and compares the address; dereferencing is up to the owner.
unsafe impl Send for VoidPtr {}
// SAFETY: see above.
unsafe impl Sync for VoidPtr {}

impl VoidPtr {
	pub const NULL: Self = Self( std::ptr::null_mut() );
	#[inline] pub fn is_null( &self ) -> bool { self.0.is_null() }
	#[inline] pub fn addr( &self ) -> usize { self.0 as usize }
}

/// Payload of an extension-defined seed type.
pub type Opaque = Arc<dyn Any + Send + Sync> ;

/// A single leaf element.
#[derive( Debug, Clone )]
pub enum Value {
	Int( i32 ),
	UInt( u32 ),
	Int64( i64 ),
	UInt64( u64 ),
	Boolean( bool ),
	Float( f32 ),
	Double( f64 ),
	String( Arc<[u8]> ),
	FuncPtr( FuncPtr ),
	VoidPtr( VoidPtr ),
	PlantPtr( PlantId ),
	Custom { seed: u32, payload: Opaque },
}

impl Value {

	pub fn string( bytes: impl AsRef<[u8]> ) -> Self { Self::String( Arc::from( bytes.as_ref() )) }

	pub fn seed_type( &self ) -> SeedType { match self {
		Self::Int( _ ) => SeedType::Int,
		Self::UInt( _ ) => SeedType::UInt,
		Self::Int64( _ ) => SeedType::Int64,
		Self::UInt64( _ ) => SeedType::UInt64,
		Self::Boolean( _ ) => SeedType::Boolean,
		Self::Float( _ ) => SeedType::Float,
		Self::Double( _ ) => SeedType::Double,
		Self::String( _ ) => SeedType::String,
		Self::FuncPtr( _ ) => SeedType::FuncPtr,
		Self::VoidPtr( _ ) => SeedType::VoidPtr,
		Self::PlantPtr( _ ) => SeedType::PlantPtr,
		Self::Custom { seed, .. } => SeedType::Custom( *seed ),
	}}

	/// Byte size of this element: the byte length for strings, the native size otherwise.
	pub fn element_size( &self ) -> usize {
		match self {
			Self::String( bytes ) => bytes.len(),
			other => other.seed_type().element_size().unwrap_or( 0 ),
		}
	}

	/// A copy that shares no allocation with `self`. Strings get fresh storage,
	/// everything else is copied as is, which for pointer seeds means aliasing.
	pub fn detached( &self ) -> Self { match self {
		Self::String( bytes ) => Self::String( Arc::from( &bytes[..] )),
		other => other.clone(),
	}}

	/// Identity comparison: numeric values by bits, strings by content,
	/// pointers by address and custom payloads by allocation.
	pub fn same_as( &self, other: &Self ) -> bool { match ( self, other ) {
		( Self::Int( a ), Self::Int( b )) => a == b,
		( Self::UInt( a ), Self::UInt( b )) => a == b,
		( Self::Int64( a ), Self::Int64( b )) => a == b,
		( Self::UInt64( a ), Self::UInt64( b )) => a == b,
		( Self::Boolean( a ), Self::Boolean( b )) => a == b,
		( Self::Float( a ), Self::Float( b )) => a.to_bits() == b.to_bits(),
		( Self::Double( a ), Self::Double( b )) => a.to_bits() == b.to_bits(),
		( Self::String( a ), Self::String( b )) => a == b,
		( Self::FuncPtr( a ), Self::FuncPtr( b )) => a == b,
		( Self::VoidPtr( a ), Self::VoidPtr( b )) => a == b,
		( Self::PlantPtr( a ), Self::PlantPtr( b )) => a == b,
		( Self::Custom { seed: sa, payload: a }, Self::Custom { seed: sb, payload: b }) => sa == sb && Arc::ptr_eq( a, b ),
		_ => false,
	}}

}

/// A Rust type stored directly as the elements of one seed type.
///
/// Strings and custom payloads have dedicated accessors and do not implement this trait.
pub trait Seed: Sized + Clone {
	const SEED_TYPE: SeedType ;
	/// Whether equal values always have equal bytes and no padding, so whole arrays
	/// may be compared as raw byte spans.
	const RAW_COMPARABLE: bool ;
	fn into_value( self ) -> Value ;
	fn from_value( value: Value ) -> Option<Self> ;
}

macro_rules! impl_seed {
	( $( $ty:ty => $variant:ident, $raw:literal ;)* ) => { $(
		impl Seed for $ty {
			const SEED_TYPE: SeedType = SeedType::$variant ;
			const RAW_COMPARABLE: bool = $raw ;
			#[inline] fn into_value( self ) -> Value { Value::$variant( self ) }
			#[inline] fn from_value( value: Value ) -> Option<Self> { match value {
				Value::$variant( inner ) => Some( inner ),
				_ => None,
			}}
		}
	)* };
}

impl_seed! {
	i32 => Int, true ;
	u32 => UInt, true ;
	i64 => Int64, true ;
	u64 => UInt64, true ;
	bool => Boolean, true ;
	f32 => Float, true ;
	f64 => Double, true ;
	FuncPtr => FuncPtr, false ;
	VoidPtr => VoidPtr, false ;
	PlantId => PlantPtr, false ;
}

#[cfg( test )]
mod tests {

	use super::{ SeedType, Value };

	#[test]
	fn seed_codes_round_trip() {
		let all = [
			SeedType::Int, SeedType::UInt, SeedType::Int64, SeedType::UInt64,
			SeedType::Boolean, SeedType::Float, SeedType::Double, SeedType::String,
			SeedType::FuncPtr, SeedType::VoidPtr, SeedType::PlantPtr, SeedType::Custom( 4096 ),
		];
		for seed in all {
			assert_eq!( SeedType::from_code( seed.code() ), Some( seed ));
		}
	}

	#[test]
	fn reserved_codes_are_not_custom() {
		assert_eq!( SeedType::from_code( 0 ), None );
		assert_eq!( SeedType::from_code( 67 ), None );
		assert_eq!( SeedType::custom( 1023 ), None );
		assert!( !SeedType::Custom( 12 ).is_valid() );
	}

	#[test]
	fn detached_strings_do_not_share_storage() {
		let value = Value::string( "leaf" );
		let copy = value.detached();
		match ( &value, &copy ) {
			( Value::String( a ), Value::String( b )) => {
				assert_eq!( a, b );
				assert!( !std::sync::Arc::ptr_eq( a, b ));
			}
			_ => unreachable!(),
		}
		assert!( value.same_as( &copy ));
	}

}
