//! Type-checked scalar and array access to leaves.
//!
//! Every getter first confirms the leaf exists and holds the requested seed type, then
//! reads element by element through the store primitives into a buffer allocated with
//! the store's [`MemoryFunctions`]( crate::MemoryFunctions ). Scalars are element `0` of
//! the same checked path, so scalars and arrays are validated identically.
//!
//! ```
//! use plant_link::Store ;
//!
//! # fn main() -> Result<(), plant_link::LeafError> {
//! let store = Store::new();
//! let plant = store.plant_new( 0 )?;
//!
//! plant.set_int_array( "sizes", [ 3, 1, 4 ])?;
//! assert_eq!( plant.get_int_array( "sizes" )?, [ 3, 1, 4 ]);
//! assert_eq!( plant.get_int_value( "sizes" )?, 3 );
//!
//! plant.set_string_value( "name", "blur" )?;
//! assert_eq!( plant.get_string_value( "name" )?, "blur" );
//! # Ok(())
//! # }
//! ```

use pipe_trait::Pipe ;

use crate::{ keys, LeafError, LeafFlags, Plant, PlantId, Seed, SeedType, Value, FuncPtr, VoidPtr };
use crate::memory::{ Array, MemStr };
use crate::seed::Opaque ;



impl Plant {

	/// Confirms leaf `key` exists and holds elements of `seed`.
	pub fn check_seed( &self, key: &str, seed: SeedType ) -> Result<(), LeafError> {
		match self.leaf_seed_type( key )? == seed {
			true => Ok(()),
			false => Err( LeafError::WrongSeedType ),
		}
	}

	fn read_element<T: Seed>( &self, key: &str, index: usize ) -> Result<T, LeafError> {
		self.leaf_get( key, index )?
			.pipe( T::from_value )
			.ok_or( LeafError::WrongSeedType )
	}

	/// Element `0` of leaf `key`.
	pub fn get_value<T: Seed>( &self, key: &str ) -> Result<T, LeafError> {
		self.check_seed( key, T::SEED_TYPE )?;
		self.read_element( key, 0 )
	}

	/// Every element of leaf `key`, in one buffer allocated with the store's `malloc`.
	///
	/// If any element cannot be read the buffer is released before the error is returned.
	pub fn get_array<T: Seed>( &self, key: &str ) -> Result<Array<T>, LeafError> {

		self.check_seed( key, T::SEED_TYPE )?;
		let count = self.leaf_num_elements( key )?;

		let mut array = Array::with_capacity( self.memory(), count )?;
		for index in 0..count {
			array.push( self.read_element( key, index )? );
		}
		Ok( array )

	}

	/// Like [`Plant::get_array`] but reports the element count directly.
	/// On any failure the result is `( None, 0 )`.
	pub fn get_array_counted<T: Seed>( &self, key: &str ) -> ( Option<Array<T>>, usize ) {
		match self.get_array( key ) {
			Ok( array ) => { let count = array.len(); ( Some( array ), count ) }
			Err( _ ) => ( None, 0 ),
		}
	}

	/// Sets leaf `key` to the single element `value`.
	pub fn set_value<T: Seed>( &self, key: &str, value: T ) -> Result<(), LeafError> {
		self.set_array( key, [ value ])
	}

	/// Sets leaf `key` to `values`, which may be empty.
	pub fn set_array<T: Seed>( &self, key: &str, values: impl IntoIterator<Item = T> ) -> Result<(), LeafError> {
		let values = values.into_iter().map( Seed::into_value ).collect();
		self.leaf_set( key, T::SEED_TYPE, values )
	}

	fn read_string( &self, key: &str, index: usize ) -> Result<MemStr, LeafError> {
		match self.leaf_get( key, index )? {
			Value::String( bytes ) => MemStr::copy_from( self.memory(), &bytes ),
			_ => Err( LeafError::WrongSeedType ),
		}
	}

	/// Element `0` of string leaf `key`, copied into its own allocation.
	pub fn get_string_value( &self, key: &str ) -> Result<MemStr, LeafError> {
		self.check_seed( key, SeedType::String )?;
		self.read_string( key, 0 )
	}

	/// Every element of string leaf `key`.
	///
	/// The outer array is allocated with the store's `calloc` and each string with its
	/// own `malloc` sized to that element. If any string fails to allocate, every string
	/// allocated before it and the outer array are released before the error is returned.
	pub fn get_string_array( &self, key: &str ) -> Result<Array<MemStr>, LeafError> {

		self.check_seed( key, SeedType::String )?;
		let count = self.leaf_num_elements( key )?;

		let mut array = Array::zeroed( self.memory(), count )?;
		for index in 0..count {
			array.push( self.read_string( key, index )? );
		}
		Ok( array )

	}

	pub fn get_string_array_counted( &self, key: &str ) -> ( Option<Array<MemStr>>, usize ) {
		match self.get_string_array( key ) {
			Ok( array ) => { let count = array.len(); ( Some( array ), count ) }
			Err( _ ) => ( None, 0 ),
		}
	}

	pub fn set_string_value( &self, key: &str, value: impl AsRef<[u8]> ) -> Result<(), LeafError> {
		self.leaf_set( key, SeedType::String, vec![ Value::string( value )])
	}

	pub fn set_string_array( &self, key: &str, values: impl IntoIterator<Item = impl AsRef<[u8]>> ) -> Result<(), LeafError> {
		let values = values.into_iter().map( Value::string ).collect();
		self.leaf_set( key, SeedType::String, values )
	}

	fn read_custom( &self, key: &str, index: usize ) -> Result<Opaque, LeafError> {
		match self.leaf_get( key, index )? {
			Value::Custom { payload, .. } => Ok( payload ),
			_ => Err( LeafError::WrongSeedType ),
		}
	}

	/// Element `0` of a leaf holding the extension-defined seed type `seed`.
	pub fn get_custom_value( &self, key: &str, seed: SeedType ) -> Result<Opaque, LeafError> {
		self.check_seed( key, seed )?;
		self.read_custom( key, 0 )
	}

	pub fn get_custom_array( &self, key: &str, seed: SeedType ) -> Result<Array<Opaque>, LeafError> {

		self.check_seed( key, seed )?;
		let count = self.leaf_num_elements( key )?;

		let mut array = Array::with_capacity( self.memory(), count )?;
		for index in 0..count {
			array.push( self.read_custom( key, index )? );
		}
		Ok( array )

	}

	pub fn set_custom_value( &self, key: &str, seed: SeedType, payload: Opaque ) -> Result<(), LeafError> {
		self.set_custom_array( key, seed, [ payload ])
	}

	/// Sets leaf `key` to custom payloads of seed type `seed`, which must be a
	/// [`SeedType::Custom`] outside the reserved range.
	pub fn set_custom_array( &self, key: &str, seed: SeedType, payloads: impl IntoIterator<Item = Opaque> ) -> Result<(), LeafError> {
		let SeedType::Custom( code ) = seed else { return Err( LeafError::WrongSeedType ) };
		let values = payloads.into_iter()
			.map(| payload | Value::Custom { seed: code, payload })
			.collect();
		self.leaf_set( key, seed, values )
	}

	/// The plant referenced by element `0` of plant-pointer leaf `key`.
	pub fn get_plant( &self, key: &str ) -> Result<Plant, LeafError> {
		let id = self.get_value::<PlantId>( key )?;
		self.store().plant( id ).ok_or( LeafError::NoSuchPlant )
	}

	pub fn set_plant( &self, key: &str, plant: &Plant ) -> Result<(), LeafError> {
		self.set_value( key, plant.id() )
	}

	/// Value of the `type` leaf.
	pub fn plant_type( &self ) -> Result<i32, LeafError> { self.get_value( keys::TYPE ) }

	/// Changes the plant type by temporarily lifting the immutable flag on the `type` leaf.
	///
	/// Meant for code that builds plants of its own; ordinary callers treat the type as fixed.
	pub fn mutate_type( &self, plant_type: i32 ) -> Result<(), LeafError> {

		let flags = self.leaf_get_flags( keys::TYPE )?;
		self.leaf_set_flags( keys::TYPE, flags.difference( LeafFlags::IMMUTABLE ))?;
		let written = self.leaf_set( keys::TYPE, SeedType::Int, vec![ Value::Int( plant_type )]);
		self.leaf_set_flags( keys::TYPE, flags | LeafFlags::IMMUTABLE )?;
		written

	}

	/// ORs `flags` into leaf `key`'s flag bitset.
	pub fn leaf_add_flags( &self, key: &str, flags: LeafFlags ) -> Result<(), LeafError> {
		let current = self.leaf_get_flags( key )?;
		self.leaf_set_flags( key, current | flags )
	}

	/// Clears `flags` from leaf `key`'s flag bitset.
	pub fn leaf_clear_flags( &self, key: &str, flags: LeafFlags ) -> Result<(), LeafError> {
		let current = self.leaf_get_flags( key )?;
		self.leaf_set_flags( key, current.difference( flags ))
	}

	/// Adds `flags` to every leaf except `type` and those whose key starts with `ignore_prefix`.
	pub fn add_plant_flags( &self, flags: LeafFlags, ignore_prefix: Option<&str> ) -> Result<(), LeafError> {
		for key in self.flaggable_leaves( ignore_prefix )? {
			self.leaf_add_flags( &key, flags )?;
		}
		Ok(())
	}

	/// Clears `flags` from every leaf except `type` and those whose key starts with `ignore_prefix`.
	pub fn clear_plant_flags( &self, flags: LeafFlags, ignore_prefix: Option<&str> ) -> Result<(), LeafError> {
		for key in self.flaggable_leaves( ignore_prefix )? {
			self.leaf_clear_flags( &key, flags )?;
		}
		Ok(())
	}

	fn flaggable_leaves( &self, ignore_prefix: Option<&str> ) -> Result<impl Iterator<Item = String>, LeafError> {
		let ignore_prefix = ignore_prefix.map( str::to_owned );
		Ok( self.plant_list_leaves()?
			.into_iter()
			.filter( move | key | key != keys::TYPE
				&& !ignore_prefix.as_deref().is_some_and(| prefix | key.starts_with( prefix ))))
	}

}

macro_rules! typed_accessors {
	( $( $ty:ty => $get:ident, $get_array:ident, $get_counted:ident, $set:ident, $set_array:ident ;)* ) => {
		impl Plant { $(

			#[doc = concat!( "Element `0` of a leaf holding `", stringify!( $ty ), "` elements." )]
			#[inline] pub fn $get( &self, key: &str ) -> Result<$ty, LeafError> { self.get_value( key ) }

			#[doc = concat!( "Every element of a leaf holding `", stringify!( $ty ), "` elements." )]
			#[inline] pub fn $get_array( &self, key: &str ) -> Result<Array<$ty>, LeafError> { self.get_array( key ) }

			#[inline] pub fn $get_counted( &self, key: &str ) -> ( Option<Array<$ty>>, usize ) { self.get_array_counted( key ) }

			#[inline] pub fn $set( &self, key: &str, value: $ty ) -> Result<(), LeafError> { self.set_value( key, value ) }

			#[inline] pub fn $set_array( &self, key: &str, values: impl IntoIterator<Item = $ty> ) -> Result<(), LeafError> {
				self.set_array( key, values )
			}

		)* }
	};
}

typed_accessors! {
	i32 => get_int_value, get_int_array, get_int_array_counted, set_int_value, set_int_array ;
	u32 => get_uint_value, get_uint_array, get_uint_array_counted, set_uint_value, set_uint_array ;
	i64 => get_int64_value, get_int64_array, get_int64_array_counted, set_int64_value, set_int64_array ;
	u64 => get_uint64_value, get_uint64_array, get_uint64_array_counted, set_uint64_value, set_uint64_array ;
	bool => get_boolean_value, get_boolean_array, get_boolean_array_counted, set_boolean_value, set_boolean_array ;
	f32 => get_float_value, get_float_array, get_float_array_counted, set_float_value, set_float_array ;
	f64 => get_double_value, get_double_array, get_double_array_counted, set_double_value, set_double_array ;
	FuncPtr => get_funcptr_value, get_funcptr_array, get_funcptr_array_counted, set_funcptr_value, set_funcptr_array ;
	VoidPtr => get_voidptr_value, get_voidptr_array, get_voidptr_array_counted, set_voidptr_value, set_voidptr_array ;
	PlantId => get_plantptr_value, get_plantptr_array, get_plantptr_array_counted, set_plantptr_value, set_plantptr_array ;
}
