//! The extension's side of the bootstrap.
//!
//! An extension starts out knowing nothing about the host but the [`Bootstrap`] entry
//! point. After a successful negotiation it holds a generic getter and the negotiation
//! plant; the getter is enough to fetch `leaf_get_func`, and through that every other
//! capability the negotiated versions enable. [`HostFunctions`] collects them once so
//! the rest of the extension calls the host through typed function pointers.

use std::sync::Arc ;

use nonempty_collections::NEVec ;
use pipe_trait::Pipe ;
use tracing::debug ;

use crate::{ keys, FuncPtr, LeafError, LeafFlags, NegotiationError, OwnedPlant, Plant, SeedType, Store, Value };
use crate::capability::Capability ;
use crate::function::{
	DefaultGetterFn, LeafDeleteFn, LeafElementSizeFn, LeafGetFlagsFn, LeafGetFn, LeafNumElementsFn,
	LeafSeedTypeFn, LeafSetFlagsFn, LeafSetFn, PlantFreeFn, PlantListLeavesFn, PlantNewFn,
};
use crate::keys::plant_type ;
use crate::memory::{ CallocFn, FreeFn, MallocFn, MemcmpFn, MemcpyFn, MemmoveFn, MemsetFn, ReallocFn };
use crate::negotiation::Bootstrap ;
use crate::version::VersionRange ;



/// The host capabilities available to an extension at its negotiated versions.
///
/// Mandatory capabilities are always present. Gated ones are `None` when the
/// negotiated versions predate them.
#[derive( Debug, Clone, Copy )]
pub struct HostFunctions {
	abi_version: i32,
	api_version: i32,
	plant_new: PlantNewFn,
	plant_list_leaves: PlantListLeavesFn,
	leaf_get: LeafGetFn,
	leaf_set: LeafSetFn,
	leaf_seed_type: LeafSeedTypeFn,
	leaf_num_elements: LeafNumElementsFn,
	leaf_element_size: LeafElementSizeFn,
	leaf_get_flags: LeafGetFlagsFn,
	malloc: MallocFn,
	free: FreeFn,
	memset: MemsetFn,
	memcpy: MemcpyFn,
	plant_free: Option<PlantFreeFn>,
	leaf_delete: Option<LeafDeleteFn>,
	leaf_set_flags: Option<LeafSetFlagsFn>,
	realloc: Option<ReallocFn>,
	calloc: Option<CallocFn>,
	memmove: Option<MemmoveFn>,
	memcmp: Option<MemcmpFn>,
}

impl HostFunctions {

	/// Reads every capability the negotiated versions of `host_info` enable.
	///
	/// Only `leaf_get_func` and the two version leaves are read through `getter`.
	/// A capability leaf holding a function of the wrong signature is reported as
	/// [`LeafError::WrongSeedType`].
	pub fn bootstrap( getter: DefaultGetterFn, host_info: &Plant ) -> Result<Arc<Self>, LeafError> {

		let leaf_get = match getter( host_info, keys::LEAF_GET )? {
			Value::FuncPtr( function ) => function.as_leaf_get().ok_or( LeafError::WrongSeedType )?,
			_ => return Err( LeafError::WrongSeedType ),
		};
		let version = | key: &str | -> Result<i32, LeafError> {
			match getter( host_info, key )? {
				Value::Int( version ) => Ok( version ),
				_ => Err( LeafError::WrongSeedType ),
			}
		};
		let abi_version = version( keys::ABI_VERSION )?;
		let api_version = version( keys::API_VERSION )?;

		let fetch = | key: &str | -> Result<FuncPtr, LeafError> {
			match leaf_get( host_info, key, 0 )? {
				Value::FuncPtr( function ) => Ok( function ),
				_ => Err( LeafError::WrongSeedType ),
			}
		};
		let gated = | key: &str | -> Result<Option<FuncPtr>, LeafError> {
			match Capability::find( key ).is_some_and(| capability | capability.is_supported_at( abi_version, api_version )) {
				true => fetch( key ).map( Some ),
				false => Ok( None ),
			}
		};

		let functions = Self {
			abi_version,
			api_version,
			plant_new: typed( fetch( keys::PLANT_NEW )?, FuncPtr::as_plant_new )?,
			plant_list_leaves: typed( fetch( keys::PLANT_LIST_LEAVES )?, FuncPtr::as_plant_list_leaves )?,
			leaf_get,
			leaf_set: typed( fetch( keys::LEAF_SET )?, FuncPtr::as_leaf_set )?,
			leaf_seed_type: typed( fetch( keys::LEAF_SEED_TYPE )?, FuncPtr::as_leaf_seed_type )?,
			leaf_num_elements: typed( fetch( keys::LEAF_NUM_ELEMENTS )?, FuncPtr::as_leaf_num_elements )?,
			leaf_element_size: typed( fetch( keys::LEAF_ELEMENT_SIZE )?, FuncPtr::as_leaf_element_size )?,
			leaf_get_flags: typed( fetch( keys::LEAF_GET_FLAGS )?, FuncPtr::as_leaf_get_flags )?,
			malloc: typed( fetch( keys::MALLOC )?, FuncPtr::as_malloc )?,
			free: typed( fetch( keys::FREE )?, FuncPtr::as_free )?,
			memset: typed( fetch( keys::MEMSET )?, FuncPtr::as_memset )?,
			memcpy: typed( fetch( keys::MEMCPY )?, FuncPtr::as_memcpy )?,
			plant_free: typed_gated( gated( keys::PLANT_FREE )?, FuncPtr::as_plant_free )?,
			leaf_delete: typed_gated( gated( keys::LEAF_DELETE )?, FuncPtr::as_leaf_delete )?,
			leaf_set_flags: typed_gated( gated( keys::LEAF_SET_FLAGS )?, FuncPtr::as_leaf_set_flags )?,
			realloc: typed_gated( gated( keys::REALLOC )?, FuncPtr::as_realloc )?,
			calloc: typed_gated( gated( keys::CALLOC )?, FuncPtr::as_calloc )?,
			memmove: typed_gated( gated( keys::MEMMOVE )?, FuncPtr::as_memmove )?,
			memcmp: typed_gated( gated( keys::MEMCMP )?, FuncPtr::as_memcmp )?,
		};

		debug!( abi_version, api_version, "Read host functions" );
		Ok( Arc::new( functions ))

	}

	#[inline] pub fn abi_version( &self ) -> i32 { self.abi_version }
	#[inline] pub fn api_version( &self ) -> i32 { self.api_version }

	pub fn plant_new( &self, store: &Store, plant_type: i32 ) -> Result<Plant, LeafError> { ( self.plant_new )( store, plant_type ) }
	pub fn plant_list_leaves( &self, plant: &Plant ) -> Result<NEVec<String>, LeafError> { ( self.plant_list_leaves )( plant ) }
	pub fn leaf_get( &self, plant: &Plant, key: &str, index: usize ) -> Result<Value, LeafError> { ( self.leaf_get )( plant, key, index ) }
	pub fn leaf_set( &self, plant: &Plant, key: &str, seed: SeedType, values: Vec<Value> ) -> Result<(), LeafError> {
		( self.leaf_set )( plant, key, seed, values )
	}
	pub fn leaf_seed_type( &self, plant: &Plant, key: &str ) -> Result<SeedType, LeafError> { ( self.leaf_seed_type )( plant, key ) }
	pub fn leaf_num_elements( &self, plant: &Plant, key: &str ) -> Result<usize, LeafError> { ( self.leaf_num_elements )( plant, key ) }
	pub fn leaf_element_size( &self, plant: &Plant, key: &str, index: usize ) -> Result<usize, LeafError> {
		( self.leaf_element_size )( plant, key, index )
	}
	pub fn leaf_get_flags( &self, plant: &Plant, key: &str ) -> Result<LeafFlags, LeafError> { ( self.leaf_get_flags )( plant, key ) }

	/// `None` when the negotiated API version predates plant removal.
	pub fn plant_free( &self, plant: &Plant ) -> Option<Result<(), LeafError>> { self.plant_free.map(| f | f( plant )) }
	pub fn leaf_delete( &self, plant: &Plant, key: &str ) -> Option<Result<(), LeafError>> { self.leaf_delete.map(| f | f( plant, key )) }
	pub fn leaf_set_flags( &self, plant: &Plant, key: &str, flags: LeafFlags ) -> Option<Result<(), LeafError>> {
		self.leaf_set_flags.map(| f | f( plant, key, flags ))
	}

	#[inline] pub fn malloc( &self ) -> MallocFn { self.malloc }
	#[inline] pub fn free( &self ) -> FreeFn { self.free }
	#[inline] pub fn memset( &self ) -> MemsetFn { self.memset }
	#[inline] pub fn memcpy( &self ) -> MemcpyFn { self.memcpy }
	#[inline] pub fn realloc( &self ) -> Option<ReallocFn> { self.realloc }
	#[inline] pub fn calloc( &self ) -> Option<CallocFn> { self.calloc }
	#[inline] pub fn memmove( &self ) -> Option<MemmoveFn> { self.memmove }
	#[inline] pub fn memcmp( &self ) -> Option<MemcmpFn> { self.memcmp }

}

/// An extension's view of a completed bootstrap: the negotiation plant, its own
/// descriptor plant and the host functions.
#[derive( Debug, Clone )]
pub struct ExtensionInfo {
	host_info: Plant,
	descriptor: Plant,
	functions: Arc<HostFunctions>,
}

impl ExtensionInfo {

	/// Bootstraps against `host` accepting the given version ranges.
	///
	/// The descriptor is the plant the host linked through `extension_info`; if the
	/// host linked none, one is created with the host's `plant_new`. The descriptor
	/// gets a `host_info` leaf pointing back at the negotiation plant.
	pub fn init( host: &impl Bootstrap, abi: VersionRange, api: VersionRange ) -> Result<Self, NegotiationError> {

		let mut getter = None ;
		let host_info = host.bootstrap( &mut getter, abi.min(), abi.max(), api.min(), api.max() )
			.ok_or( NegotiationError::BootstrapFailed )?;
		let host_info = OwnedPlant::new( host_info );
		let getter = getter.ok_or( NegotiationError::BootstrapFailed )?;

		let linked = match host_info.leaf_seed_type( keys::EXTENSION_INFO ) {
			Ok( SeedType::PlantPtr ) => host_info.get_plantptr_value( keys::EXTENSION_INFO )?
				.pipe(| id | host_info.store().plant( id ))
				.map( OwnedPlant::new )
				.ok_or( NegotiationError::InvalidPlant( "extension descriptor is not a live plant" ))?
				.pipe( Some ),
			Ok( _ ) => return Err( NegotiationError::InvalidPlant( "extension descriptor leaf is not a plant pointer" )),
			Err( LeafError::NoSuchLeaf ) => None,
			Err( error ) => return Err( error.into() ),
		};

		let functions = HostFunctions::bootstrap( getter, &host_info )?;

		let descriptor = match linked {
			Some( descriptor ) => descriptor,
			None => {
				let descriptor = functions.plant_new( host_info.store(), plant_type::EXTENSION_INFO )?
					.pipe( OwnedPlant::new );
				for ( key, version ) in [
					( keys::MIN_ABI_VERSION, abi.min() ),
					( keys::MAX_ABI_VERSION, abi.max() ),
					( keys::MIN_API_VERSION, api.min() ),
					( keys::MAX_API_VERSION, api.max() ),
					( keys::ABI_VERSION, functions.abi_version() ),
					( keys::API_VERSION, functions.api_version() ),
				] {
					functions.leaf_set( &descriptor, key, SeedType::Int, vec![ Value::Int( version ) ])?;
				}
				functions.leaf_set( &host_info, keys::EXTENSION_INFO, SeedType::PlantPtr, vec![ Value::PlantPtr( descriptor.id() )])?;
				descriptor
			}
		};

		functions.leaf_set( &descriptor, keys::HOST_INFO, SeedType::PlantPtr, vec![ Value::PlantPtr( host_info.id() )])?;
		debug!( host_info = %host_info.id(), descriptor = %descriptor.id(), "Extension initialised" );

		Ok( Self { descriptor: descriptor.release(), host_info: host_info.release(), functions })

	}

	#[inline] pub fn host_info( &self ) -> &Plant { &self.host_info }
	#[inline] pub fn descriptor( &self ) -> &Plant { &self.descriptor }
	#[inline] pub fn functions( &self ) -> &Arc<HostFunctions> { &self.functions }
	#[inline] pub fn abi_version( &self ) -> i32 { self.functions.abi_version() }
	#[inline] pub fn api_version( &self ) -> i32 { self.functions.api_version() }

	/// Frees both plants through the host's `plant_free`. When the negotiated API
	/// predates plant removal the plants are left for the host to reclaim.
	///
	/// Both plants are attempted even if the first free fails; the first error is returned.
	pub fn unload( self ) -> Result<(), LeafError> {
		let Some( descriptor ) = self.functions.plant_free( &self.descriptor ) else {
			debug!( host_info = %self.host_info.id(), "Host cannot free plants at this API version" );
			return Ok(())
		};
		let host_info = self.functions.plant_free( &self.host_info ).unwrap_or( Ok(() ));
		descriptor.and( host_info )
	}

}

fn typed<F>( function: FuncPtr, cast: fn( &FuncPtr ) -> Option<F> ) -> Result<F, LeafError> {
	cast( &function ).ok_or( LeafError::WrongSeedType )
}

fn typed_gated<F>( function: Option<FuncPtr>, cast: fn( &FuncPtr ) -> Option<F> ) -> Result<Option<F>, LeafError> {
	function.map(| function | typed( function, cast )).transpose()
}
