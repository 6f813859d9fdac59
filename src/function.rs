//! Signatures of the functions exchanged across the host/extension boundary.
//!
//! Capabilities travel through plants as [`FuncPtr`] leaf values. Each variant
//! wraps one concrete signature, so an extension that reads a capability back
//! gets a typed function pointer rather than an untyped address.

use std::fmt ;
use std::hash::{ Hash, Hasher };

use nonempty_collections::NEVec ;

use crate::{ LeafError, LeafFlags, Plant, SeedType, Store, Value };
use crate::memory::{ CallocFn, FreeFn, MallocFn, MemcmpFn, MemcpyFn, MemmoveFn, MemsetFn, ReallocFn };



pub type PlantNewFn = fn( &Store, i32 ) -> Result<Plant, LeafError> ;
pub type PlantFreeFn = fn( &Plant ) -> Result<(), LeafError> ;
pub type PlantListLeavesFn = fn( &Plant ) -> Result<NEVec<String>, LeafError> ;
pub type LeafGetFn = fn( &Plant, &str, usize ) -> Result<Value, LeafError> ;
pub type LeafSetFn = fn( &Plant, &str, SeedType, Vec<Value> ) -> Result<(), LeafError> ;
pub type LeafSeedTypeFn = fn( &Plant, &str ) -> Result<SeedType, LeafError> ;
pub type LeafNumElementsFn = fn( &Plant, &str ) -> Result<usize, LeafError> ;
pub type LeafElementSizeFn = fn( &Plant, &str, usize ) -> Result<usize, LeafError> ;
pub type LeafGetFlagsFn = fn( &Plant, &str ) -> Result<LeafFlags, LeafError> ;
pub type LeafSetFlagsFn = fn( &Plant, &str, LeafFlags ) -> Result<(), LeafError> ;
pub type LeafDeleteFn = fn( &Plant, &str ) -> Result<(), LeafError> ;

/// The one function an extension receives before anything else: reads element 0
/// of a named leaf without allocating through any memory function.
pub type DefaultGetterFn = fn( &Plant, &str ) -> Result<Value, LeafError> ;

/// A function of a signature this crate does not model.
pub type RawFn = unsafe extern "C" fn();

macro_rules! func_ptrs {
	( $( $( #[$doc:meta] )* $variant:ident( $ty:ty ) => $getter:ident ;)* ) => {

		/// A typed function pointer stored in a leaf of seed type [`SeedType::FuncPtr`].
		///
		/// Two values are equal when they wrap the same signature and the same address.
		#[derive( Clone, Copy )]
		pub enum FuncPtr { $( $( #[$doc] )* $variant( $ty ), )* }

		impl FuncPtr {

			/// Address of the wrapped function.
			pub fn addr( &self ) -> usize { match self {
				$( Self::$variant( f ) => *f as usize, )*
			}}

			/// Name of the wrapped signature.
			pub fn signature( &self ) -> &'static str { match self {
				$( Self::$variant( _ ) => stringify!( $variant ), )*
			}}

			$(
				#[inline] pub fn $getter( &self ) -> Option<$ty> { match self {
					Self::$variant( f ) => Some( *f ),
					_ => None,
				}}
			)*

		}

	};
}

func_ptrs! {
	PlantNew( PlantNewFn ) => as_plant_new ;
	PlantFree( PlantFreeFn ) => as_plant_free ;
	PlantListLeaves( PlantListLeavesFn ) => as_plant_list_leaves ;
	LeafGet( LeafGetFn ) => as_leaf_get ;
	LeafSet( LeafSetFn ) => as_leaf_set ;
	LeafSeedType( LeafSeedTypeFn ) => as_leaf_seed_type ;
	LeafNumElements( LeafNumElementsFn ) => as_leaf_num_elements ;
	LeafElementSize( LeafElementSizeFn ) => as_leaf_element_size ;
	LeafGetFlags( LeafGetFlagsFn ) => as_leaf_get_flags ;
	LeafSetFlags( LeafSetFlagsFn ) => as_leaf_set_flags ;
	LeafDelete( LeafDeleteFn ) => as_leaf_delete ;
	DefaultGetter( DefaultGetterFn ) => as_default_getter ;
	Malloc( MallocFn ) => as_malloc ;
	Calloc( CallocFn ) => as_calloc ;
	Realloc( ReallocFn ) => as_realloc ;
	Free( FreeFn ) => as_free ;
	Memcpy( MemcpyFn ) => as_memcpy ;
	Memmove( MemmoveFn ) => as_memmove ;
	Memset( MemsetFn ) => as_memset ;
	Memcmp( MemcmpFn ) => as_memcmp ;
	/// Any other function. Callers must know its real signature before calling it.
	Raw( RawFn ) => as_raw ;
}

impl PartialEq for FuncPtr {
	fn eq( &self, other: &Self ) -> bool {
		self.signature() == other.signature() && self.addr() == other.addr()
	}
}

impl Eq for FuncPtr {}

impl Hash for FuncPtr {
	fn hash<H: Hasher>( &self, state: &mut H ) {
		self.signature().hash( state );
		self.addr().hash( state );
	}
}

impl fmt::Debug for FuncPtr {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		write!( f, "{}@{:#x}", self.signature(), self.addr() )
	}
}
