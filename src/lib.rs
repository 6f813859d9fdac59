//! A typed attribute store shared between a host and independently built extensions,
//! and the handshake through which they agree on what they can call.
//!
//! Everything that crosses the host/extension boundary is a **plant**: a bag of named
//! **leaves**, each holding an ordered array of elements of one **seed type**. Plants
//! describe themselves, so either side can inspect one without sharing struct layouts.
//!
//! # Core Concepts
//!
//! - [`Store`]: Owns every plant and the [`MemoryFunctions`] used for buffers handed out
//! 	from it. Cloning a store clones a handle, not the plants.
//!
//! - [`Plant`]: A handle to one plant. The store primitives (`leaf_get`, `leaf_set`,
//! 	`leaf_delete`, ...) live on it, as does the typed accessor layer built over them:
//! 	`get_int_value`, `set_string_array`, `get_plant` and so on.
//!
//! - [`SeedType`] and [`Value`]: The type tag of a leaf and one element of it. Besides
//! 	the numeric, string and pointer seeds, hosts may register custom seed types at or
//! 	above [`SeedType::FIRST_CUSTOM`].
//!
//! - [`LeafFlags`]: Per-leaf protection bits. Immutable leaves reject writes,
//! 	undeletable leaves reject deletes.
//!
//! - [`Negotiator`]: The host's side of the bootstrap. Resolves an ABI and a feature-API
//! 	version with the extension and hands over a plant of function pointers for every
//! 	capability the negotiated versions enable.
//!
//! - [`ExtensionInfo`]: The extension's side of the bootstrap. Reads the negotiated plant
//! 	through the generic getter into [`HostFunctions`].
//!
//! # Example
//!
//! ```
//! use plant_link::{ ExtensionInfo, Negotiator, Store, VersionRange };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::new();
//! let host = Negotiator::new( store.clone() );
//!
//! // The extension accepts any ABI from 100 and any API from 150 up to the current one.
//! let extension = ExtensionInfo::init( &host, VersionRange::new( 100, 200 ), VersionRange::new( 150, 200 ))?;
//! assert_eq!( extension.abi_version(), 200 );
//!
//! // From here on the extension talks to the host only through its host functions.
//! let functions = extension.functions();
//! let settings = functions.plant_new( &store, 7 )?;
//! settings.set_string_value( "greeting", "hello" )?;
//! assert_eq!( settings.get_string_value( "greeting" )?, "hello" );
//!
//! settings.free()?;
//! extension.unload()?;
//! assert_eq!( store.plant_count(), 0 );
//! # Ok(())
//! # }
//! ```
//!
//! # Ownership
//!
//! Arrays and strings read through the accessor layer are allocated with the store's
//! memory functions and released with them when dropped, so a buffer never outlives or
//! escapes the allocator that produced it. Plants are released explicitly with
//! [`Plant::free`], or by dropping an [`OwnedPlant`] guard.

mod error ;
mod flags ;
mod version ;
mod memory ;
mod seed ;
mod function ;
pub mod keys ;
mod store ;
mod accessor ;
mod duplicate ;
mod utils ;
mod capability ;
mod negotiation ;
mod extension ;

pub use error::{ LeafError, NegotiationError };
pub use flags::LeafFlags ;
pub use version::{ Axis, CompatRule, FloorBound, VersionRange, ABI_VERSION, API_VERSION };
pub use memory::{ Array, MemStr, MemoryFunctions };
pub use memory::{ CallocFn, FreeFn, MallocFn, MemcmpFn, MemcpyFn, MemmoveFn, MemsetFn, ReallocFn };
pub use seed::{ Opaque, Seed, SeedType, Value, VoidPtr };
pub use function::{
	FuncPtr, DefaultGetterFn, RawFn,
	PlantNewFn, PlantFreeFn, PlantListLeavesFn,
	LeafGetFn, LeafSetFn, LeafSeedTypeFn, LeafNumElementsFn, LeafElementSizeFn,
	LeafGetFlagsFn, LeafSetFlagsFn, LeafDeleteFn,
};
pub use keys::plant_type ;
pub use store::{ OwnedPlant, Plant, PlantId, Store, StoreLimits };
pub use duplicate::{ leaf_copy, leaf_copy_nth, leaf_elements_equate, plant_copy, plant_duplicate, plants_equate, DuplicateMode, SkippedLeaf };
pub use utils::PartialSuccess ;
pub use capability::{ Capability, Gate, CAPABILITIES };
pub use negotiation::{ default_getter, Bootstrap, Negotiator, ReviewFn };
pub use extension::{ ExtensionInfo, HostFunctions };
