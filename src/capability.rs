//! The table of capabilities a negotiation plant can carry.
//!
//! Each capability is a function-pointer leaf. Mandatory capabilities exist at every
//! version; the others are gated on the version of one axis that introduced them and
//! are pruned from negotiation plants that settle on an older version.

use crate::{ keys, FuncPtr, MemoryFunctions, Plant, Store };
use crate::version::Axis ;



/// The version that introduced a capability.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub struct Gate {
	pub axis: Axis,
	pub since: i32,
}

/// One entry of [`CAPABILITIES`].
#[derive( Clone, Copy )]
pub struct Capability {
	key: &'static str,
	gate: Option<Gate>,
	default: fn( &MemoryFunctions ) -> FuncPtr,
}

impl std::fmt::Debug for Capability {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Capability" )
			.field( "key", &self.key )
			.field( "gate", &self.gate )
			.finish_non_exhaustive()
	}
}

impl Capability {

	const fn mandatory( key: &'static str, default: fn( &MemoryFunctions ) -> FuncPtr ) -> Self {
		Self { key, gate: None, default }
	}

	const fn gated( key: &'static str, axis: Axis, since: i32, default: fn( &MemoryFunctions ) -> FuncPtr ) -> Self {
		Self { key, gate: Some( Gate { axis, since }), default }
	}

	/// Leaf key carrying this capability.
	#[inline] pub fn key( &self ) -> &'static str { self.key }

	#[inline] pub fn gate( &self ) -> Option<Gate> { self.gate }

	#[inline] pub fn is_mandatory( &self ) -> bool { self.gate.is_none() }

	/// Whether a plant negotiated to these versions may carry this capability.
	pub fn is_supported_at( &self, abi: i32, api: i32 ) -> bool {
		match self.gate {
			None => true,
			Some( Gate { axis: Axis::Abi, since }) => abi >= since,
			Some( Gate { axis: Axis::Api, since }) => api >= since,
		}
	}

	/// The crate's own implementation of this capability, backed by `memory` for memory functions.
	#[inline] pub fn default_for( &self, memory: &MemoryFunctions ) -> FuncPtr { ( self.default )( memory ) }

	/// Looks a capability up by its leaf key.
	pub fn find( key: &str ) -> Option<&'static Capability> {
		CAPABILITIES.iter().find(| capability | capability.key == key )
	}

}

/// Every capability, in the order they are written to a negotiation plant.
pub static CAPABILITIES: [Capability; 19] = [
	Capability::mandatory( keys::PLANT_NEW, | _ | FuncPtr::PlantNew( Store::plant_new )),
	Capability::mandatory( keys::PLANT_LIST_LEAVES, | _ | FuncPtr::PlantListLeaves( Plant::plant_list_leaves )),
	Capability::mandatory( keys::LEAF_GET, | _ | FuncPtr::LeafGet( Plant::leaf_get )),
	Capability::mandatory( keys::LEAF_SET, | _ | FuncPtr::LeafSet( Plant::leaf_set )),
	Capability::mandatory( keys::LEAF_SEED_TYPE, | _ | FuncPtr::LeafSeedType( Plant::leaf_seed_type )),
	Capability::mandatory( keys::LEAF_NUM_ELEMENTS, | _ | FuncPtr::LeafNumElements( Plant::leaf_num_elements )),
	Capability::mandatory( keys::LEAF_ELEMENT_SIZE, | _ | FuncPtr::LeafElementSize( Plant::leaf_element_size )),
	Capability::mandatory( keys::LEAF_GET_FLAGS, | _ | FuncPtr::LeafGetFlags( Plant::leaf_get_flags )),
	Capability::mandatory( keys::MALLOC, | memory | FuncPtr::Malloc( memory.malloc() )),
	Capability::mandatory( keys::FREE, | memory | FuncPtr::Free( memory.free() )),
	Capability::mandatory( keys::MEMSET, | memory | FuncPtr::Memset( memory.memset() )),
	Capability::mandatory( keys::MEMCPY, | memory | FuncPtr::Memcpy( memory.memcpy() )),
	Capability::gated( keys::PLANT_FREE, Axis::Api, 200, | _ | FuncPtr::PlantFree( Plant::free )),
	Capability::gated( keys::LEAF_DELETE, Axis::Api, 200, | _ | FuncPtr::LeafDelete( Plant::leaf_delete )),
	Capability::gated( keys::LEAF_SET_FLAGS, Axis::Api, 200, | _ | FuncPtr::LeafSetFlags( Plant::leaf_set_flags )),
	Capability::gated( keys::REALLOC, Axis::Abi, 200, | memory | FuncPtr::Realloc( memory.realloc() )),
	Capability::gated( keys::CALLOC, Axis::Abi, 200, | memory | FuncPtr::Calloc( memory.calloc() )),
	Capability::gated( keys::MEMMOVE, Axis::Abi, 200, | memory | FuncPtr::Memmove( memory.memmove() )),
	Capability::gated( keys::MEMCMP, Axis::Abi, 200, | memory | FuncPtr::Memcmp( memory.memcmp() )),
];
