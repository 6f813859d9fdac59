//! Well-known leaf keys.
//!
//! Capability leaves are named after the primitive they carry with a `_func` suffix.

/// The mandatory leaf every plant carries, holding its plant type.
pub const TYPE: &str = "type" ;

pub const ABI_VERSION: &str = "abi_version" ;
pub const API_VERSION: &str = "api_version" ;

pub const MIN_ABI_VERSION: &str = "min_abi_version" ;
pub const MAX_ABI_VERSION: &str = "max_abi_version" ;
pub const MIN_API_VERSION: &str = "min_api_version" ;
pub const MAX_API_VERSION: &str = "max_api_version" ;

/// Plant-pointer leaf on the host info plant referencing the extension descriptor.
pub const EXTENSION_INFO: &str = "extension_info" ;
/// Plant-pointer leaf on the extension descriptor referencing the host info plant.
pub const HOST_INFO: &str = "host_info" ;

pub const PLANT_NEW: &str = "plant_new_func" ;
pub const PLANT_FREE: &str = "plant_free_func" ;
pub const PLANT_LIST_LEAVES: &str = "plant_list_leaves_func" ;
pub const LEAF_GET: &str = "leaf_get_func" ;
pub const LEAF_SET: &str = "leaf_set_func" ;
pub const LEAF_SEED_TYPE: &str = "leaf_seed_type_func" ;
pub const LEAF_NUM_ELEMENTS: &str = "leaf_num_elements_func" ;
pub const LEAF_ELEMENT_SIZE: &str = "leaf_element_size_func" ;
pub const LEAF_GET_FLAGS: &str = "leaf_get_flags_func" ;
pub const LEAF_SET_FLAGS: &str = "leaf_set_flags_func" ;
pub const LEAF_DELETE: &str = "leaf_delete_func" ;

pub const MALLOC: &str = "malloc_func" ;
pub const CALLOC: &str = "calloc_func" ;
pub const REALLOC: &str = "realloc_func" ;
pub const FREE: &str = "free_func" ;
pub const MEMCPY: &str = "memcpy_func" ;
pub const MEMMOVE: &str = "memmove_func" ;
pub const MEMSET: &str = "memset_func" ;
pub const MEMCMP: &str = "memcmp_func" ;

/// Values of the [`TYPE`] leaf for the plants this crate creates itself.
pub mod plant_type {
	pub const UNKNOWN: i32 = 0 ;
	/// Descriptor of an extension's accepted and negotiated versions.
	pub const EXTENSION_INFO: i32 = 1 ;
	/// The negotiation plant handed to an extension at bootstrap.
	pub const HOST_INFO: i32 = 255 ;
}
