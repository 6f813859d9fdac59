//! The attribute store: plants, their leaves and the primitives over them.
//!
//! Everything above this module only ever talks to the store through the primitives
//! on [`Plant`] (and [`Store::plant_new`]), which is also the set of functions the
//! negotiation protocol hands to extensions. Each primitive takes the store lock once,
//! so every call is atomic; sequences of calls are not.

use std::collections::HashMap ;
use std::fmt ;
use std::hash::{ Hash, Hasher };
use std::num::NonZeroU64 ;
use std::ops::Deref ;
use std::sync::{ Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard };
use std::sync::atomic::{ AtomicU64, Ordering };

use nonempty_collections::NEVec ;
use pipe_trait::Pipe ;
use tracing::{ trace, warn };

use crate::{ keys, LeafError, LeafFlags, MemoryFunctions, SeedType, Value };



/// Identity of a plant within its [`Store`]. Ids are never reused.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct PlantId( NonZeroU64 );

impl PlantId {
	#[inline] pub fn get( self ) -> u64 { self.0.get() }
}

impl fmt::Display for PlantId {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result { write!( f, "plant#{}", self.0 ) }
}

/// Resource limits of a [`Store`].
///
/// Exceeding a limit makes the primitive that would exceed it fail with
/// [`LeafError::MemoryAllocation`], exactly as an exhausted allocator would.
#[derive( Debug, Clone, Copy, Default, PartialEq, Eq )]
pub struct StoreLimits {
	max_plants: Option<usize>,
	max_leaves: Option<usize>,
}

impl StoreLimits {

	pub fn new() -> Self { Self::default() }

	/// Maximum number of live plants.
	pub fn with_max_plants( mut self, max: usize ) -> Self { self.max_plants = Some( max ); self }

	/// Maximum number of live leaves across all plants, type leaves included.
	pub fn with_max_leaves( mut self, max: usize ) -> Self { self.max_leaves = Some( max ); self }

	#[inline] pub fn max_plants( &self ) -> Option<usize> { self.max_plants }
	#[inline] pub fn max_leaves( &self ) -> Option<usize> { self.max_leaves }

}

#[derive( Debug )]
struct Leaf {
	key: String,
	seed: SeedType,
	flags: LeafFlags,
	values: Vec<Value>,
}

#[derive( Debug )]
struct PlantData {
	leaves: Vec<Leaf>,
}

impl PlantData {

	fn new( plant_type: i32 ) -> Self {
		Self { leaves: vec![ Leaf {
			key: keys::TYPE.to_owned(),
			seed: SeedType::Int,
			flags: LeafFlags::IMMUTABLE,
			values: vec![ Value::Int( plant_type )],
		}]}
	}

	fn position( &self, key: &str ) -> Option<usize> {
		self.leaves.iter().position(| leaf | leaf.key == key )
	}

	fn leaf( &self, key: &str ) -> Result<&Leaf, LeafError> {
		self.leaves.iter().find(| leaf | leaf.key == key ).ok_or( LeafError::NoSuchLeaf )
	}

	fn leaf_mut( &mut self, key: &str ) -> Result<&mut Leaf, LeafError> {
		self.leaves.iter_mut().find(| leaf | leaf.key == key ).ok_or( LeafError::NoSuchLeaf )
	}

}

#[derive( Debug, Default )]
struct Plants {
	table: HashMap<PlantId, PlantData>,
	leaves: usize,
	limits: StoreLimits,
}

impl Plants {

	fn plant( &self, id: PlantId ) -> Result<&PlantData, LeafError> {
		self.table.get( &id ).ok_or( LeafError::NoSuchPlant )
	}

	fn plant_mut( &mut self, id: PlantId ) -> Result<&mut PlantData, LeafError> {
		self.table.get_mut( &id ).ok_or( LeafError::NoSuchPlant )
	}

	fn reserve_leaf( &self ) -> Result<(), LeafError> {
		match self.limits.max_leaves.is_some_and(| max | self.leaves >= max ) {
			true => Err( LeafError::MemoryAllocation ),
			false => Ok(()),
		}
	}

}

struct StoreInner {
	plants: RwLock<Plants>,
	next_id: AtomicU64,
	memory: MemoryFunctions,
}

/// A shared handle to a set of plants and the memory functions used for everything
/// read out of them.
///
/// Cloning a `Store` produces another handle to the same plants.
#[derive( Clone )]
pub struct Store {
	inner: Arc<StoreInner>,
}

impl Default for Store {
	fn default() -> Self { Self::new() }
}

impl fmt::Debug for Store {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		f.debug_struct( "Store" )
			.field( "plants", &self.plant_count() )
			.field( "leaves", &self.leaf_count() )
			.field( "memory", &self.inner.memory )
			.finish_non_exhaustive()
	}
}

impl PartialEq for Store {
	fn eq( &self, other: &Self ) -> bool { Arc::ptr_eq( &self.inner, &other.inner ) }
}

impl Eq for Store {}

impl Store {

	/// Creates an empty store using the C library memory functions.
	pub fn new() -> Self { Self::with_memory( MemoryFunctions::default() ) }

	/// Creates an empty store that allocates every buffer it hands out with `memory`.
	pub fn with_memory( memory: MemoryFunctions ) -> Self {
		Self { inner: Arc::new( StoreInner {
			plants: RwLock::new( Plants::default() ),
			next_id: AtomicU64::new( 1 ),
			memory,
		})}
	}

	/// Applies resource limits to this store.
	pub fn with_limits( self, limits: StoreLimits ) -> Self {
		self.set_limits( limits );
		self
	}

	/// Replaces the resource limits. Plants and leaves already live are unaffected.
	pub fn set_limits( &self, limits: StoreLimits ) { self.write().limits = limits ; }

	#[inline] pub fn limits( &self ) -> StoreLimits { self.read().limits }

	#[inline] pub fn memory( &self ) -> &MemoryFunctions { &self.inner.memory }

	/// Number of live plants.
	pub fn plant_count( &self ) -> usize { self.read().table.len() }

	/// Number of live leaves across all plants.
	pub fn leaf_count( &self ) -> usize { self.read().leaves }

	/// Creates a plant whose immutable `type` leaf holds `plant_type`.
	pub fn plant_new( &self, plant_type: i32 ) -> Result<Plant, LeafError> {

		let mut plants = self.write();
		if plants.limits.max_plants.is_some_and(| max | plants.table.len() >= max ) {
			return Err( LeafError::MemoryAllocation );
		}
		plants.reserve_leaf()?;
		plants.table.try_reserve( 1 ).map_err(| _ | LeafError::MemoryAllocation )?;

		let id = self.inner.next_id.fetch_add( 1, Ordering::Relaxed )
			.pipe( NonZeroU64::new )
			.map( PlantId )
			.ok_or( LeafError::MemoryAllocation )?;
		plants.table.insert( id, PlantData::new( plant_type ));
		plants.leaves += 1 ;
		drop( plants );

		trace!( plant = %id, plant_type, "Plant created" );
		Ok( Plant { store: self.clone(), id })

	}

	/// Creates a plant that is freed again when the returned guard drops.
	pub fn plant_new_owned( &self, plant_type: i32 ) -> Result<OwnedPlant, LeafError> {
		self.plant_new( plant_type ).map( OwnedPlant::new )
	}

	/// A handle to the plant with id `id`, if it is alive.
	pub fn plant( &self, id: PlantId ) -> Option<Plant> {
		match self.read().table.contains_key( &id ) {
			true => Some( Plant { store: self.clone(), id }),
			false => None,
		}
	}

	fn read( &self ) -> RwLockReadGuard<'_, Plants> {
		self.inner.plants.read().unwrap_or_else( PoisonError::into_inner )
	}

	fn write( &self ) -> RwLockWriteGuard<'_, Plants> {
		self.inner.plants.write().unwrap_or_else( PoisonError::into_inner )
	}

}

/// A non-owning handle to one plant of a [`Store`].
///
/// Handles are cheap to clone. Freeing the plant through any handle invalidates all of
/// them; primitives called through a stale handle fail with [`LeafError::NoSuchPlant`].
#[derive( Clone )]
pub struct Plant {
	store: Store,
	id: PlantId,
}

impl fmt::Debug for Plant {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		f.debug_tuple( "Plant" ).field( &self.id ).finish()
	}
}

impl PartialEq for Plant {
	fn eq( &self, other: &Self ) -> bool { self.id == other.id && self.store == other.store }
}

impl Eq for Plant {}

impl Hash for Plant {
	fn hash<H: Hasher>( &self, state: &mut H ) { self.id.hash( state ) }
}

impl Plant {

	#[inline] pub fn id( &self ) -> PlantId { self.id }
	#[inline] pub fn store( &self ) -> &Store { &self.store }
	#[inline] pub fn memory( &self ) -> &MemoryFunctions { self.store.memory() }

	pub fn is_alive( &self ) -> bool { self.store.read().table.contains_key( &self.id ) }

	/// Destroys the plant and all of its leaves.
	///
	/// Plants referenced from plant-pointer leaves are not freed along with it.
	pub fn free( &self ) -> Result<(), LeafError> {

		let mut plants = self.store.write();
		let plant = plants.table.remove( &self.id ).ok_or( LeafError::NoSuchPlant )?;
		plants.leaves -= plant.leaves.len();
		drop( plants );

		trace!( plant = %self.id, "Plant freed" );
		Ok(())

	}

	/// Element `index` of the leaf `key`.
	pub fn leaf_get( &self, key: &str, index: usize ) -> Result<Value, LeafError> {
		self.store.read()
			.plant( self.id )?
			.leaf( key )?
			.values.get( index )
			.cloned()
			.ok_or( LeafError::NoSuchElement )
	}

	/// Replaces the elements of leaf `key`, creating the leaf if needed.
	///
	/// Fails with [`LeafError::WrongSeedType`] if any value is not of seed type `seed`
	/// or the leaf already exists with another seed type, and with
	/// [`LeafError::Immutable`] if the leaf is flagged immutable. On failure the leaf
	/// is left untouched.
	pub fn leaf_set( &self, key: &str, seed: SeedType, values: Vec<Value> ) -> Result<(), LeafError> {

		if !seed.is_valid() || values.iter().any(| value | value.seed_type() != seed ) {
			return Err( LeafError::WrongSeedType );
		}

		let mut plants = self.store.write();
		let can_grow = plants.reserve_leaf();
		let plant = plants.plant_mut( self.id )?;

		match plant.leaf_mut( key ) {
			Ok( leaf ) => {
				if leaf.seed != seed { return Err( LeafError::WrongSeedType ) }
				if leaf.flags.contains( LeafFlags::IMMUTABLE ) { return Err( LeafError::Immutable ) }
				leaf.values = values ;
			}
			Err( _ ) => {
				can_grow?;
				plant.leaves.try_reserve( 1 ).map_err(| _ | LeafError::MemoryAllocation )?;
				plant.leaves.push( Leaf { key: key.to_owned(), seed, flags: LeafFlags::empty(), values });
				plants.leaves += 1 ;
			}
		}

		Ok(())

	}

	pub fn leaf_seed_type( &self, key: &str ) -> Result<SeedType, LeafError> {
		Ok( self.store.read().plant( self.id )?.leaf( key )?.seed )
	}

	pub fn leaf_num_elements( &self, key: &str ) -> Result<usize, LeafError> {
		Ok( self.store.read().plant( self.id )?.leaf( key )?.values.len() )
	}

	/// Byte size of element `index`: the string length for strings, the native size otherwise.
	pub fn leaf_element_size( &self, key: &str, index: usize ) -> Result<usize, LeafError> {
		self.store.read()
			.plant( self.id )?
			.leaf( key )?
			.values.get( index )
			.map( Value::element_size )
			.ok_or( LeafError::NoSuchElement )
	}

	pub fn leaf_get_flags( &self, key: &str ) -> Result<LeafFlags, LeafError> {
		Ok( self.store.read().plant( self.id )?.leaf( key )?.flags )
	}

	/// Replaces the whole flag bitset of leaf `key`.
	pub fn leaf_set_flags( &self, key: &str, flags: LeafFlags ) -> Result<(), LeafError> {
		self.store.write().plant_mut( self.id )?.leaf_mut( key )?.flags = flags ;
		Ok(())
	}

	/// Removes leaf `key`. The `type` leaf and leaves flagged undeletable cannot be removed.
	pub fn leaf_delete( &self, key: &str ) -> Result<(), LeafError> {

		let mut plants = self.store.write();
		let plant = plants.plant_mut( self.id )?;
		let position = plant.position( key ).ok_or( LeafError::NoSuchLeaf )?;
		if key == keys::TYPE || plant.leaves[ position ].flags.contains( LeafFlags::UNDELETABLE ) {
			return Err( LeafError::Undeletable );
		}
		plant.leaves.remove( position );
		plants.leaves -= 1 ;
		Ok(())

	}

	/// Keys of every leaf in creation order. The `type` leaf always comes first.
	pub fn plant_list_leaves( &self ) -> Result<NEVec<String>, LeafError> {

		let plants = self.store.read();
		let plant = plants.plant( self.id )?;
		let ( first, rest ) = plant.leaves.split_first().ok_or( LeafError::NoSuchLeaf )?;

		let mut names = NEVec::new( first.key.clone() );
		for leaf in rest { names.push( leaf.key.clone() ); }
		Ok( names )

	}

	/// Whether the plant is alive and has a leaf `key`.
	pub fn has_leaf( &self, key: &str ) -> bool {
		self.store.read()
			.plant( self.id )
			.is_ok_and(| plant | plant.position( key ).is_some() )
	}

}

/// Frees its plant when dropped, unless [`released`]( OwnedPlant::release ) first.
///
/// Multi-step operations that create plants hold them in guards so that every early
/// return frees exactly the plants created so far.
#[must_use = "dropping an OwnedPlant frees its plant"]
pub struct OwnedPlant {
	plant: Plant,
	armed: bool,
}

impl OwnedPlant {

	pub fn new( plant: Plant ) -> Self { Self { plant, armed: true }}

	/// Gives up ownership. The plant stays alive.
	pub fn release( mut self ) -> Plant {
		self.armed = false ;
		self.plant.clone()
	}

	#[inline] pub fn plant( &self ) -> &Plant { &self.plant }

}

impl fmt::Debug for OwnedPlant {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		f.debug_tuple( "OwnedPlant" ).field( &self.plant.id ).finish()
	}
}

impl Deref for OwnedPlant {
	type Target = Plant ;
	fn deref( &self ) -> &Plant { &self.plant }
}

impl Drop for OwnedPlant {
	fn drop( &mut self ) {
		if !self.armed { return }
		if let Err( error ) = self.plant.free() {
			warn!( plant = %self.plant.id, %error, "Failed to free owned plant" );
		}
	}
}

#[cfg( test )]
mod tests {

	use super::{ Store, StoreLimits };
	use crate::{ keys, LeafError, LeafFlags, SeedType, Value };

	#[test]
	fn new_plant_has_locked_type_leaf() {
		let store = Store::new();
		let plant = store.plant_new( 7 ).unwrap();
		assert!( matches!( plant.leaf_get( keys::TYPE, 0 ), Ok( Value::Int( 7 ))));
		assert_eq!( plant.leaf_get_flags( keys::TYPE ), Ok( LeafFlags::IMMUTABLE ));
		assert_eq!( plant.leaf_set( keys::TYPE, SeedType::Int, vec![ Value::Int( 8 )]), Err( LeafError::Immutable ));
		assert_eq!( plant.leaf_delete( keys::TYPE ), Err( LeafError::Undeletable ));
	}

	#[test]
	fn heterogeneous_values_are_rejected() {
		let store = Store::new();
		let plant = store.plant_new( 0 ).unwrap();
		let mixed = vec![ Value::Int( 1 ), Value::Double( 2.0 )];
		assert_eq!( plant.leaf_set( "mixed", SeedType::Int, mixed ), Err( LeafError::WrongSeedType ));
		assert!( !plant.has_leaf( "mixed" ));
	}

	#[test]
	fn stale_handles_report_missing_plant() {
		let store = Store::new();
		let plant = store.plant_new( 0 ).unwrap();
		let alias = plant.clone();
		plant.free().unwrap();
		assert_eq!( alias.leaf_num_elements( keys::TYPE ), Err( LeafError::NoSuchPlant ));
		assert_eq!( alias.free(), Err( LeafError::NoSuchPlant ));
		assert_eq!( store.plant_count(), 0 );
		assert_eq!( store.leaf_count(), 0 );
	}

	#[test]
	fn limits_fail_like_allocation() {
		let store = Store::new().with_limits( StoreLimits::new().with_max_plants( 1 ).with_max_leaves( 2 ));
		let plant = store.plant_new( 0 ).unwrap();
		assert_eq!( store.plant_new( 0 ).unwrap_err(), LeafError::MemoryAllocation );
		plant.leaf_set( "a", SeedType::Int, vec![]).unwrap();
		assert_eq!( plant.leaf_set( "b", SeedType::Int, vec![]), Err( LeafError::MemoryAllocation ));
		plant.leaf_set( "a", SeedType::Int, vec![ Value::Int( 3 )]).unwrap();
	}

	#[test]
	fn owned_plant_frees_unless_released() {
		let store = Store::new();
		{
			let _guard = store.plant_new_owned( 0 ).unwrap();
			assert_eq!( store.plant_count(), 1 );
		}
		assert_eq!( store.plant_count(), 0 );
		let kept = store.plant_new_owned( 0 ).unwrap().release();
		assert!( kept.is_alive() );
	}

}
