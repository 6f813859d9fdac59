//! The capability negotiation run once per extension load.
//!
//! The extension states the version ranges it accepts on both axes. The host proposes a
//! negotiation plant carrying its running versions and a function pointer for every
//! capability it supports, optionally lets a review callback revise or replace that
//! plant, resolves both axes, fills in any missing mandatory capability, and prunes
//! capabilities that are newer than the negotiated versions. The finalized plant is
//! the extension's one handle into the host.
//!
//! Every plant created along the way is held in an [`OwnedPlant`] guard until the
//! negotiation succeeds, so any failure frees exactly the plants the protocol owns at
//! that moment.
//!
//! ```
//! use plant_link::{ keys, Negotiator, Store };
//!
//! let negotiator = Negotiator::new( Store::new() ).with_abi_version( 145 );
//!
//! let mut getter = None ;
//! let host_info = negotiator.negotiate( &mut getter, 100, 150, 100, 200 )
//! 	.expect( "ranges overlap" );
//!
//! let getter = getter.expect( "getter is handed over with the plant" );
//! assert_eq!( host_info.get_int_value( keys::ABI_VERSION ), Ok( 145 ));
//! assert!( getter( &host_info, keys::LEAF_GET ).is_ok() );
//! // ABI 145 predates the extended memory functions.
//! assert!( !host_info.has_leaf( keys::REALLOC ));
//! ```

use std::collections::HashMap ;
use std::fmt ;
use std::sync::Arc ;

use pipe_trait::Pipe ;
use tracing::{ debug, warn };

use crate::{ keys, FuncPtr, LeafError, NegotiationError, OwnedPlant, Plant, SeedType, Store, Value };
use crate::capability::{ Capability, CAPABILITIES };
use crate::function::DefaultGetterFn ;
use crate::keys::plant_type ;
use crate::version::{ Axis, CompatRule, VersionRange, ABI_VERSION, API_VERSION };



/// Host callback inspecting, revising or replacing the proposed negotiation plant.
///
/// Returning the proposed plant continues with it as is. Returning a different plant
/// hands that plant to the protocol, which frees the proposed one; the callback must
/// not free the proposed plant itself. Returning `None` aborts the negotiation.
/// Extensions may bootstrap concurrently, so the callback must be reentrant.
pub type ReviewFn = dyn Fn( &Plant ) -> Option<Plant> + Send + Sync ;

/// The entry point an extension calls at load time.
///
/// Implemented by [`Negotiator`]; extensions depend on this trait rather than on
/// the host's negotiator.
pub trait Bootstrap {
	/// Negotiates versions and capabilities. On success `getter` holds the generic
	/// getter used to read the returned plant; on failure the result is `None`.
	fn bootstrap(
		&self,
		getter: &mut Option<DefaultGetterFn>,
		abi_min: i32,
		abi_max: i32,
		api_min: i32,
		api_max: i32,
	) -> Option<Plant> ;
}

/// Reads element `0` of leaf `key` straight from the store, without allocating.
pub fn default_getter( plant: &Plant, key: &str ) -> Result<Value, LeafError> {
	plant.leaf_get( key, 0 )
}

/// Host-side configuration of the negotiation protocol.
///
/// A negotiator is cheap to clone and can be shared between threads; each call to
/// [`Negotiator::negotiate`] is an independent bootstrap attempt.
#[derive( Clone )]
pub struct Negotiator {
	store: Store,
	abi_version: i32,
	api_version: i32,
	abi_rule: CompatRule,
	api_rule: CompatRule,
	review: Option<Arc<ReviewFn>>,
	defaults: HashMap<&'static str, FuncPtr>,
}

impl fmt::Debug for Negotiator {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		f.debug_struct( "Negotiator" )
			.field( "store", &self.store )
			.field( "abi_version", &self.abi_version )
			.field( "api_version", &self.api_version )
			.field( "abi_rule", &self.abi_rule )
			.field( "api_rule", &self.api_rule )
			.field( "review", &self.review.as_ref().map(| _ | "<closure>" ))
			.field( "defaults", &self.defaults.len() )
			.finish()
	}
}

impl Negotiator {

	/// A negotiator creating its plants in `store`, running the newest known versions on
	/// both axes with the default compatibility rules and every capability supported.
	pub fn new( store: Store ) -> Self {
		let defaults = CAPABILITIES.iter()
			.map(| capability | ( capability.key(), capability.default_for( store.memory() )))
			.collect();
		Self {
			store,
			abi_version: ABI_VERSION,
			api_version: API_VERSION,
			abi_rule: CompatRule::abi(),
			api_rule: CompatRule::api(),
			review: None,
			defaults,
		}
	}

	/// The ABI version the host runs.
	pub fn with_abi_version( mut self, version: i32 ) -> Self { self.abi_version = version ; self }

	/// The feature-API version the host runs.
	pub fn with_api_version( mut self, version: i32 ) -> Self { self.api_version = version ; self }

	pub fn with_abi_rule( mut self, rule: CompatRule ) -> Self { self.abi_rule = rule ; self }

	pub fn with_api_rule( mut self, rule: CompatRule ) -> Self { self.api_rule = rule ; self }

	/// Registers a callback run on every proposed negotiation plant. See [`ReviewFn`].
	pub fn with_review( mut self, review: impl Fn( &Plant ) -> Option<Plant> + Send + Sync + 'static ) -> Self {
		self.review = Some( Arc::new( review ));
		self
	}

	/// Supplies the host's own implementation of the capability stored under `key`.
	/// Keys that name no capability are ignored.
	pub fn with_default( mut self, key: &str, function: FuncPtr ) -> Self {
		if let Some( capability ) = Capability::find( key ) {
			self.defaults.insert( capability.key(), function );
		}
		self
	}

	/// Withdraws support for the capability stored under `key`. It is left out of
	/// proposals and cannot be back-filled.
	pub fn without_default( mut self, key: &str ) -> Self {
		self.defaults.remove( key );
		self
	}

	#[inline] pub fn store( &self ) -> &Store { &self.store }
	#[inline] pub fn abi_version( &self ) -> i32 { self.abi_version }
	#[inline] pub fn api_version( &self ) -> i32 { self.api_version }

	/// Runs one bootstrap attempt and reports failure as `None`.
	///
	/// Version bounds given backwards are swapped. The cause of a failure is logged;
	/// use [`Negotiator::try_negotiate`] to inspect it.
	pub fn negotiate(
		&self,
		getter: &mut Option<DefaultGetterFn>,
		abi_min: i32,
		abi_max: i32,
		api_min: i32,
		api_max: i32,
	) -> Option<Plant> {

		let abi = VersionRange::new( abi_min, abi_max );
		let api = VersionRange::new( api_min, api_max );

		match self.try_negotiate( getter, abi, api ) {
			Ok( host_info ) => Some( host_info ),
			Err( error ) => {
				warn!( %error, abi_min = abi.min(), abi_max = abi.max(), api_min = api.min(), api_max = api.max(), "Negotiation failed" );
				None
			}
		}

	}

	/// Runs one bootstrap attempt.
	///
	/// On success the returned plant and the plant its `extension_info` leaf references
	/// are owned by the caller. On failure every plant created or adopted during the
	/// attempt has been freed and `getter` is `None`.
	pub fn try_negotiate(
		&self,
		getter: &mut Option<DefaultGetterFn>,
		abi: VersionRange,
		api: VersionRange,
	) -> Result<Plant, NegotiationError> {

		let result = self.run( getter, abi, api );
		if result.is_err() { *getter = None }
		result

	}

	fn run(
		&self,
		getter: &mut Option<DefaultGetterFn>,
		abi: VersionRange,
		api: VersionRange,
	) -> Result<Plant, NegotiationError> {

		ensure_known( Axis::Abi, self.abi_version, &self.abi_rule )?;
		ensure_known( Axis::Api, self.api_version, &self.api_rule )?;
		*getter = Some( default_getter );

		let ( host_info, extension_info ) = self.propose( abi, api )?;
		debug!( host_info = %host_info.id(), extension_info = %extension_info.id(), "Proposed negotiation plant" );

		let ( host_info, extension_info ) = self.review( host_info, extension_info )?;
		debug!( host_info = %host_info.id(), extension_info = %extension_info.id(), "Reviewed negotiation plant" );

		let host_abi = read_version( &host_info, keys::ABI_VERSION, self.abi_version )?;
		let host_api = read_version( &host_info, keys::API_VERSION, self.api_version )?;
		let abi_version = reconcile( Axis::Abi, host_abi, abi, &self.abi_rule )?;
		let api_version = reconcile( Axis::Api, host_api, api, &self.api_rule )?;
		debug!( abi_version, api_version, "Reconciled versions" );

		self.back_fill( &host_info, abi_version, api_version )?;
		prune( &host_info, abi_version, api_version )?;

		write_version( &host_info, keys::ABI_VERSION, abi_version )?;
		write_version( &host_info, keys::API_VERSION, api_version )?;
		write_version( &extension_info, keys::ABI_VERSION, abi_version )?;
		write_version( &extension_info, keys::API_VERSION, api_version )?;

		extension_info.release();
		Ok( host_info.release() )

	}

	fn propose( &self, abi: VersionRange, api: VersionRange ) -> Result<( OwnedPlant, OwnedPlant ), LeafError> {

		let host_info = self.store.plant_new_owned( plant_type::HOST_INFO )?;
		host_info.set_int_value( keys::ABI_VERSION, self.abi_version )?;
		host_info.set_int_value( keys::API_VERSION, self.api_version )?;
		for capability in &CAPABILITIES {
			if let Some( function ) = self.defaults.get( capability.key() ) {
				host_info.set_funcptr_value( capability.key(), *function )?;
			}
		}

		let extension_info = self.store.plant_new_owned( plant_type::EXTENSION_INFO )?;
		extension_info.set_int_value( keys::MIN_ABI_VERSION, abi.min() )?;
		extension_info.set_int_value( keys::MAX_ABI_VERSION, abi.max() )?;
		extension_info.set_int_value( keys::MIN_API_VERSION, api.min() )?;
		extension_info.set_int_value( keys::MAX_API_VERSION, api.max() )?;
		host_info.set_plant( keys::EXTENSION_INFO, &extension_info )?;

		Ok(( host_info, extension_info ))

	}

	fn review( &self, host_info: OwnedPlant, extension_info: OwnedPlant ) -> Result<( OwnedPlant, OwnedPlant ), NegotiationError> {

		let Some( review ) = &self.review else { return Ok(( host_info, extension_info )) };
		let reviewed = review( host_info.plant() ).ok_or( NegotiationError::Rejected )?;

		let host_info = match reviewed == *host_info {
			true => host_info,
			false => {
				debug!( proposed = %host_info.id(), substitute = %reviewed.id(), "Host substituted the negotiation plant" );
				drop( host_info );
				let substitute = OwnedPlant::new( reviewed );
				if substitute.plant_type()? != plant_type::HOST_INFO {
					return Err( NegotiationError::InvalidPlant( "substituted plant is not a host info plant" ));
				}
				substitute
			}
		};

		let extension_info = match host_info.leaf_seed_type( keys::EXTENSION_INFO ) {
			Err( LeafError::NoSuchLeaf ) => {
				host_info.set_plant( keys::EXTENSION_INFO, &extension_info )?;
				extension_info
			}
			Err( error ) => return Err( error.into() ),
			Ok( SeedType::PlantPtr ) => {
				let id = host_info.get_plantptr_value( keys::EXTENSION_INFO )?;
				match id == extension_info.id() {
					true => extension_info,
					false => {
						drop( extension_info );
						let adopted = host_info.store().plant( id )
							.ok_or( NegotiationError::InvalidPlant( "extension descriptor is not a live plant" ))?
							.pipe( OwnedPlant::new );
						if adopted.plant_type()? != plant_type::EXTENSION_INFO {
							return Err( NegotiationError::InvalidPlant( "extension descriptor has the wrong plant type" ));
						}
						adopted
					}
				}
			}
			Ok( _ ) => return Err( NegotiationError::InvalidPlant( "extension descriptor leaf is not a plant pointer" )),
		};

		Ok(( host_info, extension_info ))

	}

	/// Makes sure every capability supported at the negotiated versions is present,
	/// filling gaps from the defaults.
	fn back_fill( &self, host_info: &Plant, abi_version: i32, api_version: i32 ) -> Result<(), NegotiationError> {

		let memory = self.store.memory();
		for capability in CAPABILITIES.iter().filter(| capability | capability.is_supported_at( abi_version, api_version )) {

			let key = capability.key();
			match host_info.leaf_seed_type( key ) {
				Ok( SeedType::FuncPtr ) => {
					let expected = capability.default_for( memory ).signature();
					if host_info.get_funcptr_value( key )?.signature() != expected {
						return Err( NegotiationError::InvalidPlant( "capability has the wrong signature" ));
					}
					continue
				}
				Ok( _ ) => return Err( NegotiationError::InvalidPlant( "capability leaf is not a function pointer" )),
				Err( LeafError::NoSuchLeaf ) => {}
				Err( error ) => return Err( error.into() ),
			}

			let function = self.defaults.get( key ).ok_or( NegotiationError::MissingCapability( key ))?;
			host_info.set_funcptr_value( key, *function )?;
			debug!( capability = key, "Back-filled capability" );

		}

		Ok(())

	}

}

impl Bootstrap for Negotiator {
	fn bootstrap(
		&self,
		getter: &mut Option<DefaultGetterFn>,
		abi_min: i32,
		abi_max: i32,
		api_min: i32,
		api_max: i32,
	) -> Option<Plant> {
		self.negotiate( getter, abi_min, abi_max, api_min, api_max )
	}
}

fn ensure_known( axis: Axis, version: i32, rule: &CompatRule ) -> Result<(), NegotiationError> {
	match version > rule.current() {
		true => Err( NegotiationError::FutureVersion { axis, version, current: rule.current() }),
		false => Ok(()),
	}
}

fn read_version( host_info: &Plant, key: &str, fallback: i32 ) -> Result<i32, NegotiationError> {
	match host_info.get_int_value( key ) {
		Ok( version ) => Ok( version ),
		Err( LeafError::NoSuchLeaf ) => Ok( fallback ),
		Err( error ) => Err( error.into() ),
	}
}

/// Resolves one axis to the host's version, or fails.
fn reconcile( axis: Axis, host: i32, extension: VersionRange, rule: &CompatRule ) -> Result<i32, NegotiationError> {

	ensure_known( axis, host, rule )?;

	if extension.min() > host {
		return Err( NegotiationError::DisjointRanges { axis, host, min: extension.min(), max: extension.max() });
	}
	if host > extension.max() && !rule.is_compatible( host, extension.max() ) {
		return Err( NegotiationError::IncompatibleVersions { axis, host, max: extension.max() });
	}

	Ok( host )

}

/// Deletes every capability newer than the negotiated versions. Undeletable leaves are left in place.
fn prune( host_info: &Plant, abi_version: i32, api_version: i32 ) -> Result<(), LeafError> {

	let mut pruned = Vec::new();
	for capability in CAPABILITIES.iter().filter(| capability | !capability.is_supported_at( abi_version, api_version )) {
		match host_info.leaf_delete( capability.key() ) {
			Ok(()) => pruned.push( capability.key() ),
			Err( LeafError::NoSuchLeaf ) => {}
			Err( LeafError::Undeletable ) => debug!( capability = capability.key(), "Capability is undeletable, left in place" ),
			Err( error ) => return Err( error ),
		}
	}

	debug!( ?pruned, "Pruned capabilities" );
	Ok(())

}

fn write_version( plant: &Plant, key: &str, version: i32 ) -> Result<(), LeafError> {
	match plant.get_int_value( key ) {
		Ok( current ) if current == version => Ok(()),
		_ => plant.set_int_value( key, version ),
	}
}
