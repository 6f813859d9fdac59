use plant_link::{ keys, LeafError, NegotiationError, Negotiator, Store, StoreLimits, VersionRange };

use crate::{ free_negotiated, init_tracing };

/// Fails the negotiation at every leaf allocation in turn and checks nothing outlives the failure.
#[test]
fn every_leaf_failure_point_unwinds() {

	init_tracing();
	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() );
	let ( abi, api ) = ( VersionRange::new( 100, 200 ), VersionRange::new( 100, 200 ));

	let mut failures = 0 ;
	let host_info = loop {
		store.set_limits( StoreLimits::new().with_max_leaves( failures ));
		let mut getter = None ;
		match negotiator.try_negotiate( &mut getter, abi, api ) {
			Ok( host_info ) => break host_info,
			Err( error ) => {
				assert_eq!( error, NegotiationError::Leaf( LeafError::MemoryAllocation ), "at {} leaves", failures );
				assert_eq!( store.plant_count(), 0, "plants leaked at {} leaves", failures );
				assert_eq!( store.leaf_count(), 0, "leaves leaked at {} leaves", failures );
				assert!( getter.is_none() );
			}
		}
		failures += 1 ;
		assert!( failures < 100, "negotiation never succeeded" );
	};

	assert!( failures > 20 );
	assert_eq!( store.leaf_count(), failures );
	store.set_limits( StoreLimits::new() );
	free_negotiated( host_info );
	assert_eq!( store.plant_count(), 0 );

}

#[test]
fn every_plant_failure_point_unwinds() {

	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() ).with_review(| proposed | {
		let descriptor = proposed.store().plant_new( plant_link::plant_type::EXTENSION_INFO ).ok()?;
		proposed.set_plant( keys::EXTENSION_INFO, &descriptor ).ok()?;
		Some( proposed.clone() )
	});
	let ( abi, api ) = ( VersionRange::new( 100, 200 ), VersionRange::new( 100, 200 ));

	for max_plants in 0..3 {
		store.set_limits( StoreLimits::new().with_max_plants( max_plants ));
		assert!( negotiator.try_negotiate( &mut None, abi, api ).is_err(), "succeeded with {} plants", max_plants );
		assert_eq!( store.plant_count(), 0, "plants leaked at {} plants", max_plants );
	}

	store.set_limits( StoreLimits::new().with_max_plants( 3 ));
	let host_info = negotiator.try_negotiate( &mut None, abi, api ).expect( "Negotiation failed" );
	assert_eq!( store.plant_count(), 2 );
	free_negotiated( host_info );

}
