use plant_link::{ keys, plant_type, Axis, CompatRule, FloorBound, NegotiationError, Negotiator, Store, VersionRange };

use crate::{ free_negotiated, init_tracing };

#[test]
fn overlapping_ranges_settle_on_host_version() {

	init_tracing();
	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() ).with_abi_version( 145 );

	let mut getter = None ;
	let host_info = negotiator.negotiate( &mut getter, 100, 150, 100, 200 ).expect( "Negotiation failed" );
	let getter = getter.expect( "Getter not handed over" );

	assert_eq!( host_info.plant_type(), Ok( plant_type::HOST_INFO ));
	assert_eq!( host_info.get_int_value( keys::ABI_VERSION ), Ok( 145 ));
	assert_eq!( host_info.get_int_value( keys::API_VERSION ), Ok( 200 ));
	assert!( matches!( getter( &host_info, keys::ABI_VERSION ), Ok( plant_link::Value::Int( 145 ))));

	let descriptor = host_info.get_plant( keys::EXTENSION_INFO ).expect( "Descriptor not linked" );
	assert_eq!( descriptor.plant_type(), Ok( plant_type::EXTENSION_INFO ));
	assert_eq!( descriptor.get_int_value( keys::MIN_ABI_VERSION ), Ok( 100 ));
	assert_eq!( descriptor.get_int_value( keys::MAX_ABI_VERSION ), Ok( 150 ));
	assert_eq!( descriptor.get_int_value( keys::ABI_VERSION ), Ok( 145 ));
	assert_eq!( descriptor.get_int_value( keys::API_VERSION ), Ok( 200 ));

	free_negotiated( host_info );
	assert_eq!( store.plant_count(), 0 );

}

#[test]
fn backwards_bounds_are_swapped() {

	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() ).with_abi_version( 145 );

	let host_info = negotiator.negotiate( &mut None, 150, 100, 200, 100 ).expect( "Negotiation failed" );
	let descriptor = host_info.get_plant( keys::EXTENSION_INFO ).unwrap();
	assert_eq!( descriptor.get_int_value( keys::MIN_ABI_VERSION ), Ok( 100 ));
	assert_eq!( descriptor.get_int_value( keys::MAX_API_VERSION ), Ok( 200 ));

	free_negotiated( host_info );

}

#[test]
fn host_above_extension_maximum_consults_rule() {

	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() )
		.with_abi_version( 180 )
		.with_abi_rule( CompatRule::abi().without_breaking_change() );

	let host_info = negotiator.try_negotiate( &mut None, VersionRange::new( 100, 150 ), VersionRange::new( 100, 200 ))
		.expect( "Compatible pairing was rejected" );
	assert_eq!( host_info.get_int_value( keys::ABI_VERSION ), Ok( 180 ));
	free_negotiated( host_info );

}

#[test]
fn breaking_boundary_rejects_regardless_of_distance() {

	init_tracing();
	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() )
		.with_abi_version( 210 )
		.with_abi_rule( CompatRule::abi().with_current( 300 ));

	let mut getter = None ;
	let result = negotiator.try_negotiate( &mut getter, VersionRange::new( 100, 190 ), VersionRange::new( 100, 200 ));
	assert_eq!( result.unwrap_err(), NegotiationError::IncompatibleVersions { axis: Axis::Abi, host: 210, max: 190 });
	assert!( getter.is_none() );
	assert_eq!( store.plant_count(), 0 );

}

#[test]
fn disjoint_ranges_fail() {

	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() ).with_abi_version( 100 );

	let result = negotiator.try_negotiate( &mut None, VersionRange::new( 300, 310 ), VersionRange::new( 100, 200 ));
	assert_eq!( result.unwrap_err(), NegotiationError::DisjointRanges { axis: Axis::Abi, host: 100, min: 300, max: 310 });
	assert_eq!( store.plant_count(), 0 );

}

#[test]
fn versions_below_floor_are_incompatible() {

	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() );

	let mut getter = None ;
	assert!( negotiator.negotiate( &mut getter, 100, 200, 50, 90 ).is_none() );
	assert!( getter.is_none() );
	assert_eq!( store.plant_count(), 0 );

}

#[test]
fn floor_on_higher_version_serves_ancient_extensions() {

	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() )
		.with_api_rule( CompatRule::api().with_floor_bound( FloorBound::Higher ));

	let mut getter = None ;
	let host_info = negotiator.negotiate( &mut getter, 100, 200, 50, 90 ).expect( "Negotiation failed" );
	assert_eq!( host_info.get_int_value( keys::API_VERSION ), Ok( 200 ));
	free_negotiated( host_info );
	assert_eq!( store.plant_count(), 0 );

}

#[test]
fn future_host_version_fails_before_proposing() {

	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() ).with_api_version( 250 );

	let mut getter = None ;
	let result = negotiator.try_negotiate( &mut getter, VersionRange::new( 100, 300 ), VersionRange::new( 100, 300 ));
	assert_eq!( result.unwrap_err(), NegotiationError::FutureVersion { axis: Axis::Api, version: 250, current: 200 });
	assert!( getter.is_none() );
	assert_eq!( store.leaf_count(), 0 );

}

#[test]
fn default_rules() {

	let abi = CompatRule::abi();
	assert!( abi.is_compatible( 150, 100 ));
	assert!( !abi.is_compatible( 200, 199 ));
	assert!( !abi.is_compatible( 201, 200 ));
	assert!( abi.is_compatible( 200, 200 ));

	let api = CompatRule::api();
	assert!( api.is_compatible( 200, 100 ));
	assert!( !api.is_compatible( 200, 99 ));

}
