use std::sync::Arc ;
use plant_link::{
	leaf_copy, leaf_copy_nth, plant_copy, plant_duplicate, plants_equate,
	DuplicateMode, LeafError, LeafFlags, Opaque, SeedType, Store,
};

use crate::init_tracing ;

#[test]
fn leaf_copy_detaches_strings_and_aliases_pointers() {

	let store = Store::new();
	let src = store.plant_new( 0 ).expect( "Failed to create plant" );
	let dst = store.plant_new( 0 ).expect( "Failed to create plant" );
	let seed = SeedType::Custom( 1500 );
	let payload: Opaque = Arc::new( "shared" );

	src.set_string_array( "names", [ "left", "right" ]).unwrap();
	src.set_custom_value( "payload", seed, payload.clone() ).unwrap();
	leaf_copy( &dst, "names", &src, "names" ).unwrap();
	leaf_copy( &dst, "payload", &src, "payload" ).unwrap();

	src.set_string_array( "names", [ "changed" ]).unwrap();
	let names = dst.get_string_array( "names" ).unwrap();
	assert_eq!( names.len(), 2 );
	assert_eq!( names[ 1 ], "right" );
	assert!( Arc::ptr_eq( &dst.get_custom_value( "payload", seed ).unwrap(), &payload ));

}

#[test]
fn leaf_copy_nth_replaces_one_element() {

	let store = Store::new();
	let src = store.plant_new( 0 ).expect( "Failed to create plant" );
	let dst = store.plant_new( 0 ).expect( "Failed to create plant" );
	src.set_int_array( "values", [ 10, 20, 30 ]).unwrap();
	dst.set_int_array( "values", [ 1, 2, 3 ]).unwrap();
	dst.set_double_array( "doubles", [ 1.0, 2.0, 3.0 ]).unwrap();

	leaf_copy_nth( &dst, "values", &src, "values", 1 ).unwrap();
	assert_eq!( dst.get_int_array( "values" ).unwrap(), [ 1, 20, 3 ]);

	assert_eq!( leaf_copy_nth( &dst, "values", &src, "values", 3 ), Err( LeafError::NoSuchElement ));
	assert_eq!( leaf_copy_nth( &dst, "doubles", &src, "values", 0 ), Err( LeafError::WrongSeedType ));
	assert_eq!( leaf_copy_nth( &dst, "missing", &src, "values", 0 ), Err( LeafError::NoSuchLeaf ));

}

#[test]
fn duplicate_requires_matching_plant_types() {

	let store = Store::new();
	let src = store.plant_new( 1 ).expect( "Failed to create plant" );
	let dst = store.plant_new( 2 ).expect( "Failed to create plant" );

	assert_eq!( plant_duplicate( &dst, &src, DuplicateMode::Merge ).unwrap_err(), LeafError::WrongPlantType );

}

#[test]
fn replace_clears_destination_except_undeletable_leaves() {

	init_tracing();
	let store = Store::new();
	let src = store.plant_new( 4 ).expect( "Failed to create plant" );
	let dst = store.plant_new( 4 ).expect( "Failed to create plant" );

	let target = store.plant_new( 9 ).expect( "Failed to create plant" );
	src.set_int_value( "width", 640 ).unwrap();
	src.set_string_array( "labels", [ "near", "far", "" ]).unwrap();
	src.set_int_array( "levels", [ 3, 1, 4, 1 ]).unwrap();
	src.set_plant( "target", &target ).unwrap();
	src.set_int_value( "pinned", 7 ).unwrap();
	dst.set_int_value( "stale", 1 ).unwrap();
	dst.set_int_value( "pinned", 2 ).unwrap();
	dst.leaf_add_flags( "pinned", LeafFlags::UNDELETABLE ).unwrap();
	dst.set_int_value( "guard", 5 ).unwrap();
	dst.leaf_add_flags( "guard", LeafFlags::UNDELETABLE ).unwrap();

	let ( (), skipped ) = plant_duplicate( &dst, &src, DuplicateMode::Replace ).unwrap();
	assert!( skipped.is_empty() );
	assert!( !dst.has_leaf( "stale" ));
	assert_eq!( dst.get_int_value( "guard" ), Ok( 5 ));
	assert_eq!( dst.get_int_value( "pinned" ), Ok( 7 ));
	assert!( dst.leaf_get_flags( "pinned" ).unwrap().contains( LeafFlags::UNDELETABLE ));
	assert_eq!( plants_equate( &dst, &src ), Ok( true ));

}

#[test]
fn merge_skips_immutable_and_mistyped_leaves() {

	init_tracing();
	let store = Store::new();
	let src = store.plant_new( 4 ).expect( "Failed to create plant" );
	let dst = store.plant_new( 4 ).expect( "Failed to create plant" );

	src.set_int_value( "width", 640 ).unwrap();
	src.set_int_value( "height", 480 ).unwrap();
	src.set_int_value( "depth", 8 ).unwrap();
	dst.set_int_value( "kept", 1 ).unwrap();
	dst.set_int_value( "height", 0 ).unwrap();
	dst.leaf_add_flags( "height", LeafFlags::IMMUTABLE ).unwrap();
	dst.set_double_value( "depth", 8.0 ).unwrap();

	let ( (), skipped ) = plant_duplicate( &dst, &src, DuplicateMode::Merge ).unwrap();
	assert_eq!( skipped, [
		( "height".to_string(), LeafError::Immutable ),
		( "depth".to_string(), LeafError::WrongSeedType ),
	]);
	assert_eq!( dst.get_int_value( "kept" ), Ok( 1 ));
	assert_eq!( dst.get_int_value( "width" ), Ok( 640 ));
	assert_eq!( dst.get_int_value( "height" ), Ok( 0 ));

}

#[test]
fn plant_copy_carries_protection_flags() {

	let store = Store::new();
	let src = store.plant_new( 6 ).expect( "Failed to create plant" );
	src.set_string_value( "name", "copy me" ).unwrap();
	src.set_int_value( "locked", 1 ).unwrap();
	src.leaf_add_flags( "locked", LeafFlags::IMMUTABLE | LeafFlags::UNDELETABLE ).unwrap();

	let copy = plant_copy( &src ).unwrap();
	assert_ne!( copy.id(), src.id() );
	assert_eq!( copy.plant_type(), Ok( 6 ));
	assert_eq!( copy.leaf_get_flags( "locked" ), Ok( LeafFlags::IMMUTABLE | LeafFlags::UNDELETABLE ));
	assert_eq!( copy.leaf_get_flags( "name" ), Ok( LeafFlags::empty() ));
	assert_eq!( plants_equate( &copy, &src ), Ok( true ));

}

#[test]
fn failed_plant_copy_frees_the_partial_copy() {

	let store = Store::new();
	let src = store.plant_new( 6 ).expect( "Failed to create plant" );
	src.set_int_value( "a", 1 ).unwrap();
	src.set_int_value( "b", 2 ).unwrap();

	let plants = store.plant_count();
	let leaves = store.leaf_count();
	store.set_limits( plant_link::StoreLimits::new().with_max_leaves( leaves + 2 ));

	assert_eq!( plant_copy( &src ).unwrap_err(), LeafError::MemoryAllocation );
	assert_eq!( store.plant_count(), plants );
	assert_eq!( store.leaf_count(), leaves );

}
