use std::sync::Arc ;
use plant_link::{ leaf_elements_equate, plants_equate, FuncPtr, LeafError, Opaque, Plant, SeedType, Store };

use crate::counting_memory ;

#[test]
fn equality_by_seed_type() {

	let store = Store::with_memory( counting_memory() );
	let a = store.plant_new( 0 ).expect( "Failed to create plant" );
	let b = store.plant_new( 0 ).expect( "Failed to create plant" );
	let getter = FuncPtr::LeafGet( Plant::leaf_get );
	let payload: Opaque = Arc::new( 1_u8 );

	a.set_int_array( "ints", [ 1, 2, 3 ]).unwrap();
	b.set_int_array( "ints", [ 1, 2, 3 ]).unwrap();
	a.set_double_value( "double", 0.1 ).unwrap();
	b.set_double_value( "double", 0.1 ).unwrap();
	a.set_string_array( "strings", [ "x", "yy" ]).unwrap();
	b.set_string_array( "strings", [ "x", "yy" ]).unwrap();
	a.set_funcptr_value( "func", getter ).unwrap();
	b.set_funcptr_value( "func", getter ).unwrap();
	a.set_custom_value( "custom", SeedType::Custom( 1024 ), payload.clone() ).unwrap();
	b.set_custom_value( "custom", SeedType::Custom( 1024 ), payload ).unwrap();

	for key in [ "ints", "double", "strings", "func", "custom" ] {
		assert_eq!( leaf_elements_equate( &a, key, &b, key, None ), Ok( true ), "{} should be equal", key );
	}
	assert_eq!( plants_equate( &a, &b ), Ok( true ));

}

#[test]
fn inequality_sweep() {

	let store = Store::new();
	let a = store.plant_new( 0 ).expect( "Failed to create plant" );
	let b = store.plant_new( 0 ).expect( "Failed to create plant" );

	a.set_int_array( "values", [ 1, 2, 3 ]).unwrap();
	b.set_int_array( "values", [ 1, 9, 3 ]).unwrap();
	a.set_int_array( "short", [ 1, 2 ]).unwrap();
	b.set_int_array( "short", [ 1, 2, 3 ]).unwrap();
	a.set_string_value( "name", "abc" ).unwrap();
	b.set_string_value( "name", "abcd" ).unwrap();
	a.set_uint_value( "kind", 1 ).unwrap();
	b.set_int_value( "kind", 1 ).unwrap();
	a.set_custom_value( "custom", SeedType::Custom( 1024 ), Arc::new( 1_u8 )).unwrap();
	b.set_custom_value( "custom", SeedType::Custom( 1024 ), Arc::new( 1_u8 )).unwrap();

	// Differing middle element, but the outer ones still match individually.
	assert_eq!( leaf_elements_equate( &a, "values", &b, "values", None ), Ok( false ));
	assert_eq!( leaf_elements_equate( &a, "values", &b, "values", Some( 0 )), Ok( true ));
	assert_eq!( leaf_elements_equate( &a, "values", &b, "values", Some( 1 )), Ok( false ));
	assert_eq!( leaf_elements_equate( &a, "values", &b, "values", Some( 2 )), Ok( true ));

	assert_eq!( leaf_elements_equate( &a, "short", &b, "short", None ), Ok( false ));
	assert_eq!( leaf_elements_equate( &a, "short", &b, "short", Some( 1 )), Ok( true ));
	assert_eq!( leaf_elements_equate( &a, "short", &b, "short", Some( 2 )), Ok( false ));
	assert_eq!( leaf_elements_equate( &a, "name", &b, "name", None ), Ok( false ));
	assert_eq!( leaf_elements_equate( &a, "kind", &b, "kind", None ), Ok( false ));
	assert_eq!( leaf_elements_equate( &a, "custom", &b, "custom", None ), Ok( false ));

	assert_eq!( leaf_elements_equate( &a, "missing", &b, "values", None ), Err( LeafError::NoSuchLeaf ));
	assert_eq!( plants_equate( &a, &b ), Ok( false ));

}

#[test]
fn plants_equate_ignores_extra_destination_leaves() {

	let store = Store::new();
	let dst = store.plant_new( 0 ).expect( "Failed to create plant" );
	let src = store.plant_new( 0 ).expect( "Failed to create plant" );
	src.set_boolean_value( "enabled", true ).unwrap();
	dst.set_boolean_value( "enabled", true ).unwrap();
	dst.set_boolean_value( "extra", false ).unwrap();

	assert_eq!( plants_equate( &dst, &src ), Ok( true ));
	assert_eq!( plants_equate( &src, &dst ), Ok( false ));

}
