use std::ffi::c_void ;
use plant_link::{ FuncPtr, LeafError, Plant, SeedType, Store, VoidPtr };

#[test]
fn scalar_round_trips() {

	let store = Store::new();
	let plant = store.plant_new( 3 ).expect( "Failed to create plant" );

	plant.set_int_value( "int", -7 ).unwrap();
	plant.set_uint_value( "uint", 7 ).unwrap();
	plant.set_int64_value( "int64", i64::MIN ).unwrap();
	plant.set_uint64_value( "uint64", u64::MAX ).unwrap();
	plant.set_boolean_value( "boolean", true ).unwrap();
	plant.set_float_value( "float", 0.5 ).unwrap();
	plant.set_double_value( "double", -2.25 ).unwrap();

	assert_eq!( plant.get_int_value( "int" ), Ok( -7 ));
	assert_eq!( plant.get_uint_value( "uint" ), Ok( 7 ));
	assert_eq!( plant.get_int64_value( "int64" ), Ok( i64::MIN ));
	assert_eq!( plant.get_uint64_value( "uint64" ), Ok( u64::MAX ));
	assert_eq!( plant.get_boolean_value( "boolean" ), Ok( true ));
	assert_eq!( plant.get_float_value( "float" ), Ok( 0.5 ));
	assert_eq!( plant.get_double_value( "double" ), Ok( -2.25 ));

}

#[test]
fn pointer_round_trips() {

	let store = Store::new();
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	let other = store.plant_new( 9 ).expect( "Failed to create plant" );

	let mut target = 5_u8 ;
	let data = VoidPtr(( &mut target as *mut u8 ).cast::<c_void>() );
	plant.set_voidptr_value( "data", data ).unwrap();
	let getter = FuncPtr::LeafGet( Plant::leaf_get );
	plant.set_funcptr_value( "getter", getter ).unwrap();
	plant.set_plant( "other", &other ).unwrap();

	assert_eq!( plant.get_voidptr_value( "data" ), Ok( data ));
	assert_eq!( plant.get_funcptr_value( "getter" ), Ok( getter ));
	assert_eq!( plant.get_funcptr_value( "getter" ).map(| f | f.signature() ), Ok( "LeafGet" ));
	assert_eq!( plant.get_plant( "other" ), Ok( other.clone() ));
	assert_eq!( plant.get_plant( "other" ).and_then(| plant | plant.plant_type() ), Ok( 9 ));

	other.free().unwrap();
	assert_eq!( plant.get_plant( "other" ), Err( LeafError::NoSuchPlant ));
	assert_eq!( plant.leaf_seed_type( "data" ), Ok( SeedType::VoidPtr ));

}

#[test]
fn getters_check_seed_type_before_reading() {

	let store = Store::new();
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	plant.set_int_value( "count", 4 ).unwrap();

	assert_eq!( plant.get_double_value( "count" ), Err( LeafError::WrongSeedType ));
	assert_eq!( plant.get_uint_value( "count" ), Err( LeafError::WrongSeedType ));
	assert_eq!( plant.get_string_value( "count" ).unwrap_err(), LeafError::WrongSeedType );
	assert_eq!( plant.get_int_value( "missing" ), Err( LeafError::NoSuchLeaf ));

}

#[test]
fn setting_an_existing_leaf_keeps_its_seed_type() {

	let store = Store::new();
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	plant.set_int_value( "count", 4 ).unwrap();

	assert_eq!( plant.set_double_value( "count", 4.0 ), Err( LeafError::WrongSeedType ));
	assert_eq!( plant.get_int_value( "count" ), Ok( 4 ));

}

#[test]
fn empty_leaf_has_no_first_element() {

	let store = Store::new();
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	plant.set_int_array( "empty", []).unwrap();

	assert_eq!( plant.leaf_num_elements( "empty" ), Ok( 0 ));
	assert_eq!( plant.get_int_value( "empty" ), Err( LeafError::NoSuchElement ));
	assert_eq!( plant.leaf_get( "empty", 3 ).unwrap_err(), LeafError::NoSuchElement );

}

#[test]
fn freed_plant_rejects_every_accessor() {

	let store = Store::new();
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	plant.set_int_value( "count", 4 ).unwrap();
	plant.free().unwrap();

	assert_eq!( plant.get_int_value( "count" ), Err( LeafError::NoSuchPlant ));
	assert_eq!( plant.set_int_value( "count", 5 ), Err( LeafError::NoSuchPlant ));
	assert_eq!( plant.plant_type(), Err( LeafError::NoSuchPlant ));
	assert!( !plant.is_alive() );

}

#[test]
fn type_can_only_be_changed_through_mutate_type() {

	let store = Store::new();
	let plant = store.plant_new( 1 ).expect( "Failed to create plant" );

	assert_eq!( plant.set_int_value( plant_link::keys::TYPE, 2 ), Err( LeafError::Immutable ));
	plant.mutate_type( 2 ).unwrap();
	assert_eq!( plant.plant_type(), Ok( 2 ));
	assert_eq!( plant.set_int_value( plant_link::keys::TYPE, 3 ), Err( LeafError::Immutable ));

}
