use plant_link::{ LeafError, Store };

use crate::{ counting_memory, fail_allocations_after, live_allocations };

#[test]
fn arrays_of_every_length() {

	let store = Store::with_memory( counting_memory() );
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	let baseline = live_allocations();

	plant.set_double_array( "none", []).unwrap();
	plant.set_double_array( "one", [ 1.5 ]).unwrap();
	plant.set_double_array( "many", [ 1.0, 2.0, 3.0, 4.0 ]).unwrap();

	{
		let none = plant.get_double_array( "none" ).unwrap();
		let one = plant.get_double_array( "one" ).unwrap();
		let many = plant.get_double_array( "many" ).unwrap();
		assert!( none.is_empty() );
		assert_eq!( one, [ 1.5 ]);
		assert_eq!( many, [ 1.0, 2.0, 3.0, 4.0 ]);
		assert_eq!( live_allocations(), baseline + 2 );
	}

	assert_eq!( live_allocations(), baseline );

}

#[test]
fn counted_getters_report_length_or_nothing() {

	let store = Store::new();
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	plant.set_uint64_array( "ids", [ 10, 20, 30 ]).unwrap();

	let ( ids, count ) = plant.get_uint64_array_counted( "ids" );
	assert_eq!( count, 3 );
	assert_eq!( ids.expect( "Expected an array" ), [ 10, 20, 30 ]);

	let ( missing, count ) = plant.get_uint64_array_counted( "missing" );
	assert!( missing.is_none() );
	assert_eq!( count, 0 );

	let ( wrong, count ) = plant.get_int_array_counted( "ids" );
	assert!( wrong.is_none() );
	assert_eq!( count, 0 );

}

#[test]
fn failed_allocation_leaves_nothing_behind() {

	let store = Store::with_memory( counting_memory() );
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	plant.set_int_array( "sizes", [ 1, 2, 3 ]).unwrap();
	let baseline = live_allocations();

	fail_allocations_after( Some( 0 ));
	let result = plant.get_int_array( "sizes" );
	fail_allocations_after( None );

	assert_eq!( result.unwrap_err(), LeafError::MemoryAllocation );
	assert_eq!( live_allocations(), baseline );

}

#[test]
fn scalar_reads_do_not_allocate() {

	let store = Store::with_memory( counting_memory() );
	let plant = store.plant_new( 0 ).expect( "Failed to create plant" );
	plant.set_int_array( "sizes", [ 1, 2, 3 ]).unwrap();

	fail_allocations_after( Some( 0 ));
	let first = plant.get_int_value( "sizes" );
	fail_allocations_after( None );

	assert_eq!( first, Ok( 1 ));

}
