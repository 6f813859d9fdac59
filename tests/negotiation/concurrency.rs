use std::thread ;
use plant_link::{ keys, Negotiator, Store };

use crate::free_negotiated ;

#[test]
fn extensions_bootstrap_concurrently() {

	let store = Store::new();
	let negotiator = Negotiator::new( store.clone() )
		.with_abi_version( 180 )
		.with_review(| proposed | {
			proposed.set_int_value( "reviewed", 1 ).ok()?;
			Some( proposed.clone() )
		});

	thread::scope(| scope | {
		let workers: Vec<_> = ( 0..8 ).map(| n | {
			let negotiator = &negotiator ;
			scope.spawn( move || {
				let min = 100 + n * 10 ;
				let mut getter = None ;
				let host_info = negotiator.negotiate( &mut getter, min, 180, 100, 200 ).expect( "Negotiation failed" );
				assert!( getter.is_some() );
				assert_eq!( host_info.get_int_value( keys::ABI_VERSION ), Ok( 180 ));
				assert_eq!( host_info.get_int_value( "reviewed" ), Ok( 1 ));
				let descriptor = host_info.get_plant( keys::EXTENSION_INFO ).expect( "Descriptor not linked" );
				assert_eq!( descriptor.get_int_value( keys::MIN_ABI_VERSION ), Ok( min ));
				free_negotiated( host_info );
			})
		}).collect();
		for worker in workers { worker.join().expect( "Worker panicked" ); }
	});

	assert_eq!( store.plant_count(), 0 );

}
