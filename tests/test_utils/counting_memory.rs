use std::cell::Cell ;
use std::ffi::c_void ;

thread_local! {
	static LIVE_ALLOCATIONS: Cell<isize> = const { Cell::new( 0 ) };
	static ALLOCATIONS_BEFORE_FAILURE: Cell<Option<usize>> = const { Cell::new( None ) };
}

fn allocation_permitted() -> bool {
	ALLOCATIONS_BEFORE_FAILURE.with(| budget | match budget.get() {
		Some( 0 ) => false,
		Some( remaining ) => { budget.set( Some( remaining - 1 )); true }
		None => true,
	})
}

fn track( ptr: *mut c_void ) -> *mut c_void {
	if !ptr.is_null() { LIVE_ALLOCATIONS.with(| live | live.set( live.get() + 1 )) }
	ptr
}

unsafe extern "C" fn counting_malloc( size: usize ) -> *mut c_void {
	match allocation_permitted() {
		true => track( libc::malloc( size )),
		false => std::ptr::null_mut(),
	}
}

unsafe extern "C" fn counting_calloc( count: usize, size: usize ) -> *mut c_void {
	match allocation_permitted() {
		true => track( libc::calloc( count, size )),
		false => std::ptr::null_mut(),
	}
}

unsafe extern "C" fn counting_free( ptr: *mut c_void ) {
	if !ptr.is_null() { LIVE_ALLOCATIONS.with(| live | live.set( live.get() - 1 )) }
	libc::free( ptr );
}

/// The C library memory functions, with every allocation and release on this thread counted.
#[allow( dead_code )]
pub fn counting_memory() -> plant_link::MemoryFunctions {
	plant_link::MemoryFunctions::default()
		.with_malloc( counting_malloc )
		.with_calloc( counting_calloc )
		.with_free( counting_free )
}

/// Allocations made through [`counting_memory`] on this thread and not yet released.
#[allow( dead_code )]
pub fn live_allocations() -> isize { LIVE_ALLOCATIONS.with( Cell::get ) }

/// Lets `count` more allocations succeed on this thread, then fails every one after.
/// `None` lifts the restriction.
#[allow( dead_code )]
pub fn fail_allocations_after( count: Option<usize> ) {
	ALLOCATIONS_BEFORE_FAILURE.with(| budget | budget.set( count ));
}
