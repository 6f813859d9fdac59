//! Installable memory functions and the buffers allocated through them.
//!
//! Every buffer the accessor layer hands out is allocated and released with the
//! [`MemoryFunctions`] captured by the [`Store`]( crate::Store ) it came from. A plant
//! crossing the host/extension boundary is therefore always released by the allocator
//! that created it, whatever allocator the other side was built with.

use std::ffi::{ c_int, c_void };
use std::fmt ;
use std::mem ;
use std::ops::Deref ;
use std::ptr::{ self, NonNull };
use std::str::Utf8Error ;

use crate::LeafError ;



pub type MallocFn = unsafe extern "C" fn( usize ) -> *mut c_void ;
pub type CallocFn = unsafe extern "C" fn( usize, usize ) -> *mut c_void ;
pub type ReallocFn = unsafe extern "C" fn( *mut c_void, usize ) -> *mut c_void ;
pub type FreeFn = unsafe extern "C" fn( *mut c_void );
pub type MemcpyFn = unsafe extern "C" fn( *mut c_void, *const c_void, usize ) -> *mut c_void ;
pub type MemmoveFn = unsafe extern "C" fn( *mut c_void, *const c_void, usize ) -> *mut c_void ;
pub type MemsetFn = unsafe extern "C" fn( *mut c_void, c_int, usize ) -> *mut c_void ;
pub type MemcmpFn = unsafe extern "C" fn( *const c_void, *const c_void, usize ) -> c_int ;

/// The set of allocation, copy and compare functions used for every buffer handed
/// out by the accessor layer.
///
/// Defaults to the C library. Any slot can be replaced before the set is handed to
/// [`Store::with_memory`]( crate::Store::with_memory ); after that it is read-only.
///
/// Replacement functions must behave like their C library namesakes. In particular
/// `malloc` and `calloc` must return memory aligned for any fundamental type.
#[derive( Clone, Copy )]
pub struct MemoryFunctions {
	malloc: MallocFn,
	calloc: CallocFn,
	realloc: ReallocFn,
	free: FreeFn,
	memcpy: MemcpyFn,
	memmove: MemmoveFn,
	memset: MemsetFn,
	memcmp: MemcmpFn,
}

impl Default for MemoryFunctions {
	fn default() -> Self {
		Self {
			malloc: libc::malloc,
			calloc: libc::calloc,
			realloc: libc::realloc,
			free: libc::free,
			memcpy: libc::memcpy,
			memmove: libc::memmove,
			memset: libc::memset,
			memcmp: libc::memcmp,
		}
	}
}

impl fmt::Debug for MemoryFunctions {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		f.debug_struct( "MemoryFunctions" )
			.field( "malloc", &( self.malloc as usize as *const () ))
			.field( "calloc", &( self.calloc as usize as *const () ))
			.field( "realloc", &( self.realloc as usize as *const () ))
			.field( "free", &( self.free as usize as *const () ))
			.field( "memcpy", &( self.memcpy as usize as *const () ))
			.field( "memmove", &( self.memmove as usize as *const () ))
			.field( "memset", &( self.memset as usize as *const () ))
			.field( "memcmp", &( self.memcmp as usize as *const () ))
			.finish()
	}
}

impl MemoryFunctions {

	pub fn with_malloc( mut self, malloc: MallocFn ) -> Self { self.malloc = malloc ; self }
	pub fn with_calloc( mut self, calloc: CallocFn ) -> Self { self.calloc = calloc ; self }
	pub fn with_realloc( mut self, realloc: ReallocFn ) -> Self { self.realloc = realloc ; self }
	pub fn with_free( mut self, free: FreeFn ) -> Self { self.free = free ; self }
	pub fn with_memcpy( mut self, memcpy: MemcpyFn ) -> Self { self.memcpy = memcpy ; self }
	pub fn with_memmove( mut self, memmove: MemmoveFn ) -> Self { self.memmove = memmove ; self }
	pub fn with_memset( mut self, memset: MemsetFn ) -> Self { self.memset = memset ; self }
	pub fn with_memcmp( mut self, memcmp: MemcmpFn ) -> Self { self.memcmp = memcmp ; self }

	#[inline] pub fn malloc( &self ) -> MallocFn { self.malloc }
	#[inline] pub fn calloc( &self ) -> CallocFn { self.calloc }
	#[inline] pub fn realloc( &self ) -> ReallocFn { self.realloc }
	#[inline] pub fn free( &self ) -> FreeFn { self.free }
	#[inline] pub fn memcpy( &self ) -> MemcpyFn { self.memcpy }
	#[inline] pub fn memmove( &self ) -> MemmoveFn { self.memmove }
	#[inline] pub fn memset( &self ) -> MemsetFn { self.memset }
	#[inline] pub fn memcmp( &self ) -> MemcmpFn { self.memcmp }

	/// Compares two byte spans with the installed `memcmp`.
	pub fn bytes_equal( &self, a: &[u8], b: &[u8] ) -> bool {
		if a.len() != b.len() { return false }
		if a.is_empty() { return true }
		// SAFETY: both spans are valid for `a.len()` bytes.
		unsafe { ( self.memcmp )( a.as_ptr().cast(), b.as_ptr().cast(), a.len() ) == 0 }
	}

}

/// A contiguous buffer of `T` allocated through [`MemoryFunctions`].
///
/// Only the first `len` slots are initialized; dropping the array drops those and
/// releases the buffer with the `free` it was allocated alongside. A partially filled
/// array that is dropped on an error path therefore releases everything it holds.
pub struct Array<T> {
	ptr: NonNull<T>,
	len: usize,
	capacity: usize,
	free: FreeFn,
}

// SAFETY: `Array<T>` uniquely owns its elements, like `Vec<T>`.
unsafe impl<T: Send> Send for Array<T> {}
// SAFETY: shared access only hands out `&[T]`.
unsafe impl<T: Sync> Sync for Array<T> {}

impl<T> Array<T> {

	/// Allocates room for `capacity` elements with `malloc`.
	pub(crate) fn with_capacity( memory: &MemoryFunctions, capacity: usize ) -> Result<Self, LeafError> {
		Self::allocate( memory, capacity, false )
	}

	/// Allocates room for `capacity` elements with `calloc`.
	pub(crate) fn zeroed( memory: &MemoryFunctions, capacity: usize ) -> Result<Self, LeafError> {
		Self::allocate( memory, capacity, true )
	}

	fn allocate( memory: &MemoryFunctions, capacity: usize, zeroed: bool ) -> Result<Self, LeafError> {

		if capacity == 0 {
			return Ok( Self { ptr: NonNull::dangling(), len: 0, capacity: 0, free: memory.free })
		}

		let bytes = capacity.checked_mul( mem::size_of::<T>() ).ok_or( LeafError::MemoryAllocation )?;
		// SAFETY: the installed functions follow the C library contract.
		let raw = unsafe { match zeroed {
			true => ( memory.calloc )( capacity, mem::size_of::<T>() ),
			false => ( memory.malloc )( bytes ),
		}};
		let ptr = NonNull::new( raw.cast::<T>() ).ok_or( LeafError::MemoryAllocation )?;

		if ( ptr.as_ptr() as usize ) % mem::align_of::<T>() != 0 {
			// SAFETY: `raw` came from the matching allocator and holds no values.
			unsafe { ( memory.free )( raw ) };
			return Err( LeafError::MemoryAllocation );
		}

		Ok( Self { ptr, len: 0, capacity, free: memory.free })

	}

	/// Appends a value. The caller sizes the array up front, pushing past capacity is a bug.
	pub(crate) fn push( &mut self, value: T ) {
		assert!( self.len < self.capacity, "Array pushed past its capacity" );
		// SAFETY: `len < capacity`, so the slot is inside the allocation and uninitialized.
		unsafe { self.ptr.as_ptr().add( self.len ).write( value ) };
		self.len += 1 ;
	}

	#[inline] pub fn as_slice( &self ) -> &[T] {
		// SAFETY: the first `len` slots are initialized; a dangling pointer is valid for `len == 0`.
		unsafe { std::slice::from_raw_parts( self.ptr.as_ptr(), self.len ) }
	}

	/// Raw start of the buffer, as the C side of the boundary would see it.
	#[inline] pub fn as_ptr( &self ) -> *const T { self.ptr.as_ptr() }

	/// The buffer viewed as bytes.
	pub(crate) fn as_bytes( &self ) -> &[u8] where T: Copy {
		// SAFETY: only used for padding-free primitive seeds.
		unsafe { std::slice::from_raw_parts( self.ptr.as_ptr().cast::<u8>(), self.len * mem::size_of::<T>() ) }
	}

}

impl<T> Deref for Array<T> {
	type Target = [T];
	fn deref( &self ) -> &[T] { self.as_slice() }
}

impl<T: fmt::Debug> fmt::Debug for Array<T> {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		f.debug_list().entries( self.as_slice() ).finish()
	}
}

impl<T: PartialEq> PartialEq<[T]> for Array<T> {
	fn eq( &self, other: &[T] ) -> bool { self.as_slice() == other }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for Array<T> {
	fn eq( &self, other: &[T; N] ) -> bool { self.as_slice() == other.as_slice() }
}

impl<T: PartialEq> PartialEq<Vec<T>> for Array<T> {
	fn eq( &self, other: &Vec<T> ) -> bool { self.as_slice() == other.as_slice() }
}

impl<T> Drop for Array<T> {
	fn drop( &mut self ) {
		// SAFETY: exactly the first `len` slots are initialized.
		unsafe { ptr::drop_in_place( ptr::slice_from_raw_parts_mut( self.ptr.as_ptr(), self.len )) };
		if self.capacity > 0 {
			// SAFETY: allocated by the allocator paired with `free`.
			unsafe { ( self.free )( self.ptr.as_ptr().cast() ) };
		}
	}
}

/// A NUL-terminated byte string allocated through [`MemoryFunctions`].
///
/// Strings in plants are byte sequences; they are not required to be UTF-8.
pub struct MemStr {
	ptr: NonNull<u8>,
	len: usize,
	free: FreeFn,
}

// SAFETY: `MemStr` uniquely owns an immutable byte buffer.
unsafe impl Send for MemStr {}
// SAFETY: see above.
unsafe impl Sync for MemStr {}

impl MemStr {

	/// Allocates `bytes.len() + 1` bytes, copies `bytes` in with `memcpy` and terminates them.
	pub(crate) fn copy_from( memory: &MemoryFunctions, bytes: &[u8] ) -> Result<Self, LeafError> {

		let size = bytes.len().checked_add( 1 ).ok_or( LeafError::MemoryAllocation )?;
		// SAFETY: the installed functions follow the C library contract.
		let raw = unsafe { ( memory.malloc )( size ) };
		let ptr = NonNull::new( raw.cast::<u8>() ).ok_or( LeafError::MemoryAllocation )?;

		// SAFETY: `ptr` holds `size` bytes and does not overlap `bytes`.
		unsafe {
			if !bytes.is_empty() {
				( memory.memcpy )( raw, bytes.as_ptr().cast(), bytes.len() );
			}
			ptr.as_ptr().add( bytes.len() ).write( 0 );
		}

		Ok( Self { ptr, len: bytes.len(), free: memory.free })

	}

	#[inline] pub fn as_bytes( &self ) -> &[u8] {
		// SAFETY: `len` bytes were copied in at construction.
		unsafe { std::slice::from_raw_parts( self.ptr.as_ptr(), self.len ) }
	}

	#[inline] pub fn to_str( &self ) -> Result<&str, Utf8Error> { std::str::from_utf8( self.as_bytes() ) }

	/// Start of the NUL-terminated buffer.
	#[inline] pub fn as_ptr( &self ) -> *const u8 { self.ptr.as_ptr() }

	#[inline] pub fn len( &self ) -> usize { self.len }
	#[inline] pub fn is_empty( &self ) -> bool { self.len == 0 }

}

impl Deref for MemStr {
	type Target = [u8];
	fn deref( &self ) -> &[u8] { self.as_bytes() }
}

impl fmt::Debug for MemStr {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		fmt::Debug::fmt( &String::from_utf8_lossy( self.as_bytes() ), f )
	}
}

impl PartialEq for MemStr {
	fn eq( &self, other: &Self ) -> bool { self.as_bytes() == other.as_bytes() }
}

impl PartialEq<str> for MemStr {
	fn eq( &self, other: &str ) -> bool { self.as_bytes() == other.as_bytes() }
}

impl PartialEq<&str> for MemStr {
	fn eq( &self, other: &&str ) -> bool { self.as_bytes() == other.as_bytes() }
}

impl PartialEq<[u8]> for MemStr {
	fn eq( &self, other: &[u8] ) -> bool { self.as_bytes() == other }
}

impl Drop for MemStr {
	fn drop( &mut self ) {
		// SAFETY: allocated by the allocator paired with `free`.
		unsafe { ( self.free )( self.ptr.as_ptr().cast() ) };
	}
}
