//! Copying and comparing leaves and whole plants.
//!
//! Pointer seeds (function, data and plant pointers) and custom payloads are copied by
//! reference, so the source and destination alias the same pointee afterwards. Strings
//! are copied into fresh allocations.

use itertools::Itertools ;
use tracing::debug ;

use crate::{ keys, FuncPtr, LeafError, Plant, PlantId, Seed, SeedType, VoidPtr };
use crate::utils::PartialSuccess ;



/// How [`plant_duplicate`] treats leaves already on the destination.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum DuplicateMode {
	/// Remove every destination leaf first, except `type` and undeletable leaves.
	Replace,
	/// Keep existing destination leaves; source leaves overwrite same-named ones.
	Merge,
}

/// A leaf [`plant_duplicate`] could not copy, and why.
pub type SkippedLeaf = ( String, LeafError );

/// Sets `dst_key` on `dst` to a copy of every element of `src_key` on `src`.
pub fn leaf_copy( dst: &Plant, dst_key: &str, src: &Plant, src_key: &str ) -> Result<(), LeafError> {

	let seed = src.leaf_seed_type( src_key )?;
	match seed {
		SeedType::Int => copy_seed::<i32>( dst, dst_key, src, src_key ),
		SeedType::UInt => copy_seed::<u32>( dst, dst_key, src, src_key ),
		SeedType::Int64 => copy_seed::<i64>( dst, dst_key, src, src_key ),
		SeedType::UInt64 => copy_seed::<u64>( dst, dst_key, src, src_key ),
		SeedType::Boolean => copy_seed::<bool>( dst, dst_key, src, src_key ),
		SeedType::Float => copy_seed::<f32>( dst, dst_key, src, src_key ),
		SeedType::Double => copy_seed::<f64>( dst, dst_key, src, src_key ),
		SeedType::FuncPtr => copy_seed::<FuncPtr>( dst, dst_key, src, src_key ),
		SeedType::VoidPtr => copy_seed::<VoidPtr>( dst, dst_key, src, src_key ),
		SeedType::PlantPtr => copy_seed::<PlantId>( dst, dst_key, src, src_key ),
		SeedType::String => {
			let strings = src.get_string_array( src_key )?;
			dst.set_string_array( dst_key, strings.iter().map(| string | string.as_bytes() ))
		}
		SeedType::Custom( _ ) => {
			let payloads = src.get_custom_array( src_key, seed )?;
			dst.set_custom_array( dst_key, seed, payloads.iter().cloned() )
		}
	}

}

fn copy_seed<T: Seed>( dst: &Plant, dst_key: &str, src: &Plant, src_key: &str ) -> Result<(), LeafError> {
	let values = src.get_array::<T>( src_key )?;
	dst.set_array( dst_key, values.iter().cloned() )
}

/// Replaces element `index` of the existing leaf `dst_key` with element `index` of `src_key`.
///
/// Fails with [`LeafError::NoSuchElement`] if either leaf has `index` or fewer elements
/// and with [`LeafError::WrongSeedType`] if the two leaves differ in seed type.
pub fn leaf_copy_nth( dst: &Plant, dst_key: &str, src: &Plant, src_key: &str, index: usize ) -> Result<(), LeafError> {

	let seed = src.leaf_seed_type( src_key )?;
	if dst.leaf_seed_type( dst_key )? != seed { return Err( LeafError::WrongSeedType ) }

	let count = dst.leaf_num_elements( dst_key )?;
	if index >= count || index >= src.leaf_num_elements( src_key )? {
		return Err( LeafError::NoSuchElement );
	}

	let replacement = src.leaf_get( src_key, index )?.detached();
	let mut values = ( 0..count )
		.map(| i | dst.leaf_get( dst_key, i ))
		.collect::<Result<Vec<_>, _>>()?;
	values[ index ] = replacement ;
	dst.leaf_set( dst_key, seed, values )

}

/// Copies every leaf of `src` except `type` onto `dst`.
///
/// Both plants must have the same plant type. In [`DuplicateMode::Replace`] the
/// destination is cleared first; leaves that refuse deletion stay and are overwritten
/// if `src` has them. Destination leaves that are immutable or hold another seed type
/// are skipped and returned alongside the success; any other error aborts the copy.
pub fn plant_duplicate( dst: &Plant, src: &Plant, mode: DuplicateMode ) -> Result<PartialSuccess<(), SkippedLeaf>, LeafError> {

	if dst.plant_type()? != src.plant_type()? { return Err( LeafError::WrongPlantType ) }

	if mode == DuplicateMode::Replace {
		for key in dst.plant_list_leaves()?.into_iter().filter(| key | key != keys::TYPE ) {
			match dst.leaf_delete( &key ) {
				Ok(()) | Err( LeafError::Undeletable ) => {}
				Err( error ) => return Err( error ),
			}
		}
	}

	let mut skipped = Vec::new();
	for key in src.plant_list_leaves()?.into_iter().filter(| key | key != keys::TYPE ) {
		match leaf_copy( dst, &key, src, &key ) {
			Ok(()) => {}
			Err( error @ ( LeafError::Immutable | LeafError::WrongSeedType )) => {
				debug!( plant = %dst.id(), leaf = %key, %error, "Skipped leaf while duplicating" );
				skipped.push(( key, error ));
			}
			Err( error ) => return Err( error ),
		}
	}

	Ok(( (), skipped ))

}

/// A new plant of the same type as `src` holding copies of all its leaves.
///
/// Each leaf's immutable and undeletable flags are applied after its value is copied.
/// On failure the partially built copy is freed.
pub fn plant_copy( src: &Plant ) -> Result<Plant, LeafError> {

	let copy = src.store().plant_new_owned( src.plant_type()? )?;

	for key in src.plant_list_leaves()?.into_iter().filter(| key | key != keys::TYPE ) {
		leaf_copy( &copy, &key, src, &key )?;
		let flags = src.leaf_get_flags( &key )?.protection();
		if !flags.is_empty() { copy.leaf_add_flags( &key, flags )? }
	}

	Ok( copy.release() )

}

/// Compares element `index` of two leaves, or every element when `index` is `None`.
///
/// Leaves of different seed types, element counts or element sizes are not equal, and
/// an index past either leaf's end is not equal. Numeric seeds are compared as raw
/// bytes with the installed `memcmp`, strings element by element, pointers by address
/// and custom payloads by identity. Fails only when either leaf is missing.
pub fn leaf_elements_equate( a: &Plant, a_key: &str, b: &Plant, b_key: &str, index: Option<usize> ) -> Result<bool, LeafError> {

	let seed = a.leaf_seed_type( a_key )?;
	if b.leaf_seed_type( b_key )? != seed { return Ok( false ) }

	let a_count = a.leaf_num_elements( a_key )?;
	let b_count = b.leaf_num_elements( b_key )?;
	let range = match index {
		Some( index ) if index < a_count && index < b_count => index..index + 1,
		Some( _ ) => return Ok( false ),
		None if a_count != b_count => return Ok( false ),
		None => 0..a_count,
	};

	let sizes_match = range.clone()
		.map(| i | Ok::<_, LeafError>( a.leaf_element_size( a_key, i )? == b.leaf_element_size( b_key, i )? ))
		.fold_ok( true, | all, same | all && same )?;
	if !sizes_match { return Ok( false ) }

	let memory = a.memory();
	match seed {
		SeedType::Int => raw_equal::<i32>( a, a_key, b, b_key, range ),
		SeedType::UInt => raw_equal::<u32>( a, a_key, b, b_key, range ),
		SeedType::Int64 => raw_equal::<i64>( a, a_key, b, b_key, range ),
		SeedType::UInt64 => raw_equal::<u64>( a, a_key, b, b_key, range ),
		SeedType::Boolean => raw_equal::<bool>( a, a_key, b, b_key, range ),
		SeedType::Float => raw_equal::<f32>( a, a_key, b, b_key, range ),
		SeedType::Double => raw_equal::<f64>( a, a_key, b, b_key, range ),
		SeedType::String => {
			let ( left, right ) = ( a.get_string_array( a_key )?, b.get_string_array( b_key )? );
			for i in range {
				if !memory.bytes_equal( &left[ i ], &right[ i ] ) { return Ok( false ) }
			}
			Ok( true )
		}
		SeedType::FuncPtr | SeedType::VoidPtr | SeedType::PlantPtr | SeedType::Custom( _ ) => {
			for i in range {
				if !a.leaf_get( a_key, i )?.same_as( &b.leaf_get( b_key, i )? ) { return Ok( false ) }
			}
			Ok( true )
		}
	}

}

fn raw_equal<T: Seed + Copy>( a: &Plant, a_key: &str, b: &Plant, b_key: &str, range: std::ops::Range<usize> ) -> Result<bool, LeafError> {

	debug_assert!( T::RAW_COMPARABLE );
	let ( left, right ) = ( a.get_array::<T>( a_key )?, b.get_array::<T>( b_key )? );
	let size = std::mem::size_of::<T>();
	let span = range.start * size..range.end * size ;
	Ok( a.memory().bytes_equal( &left.as_bytes()[ span.clone() ], &right.as_bytes()[ span ]))

}

/// Every leaf of `src` other than `type` compares equal on `dst`.
pub fn plants_equate( dst: &Plant, src: &Plant ) -> Result<bool, LeafError> {
	src.plant_list_leaves()?
		.into_iter()
		.filter(| key | key != keys::TYPE )
		.map(| key | match dst.has_leaf( &key ) {
			true => leaf_elements_equate( dst, &key, src, &key, None ),
			false => Ok( false ),
		})
		.fold_ok( true, | all, equal | all && equal )
}
