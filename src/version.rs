//! Version axes, ranges and the compatibility rule used during negotiation.
//!
//! Host and extension negotiate two independent axes: the low-level [`Axis::Abi`] and
//! the higher-level [`Axis::Api`]. Each axis is governed by a [`CompatRule`] that decides
//! whether a host running a version above the extension's maximum may still serve it.

use std::fmt ;



/// Newest low-level ABI version this crate knows about.
pub const ABI_VERSION: i32 = 200 ;

/// Newest feature-API version this crate knows about.
pub const API_VERSION: i32 = 200 ;

/// One of the two independently negotiated compatibility axes.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum Axis {
	/// Low-level binary interface: plant primitives and memory functions.
	Abi,
	/// Higher-level feature API built on top of the plants.
	Api,
}

impl fmt::Display for Axis {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		match self {
			Self::Abi => f.write_str( "ABI" ),
			Self::Api => f.write_str( "feature API" ),
		}
	}
}

/// An inclusive range of versions an extension accepts on one axis.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub struct VersionRange {
	min: i32,
	max: i32,
}

impl VersionRange {

	/// Creates a range from an unordered pair. Bounds given backwards are swapped.
	pub fn new( a: i32, b: i32 ) -> Self {
		match a <= b {
			true => Self { min: a, max: b },
			false => Self { min: b, max: a },
		}
	}

	/// A range accepting a single version.
	#[inline] pub fn exactly( version: i32 ) -> Self { Self { min: version, max: version } }

	#[inline] pub fn min( &self ) -> i32 { self.min }
	#[inline] pub fn max( &self ) -> i32 { self.max }

	#[inline] pub fn contains( &self, version: i32 ) -> bool {
		self.min <= version && version <= self.max
	}

}

/// Decides whether two versions on one axis are compatible.
///
/// The rule is applied in this order:
/// 1. equal versions are always compatible
/// 2. a pairing whose higher version is above `current` is rejected, a host cannot know
/// 	about versions newer than itself
/// 3. a pairing that straddles the `breaking` boundary is rejected regardless of distance
/// 4. a pairing whose [`FloorBound`] version is below `floor` is rejected
/// 5. anything else is compatible
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub struct CompatRule {
	current: i32,
	floor: i32,
	floor_bound: FloorBound,
	breaking: Option<i32>,
}

/// Which version of a pairing the floor is checked against.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, Default )]
pub enum FloorBound {
	/// Both versions must be at or above the floor.
	#[default] Lower,
	/// Only the newer version must be at or above the floor, so an ancient extension
	/// is still served by a recent host.
	Higher,
}

impl CompatRule {

	/// Creates a rule with no breaking-change boundary.
	pub const fn new( current: i32, floor: i32 ) -> Self {
		Self { current, floor, floor_bound: FloorBound::Lower, breaking: None }
	}

	/// Default rule for the ABI axis: current [`ABI_VERSION`], floor 100, breaking change at 200.
	pub const fn abi() -> Self {
		Self { current: ABI_VERSION, floor: 100, floor_bound: FloorBound::Lower, breaking: Some( 200 ) }
	}

	/// Default rule for the feature-API axis: current [`API_VERSION`], floor 100, no breaking change.
	pub const fn api() -> Self {
		Self { current: API_VERSION, floor: 100, floor_bound: FloorBound::Lower, breaking: None }
	}

	/// Declares `version` as the first version incompatible with everything before it.
	pub const fn with_breaking_change( mut self, version: i32 ) -> Self {
		self.breaking = Some( version );
		self
	}

	pub const fn without_breaking_change( mut self ) -> Self {
		self.breaking = None ;
		self
	}

	pub const fn with_floor( mut self, floor: i32 ) -> Self {
		self.floor = floor ;
		self
	}

	pub const fn with_floor_bound( mut self, floor_bound: FloorBound ) -> Self {
		self.floor_bound = floor_bound ;
		self
	}

	pub const fn with_current( mut self, current: i32 ) -> Self {
		self.current = current ;
		self
	}

	#[inline] pub const fn current( &self ) -> i32 { self.current }
	#[inline] pub const fn floor( &self ) -> i32 { self.floor }
	#[inline] pub const fn floor_bound( &self ) -> FloorBound { self.floor_bound }
	#[inline] pub const fn breaking_change( &self ) -> Option<i32> { self.breaking }

	pub fn is_compatible( &self, a: i32, b: i32 ) -> bool {

		if a == b { return true }
		let ( lower, higher ) = match a < b {
			true => ( a, b ),
			false => ( b, a ),
		};

		if higher > self.current { return false }
		let straddles = self.breaking
			.is_some_and(| breaking | lower < breaking && higher >= breaking );
		if straddles { return false }
		match self.floor_bound {
			FloorBound::Lower => lower >= self.floor,
			FloorBound::Higher => higher >= self.floor,
		}

	}

}

#[cfg( test )]
mod tests {

	use super::{ CompatRule, FloorBound, VersionRange };

	#[test]
	fn range_normalizes_backwards_bounds() {
		let range = VersionRange::new( 150, 100 );
		assert_eq!(( range.min(), range.max() ), ( 100, 150 ));
		assert!( range.contains( 145 ));
		assert!( !range.contains( 151 ));
	}

	#[test]
	fn equal_versions_are_compatible() {
		let rule = CompatRule::abi();
		assert!( rule.is_compatible( 42, 42 ));
		assert!( rule.is_compatible( 900, 900 ));
	}

	#[test]
	fn breaking_change_rejects_regardless_of_distance() {
		let rule = CompatRule::abi().with_current( 300 );
		assert!( !rule.is_compatible( 199, 200 ));
		assert!( !rule.is_compatible( 210, 190 ));
		assert!( rule.is_compatible( 200, 290 ));
		assert!( rule.is_compatible( 110, 190 ));
	}

	#[test]
	fn future_and_ancient_versions_are_rejected() {
		let rule = CompatRule::api();
		assert!( !rule.is_compatible( 150, 201 ));
		assert!( !rule.is_compatible( 99, 150 ));
		assert!( rule.is_compatible( 100, 200 ));
	}

	#[test]
	fn floor_can_bound_the_higher_version() {
		let rule = CompatRule::api().with_floor_bound( FloorBound::Higher );
		assert!( rule.is_compatible( 99, 150 ));
		assert!( rule.is_compatible( 50, 100 ));
		assert!( !rule.is_compatible( 50, 99 ));
		assert!( !rule.is_compatible( 150, 201 ));
	}

	#[test]
	fn boundary_can_be_removed() {
		let rule = CompatRule::abi().with_current( 300 ).without_breaking_change();
		assert!( rule.is_compatible( 190, 210 ));
	}

}
