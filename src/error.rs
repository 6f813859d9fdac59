//! Error types shared by the store, the accessor layer and the negotiation protocol.
//!
//! Store and accessor calls fail with a [`LeafError`], a small closed set of outcomes
//! that callers are expected to match on. Nothing in this crate retries a failed call,
//! the immediate caller decides which outcomes are fatal. The negotiation protocol wraps
//! these into a [`NegotiationError`] together with its own version and structure checks.

use thiserror::Error ;

use crate::version::Axis ;



/// Outcome of a failed store primitive or accessor call.
///
/// Every variant carries a stable numeric code (see [`LeafError::code`]) so the
/// outcome can be reported across the host/extension boundary as a plain integer.
#[derive( Error, Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum LeafError {
	/// An allocation through the installed memory functions, or a store limit, failed.
	#[error( "Memory Allocation Failed" )] MemoryAllocation,
	/// A write was attempted on a leaf flagged immutable.
	#[error( "Leaf Is Immutable" )] Immutable,
	/// The requested element index is past the end of the leaf.
	#[error( "No Such Element" )] NoSuchElement,
	/// The plant has no leaf with the requested key.
	#[error( "No Such Leaf" )] NoSuchLeaf,
	/// The leaf's seed type differs from the one requested or supplied.
	#[error( "Wrong Seed Type" )] WrongSeedType,
	/// A delete was attempted on a protected leaf.
	#[error( "Leaf Is Undeletable" )] Undeletable,
	/// The plant handle does not refer to a live plant.
	#[error( "No Such Plant" )] NoSuchPlant,
	/// Two plants were expected to share a plant type but do not.
	#[error( "Wrong Plant Type" )] WrongPlantType,
}

impl LeafError {

	/// Stable numeric code of this outcome. `0` is reserved for success.
	pub const fn code( self ) -> i32 { match self {
		Self::MemoryAllocation => 1,
		Self::Immutable => 2,
		Self::NoSuchElement => 3,
		Self::NoSuchLeaf => 4,
		Self::WrongSeedType => 5,
		Self::Undeletable => 10,
		Self::NoSuchPlant => 11,
		Self::WrongPlantType => 12,
	}}

	/// Inverse of [`LeafError::code`]. Returns `None` for `0` and for unknown codes.
	pub const fn from_code( code: i32 ) -> Option<Self> { match code {
		1 => Some( Self::MemoryAllocation ),
		2 => Some( Self::Immutable ),
		3 => Some( Self::NoSuchElement ),
		4 => Some( Self::NoSuchLeaf ),
		5 => Some( Self::WrongSeedType ),
		10 => Some( Self::Undeletable ),
		11 => Some( Self::NoSuchPlant ),
		12 => Some( Self::WrongPlantType ),
		_ => None,
	}}

}

/// Reasons a capability negotiation can fail.
///
/// [`Negotiator::negotiate`]( crate::Negotiator::negotiate ) only reports failure as
/// `None` and logs the cause; use
/// [`Negotiator::try_negotiate`]( crate::Negotiator::try_negotiate ) to inspect it.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum NegotiationError {
	/// The host runs a version newer than the newest one it knows how to serve.
	#[error( "Cannot serve future {axis} version {version}, newest known is {current}" )]
	FutureVersion { axis: Axis, version: i32, current: i32 },
	/// The extension requires a newer version than the host runs.
	#[error( "Disjoint {axis} ranges: host runs {host}, extension accepts {min}..={max}" )]
	DisjointRanges { axis: Axis, host: i32, min: i32, max: i32 },
	/// The host version is above the extension's maximum and the compatibility rule rejects the pairing.
	#[error( "Incompatible {axis} versions: host runs {host}, extension supports up to {max}" )]
	IncompatibleVersions { axis: Axis, host: i32, max: i32 },
	/// The review callback aborted the negotiation.
	#[error( "Negotiation Rejected By Host" )] Rejected,
	/// A plant taking part in the negotiation does not have the expected structure.
	#[error( "Invalid Plant: {0}" )] InvalidPlant( &'static str ),
	/// A mandatory capability is absent and the negotiator has no default for it.
	#[error( "Missing Capability: {0}" )] MissingCapability( &'static str ),
	/// The host returned no negotiation plant.
	#[error( "Bootstrap Failed" )] BootstrapFailed,
	/// A store primitive failed while building or finalizing the plants.
	#[error( "Leaf Error: {0}" )] Leaf( #[from] LeafError ),
}

#[cfg( test )]
mod tests {

	use super::LeafError ;

	#[test]
	fn codes_round_trip() {
		let all = [
			LeafError::MemoryAllocation,
			LeafError::Immutable,
			LeafError::NoSuchElement,
			LeafError::NoSuchLeaf,
			LeafError::WrongSeedType,
			LeafError::Undeletable,
			LeafError::NoSuchPlant,
			LeafError::WrongPlantType,
		];
		for error in all {
			assert_eq!( LeafError::from_code( error.code() ), Some( error ));
		}
	}

	#[test]
	fn success_code_is_not_an_error() {
		assert_eq!( LeafError::from_code( 0 ), None );
		assert_eq!( LeafError::from_code( 6 ), None );
	}

}
