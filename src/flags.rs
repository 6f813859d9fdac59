use bitflags::bitflags ;



bitflags! {
	/// Per-leaf flag bitset.
	///
	/// Only [`IMMUTABLE`]( LeafFlags::IMMUTABLE ) and [`UNDELETABLE`]( LeafFlags::UNDELETABLE )
	/// are interpreted by the store. Bits from [`LeafFlags::FIRST_CUSTOM_BIT`] upward are
	/// free for host policy (e.g. "owned by the extension, host must not touch") and are
	/// carried through unchanged.
	#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, Default )]
	pub struct LeafFlags: u32 {
		/// The value may not be changed. The leaf may still be deleted unless it is also undeletable.
		const IMMUTABLE = 1 ;
		/// The leaf may not be removed from its plant.
		const UNDELETABLE = 1 << 1 ;

		const _ = !0 ;
	}
}

impl LeafFlags {

	/// Lowest bit reserved for host-defined flags.
	pub const FIRST_CUSTOM_BIT: u32 = 1 << 16 ;

	/// Host-defined flag number `n`, counted from [`LeafFlags::FIRST_CUSTOM_BIT`].
	/// Returns `None` when `n` does not fit into the bitset.
	pub const fn custom( n: u32 ) -> Option<Self> {
		match n < 16 {
			true => Some( Self::from_bits_retain( Self::FIRST_CUSTOM_BIT << n )),
			false => None,
		}
	}

	/// The two bits the store enforces.
	#[inline] pub const fn protection( self ) -> Self {
		Self::from_bits_retain( self.bits() & ( Self::IMMUTABLE.bits() | Self::UNDELETABLE.bits() ))
	}

}

#[cfg( test )]
mod tests {

	use super::LeafFlags ;

	#[test]
	fn custom_bits_are_retained() {
		let owned = LeafFlags::custom( 0 ).unwrap();
		let flags = LeafFlags::IMMUTABLE | owned ;
		assert_eq!( flags.bits(), 1 | ( 1 << 16 ));
		assert_eq!( flags.protection(), LeafFlags::IMMUTABLE );
		assert!( LeafFlags::custom( 16 ).is_none() );
	}

}
