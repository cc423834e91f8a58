use crate::types::{SymbolNumber, TransitionTableIndex};

pub const INDEX_TABLE_SIZE: usize = 6;
pub const TRANS_TABLE_SIZE: usize = 12;
pub const TARGET_TABLE: TransitionTableIndex = 2_147_483_648;

pub const NO_SYMBOL: SymbolNumber = SymbolNumber::MAX;
pub const NO_TABLE_INDEX: TransitionTableIndex = TransitionTableIndex::MAX;

/// Magic of the optional HFST3 prefix block, including its terminating NUL.
pub const HFST3_MAGIC: &[u8; 5] = b"HFST\0";
pub const HEADER_FLAG_COUNT: usize = 9;

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn test_INDEX_TABLE_SIZE() {
        use crate::types::*;
        use std::mem;

        let c = mem::size_of::<SymbolNumber>() + mem::size_of::<TransitionTableIndex>();

        assert!(INDEX_TABLE_SIZE == c);
    }

    #[test]
    fn test_TRANS_TABLE_SIZE() {
        use crate::types::*;
        use std::mem;

        let c = 2 * mem::size_of::<SymbolNumber>()
            + mem::size_of::<TransitionTableIndex>()
            + mem::size_of::<Weight>();

        assert!(TRANS_TABLE_SIZE == c);
    }

    #[test]
    fn test_TARGET_TABLE_is_half_the_address_space() {
        assert_eq!(TARGET_TABLE, 1u32 << 31);
        assert!(NO_TABLE_INDEX > TARGET_TABLE);
    }
}
