//! ERC20 contract interface.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};

sol!(
    #[allow(missing_docs)]
    #[derive(Debug)]
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
    }
);

/// ABI-encoded calldata for `transfer(to, amount)`.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_transfer_calldata() {
        let to = address!("0xcBa852Ef29a43a7542B88F60C999eD9cB66f6000");
        let data = transfer_calldata(to, U256::from(10_500_000u64));
        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&data[16..36], to.as_slice());
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(10_500_000u64));
    }
}
