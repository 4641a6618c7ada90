#![no_main]

use alloy::dyn_abi::DynSolType;
use libfuzzer_sys::fuzz_target;
use scui::utils::{decode, encode};

const TYPES: &[&str] = &[
    "uint8",
    "int256",
    "address",
    "bytes32",
    "string",
    "bool[]",
    "(address,uint256[],string)",
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let Ok(ty) = TYPES[selector as usize % TYPES.len()].parse::<DynSolType>() else {
        return;
    };

    // anything that encodes must render back to text of the same value
    if let Ok(value) = encode(text, &ty) {
        if let Ok(rendered) = decode(&value) {
            assert_eq!(encode(&rendered, &ty).ok(), Some(value));
        }
    }
});
