//! Property checks for the value codec and the menu tree.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{Address, U256};
use proptest::collection::{hash_set, vec};
use proptest::prelude::*;

use scui::repl::tree::{Action, MenuTree, Resolution, EXIT_LABEL, HELP_LABEL, UP_LABEL};
use scui::utils::{decode, encode};

fn round_trip(text: &str, ty: &DynSolType) -> String {
    let value = encode(text, ty).expect("encodes");
    decode(&value).expect("decodes")
}

proptest! {
    #[test]
    fn test_uint256_text_round_trip(hi in any::<u128>(), lo in any::<u128>()) {
        let n: U256 = (U256::from(hi) << 128) | U256::from(lo);
        let text = n.to_string();
        prop_assert_eq!(round_trip(&text, &DynSolType::Uint(256)), text);
    }

    #[test]
    fn test_hex_integers_render_decimal(n in any::<u64>()) {
        let text = format!("{:#x}", n);
        prop_assert_eq!(round_trip(&text, &DynSolType::Uint(64)), n.to_string());
    }

    #[test]
    fn test_int64_text_round_trip(n in any::<i64>()) {
        let text = n.to_string();
        prop_assert_eq!(round_trip(&text, &DynSolType::Int(64)), text);
    }

    #[test]
    fn test_uint8_rejects_out_of_range(n in 256u64..u64::MAX) {
        prop_assert!(encode(&n.to_string(), &DynSolType::Uint(8)).is_err());
    }

    #[test]
    fn test_address_round_trip(bytes in any::<[u8; 20]>()) {
        let address = Address::from(bytes);
        let value = encode(&address.to_string(), &DynSolType::Address).unwrap();
        prop_assert_eq!(&value, &DynSolValue::Address(address));
        prop_assert_eq!(decode(&value).unwrap(), address.to_checksum(None));
    }

    #[test]
    fn test_string_kept_verbatim(text in "[ \ta-zA-Z0-9_.,:\"-]{1,40}") {
        prop_assert_eq!(round_trip(&text, &DynSolType::String), text);
    }

    #[test]
    fn test_uint_array_round_trip(items in vec(any::<u64>(), 0..8)) {
        let ty = DynSolType::Array(Box::new(DynSolType::Uint(256)));
        let text = serde_json::to_string(&items).unwrap();
        let rendered = round_trip(&text, &ty);
        // rendered text re-encodes to the same value
        prop_assert_eq!(encode(&rendered, &ty).unwrap(), encode(&text, &ty).unwrap());
    }

    #[test]
    fn test_tuple_round_trip(
        owner in any::<[u8; 20]>(),
        amount in any::<u64>(),
        flag in any::<bool>(),
    ) {
        let ty =
            DynSolType::Tuple(vec![DynSolType::Address, DynSolType::Uint(256), DynSolType::Bool]);
        let value = DynSolValue::Tuple(vec![
            DynSolValue::Address(Address::from(owner)),
            DynSolValue::Uint(U256::from(amount), 256),
            DynSolValue::Bool(flag),
        ]);
        let rendered = decode(&value).unwrap();
        prop_assert_eq!(encode(&rendered, &ty).unwrap(), value);
    }

    #[test]
    fn test_branches_end_with_synthetic_children(labels in hash_set("[a-z]{1,8}", 1..12)) {
        let mut tree = MenuTree::new();
        let root = tree.root();
        let branch = tree.add_branch(root, "group", "").unwrap();
        for label in &labels {
            if label == HELP_LABEL || label == EXIT_LABEL {
                continue;
            }
            tree.add_leaf(branch, label, "", Action::Command).unwrap();
        }
        tree.sort_children(branch);

        let children = tree.node(branch).children();
        let tail: Vec<&str> = children[children.len() - 3..]
            .iter()
            .map(|id| tree.node(*id).label.as_str())
            .collect();
        prop_assert_eq!(tail, vec![UP_LABEL, HELP_LABEL, EXIT_LABEL]);

        for label in labels.iter().filter(|l| *l != HELP_LABEL && *l != EXIT_LABEL) {
            match tree.resolve(branch, label) {
                Resolution::Leaf(id) => prop_assert_eq!(tree.name(id), format!("group/{}", label)),
                other => prop_assert!(false, "{} resolved to {:?}", label, other),
            }
        }
        prop_assert_eq!(tree.resolve(branch, UP_LABEL), Resolution::Subtree(root));
    }
}
