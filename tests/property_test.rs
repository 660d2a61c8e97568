use proptest::prelude::*;
use swsave::{decrypt, encrypt, is_hash_valid, Block, BoolKind, ScalarValue, TypeCode, XorShift32};

fn arb_scalar_value() -> impl Strategy<Value = ScalarValue> {
    prop_oneof![
        any::<u8>().prop_map(ScalarValue::Byte),
        any::<u16>().prop_map(ScalarValue::UInt16),
        any::<u32>().prop_map(ScalarValue::UInt32),
        any::<u64>().prop_map(ScalarValue::UInt64),
        any::<i8>().prop_map(ScalarValue::SByte),
        any::<i16>().prop_map(ScalarValue::Int16),
        any::<i32>().prop_map(ScalarValue::Int32),
        any::<i64>().prop_map(ScalarValue::Int64),
        // Bit patterns survive; NaN would break structural equality.
        any::<u32>().prop_map(|b| ScalarValue::Single(f32::from_bits(b & 0x7F7F_FFFF))),
        any::<u64>().prop_map(|b| ScalarValue::Double(f64::from_bits(b & 0x7FEF_FFFF_FFFF_FFFF))),
    ]
}

fn arb_element_tag() -> impl Strategy<Value = TypeCode> {
    prop_oneof![
        Just(TypeCode::Bool3),
        Just(TypeCode::Byte),
        Just(TypeCode::UInt16),
        Just(TypeCode::UInt32),
        Just(TypeCode::UInt64),
        Just(TypeCode::SByte),
        Just(TypeCode::Int16),
        Just(TypeCode::Int32),
        Just(TypeCode::Int64),
        Just(TypeCode::Single),
        Just(TypeCode::Double),
    ]
}

fn arb_block() -> impl Strategy<Value = Block> {
    prop_oneof![
        (any::<u32>(), prop_oneof![
            Just(BoolKind::False),
            Just(BoolKind::True),
            Just(BoolKind::Either),
        ])
            .prop_map(|(key, kind)| Block::new_bool(key, kind)),
        (any::<u32>(), proptest::collection::vec(any::<u8>(), 0..256))
            .prop_map(|(key, data)| Block::new_object(key, data)),
        (any::<u32>(), arb_element_tag(), 0usize..32).prop_map(|(key, element, count)| {
            let size = element.element_size().unwrap();
            let data = (0..count * size).map(|i| i as u8).collect();
            Block::new_array(key, element, data).unwrap()
        }),
        (any::<u32>(), arb_scalar_value())
            .prop_map(|(key, value)| Block::new_scalar(key, value)),
    ]
}

proptest! {
    /// decrypt ∘ encrypt is the identity over legal block sequences.
    #[test]
    fn round_trip_any_block_sequence(blocks in proptest::collection::vec(arb_block(), 0..24)) {
        let file = encrypt(&blocks);
        prop_assert!(is_hash_valid(&file));
        prop_assert_eq!(decrypt(&file).unwrap(), blocks);
    }

    /// encrypt ∘ decrypt is byte-identical on its own output.
    #[test]
    fn reencode_is_byte_identical(blocks in proptest::collection::vec(arb_block(), 1..12)) {
        let file = encrypt(&blocks);
        let resealed = encrypt(&decrypt(&file).unwrap());
        prop_assert_eq!(resealed, file);
    }

    /// Keystreams are pure functions of the seed.
    #[test]
    fn keystream_is_deterministic(seed in any::<u32>()) {
        let mut a = XorShift32::new(seed);
        let mut b = XorShift32::new(seed);
        for _ in 0..1000 {
            prop_assert_eq!(a.next_byte(), b.next_byte());
        }
    }

    /// Decoding stops exactly at the buffer's end for any legal file.
    #[test]
    fn no_trailing_bytes_are_tolerated(blocks in proptest::collection::vec(arb_block(), 1..8)) {
        let file = encrypt(&blocks);
        let mut grown = file[..file.len() - 32].to_vec();
        grown.push(0xEE); // half a key
        let digest = swsave::compute_hash(&grown);
        grown.extend_from_slice(&digest);
        prop_assert!(decrypt(&grown).is_err());
    }
}
