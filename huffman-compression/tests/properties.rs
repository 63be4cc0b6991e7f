use huffman_compression::{
    bits::{pack, padding_len, unpack},
    compress, decompress, generate_codes, CodecConfig, FrequencyTable, MergePolicy, Sidecar,
    SidecarFormat,
};
use proptest::prelude::*;

fn merge_policy() -> impl Strategy<Value = MergePolicy> {
    prop_oneof![Just(MergePolicy::Legacy), Just(MergePolicy::MinRedundancy)]
}

proptest! {
    #[test]
    fn test_round_trip(
        input in prop::collection::vec(any::<u8>(), 0..512),
        merge_policy in merge_policy(),
    ) {
        let config = CodecConfig::new(merge_policy, SidecarFormat::Escaped);
        let compressed = compress(&input, &config).unwrap();
        let output = decompress(&compressed.payload, &compressed.sidecar, &config).unwrap();
        prop_assert_eq!(output, input);
    }

    #[test]
    fn test_round_trip_legacy_sidecar(
        // '0' and '1' cannot be keys in the legacy encoding
        input in prop::collection::vec(any::<u8>().prop_filter("code character", |&b| !matches!(b, b'0' | b'1')), 0..256),
        merge_policy in merge_policy(),
    ) {
        let config = CodecConfig::new(merge_policy, SidecarFormat::Legacy);
        let compressed = compress(&input, &config).unwrap();
        let output = decompress(&compressed.payload, &compressed.sidecar, &config).unwrap();
        prop_assert_eq!(output, input);
    }

    #[test]
    fn test_codebooks_are_prefix_free(
        input in prop::collection::vec(any::<u8>(), 1..512),
        merge_policy in merge_policy(),
    ) {
        let table = FrequencyTable::from_bytes(&input);
        let codebook = generate_codes(&table, merge_policy);

        prop_assert_eq!(codebook.len(), table.len());
        for (a, code_a) in codebook.iter() {
            for (b, code_b) in codebook.iter() {
                if a != b {
                    prop_assert!(!code_b.starts_with(code_a), "{} prefixes {}", code_a, code_b);
                }
            }
        }
    }

    #[test]
    fn test_frequency_conservation(input in prop::collection::vec(any::<u8>(), 0..1024)) {
        let table = FrequencyTable::from_bytes(&input);
        prop_assert_eq!(table.total(), input.len());
        prop_assert!(table.iter().all(|(_, count)| count > 0));
    }

    #[test]
    fn test_unpack_inverts_pack(bits in "[01]{0,100}") {
        let packed = pack(&bits).unwrap();
        let unpacked = unpack(&packed);

        let expected = format!("{bits}{}", "0".repeat(padding_len(bits.len())));
        prop_assert_eq!(&unpacked, &expected);
        if !bits.is_empty() && bits.len() <= 8 {
            prop_assert_eq!(packed.len(), 1);
        }
    }

    #[test]
    fn test_stop_count_matches_input_length(input in prop::collection::vec(any::<u8>(), 0..256)) {
        let config = CodecConfig::default();
        let compressed = compress(&input, &config).unwrap();
        let sidecar = Sidecar::deserialize(&compressed.sidecar, config.sidecar_format).unwrap();
        prop_assert_eq!(sidecar.stop_count, input.len());
    }
}
