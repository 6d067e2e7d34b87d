// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Returns a copy of `input` with every zero byte removed.
///
/// The relative order of the remaining bytes is preserved. Game servers pad some log
/// datagrams with NULs, which must not reach the transcript or the reply.
pub fn strip_zero_bytes(input: &[u8]) -> Vec<u8> {
    input.iter().copied().filter(|b| *b != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_zero_bytes() {
        assert_eq!(strip_zero_bytes(b"a\0b\0\0c"), b"abc".to_vec());
        assert_eq!(strip_zero_bytes(b"\0\0\0"), Vec::<u8>::new());
        assert_eq!(strip_zero_bytes(b""), Vec::<u8>::new());
        assert_eq!(strip_zero_bytes(b"no zeros"), b"no zeros".to_vec());
    }

    #[test]
    fn test_trailing_padding() {
        let mut datagram = b"L 11/23/2019 - 19:29:07: World triggered \"Round_End\"\n".to_vec();
        datagram.extend_from_slice(&[0; 16]);
        assert!(strip_zero_bytes(&datagram).ends_with(b"\"Round_End\"\n"));
    }

    proptest! {
        #[test]
        fn output_has_no_zero_byte(input in proptest::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert!(!strip_zero_bytes(&input).contains(&0));
        }

        #[test]
        fn output_is_the_nonzero_subsequence(input in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let expected: Vec<u8> = input.iter().copied().filter(|b| *b != 0).collect();
            prop_assert_eq!(strip_zero_bytes(&input), expected);
        }

        #[test]
        fn stripping_is_idempotent(input in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let once = strip_zero_bytes(&input);
            prop_assert_eq!(strip_zero_bytes(&once), once.clone());
        }

        #[test]
        fn nonzero_input_is_unchanged(input in proptest::collection::vec(1u8..=255, 0..2048)) {
            prop_assert_eq!(strip_zero_bytes(&input), input.clone());
        }
    }
}
