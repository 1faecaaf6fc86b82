#[cfg(test)]
mod tests {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    const EXPECTED_CATALOG_HASH: u64 = 8735676342597745444;

    fn fnv1a64(mut h: u64, bytes: &[u8]) -> u64 {
        for b in bytes {
            h ^= *b as u64;
            h = h.wrapping_mul(FNV_PRIME);
        }
        h
    }

    macro_rules! hash_catalog {
        (
            $( $(#[$doc:meta])* $name:ident = $tag:expr, $mnemonic:literal => ($a_kind:ident, $b_kind:ident), $combine:expr ),* $(,)?
        ) => {{
            let mut h = FNV_OFFSET;
            $(
                h = fnv1a64(h, stringify!($name).as_bytes());
                h = fnv1a64(h, &[crate::virtual_machine::isa::Operation::$name as u8]);
                h = fnv1a64(h, $mnemonic.as_bytes());
                h = fnv1a64(h, stringify!($a_kind).as_bytes());
                h = fnv1a64(h, stringify!($b_kind).as_bytes());
            )*
            h
        }};
    }

    fn current_catalog_hash() -> u64 {
        crate::for_each_operation!(hash_catalog)
    }

    #[test]
    #[ignore]
    fn print_catalog_hash() {
        println!("CATALOG_HASH={}", current_catalog_hash());
    }

    #[test]
    fn catalog_hash_unchanged() {
        assert_eq!(current_catalog_hash(), EXPECTED_CATALOG_HASH);
    }
}
