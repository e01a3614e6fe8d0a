use drtx::prelude::*;
use drtx::FeeCalculator;
use num_bigint::BigUint;
use proptest::prelude::*;

const ALICE: &str = "drt1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssey5egf";
const BOB: &str = "drt1spyavw0956vq68xj8y4tenjpq2wd5a9p2c6j8gsz7ztyrnpxrruqlqde3c";
const CAROL: &str = "drt1x23lzn8483xs2su4fak0r0dqx6w38enpmmqf2yrkylwq7mfnvyhsmueha6";

fn transaction(nonce: u64, data: Vec<u8>) -> Transaction {
    TransactionBuilder::new()
        .sender(ALICE)
        .receiver(BOB)
        .gas_limit(10_000_000)
        .chain_id("D")
        .nonce(nonce)
        .data(data)
        .build()
        .unwrap()
}

fn signing_json(tx: &Transaction) -> String {
    String::from_utf8(TransactionComputer::new().compute_bytes_for_signing(tx).unwrap()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fee_is_monotonic_in_gas_limit(
        gas_price in 1u64..=10_000_000_000,
        data_len in 0usize..64,
        extra in 0u64..1_000_000,
        step in 1u64..1_000_000,
    ) {
        let calc = FeeCalculator::new(50_000, 1_500, 0.01).unwrap();
        let required = calc.required_gas_limit(data_len) as u64;

        let low = calc.calculate(gas_price, required + extra, data_len).unwrap();
        let high = calc.calculate(gas_price, required + extra + step, data_len).unwrap();
        prop_assert!(high.total >= low.total);
    }

    #[test]
    fn no_execution_fee_at_required_gas(gas_price in 1u64..=10_000_000_000, data_len in 0usize..256) {
        let calc = FeeCalculator::new(50_000, 1_500, 0.01).unwrap();
        let required = calc.required_gas_limit(data_len) as u64;

        let fee = calc.calculate(gas_price, required, data_len).unwrap();
        prop_assert_eq!(fee.execution_fee, BigUint::from(0u32));
        prop_assert_eq!(fee.total, BigUint::from(required) * gas_price);
    }

    #[test]
    fn gas_below_required_is_rejected(data_len in 0usize..256, shortfall in 1u64..50_000) {
        let calc = FeeCalculator::new(50_000, 1_500, 0.01).unwrap();
        let required = calc.required_gas_limit(data_len) as u64;

        let err = calc.calculate(1_000_000_000, required - shortfall, data_len).unwrap_err();
        prop_assert!(matches!(err, DrtxError::NotEnoughGas { .. }), "unexpected error: {}", err);
    }

    #[test]
    fn signing_bytes_are_deterministic(nonce in any::<u64>(), data in prop::collection::vec(any::<u8>(), 0..64)) {
        let tx = transaction(nonce, data);
        prop_assert_eq!(signing_json(&tx), signing_json(&tx.clone()));
    }

    #[test]
    fn data_key_present_only_with_payload(nonce in any::<u64>(), byte in any::<u8>()) {
        let empty = transaction(nonce, Vec::new());
        prop_assert!(!signing_json(&empty).contains("\"data\""));

        let one = transaction(nonce, vec![byte]);
        let json = signing_json(&one);
        prop_assert_eq!(json.matches("\"data\":").count(), 1);
        prop_assert!(json.contains("\"gasLimit\":10000000,\"data\":\""));
        prop_assert!(json.contains("\",\"chainID\":\"D\""));
    }

    #[test]
    fn options_require_version_two(options in 1u32..=3, version in 0u32..2) {
        let computer = TransactionComputer::new();
        let mut tx = transaction(1, Vec::new());
        tx.options = options;
        tx.version = version;
        if tx.options & 2 != 0 {
            tx.guardian = Some(CAROL.to_string());
        }

        let is_bad_usage = matches!(computer.compute_bytes_for_signing(&tx), Err(DrtxError::BadUsage(_)));
        prop_assert!(is_bad_usage);

        tx.version = 2;
        prop_assert!(computer.compute_bytes_for_signing(&tx).is_ok());
    }

    #[test]
    fn guardian_and_hash_signing_commute(version in 0u32..4) {
        let computer = TransactionComputer::new();
        let mut first = transaction(1, Vec::new());
        first.version = version;
        let mut second = first.clone();

        computer.apply_guardian(&mut first, CAROL).unwrap();
        computer.apply_options_for_hash_signing(&mut first);

        computer.apply_options_for_hash_signing(&mut second);
        computer.apply_guardian(&mut second, CAROL).unwrap();
        computer.apply_guardian(&mut second, CAROL).unwrap();

        prop_assert_eq!(first.options, 3);
        prop_assert_eq!(first.version, version.max(2));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn verifying_bytes_follow_hash_option(nonce in any::<u64>()) {
        let computer = TransactionComputer::new();
        let mut tx = transaction(nonce, b"payload".to_vec());

        let raw = computer.compute_bytes_for_verifying(&tx).unwrap();
        prop_assert_eq!(&raw, &computer.compute_bytes_for_signing(&tx).unwrap());

        let before = tx.clone();
        computer.apply_options_for_hash_signing(&mut tx);
        let hashed = computer.compute_bytes_for_verifying(&tx).unwrap();
        prop_assert_eq!(hashed.len(), 32);
        prop_assert_eq!(hashed, computer.compute_hash_for_signing(&tx).unwrap().to_vec());

        // nothing but the option bit moved
        let mut restored = tx.clone();
        restored.options = before.options;
        prop_assert_eq!(restored, before);
    }
}

#[test]
fn signing_bytes_for_plain_transfer() {
    let tx = TransactionBuilder::new()
        .sender(ALICE)
        .receiver(BOB)
        .nonce(89)
        .value(0u32)
        .gas_limit(50_000)
        .gas_price(1_000_000_000)
        .chain_id("D")
        .version(1)
        .build()
        .unwrap();

    let json = signing_json(&tx);
    assert!(json.starts_with("{\"nonce\":89,\"value\":\"0\",\"receiver\":"));
    assert!(!json.contains("\"data\""));
    assert!(json.ends_with("\"chainID\":\"D\",\"version\":1}"));
}

#[test]
fn fee_rejects_insufficient_gas() {
    let mut tx = transaction(0, b"toolittlegaslimit".to_vec());
    tx.gas_limit = 50_000;
    assert_eq!(tx.data_len(), 17);

    let err = TransactionComputer::new()
        .compute_transaction_fee(&tx, &NetworkConfig::default())
        .unwrap_err();
    assert!(matches!(err, DrtxError::NotEnoughGas { gas_limit: 50_000, .. }));
}
