use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    Command::cargo_bin("hashchain-cli").unwrap()
}

#[test]
fn default_run_prints_three_valid_blocks() {
    cli()
        .args(["--difficulty", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Block 0"))
        .stdout(predicate::str::contains("Data: Genesis Block"))
        .stdout(predicate::str::contains("Data: Sending 1 ETH to Charles"))
        .stdout(predicate::str::contains("Data: Sending 3 ETH to Alice"))
        .stdout(predicate::str::contains("Block 3").not())
        .stdout(predicate::str::contains("Blockchain valid? true"));
}

#[test]
fn difficulty_zero_keeps_nonces_at_zero() {
    cli()
        .args(["--difficulty", "0", "only one"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Data: only one"))
        .stdout(predicate::str::contains("Nonce: 1").not())
        .stdout(predicate::str::contains("Blockchain valid? true"));
}

#[test]
fn json_output() {
    let output = cli()
        .args(["--difficulty", "2", "--json", "--parallel", "a", "b"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["valid"], true);
    assert_eq!(value["difficulty"], 2);
    let blocks = value["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0]["prev_hash"], "");
    assert_eq!(blocks[1]["prev_hash"], blocks[0]["hash"]);
    assert_eq!(blocks[2]["payload"], "b");
    for b in blocks {
        assert!(b["hash"].as_str().unwrap().starts_with("00"));
    }
}

#[test]
fn out_of_range_difficulty_fails() {
    cli()
        .args(["--difficulty", "65"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}
