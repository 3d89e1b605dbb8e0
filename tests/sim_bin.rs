use std::process::Command;

#[test]
fn sim_binary_smoke() {
    let output = Command::new(env!("CARGO_BIN_EXE_sim"))
        .args(["1", "2"])
        .output()
        .expect("failed to run sim binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("non utf8 output");
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("invalid json");
    assert!(v["winner"].is_string());
    assert_eq!(v["agreed"], true);
    assert_eq!(v["spectator"]["winner"], v["winner"]);
    assert_eq!(v["spectator"]["host_ships_revealed"], 5);
    assert_eq!(v["spectator"]["join_ships_revealed"], 5);
}

#[test]
fn sim_binary_requires_two_seeds() {
    let output = Command::new(env!("CARGO_BIN_EXE_sim"))
        .arg("1")
        .output()
        .expect("failed to run sim binary");
    assert!(!output.status.success());
}
