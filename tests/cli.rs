use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSWORD: &str = "secret123";

fn fedha(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fedha").unwrap();
    cmd.env("FEDHA_DATA_DIR", dir)
        .env("FEDHA_PASSWORD", PASSWORD)
        .env_remove("RUST_LOG");
    cmd
}

fn sign_up_and_in(dir: &Path, email: &str, phone: Option<&str>) {
    let mut signup = fedha(dir);
    signup.args(["auth", "signup", email]);
    if let Some(phone) = phone {
        signup.args(["--phone", phone]);
    }
    signup
        .assert()
        .success()
        .stdout(predicate::str::contains("Account created"));

    fedha(dir)
        .args(["auth", "signin", email])
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome back"));
}

/// The code from the newest SMS in the outbox
fn last_sms_code(dir: &Path) -> String {
    let outbox = fs::read_to_string(dir.join("outbox.log")).unwrap();
    let line = outbox
        .lines()
        .rev()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .find(|m| m["channel"] == "sms")
        .unwrap();
    line["body"]
        .as_str()
        .unwrap()
        .split_whitespace()
        .next()
        .unwrap()
        .to_string()
}

#[test]
fn records_require_sign_in() {
    let dir = TempDir::new().unwrap();

    fedha(dir.path())
        .args(["expense", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn init_and_config() {
    let dir = TempDir::new().unwrap();

    fedha(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));
    assert!(dir.path().join("config.json").exists());

    fedha(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Currency:              KES"));
}

#[test]
fn expense_flow_with_notifications() {
    let dir = TempDir::new().unwrap();
    sign_up_and_in(dir.path(), "amani@example.com", None);

    fedha(dir.path())
        .args(["expense", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No expenses found. Add your first expense to get started!",
        ));

    fedha(dir.path())
        .args(["expense", "add", "1500", "food", "--notes", "market"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expense added successfully"));

    fedha(dir.path())
        .args(["expense", "add", "-5", "food"])
        .assert()
        .failure();
    for amount in ["abc5", "10.999", "90,000,000,000,000,000"] {
        fedha(dir.path())
            .args(["expense", "add", amount, "food"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid amount"));
    }

    fedha(dir.path())
        .args(["expense", "list", "--category", "Food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("KES 1,500.00").and(predicate::str::contains("market")));

    fedha(dir.path())
        .args(["notifications", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expense of KES 1,500.00 for Food"));

    fedha(dir.path())
        .args(["notifications", "read-all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked 1 notification(s) read."));
}

#[test]
fn records_are_isolated_between_users() {
    let dir = TempDir::new().unwrap();
    sign_up_and_in(dir.path(), "first@example.com", None);

    fedha(dir.path())
        .args(["income", "add", "50000", "Salary"])
        .assert()
        .success();

    fedha(dir.path()).args(["auth", "signout"]).assert().success();
    sign_up_and_in(dir.path(), "second@example.com", None);

    fedha(dir.path())
        .args(["income", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Salary").not());
}

#[test]
fn wrong_password_is_rejected() {
    let dir = TempDir::new().unwrap();
    sign_up_and_in(dir.path(), "amani@example.com", None);

    fedha(dir.path())
        .env("FEDHA_PASSWORD", "not-the-password")
        .args(["auth", "signin", "amani@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid login credentials"));
}

#[test]
fn phone_only_user_needs_signup_for_profile_edits() {
    let dir = TempDir::new().unwrap();

    fedha(dir.path())
        .args(["auth", "phone", "send", "+254 700 111 222"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OTP sent successfully!"));

    let code = last_sms_code(dir.path());
    fedha(dir.path())
        .args(["auth", "phone", "verify", &code])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Phone authentication successful! Complete signup to access all features.",
        ));

    fedha(dir.path())
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+254700111222").and(predicate::str::contains("Read-only")));

    fedha(dir.path())
        .args(["profile", "edit", "--name", "Baraka"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile updates require a full account"));

    // Phone-only users still keep records
    fedha(dir.path())
        .args(["goal", "create", "New Laptop", "120000"])
        .assert()
        .success();
    fedha(dir.path())
        .args(["goal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Laptop"));
}

#[test]
fn phone_sign_in_links_existing_profile() {
    let dir = TempDir::new().unwrap();
    sign_up_and_in(dir.path(), "wanjiru@example.com", Some("+254711000333"));
    fedha(dir.path()).args(["auth", "signout"]).assert().success();

    fedha(dir.path())
        .args(["auth", "phone", "send", "+254711000333"])
        .assert()
        .success();
    let code = last_sms_code(dir.path());

    fedha(dir.path())
        .args(["auth", "phone", "verify", "000000x"])
        .assert()
        .failure();

    fedha(dir.path())
        .args(["auth", "phone", "verify", &code])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account linked successfully!"));
}

#[test]
fn dashboard_and_export() {
    let dir = TempDir::new().unwrap();
    sign_up_and_in(dir.path(), "amani@example.com", None);

    fedha(dir.path())
        .args(["income", "add", "1000", "Salary"])
        .assert()
        .success();
    fedha(dir.path())
        .args(["expense", "add", "250", "Transport"])
        .assert()
        .success();

    fedha(dir.path())
        .args(["dashboard", "--months", "3"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Net Balance")
                .and(predicate::str::contains("KES 750.00"))
                .and(predicate::str::contains("75.0%")),
        );

    fedha(dir.path())
        .args(["dashboard", "--months", "4000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 120 months"));

    let out = dir.path().join("expenses.csv");
    fedha(dir.path())
        .args(["export", "csv", "expenses", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 record(s)"));
    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("ID,Date,Category,Amount,Notes"));
    assert!(csv.contains("Transport,250.00"));

    fedha(dir.path())
        .args(["notifications", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report Exported"));
}

#[test]
fn audit_log_records_writes() {
    let dir = TempDir::new().unwrap();

    fedha(dir.path())
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit entries yet."));

    sign_up_and_in(dir.path(), "amani@example.com", None);
    fedha(dir.path())
        .args(["expense", "add", "300", "Bills"])
        .assert()
        .success();

    fedha(dir.path())
        .args(["audit", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Expense").and(predicate::str::contains("(Bills)")));
}
