use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BACKENDS: [&str; 2] = ["sqlite", "file"];

fn vaultix(home: &TempDir, backend: &str) -> Command {
    let mut cmd = Command::cargo_bin("vaultix").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--backend")
        .arg(backend)
        .arg("--data-dir")
        .arg(home.path().join("data"));
    cmd
}

fn add_client(home: &TempDir, backend: &str, name: &str) {
    vaultix(home, backend)
        .args(["clients", "add", name, "--email", "someone@mail.com", "--phone", "5551234567"])
        .assert()
        .success();
}

#[test]
fn init_saves_settings_and_creates_store() {
    for backend in BACKENDS {
        let home = TempDir::new().unwrap();
        vaultix(&home, backend)
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("Initialized vaultix ({backend})")));

        let settings = home.path().join(".config/vaultix/settings.json");
        let saved = std::fs::read_to_string(settings).unwrap();
        assert!(saved.contains(&format!("\"backend\": \"{backend}\"")), "{saved}");

        match backend {
            "sqlite" => assert!(home.path().join("data/vaultix.db").exists()),
            _ => {
                assert!(home.path().join("data/clients.csv").exists());
                assert!(home.path().join("data/transactions.csv").exists());
            }
        }
    }
}

#[test]
fn clients_list_is_ordered_by_name() {
    for backend in BACKENDS {
        let home = TempDir::new().unwrap();
        add_client(&home, backend, "Zoe");
        add_client(&home, backend, "Ana");

        let out = vaultix(&home, backend)
            .args(["clients", "list"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let out = String::from_utf8(out).unwrap();
        let ana = out.find("Ana").unwrap();
        let zoe = out.find("Zoe").unwrap();
        assert!(ana < zoe, "{out}");
    }
}

#[test]
fn invalid_email_is_rejected() {
    let home = TempDir::new().unwrap();
    vaultix(&home, "file")
        .args(["clients", "add", "Ana", "--email", "not-an-email", "--phone", "5551234567"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Invalid input"));
}

#[test]
fn transaction_for_unknown_client_fails() {
    for backend in BACKENDS {
        let home = TempDir::new().unwrap();
        vaultix(&home, backend)
            .args([
                "transactions", "add", "--client", "42", "--amount", "10", "--type", "Gasto",
                "--category", "Comida", "--location", "CDMX",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown client: 42"));
    }
}

#[test]
fn deleting_client_removes_its_transactions() {
    for backend in BACKENDS {
        let home = TempDir::new().unwrap();
        add_client(&home, backend, "Ana");
        for (amount, date) in [("10.0", "2024-01-01"), ("-3.5", "2024-02-01")] {
            vaultix(&home, backend)
                .args([
                    "transactions", "add", "--client", "1", "--amount", amount, "--type", "Gasto",
                    "--category", "Comida", "--location", "CDMX", "--date", date,
                ])
                .assert()
                .success();
        }

        vaultix(&home, backend)
            .args(["transactions", "list", "--client", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("$10.00").and(predicate::str::contains("-$3.50")));

        vaultix(&home, backend)
            .args(["clients", "delete", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted client 1 and 2 transaction(s)"));

        vaultix(&home, backend)
            .args(["transactions", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No transactions found."));
    }
}

#[test]
fn file_backend_writes_plain_lines() {
    let home = TempDir::new().unwrap();
    add_client(&home, "file", "Ana");
    vaultix(&home, "file")
        .args([
            "transactions", "add", "--id", "5", "--client", "1", "--amount", "10.0", "--type", "Gasto",
            "--category", "Comida", "--location", "CDMX", "--date", "2024-01-01",
        ])
        .assert()
        .success();

    let lines = std::fs::read_to_string(home.path().join("data/transactions.csv")).unwrap();
    assert_eq!(lines, "5,1,10.0,Gasto,2024-01-01,Comida,CDMX\n");
}

#[test]
fn missing_record_reports_not_found() {
    let home = TempDir::new().unwrap();
    vaultix(&home, "sqlite")
        .args(["clients", "show", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No client with ID 9"));
}

#[test]
fn menu_runs_from_piped_input() {
    for backend in BACKENDS {
        let home = TempDir::new().unwrap();
        vaultix(&home, backend)
            .write_stdin("1\nAna\nana@mail.com\n5551234567\n\n\n2024-01-01\n\n\n2\n9\n")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("Client 1 created.")
                    .and(predicate::str::contains("ana@mail.com"))
                    .and(predicate::str::contains("Goodbye.")),
            );
    }
}

#[test]
fn status_without_store_suggests_init() {
    let home = TempDir::new().unwrap();
    vaultix(&home, "sqlite")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Store not found"));
}
