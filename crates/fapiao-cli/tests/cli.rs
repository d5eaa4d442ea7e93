use std::fs;
use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use tempfile::TempDir;

/// A one-page invoice: code, date and a `¥` total in Helvetica.
fn invoice_pdf(code: &str) -> Vec<u8> {
    let runs: [(i64, i64, Vec<u8>); 3] = [
        (72, 700, code.as_bytes().to_vec()),
        (72, 680, b"20240313".to_vec()),
        (300, 500, b"\xa588.00".to_vec()),
    ];

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (x, y, text) in runs {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new("Td", vec![x.into(), y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

fn fapiao(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fapiao").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

fn workspace() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    (dir, config)
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("fapiao")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("rename"));
}

#[test]
fn test_extract_json() {
    let (dir, config) = workspace();
    let pdf = dir.path().join("invoice.pdf");
    fs::write(&pdf, invoice_pdf("03100012")).unwrap();

    fapiao(&config)
        .args(["extract", "--year", "2024"])
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""code": "03100012""#))
        .stdout(predicate::str::contains(r#""money": "88.00""#))
        .stdout(predicate::str::contains("2024年03月13日"));
}

#[test]
fn test_extract_missing_file() {
    let (dir, config) = workspace();

    fapiao(&config)
        .arg("extract")
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_lines() {
    let (dir, config) = workspace();
    let pdf = dir.path().join("invoice.pdf");
    fs::write(&pdf, invoice_pdf("03100012")).unwrap();

    fapiao(&config)
        .arg("lines")
        .arg(&pdf)
        .assert()
        .success()
        .stdout("03100012\n20240313\n¥88.00\n");
}

#[test]
fn test_batch_summary() {
    let (dir, config) = workspace();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("a.pdf"), invoice_pdf("03100012")).unwrap();
    fs::write(input.join("b.pdf"), b"not a pdf").unwrap();

    fapiao(&config)
        .args(["batch", "--summary"])
        .arg(format!("{}/*.pdf", input.display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("b.pdf"));

    fapiao(&config)
        .args(["batch", "--summary", "--continue-on-error"])
        .arg(format!("{}/*.pdf", input.display()))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(output.join("a.json").exists());
    let summary = fs::read_to_string(output.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,date,code,money"));
    assert!(summary.contains("b.pdf,error"));
}

#[test]
fn test_rename() {
    let (dir, config) = workspace();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("a.pdf"), invoice_pdf("03100012")).unwrap();
    fs::write(input.join("b.pdf"), invoice_pdf("03100012")).unwrap();

    fapiao(&config)
        .args(["config", "set", "extraction.reference_year", "2024"])
        .assert()
        .success();

    fapiao(&config)
        .args(["rename", "--claimant", "张三", "-o"])
        .arg(&output)
        .arg(format!("{}/*.pdf", input.display()))
        .assert()
        .success();

    let first = "张三+03100012+88.00+2024年03月13日.pdf";
    let second = "张三+03100012+88.00+2024年03月13日 (1).pdf";
    assert!(output.join(first).exists());
    assert!(output.join(second).exists());

    let details = fs::read_to_string(output.join("发票详情.txt")).unwrap();
    assert_eq!(details, format!("{}\n{}", first, second));
}

#[test]
fn test_rename_requires_claimant() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("a.pdf"), invoice_pdf("03100012")).unwrap();

    fapiao(&config)
        .args(["rename", "-o"])
        .arg(dir.path().join("out"))
        .arg(format!("{}/*.pdf", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No claimant given"));
}

#[test]
fn test_config_set_and_get() {
    let (_dir, config) = workspace();

    fapiao(&config)
        .args(["config", "set", "naming.claimant", "李四"])
        .assert()
        .success();

    fapiao(&config)
        .args(["config", "get", "naming.claimant"])
        .assert()
        .success()
        .stdout(predicate::str::contains("李四"));

    fapiao(&config)
        .args(["config", "get", "naming.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
