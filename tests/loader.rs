//! Folder loader tests against a real temporary directory.
//!
//! Builds a minimal one-page PDF byte-by-byte (body first, then an xref
//! table with correct offsets so `pdf-extract` can parse it) alongside
//! plain-text files, and verifies extraction, filtering, ordering, and
//! bad-file isolation.

use std::fs;
use tempfile::TempDir;

use ragchat::loader::{DocumentLoader, FolderLoader};

/// Minimal valid PDF containing the given phrase as page text.
fn minimal_pdf_with_phrase(phrase: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET\n", phrase);
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}endstream endobj\n",
            stream.len(),
            stream
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

#[tokio::test]
async fn loads_pdf_and_text_files_sorted_by_name() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("policy.pdf"),
        minimal_pdf_with_phrase("Refunds are processed within 14 days"),
    )
    .unwrap();
    fs::write(tmp.path().join("about.txt"), "We sell widgets.").unwrap();
    fs::write(tmp.path().join("faq.md"), "# FAQ\n\nShipping takes a week.").unwrap();
    fs::write(tmp.path().join("server.log"), "not a document").unwrap();

    let loader = FolderLoader::new(700, 50).unwrap();
    let documents = loader.load(tmp.path()).await.unwrap();

    let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["about.txt", "faq.md", "policy.pdf"]);

    let pdf = &documents[2];
    assert!(
        pdf.content.contains("Refunds are processed within 14 days"),
        "extracted: {:?}",
        pdf.content
    );
}

#[tokio::test]
async fn a_corrupt_pdf_is_skipped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.pdf"), b"not a pdf at all").unwrap();
    fs::write(tmp.path().join("ok.txt"), "Readable content.").unwrap();

    let loader = FolderLoader::new(700, 50).unwrap();
    let documents = loader.load(tmp.path()).await.unwrap();

    let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["ok.txt"]);
}

#[tokio::test]
async fn missing_folder_is_an_error() {
    let loader = FolderLoader::new(700, 50).unwrap();
    let err = loader
        .load(std::path::Path::new("/definitely/not/here"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[tokio::test]
async fn loaded_documents_split_into_identified_chunks() {
    let tmp = TempDir::new().unwrap();
    let body = "Shipping policy paragraph one with enough text to split.\n\n\
                Returns policy paragraph two with enough text to split as well.";
    fs::write(tmp.path().join("policies.txt"), body).unwrap();

    let loader = FolderLoader::new(60, 10).unwrap();
    let documents = loader.load(tmp.path()).await.unwrap();
    let chunks = loader.split(&documents[0]);

    assert!(chunks.len() > 1);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_id, format!("policies.txt_chunk_{}", i));
        assert_eq!(chunk.source, "policies.txt");
    }
}
