use std::path::Path;
use std::process::Command;

/// Short commit id for `sprintboard --version`; "unknown" outside a git checkout.
fn git_revision(repo_root: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["describe", "--always", "--dirty"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!rev.is_empty()).then_some(rev)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = Path::new(&manifest_dir).join("..");

    println!("cargo:rerun-if-changed={}", repo_root.join(".git/HEAD").display());
    let rev = git_revision(&repo_root).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=SPRINTBOARD_BUILD_SHA={rev}");
}
